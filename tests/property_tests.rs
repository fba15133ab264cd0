//! Property-based tests for magic-line parsing and notebook runs
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::path::Path;
use std::rc::Rc;

use proptest::prelude::*;
use testmynb::handler::{Counts, TestHandler};
use testmynb::interp::{Interpreter, Namespace, SharedBuffer};
use testmynb::notebook::magic::{MAGIC_COMMAND, split_line};
use testmynb::notebook::{Notebook, NotebookDocument, NotebookRef, TestCell};

fn name_token() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}"
}

fn flag_token() -> impl Strategy<Value = String> {
    "-[a-z]{1,3}"
}

fn separator() -> impl Strategy<Value = String> {
    " {1,3}"
}

/// One cell body with a known outcome character.
fn cell_body() -> impl Strategy<Value = (&'static str, char)> {
    prop_oneof![
        Just(("assert True", '.')),
        Just(("value = 1", '.')),
        Just(("assert 1 == 2", 'F')),
        Just(("raise ValueError('bad')", 'E')),
        Just(("[1][3]", 'E')),
    ]
}

fn inline_notebook(bodies: &[&str]) -> Notebook {
    let cells: Vec<serde_json::Value> = bodies
        .iter()
        .enumerate()
        .map(|(i, body)| {
            serde_json::json!({"cell_type": "code", "source": format!("{MAGIC_COMMAND} cell{i}\n{body}")})
        })
        .collect();
    let json = serde_json::json!({"nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": cells});
    let document = NotebookDocument::from_json_str(&json.to_string(), Path::new("test_prop.ipynb")).unwrap();
    Notebook::from_document(Path::new("/work/test_prop.ipynb"), document, false)
}

// =============================================================================
// Magic-line Properties
// =============================================================================

proptest! {
    /// Property: flags and any trailing comment never show up as positional tokens
    #[test]
    fn split_line_keeps_exactly_the_positional_tokens(
        tokens in prop::collection::vec(name_token(), 0..4),
        flags in prop::collection::vec(flag_token(), 0..3),
        seps in prop::collection::vec(separator(), 8),
        comment in prop::option::of(prop::collection::vec(name_token(), 0..3)),
    ) {
        let mut parts: Vec<String> = vec![MAGIC_COMMAND.to_string()];
        parts.extend(flags.iter().cloned());
        parts.extend(tokens.iter().cloned());
        if let Some(words) = comment {
            parts.push("#".to_string());
            parts.extend(words);
        }
        let mut line = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                line.push_str(&seps[i % seps.len()]);
            }
            line.push_str(part);
        }

        prop_assert_eq!(split_line(&line), tokens);
    }

    /// Property: only the first line is removed, whatever the body holds
    #[test]
    fn magic_line_is_stripped_once(body in "[ -~\n]{0,80}") {
        let notebook = Rc::new(NotebookRef {
            path: "/work/test_prop.ipynb".into(),
            name: "test_prop.ipynb".to_string(),
        });
        let cell = TestCell::new(&format!("{MAGIC_COMMAND} named\n{body}"), notebook, 0);
        prop_assert_eq!(cell.source(), body.as_str());
        prop_assert_eq!(cell.name(), "named");
    }
}

// =============================================================================
// Run Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: one result character per test cell, with stacks partitioning the non-passing cells
    #[test]
    fn result_and_stacks_agree(cells in prop::collection::vec(cell_body(), 0..8)) {
        let bodies: Vec<&str> = cells.iter().map(|(body, _)| *body).collect();
        let expected: String = cells.iter().map(|(_, outcome)| *outcome).collect();

        let mut nb = inline_notebook(&bodies);
        nb.run(&mut Interpreter::with_output(SharedBuffer::default()));
        let result = nb.result().unwrap_or_default().to_string();
        prop_assert_eq!(result.chars().count(), nb.tests().len());
        prop_assert_eq!(&result, &expected);

        let fails: Vec<usize> = nb.get_fail_stack().keys().map(|cell| cell.position()).collect();
        let errors: Vec<usize> = nb.get_error_stack().keys().map(|cell| cell.position()).collect();
        let expected_fails: Vec<usize> = expected.char_indices().filter(|(_, c)| *c == 'F').map(|(i, _)| i).collect();
        let expected_errors: Vec<usize> = expected.char_indices().filter(|(_, c)| *c == 'E').map(|(i, _)| i).collect();
        prop_assert_eq!(fails, expected_fails);
        prop_assert_eq!(errors, expected_errors);
    }

    /// Property: a cell run twice against fresh namespaces gives the same outcome and traceback
    #[test]
    fn fresh_namespace_runs_are_repeatable((body, expected) in cell_body()) {
        let notebook = Rc::new(NotebookRef {
            path: "/work/test_prop.ipynb".into(),
            name: "test_prop.ipynb".to_string(),
        });
        let cell = TestCell::new(&format!("{MAGIC_COMMAND} again\n{body}"), notebook, 0);

        let mut runs = Vec::new();
        for _ in 0..2 {
            let mut cell = cell.clone();
            let mut interpreter = Interpreter::with_output(SharedBuffer::default());
            runs.push(cell.run(&mut interpreter, &mut Namespace::default()));
        }
        prop_assert_eq!(&runs[0], &runs[1]);
        prop_assert_eq!(runs[0].0.as_char(), Some(expected));
    }

    /// Property: tallies across notebooks add up to the number of test cells
    #[test]
    fn counts_cover_every_cell(
        first in prop::collection::vec(cell_body(), 0..5),
        second in prop::collection::vec(cell_body(), 0..5),
    ) {
        let notebooks = [&first, &second]
            .iter()
            .map(|cells| inline_notebook(&cells.iter().map(|(body, _)| *body).collect::<Vec<_>>()))
            .collect();
        let mut handler = TestHandler::new(notebooks);
        let summary = handler.run(&mut Interpreter::with_output(SharedBuffer::default()));

        prop_assert_eq!(summary.counts.total(), first.len() + second.len());
        prop_assert_eq!(summary.test_count, summary.counts.total());
        let expected: String = first.iter().chain(second.iter()).map(|(_, c)| *c).collect();
        prop_assert_eq!(summary.counts, Counts::from_result(&expected));
        prop_assert_eq!(summary.success(), !expected.contains(['F', 'E']));
    }
}
