//! Integration tests: notebooks from disk through to run summaries

use std::path::{Path, PathBuf};

use testmynb::cli::discovery::find_notebooks;
use testmynb::handler::TestHandler;
use testmynb::interp::{CellExecutor, Interpreter, Namespace, SharedBuffer};
use testmynb::notebook::{HmacNotary, Notebook, NotebookDocument, NotebookError, Outcome};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn quiet_interpreter() -> Interpreter {
    Interpreter::with_output(SharedBuffer::default())
}

/// A notebook made of the given code-cell sources.
fn notebook(sources: &[&str]) -> Notebook {
    let cells: Vec<serde_json::Value> = sources
        .iter()
        .map(|source| serde_json::json!({"cell_type": "code", "metadata": {}, "outputs": [], "source": source}))
        .collect();
    let json = serde_json::json!({"nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": cells});
    let document = NotebookDocument::from_json_str(&json.to_string(), Path::new("test_inline.ipynb")).unwrap();
    Notebook::from_document(Path::new("/work/test_inline.ipynb"), document, false)
}

// ============================================================================
// Single-notebook scenarios
// ============================================================================

#[test]
fn test_passing_cell() {
    let mut nb = notebook(&["%%testcell t1\nassert True"]);
    nb.run(&mut quiet_interpreter());
    assert_eq!(nb.result(), Some("."));
    assert!(nb.get_error_stack().is_empty());
    assert!(nb.get_fail_stack().is_empty());
}

#[test]
fn test_failing_cell() {
    let mut nb = notebook(&["%%testcell t1\nassert False"]);
    nb.run(&mut quiet_interpreter());
    assert_eq!(nb.result(), Some("F"));
    let fails = nb.get_fail_stack();
    assert_eq!(fails.len(), 1);
    let (cell, traceback) = fails.first().unwrap();
    assert_eq!(cell.name(), "t1");
    assert_eq!(
        *traceback,
        "  File \"/work/test_inline.ipynb\", line 1, in t1\n    assert False\nAssertionError\n"
    );
    assert!(nb.get_error_stack().is_empty());
}

#[test]
fn test_erroring_cell() {
    let mut nb = notebook(&["%%testcell t1\nraise ValueError()"]);
    nb.run(&mut quiet_interpreter());
    assert_eq!(nb.result(), Some("E"));
    assert_eq!(nb.get_error_stack().len(), 1);
    assert!(nb.get_fail_stack().is_empty());
}

#[test]
fn test_bindings_carry_to_later_cells() {
    let mut nb = notebook(&["%%testcell a\nx = 1", "%%testcell b\nassert x == 1"]);
    nb.run(&mut quiet_interpreter());
    assert_eq!(nb.result(), Some(".."));
}

#[test]
fn test_fresh_namespaces_do_not_share_bindings() {
    let nb = notebook(&["%%testcell a\nx = 1", "%%testcell b\nassert x == 1"]);
    let mut interpreter = quiet_interpreter();
    let outcomes: Vec<Outcome> = nb
        .tests()
        .iter()
        .map(|cell| {
            let mut cell = cell.clone();
            let mut fresh = Namespace::default();
            cell.run(&mut interpreter, &mut fresh).0
        })
        .collect();
    assert_eq!(outcomes, vec![Outcome::Passed, Outcome::Errored]);
}

#[test]
fn test_ignore_flag_with_comment() {
    let nb = notebook(&["%%testcell -n # comment text\nx = 1"]);
    let cell = &nb.tests()[0];
    assert!(cell.ignore());
    assert_eq!(cell.name(), "unnamed");
    assert!(testmynb::notebook::magic::split_line("%%testcell -n # comment text").is_empty());
}

#[test]
fn test_bindings_before_an_exception_are_kept() {
    let mut nb = notebook(&[
        "%%testcell partial\nbefore = 1\nraise RuntimeError('stop')\nafter = 2",
        "%%testcell check\nassert before == 1",
    ]);
    nb.run(&mut quiet_interpreter());
    assert_eq!(nb.result(), Some("E."));
    assert!(nb.namespace().contains("before"));
    assert!(!nb.namespace().contains("after"));
}

#[test]
fn test_syntax_errors_are_errors_not_failures() {
    let mut nb = notebook(&["%%testcell broken\nx = (1,\nassert True"]);
    nb.run(&mut quiet_interpreter());
    assert_eq!(nb.result(), Some("E"));
    let errors = nb.get_error_stack();
    let traceback = errors.values().next().unwrap();
    assert!(traceback.starts_with("  File \"/work/test_inline.ipynb\", line "));
    assert!(traceback.contains("SyntaxError"));
}

#[test]
fn test_marker_text_later_in_a_cell_is_kept() {
    let nb = notebook(&["%%testcell first\nlabel = '%%testcell second'\nassert label.startswith('%%')"]);
    assert_eq!(nb.tests()[0].source(), "label = '%%testcell second'\nassert label.startswith('%%')");
}

// ============================================================================
// Fixture notebooks
// ============================================================================

#[test]
fn test_mixed_fixture() {
    let mut nb: Notebook = Notebook::open(&fixture("test_mixed.ipynb"), &HmacNotary::default()).unwrap();
    assert!(!nb.trusted());
    let names: Vec<&str> = nb.tests().iter().map(|cell| cell.name()).collect();
    assert_eq!(names, vec!["setup", "totals", "wrong", "boom", "unnamed"]);

    nb.run(&mut quiet_interpreter());
    assert_eq!(nb.result(), Some("..FEE"));

    let fails = nb.get_fail_stack();
    let traceback = fails.values().next().unwrap();
    assert!(traceback.ends_with("line 2, in wrong\n    assert x == 5, f\"x was {x}\"\nAssertionError: x was 4\n"));

    let errors: Vec<String> = nb.get_error_stack().keys().map(|cell| cell.name().to_string()).collect();
    assert_eq!(errors, vec!["boom", "unnamed"]);
    let unnamed = nb.get_error_stack().values().last().unwrap().to_string();
    assert!(unnamed.ends_with("NameError: name 'helper' is not defined\n"));
}

#[test]
fn test_v3_fixture_runs() {
    let mut nb: Notebook = Notebook::open(&fixture("test_legacy_v3.ipynb"), &HmacNotary::default()).unwrap();
    assert_eq!(nb.document().nbformat, 3);
    nb.run(&mut quiet_interpreter());
    assert_eq!(nb.result(), Some("."));
}

#[test]
fn test_malformed_fixture_is_rejected() {
    let err = Notebook::<Interpreter>::open(&fixture("broken.ipynb"), &HmacNotary::default()).unwrap_err();
    assert!(matches!(err, NotebookError::Json { .. }));
}

#[test]
fn test_handler_over_discovered_fixtures() {
    let paths = find_notebooks(&[fixture("")]).unwrap();
    let notary = HmacNotary::default();
    let notebooks: Vec<Notebook> = paths.iter().map(|path| Notebook::open(path, &notary).unwrap()).collect();
    let names: Vec<&str> = notebooks.iter().map(|nb| nb.name()).collect();
    assert_eq!(
        names,
        vec!["test_kept.ipynb", "test_legacy_v3.ipynb", "test_mixed.ipynb", "test_passing.ipynb"]
    );

    let mut handler = TestHandler::new(notebooks);
    let summary = handler.run(&mut quiet_interpreter());
    assert_eq!(summary.test_count, 12);
    assert_eq!(summary.counts.passed, 9);
    assert_eq!(summary.counts.failed, 1);
    assert_eq!(summary.counts.errored, 2);
    assert!(!summary.success());
    assert_eq!(handler.collect_fails().len(), 1);
    assert_eq!(handler.collect_errors().len(), 2);
}

#[test]
fn test_dialect_names_the_version() {
    assert!(quiet_interpreter().dialect().contains(testmynb::version::TESTMYNB_VERSION));
}

// ============================================================================
// Command line
// ============================================================================

#[test]
fn test_execute_exit_codes() {
    use testmynb::cli::{ExitCode, execute};
    use testmynb::{ColorChoice, RunConfig};

    let passing = RunConfig::new()
        .with_paths(vec![fixture("test_passing.ipynb")])
        .with_color(ColorChoice::Never)
        .with_quiet(true);
    assert_eq!(execute(&passing).unwrap(), ExitCode::SUCCESS);

    let mixed = passing.clone().with_paths(vec![fixture("test_mixed.ipynb")]);
    assert_eq!(execute(&mixed).unwrap(), ExitCode::FAILURE);

    let broken = passing.with_paths(vec![fixture("broken.ipynb")]);
    assert_eq!(execute(&broken).unwrap_err().exit_code, ExitCode::USAGE);
}
