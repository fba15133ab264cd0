//! `%%testcell` magic-line parsing and the assert-presence advisory check.
//!
//! A test cell starts with a line such as:
//!
//! ```text
//! %%testcell check_totals -n # anything after a lone '#' is a comment
//! ```
//!
//! Tokens are separated by runs of spaces. Tokens starting with `%` or `-` are the command and its flags; the first
//! remaining token names the cell.
//!
//! ## Examples
//!
//! ```rust
//! use testmynb::notebook::magic::{search_assert, split_line};
//!
//! assert_eq!(split_line("%%testcell test_cell1 # hello"), vec!["test_cell1"]);
//! assert!(split_line("%%testcell -n # test_cell1").is_empty());
//! assert!(search_assert("print();assert True"));
//! assert!(!search_assert("print('assert')"));
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// The command that marks a code cell as a test cell.
pub const MAGIC_COMMAND: &str = "%%testcell";

/// Flag that turns off the missing-assert advisory for a cell.
pub const IGNORE_FLAG: &str = "-n";

/// Token that starts a trailing comment on the magic line.
pub const COMMENT_TOKEN: &str = "#";

static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("INVARIANT: valid regex"));
static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"('.*')|(".*")"#).expect("INVARIANT: valid regex"));
static STATEMENT_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n|;").expect("INVARIANT: valid regex"));

/// Positional arguments of a magic line: flags, the command and empty tokens dropped, cut at the first `#` token.
pub fn split_line(line: &str) -> Vec<String> {
    let mut positional: Vec<String> = SPACES
        .split(line)
        .filter(|arg| !arg.is_empty() && !arg.starts_with('%') && !arg.starts_with('-'))
        .map(str::to_string)
        .collect();
    if let Some(comment) = positional.iter().position(|arg| arg == COMMENT_TOKEN) {
        positional.truncate(comment);
    }
    positional
}

/// Every token of the first source line after the command token, flags included.
///
/// Comments are not stripped, so a name written after `#` is still returned here. Use [`split_line`] for names.
pub fn parse_cell_magic(source: &str) -> Vec<String> {
    let line = source.split('\n').next().unwrap_or_default();
    SPACES.split(line).skip(1).map(str::to_string).collect()
}

/// Whether `source` starts with the test-cell command.
pub fn is_test_cell(source: &str) -> bool {
    source.starts_with(MAGIC_COMMAND)
}

// ============================================================================
// Assert-presence advisory
// ============================================================================

/// Delete quoted spans, greedily from the first quote to the last matching quote on each line.
pub fn remove_strings(text: &str) -> String {
    STRING_LITERAL.replace_all(text, "").into_owned()
}

/// Split on newlines and `;`, trim, and drop empty statements.
pub fn split_statements(text: &str) -> Vec<String> {
    STATEMENT_SEPARATOR
        .split(text)
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn assert_exists<S: AsRef<str>>(statements: &[S]) -> bool {
    statements.iter().any(|statement| statement.as_ref().starts_with("assert"))
}

/// Whether any statement of `cell` starts with `assert`, ignoring text inside string literals.
///
/// This is a textual heuristic: `assertion = 1` counts as an assert and an assert nested in a block body does too.
pub fn search_assert(cell: &str) -> bool {
    assert_exists(&split_statements(&remove_strings(cell)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line_takes_positional_tokens() {
        assert_eq!(split_line("%%testcell test_cell1 # hello"), vec!["test_cell1"]);
        assert_eq!(split_line("%%testcell  first   second"), vec!["first", "second"]);
    }

    #[test]
    fn test_split_line_drops_flags_and_comment() {
        assert!(split_line("%%testcell -n # test_cell1").is_empty());
        assert_eq!(split_line("%%testcell -n totals #"), vec!["totals"]);
        assert!(split_line("%%testcell").is_empty());
    }

    #[test]
    fn test_hash_glued_to_a_word_is_not_a_comment() {
        assert_eq!(split_line("%%testcell name #note"), vec!["name", "#note"]);
    }

    #[test]
    fn test_parse_cell_magic_keeps_flags() {
        let args = parse_cell_magic("%%testcell -n totals # c\nassert True");
        assert_eq!(args, vec!["-n", "totals", "#", "c"]);
        assert!(parse_cell_magic("%%testcell\nx = 1").is_empty());
    }

    #[test]
    fn test_remove_strings_is_greedy() {
        assert_eq!(remove_strings("print(\"hello\")"), "print()");
        assert_eq!(remove_strings("f('a') + g('b')"), "f()");
    }

    #[test]
    fn test_split_statements() {
        assert_eq!(split_statements("print()\nassert True"), vec!["print()", "assert True"]);
        assert_eq!(split_statements("print() ; assert True"), vec!["print()", "assert True"]);
        assert!(split_statements("\n;\n").is_empty());
    }

    #[test]
    fn test_search_assert() {
        assert!(search_assert("print();assert True"));
        assert!(!search_assert("print()"));
        assert!(!search_assert("x = 'assert'"));
        assert!(search_assert("x = 1\n    assert x"));
    }
}
