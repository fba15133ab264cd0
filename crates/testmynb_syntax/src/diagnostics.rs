//! Diagnostics for cell sources.
//!
//! Lexer and parser errors are collected as [`CompileError`]s. The executor turns the first one into a
//! `SyntaxError` traceback, so messages are written to read well after `SyntaxError: `.

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::Span;

/// A lex/parse error with location information
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(testmynb::syntax))]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Error,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn syntax(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Syntax,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// An indentation problem (`IndentationError` in Python terms).
    pub fn indentation(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Indentation,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// 1-based line number of the error's start within `source`.
    pub fn line(&self, source: &str) -> usize {
        line_col(source, self.span.start).0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    Syntax,
    Indentation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Error => write!(f, "error"),
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Indentation => write!(f, "indentation error"),
        }
    }
}

/// Get the 1-based line and column for a byte offset.
///
/// ## Parameters
/// - `source`: the text the offset points into.
/// - `offset`: byte offset; clamped to the source length.
///
/// ## Returns
/// - `(line, column)`, both starting at 1. The column counts Unicode scalars.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let mut line_num = 1;
    let mut line_start = 0;

    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }

    let col = source[line_start..offset].chars().count() + 1;
    (line_num, col)
}

/// Render an error with the offending source line and a caret, for logs and `--verbose` style output.
pub fn render(file_name: &str, source: &str, error: &CompileError) -> String {
    let (line_num, col_num) = line_col(source, error.span.start);
    let line_text = source.lines().nth(line_num - 1).unwrap_or("");
    let gutter = line_num.to_string().len();

    let mut out = format!("{}: {}\n", error.kind, error.message);
    out.push_str(&format!("  --> {file_name}:{line_num}:{col_num}\n"));
    out.push_str(&format!("  {:>gutter$} |\n", ""));
    out.push_str(&format!("  {line_num:>gutter$} | {line_text}\n"));
    out.push_str(&format!("  {:>gutter$} | {}^\n", "", " ".repeat(col_num - 1)));
    for note in &error.notes {
        out.push_str(&format!("  = note: {note}\n"));
    }
    for hint in &error.hints {
        out.push_str(&format!("  = hint: {hint}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_counts_from_one() {
        let src = "a = 1\nbb = 2\n";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 6), (2, 1));
        assert_eq!(line_col(src, 9), (2, 4));
        assert_eq!(line_col(src, 999), (3, 1));
    }

    #[test]
    fn test_render_points_at_column() {
        let err = CompileError::syntax("invalid syntax".to_string(), Span::new(10, 11)).with_hint("check the '='");
        let rendered = render("cell", "x = 1\ny = = 2\n", &err);
        assert!(rendered.starts_with("syntax error: invalid syntax\n"));
        assert!(rendered.contains("  --> cell:2:5\n"));
        assert!(rendered.contains("  2 | y = = 2\n"));
        assert!(rendered.contains("    |     ^\n"));
        assert!(rendered.ends_with("  = hint: check the '='\n"));
    }
}
