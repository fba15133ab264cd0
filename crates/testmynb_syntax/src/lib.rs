//! Syntax frontend for the Python subset that test cells are written in: lexer, parser, AST, diagnostics.
//!
//! This crate is dependency-light and intended for reuse by the cell executor, the fuzz targets and any future
//! tooling that needs to look inside a test cell.
//!
//! ## Notes
//! - This crate is intentionally “syntax-only”: it does not resolve names or evaluate anything.
//! - Vocabulary identity (keywords/operators/punctuation) comes from `testmynb_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use testmynb_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("x = 1\nassert x == 1\n").unwrap();
//! let program = parser::parse(&tokens).unwrap();
//! assert_eq!(program.body.len(), 2);
//! ```
//!
//! ## See also
//! - `testmynb_core::lang` for registry-backed language vocabulary (keywords/operators/punctuation/etc.).

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod token_helpers;

use ast::Program;
use diagnostics::CompileError;

/// Lex and parse a complete cell source in one step.
///
/// ## Parameters
/// - `source`: the cell source (marker line already removed).
///
/// ## Returns
/// - `Ok(Program)` when the source is valid.
/// - `Err(Vec<CompileError>)` with every lexer error, or every parser error when lexing succeeded.
pub fn parse_source(source: &str) -> Result<Program, Vec<CompileError>> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens)
}
