//! Test-cell language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary of the Python subset that test cells are
//! executed as: reserved keywords, operators, punctuation, builtin functions and builtin exceptions.
//!
//! The design goal is to avoid stringly-typed checks scattered across the lexer, parser and executor.
//! Instead, callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up spellings/metadata via
//! registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata for shared use (diagnostics,
//!   executor dispatch, documentation).
//!
//! ## Examples
//! ```rust
//! use testmynb_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("if"), Some(KeywordId::If));
//! assert_eq!(keywords::as_str(KeywordId::If), "if");
//! ```

pub mod builtins;
pub mod exceptions;
pub mod keywords;
pub mod operators;
pub mod punctuation;
pub mod registry;
