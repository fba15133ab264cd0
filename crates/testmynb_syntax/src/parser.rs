//! Parser for test-cell sources
//!
//! Converts a token stream into an AST for the Python subset the cell executor runs.
//!
//! ## Examples
//!
//! ```rust
//! use testmynb_syntax::{lexer, parser};
//!
//! let source = "def add(a, b=1):\n    return a + b\nassert add(1) == 2\n";
//! let tokens = lexer::lex(source).unwrap();
//! let program = parser::parse(&tokens).unwrap();
//! assert_eq!(program.body.len(), 2);
//! ```

use crate::ast::*;
use crate::diagnostics::CompileError;
use crate::lexer::{self, FStringPart as LexFStringPart, Token, TokenKind};
use testmynb_core::lang::keywords::{self, KeywordId};
use testmynb_core::lang::operators::{self, OperatorId};
use testmynb_core::lang::punctuation::PunctuationId;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/decl.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
