//! Token types for the cell lexer

use std::fmt;

use crate::ast::Span;
use testmynb_core::lang::keywords::{self, KeywordId};
use testmynb_core::lang::operators::{self, OperatorId};
use testmynb_core::lang::punctuation::{self, PunctuationId};

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Token types for the cell language.
///
/// Keywords, operators and punctuation carry registry ids rather than their spellings.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Identifiers and Literals ==========
    Ident(String),
    Int(i64),
    /// An integer literal too wide for `i64`, kept as validated digits in `radix`.
    BigInt { digits: String, radix: u32 },
    Float(f64),
    String(String),
    FString(Vec<FStringPart>),

    // ========== Indentation ==========
    Newline,
    Indent,
    Dedent,

    Eof,
}

/// Part of an f-string
#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    Literal(String),
    /// Raw expression source between braces; the parser lexes and parses it.
    Expr {
        source: String,
        conversion: Option<char>,
        format_spec: Option<String>,
    },
}

/// Resolve an identifier spelling to a reserved keyword.
#[inline]
pub fn keyword_id(spelling: &str) -> Option<KeywordId> {
    keywords::from_str(spelling)
}

/// A token with its kind and span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(id) => write!(f, "'{}'", keywords::as_str(*id)),
            TokenKind::Operator(id) => write!(f, "'{}'", operators::as_str(*id)),
            TokenKind::Punctuation(id) => write!(f, "'{}'", punctuation::as_str(*id)),
            TokenKind::Ident(name) => write!(f, "name '{name}'"),
            TokenKind::Int(n) => write!(f, "number {n}"),
            TokenKind::BigInt { digits, .. } => write!(f, "number {digits}"),
            TokenKind::Float(x) => write!(f, "number {x}"),
            TokenKind::String(_) | TokenKind::FString(_) => write!(f, "string literal"),
            TokenKind::Newline => write!(f, "end of line"),
            TokenKind::Indent => write!(f, "unexpected indent"),
            TokenKind::Dedent => write!(f, "dedent"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
