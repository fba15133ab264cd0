//! Define the reserved keyword vocabulary for test-cell source.
//!
//! This module is the single source of truth for reserved words: a stable identifier ([`KeywordId`]) plus a
//! const metadata table ([`KEYWORDS`]) that records canonical spellings, categories, usage hints and how far the
//! cell executor supports each word.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive** (Python keywords are).
//! - This registry is intentionally **pure** (no AST/IO/side effects).
//! - Some reserved words are also “word operators” (e.g. `and`). If you need operator precedence/fixity, use
//!   [`crate::lang::operators`].
//!
//! ## Examples
//! ```rust
//! use testmynb_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("assert"), Some(KeywordId::Assert));
//! assert_eq!(keywords::as_str(KeywordId::Assert), "assert");
//! assert_eq!(keywords::from_str("Assert"), None);
//! ```
//!
//! ## See also
//! - [`crate::lang::operators`] for operator precedence/fixity metadata.

use super::registry::{Example, Support};

/// Stable identifier for every reserved keyword.
///
/// ## Notes
/// - The canonical spelling is accessible via [`as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Control flow / statements
    If,
    Elif,
    Else,
    While,
    For,
    Break,
    Continue,
    Return,
    Pass,
    Assert,
    Raise,
    Try,
    Except,
    Finally,
    Del,

    // Definitions
    Def,
    Lambda,
    Class,
    With,
    Yield,
    Async,
    Await,

    // Imports
    Import,
    From,
    As,

    // Scope declarations
    Global,
    Nonlocal,

    // Literals
    True,
    False,
    None,

    // Word operators
    And,
    Or,
    Not,
    In,
    Is,
}

/// High-level grouping for documentation and tooling.
///
/// ## Notes
/// - Categories are metadata only; they do not enforce parsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    ControlFlow,
    Definition,
    Import,
    Scope,
    Literal,
    Operator,
}

/// Usage context hints (not enforced here; parser/lexer own context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordUsage {
    Statement,
    Expression,
    Clause,
    Operator,
}

/// Metadata for a keyword.
///
/// ## Notes
/// - `canonical` is the only accepted spelling; Python has no keyword aliases.
/// - `examples` are intended for generated documentation; keep them small and focused.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    pub usage: &'static [KeywordUsage],
    pub support: Support,
    pub examples: &'static [Example],
}

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Control flow / statements
    info(
        KeywordId::If,
        "if",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement, KeywordUsage::Expression],
        Support::Full,
    ),
    info(
        KeywordId::Elif,
        "elif",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Clause],
        Support::Full,
    ),
    info(
        KeywordId::Else,
        "else",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Clause, KeywordUsage::Expression],
        Support::Full,
    ),
    info(
        KeywordId::While,
        "while",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement],
        Support::Partial,
    ),
    info(
        KeywordId::For,
        "for",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement, KeywordUsage::Expression],
        Support::Partial,
    ),
    info(
        KeywordId::Break,
        "break",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement],
        Support::Full,
    ),
    info(
        KeywordId::Continue,
        "continue",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement],
        Support::Full,
    ),
    info(
        KeywordId::Return,
        "return",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement],
        Support::Full,
    ),
    info(
        KeywordId::Pass,
        "pass",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement],
        Support::Full,
    ),
    info_with_examples(
        KeywordId::Assert,
        "assert",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement],
        Support::Full,
        &[
            Example {
                code: "assert 1 + 1 == 2",
                note: Some("Passes silently."),
            },
            Example {
                code: "assert len(xs) == 3, \"expected three items\"",
                note: Some("Fails with `AssertionError: expected three items` when the condition is false."),
            },
        ],
    ),
    info(
        KeywordId::Raise,
        "raise",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement],
        Support::Partial,
    ),
    info(
        KeywordId::Try,
        "try",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement],
        Support::Full,
    ),
    info(
        KeywordId::Except,
        "except",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Clause],
        Support::Partial,
    ),
    info(
        KeywordId::Finally,
        "finally",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Clause],
        Support::Full,
    ),
    info(
        KeywordId::Del,
        "del",
        KeywordCategory::ControlFlow,
        &[KeywordUsage::Statement],
        Support::Full,
    ),
    // Definitions
    info(
        KeywordId::Def,
        "def",
        KeywordCategory::Definition,
        &[KeywordUsage::Statement],
        Support::Partial,
    ),
    info(
        KeywordId::Lambda,
        "lambda",
        KeywordCategory::Definition,
        &[KeywordUsage::Expression],
        Support::Partial,
    ),
    info(
        KeywordId::Class,
        "class",
        KeywordCategory::Definition,
        &[KeywordUsage::Statement],
        Support::Unsupported,
    ),
    info(
        KeywordId::With,
        "with",
        KeywordCategory::Definition,
        &[KeywordUsage::Statement],
        Support::Unsupported,
    ),
    info(
        KeywordId::Yield,
        "yield",
        KeywordCategory::Definition,
        &[KeywordUsage::Expression],
        Support::Unsupported,
    ),
    info(
        KeywordId::Async,
        "async",
        KeywordCategory::Definition,
        &[KeywordUsage::Statement],
        Support::Unsupported,
    ),
    info(
        KeywordId::Await,
        "await",
        KeywordCategory::Definition,
        &[KeywordUsage::Expression],
        Support::Unsupported,
    ),
    // Imports
    info(
        KeywordId::Import,
        "import",
        KeywordCategory::Import,
        &[KeywordUsage::Statement],
        Support::Partial,
    ),
    info(
        KeywordId::From,
        "from",
        KeywordCategory::Import,
        &[KeywordUsage::Statement],
        Support::Partial,
    ),
    info(
        KeywordId::As,
        "as",
        KeywordCategory::Import,
        &[KeywordUsage::Clause],
        Support::Full,
    ),
    // Scope declarations
    info(
        KeywordId::Global,
        "global",
        KeywordCategory::Scope,
        &[KeywordUsage::Statement],
        Support::Full,
    ),
    info(
        KeywordId::Nonlocal,
        "nonlocal",
        KeywordCategory::Scope,
        &[KeywordUsage::Statement],
        Support::Unsupported,
    ),
    // Literals
    info(
        KeywordId::True,
        "True",
        KeywordCategory::Literal,
        &[KeywordUsage::Expression],
        Support::Full,
    ),
    info(
        KeywordId::False,
        "False",
        KeywordCategory::Literal,
        &[KeywordUsage::Expression],
        Support::Full,
    ),
    info(
        KeywordId::None,
        "None",
        KeywordCategory::Literal,
        &[KeywordUsage::Expression],
        Support::Full,
    ),
    // Word operators
    info(
        KeywordId::And,
        "and",
        KeywordCategory::Operator,
        &[KeywordUsage::Operator],
        Support::Full,
    ),
    info(
        KeywordId::Or,
        "or",
        KeywordCategory::Operator,
        &[KeywordUsage::Operator],
        Support::Full,
    ),
    info(
        KeywordId::Not,
        "not",
        KeywordCategory::Operator,
        &[KeywordUsage::Operator],
        Support::Full,
    ),
    info(
        KeywordId::In,
        "in",
        KeywordCategory::Operator,
        &[KeywordUsage::Operator, KeywordUsage::Clause],
        Support::Full,
    ),
    info(
        KeywordId::Is,
        "is",
        KeywordCategory::Operator,
        &[KeywordUsage::Operator],
        Support::Full,
    ),
];

/// Canonical spelling.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The keyword's canonical spelling (e.g. `"assert"`).
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Category.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The keyword's [`KeywordCategory`].
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Executor support level.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The keyword's [`Support`] level.
pub fn support(id: KeywordId) -> Support {
    info_for(id).support
}

/// Full metadata.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The associated [`KeywordInfo`] from [`KEYWORDS`].
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Lookup by spelling.
///
/// ## Parameters
/// - `s`: Candidate keyword spelling.
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling matches this registry.
/// - `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical == s).map(|k| k.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(
    id: KeywordId,
    canonical: &'static str,
    category: KeywordCategory,
    usage: &'static [KeywordUsage],
    support: Support,
) -> KeywordInfo {
    info_with_examples(id, canonical, category, usage, support, &[])
}

const fn info_with_examples(
    id: KeywordId,
    canonical: &'static str,
    category: KeywordCategory,
    usage: &'static [KeywordUsage],
    support: Support,
    examples: &'static [Example],
) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        usage,
        support,
        examples,
    }
}
