//! Shareable metadata for `testmynb_core::lang` registries.
//!
//! The `testmynb_core::lang` module is a set of **registry-first** vocabularies for the Python subset that test
//! cells are written in: keywords, operators, punctuation, builtin functions and builtin exceptions. This submodule
//! provides the small, dependency-free metadata types that are reused across all registries.
//!
//! ## Notes
//! - These types are intentionally lightweight and `Copy`-friendly so registries can live in `const` tables.
//! - Metadata is meant for tooling/docs/diagnostics; enforcement of syntax rules still lives in the lexer/parser.
//!
//! ## See also
//! - [`crate::lang::keywords`]
//! - [`crate::lang::operators`]
//! - [`crate::lang::builtins`]
//! - [`crate::lang::exceptions`]

/// Describe how far the cell executor supports a vocabulary item.
///
/// ## Notes
/// - `Unsupported` items are still *reserved*: the lexer recognizes them so the parser can report a clear
///   `SyntaxError` instead of treating the word as an identifier.
///
/// ## Examples
/// ```rust
/// use testmynb_core::lang::registry::Support;
///
/// let s = Support::Full;
/// assert!(s.is_executable());
/// assert!(!Support::Unsupported.is_executable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Support {
    /// Behaves like CPython for every form the parser accepts.
    Full,
    /// Executable, but only a documented subset of CPython's forms is accepted.
    Partial,
    /// Reserved word only; using it raises a `SyntaxError`.
    Unsupported,
}

impl Support {
    /// Return `true` if cells using this item can be executed.
    pub fn is_executable(self) -> bool {
        !matches!(self, Support::Unsupported)
    }
}

/// Represent a small example snippet for documentation.
///
/// ## Notes
/// - `code` is the example body, written as test-cell source.
/// - `note` is an optional short explanation (one or two sentences).
///
/// ## Examples
/// ```rust
/// use testmynb_core::lang::registry::Example;
///
/// let ex = Example {
///     code: "assert 1 + 1 == 2",
///     note: Some("Minimal passing test cell."),
/// };
/// assert!(ex.code.contains("assert"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Example {
    pub code: &'static str,
    pub note: Option<&'static str>,
}

/// Shared metadata shape for “registry-first” vocabulary items.
///
/// Many vocabularies share the same core fields:
/// - stable identity (`id`)
/// - accepted spellings (`canonical` + `aliases`)
/// - documentation (`description` + `examples`)
/// - executor support level (`support`)
///
/// Registries that need extra per-item data (e.g. operator precedence, exception parents) wrap this struct or
/// define their own info type with the same field names.
///
/// ## Notes
/// - `description` is intentionally mandatory to keep docs/tooling consistent.
/// - This type is `Copy` so it can live in `const` tables.
#[derive(Debug, Clone, Copy)]
pub struct LangItemInfo<Id> {
    pub id: Id,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub support: Support,
    pub examples: &'static [Example],
}
