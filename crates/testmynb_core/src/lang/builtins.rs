//! Builtin function vocabulary.
//!
//! This module defines the canonical set of builtin functions visible to every test cell without an import.
//! Callers should use the stable identifier [`BuiltinFnId`] for identity and query spellings and other metadata
//! through [`BuiltinFnInfo`] / [`BUILTIN_FUNCTIONS`].
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Exception constructors (`ValueError(...)`) are not listed here; see [`crate::lang::exceptions`].
//!
//! ## Examples
//! ```rust
//! use testmynb_core::lang::builtins::{self, BuiltinFnId};
//!
//! assert_eq!(builtins::from_str("len"), Some(BuiltinFnId::Len));
//! assert_eq!(builtins::as_str(BuiltinFnId::Isinstance), "isinstance");
//! ```

use super::registry::{LangItemInfo, Support};

/// Stable identifier for a builtin function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFnId {
    Print,
    Len,
    Range,
    Str,
    Int,
    Float,
    Bool,
    List,
    Tuple,
    Dict,
    Abs,
    Min,
    Max,
    Sum,
    Sorted,
    Reversed,
    Enumerate,
    Zip,
    Isinstance,
    Repr,
    Round,
    Any,
    All,
}

/// Metadata for a builtin function.
pub type BuiltinFnInfo = LangItemInfo<BuiltinFnId>;

/// Registry of all builtin functions.
pub const BUILTIN_FUNCTIONS: &[BuiltinFnInfo] = &[
    info(
        BuiltinFnId::Print,
        "print",
        "Write values to the executor's output sink, separated by `sep` and terminated by `end`.",
        Support::Partial,
    ),
    info(
        BuiltinFnId::Len,
        "len",
        "Return the length of a string, list, tuple, dict or range.",
        Support::Full,
    ),
    info(
        BuiltinFnId::Range,
        "range",
        "Return an arithmetic progression of integers.",
        Support::Full,
    ),
    info(BuiltinFnId::Str, "str", "Convert a value to its string form.", Support::Full),
    info(
        BuiltinFnId::Int,
        "int",
        "Convert a number or numeric string to an integer.",
        Support::Partial,
    ),
    info(
        BuiltinFnId::Float,
        "float",
        "Convert a number or numeric string to a float.",
        Support::Full,
    ),
    info(BuiltinFnId::Bool, "bool", "Return the truthiness of a value.", Support::Full),
    info(BuiltinFnId::List, "list", "Build a list from an iterable.", Support::Full),
    info(BuiltinFnId::Tuple, "tuple", "Build a tuple from an iterable.", Support::Full),
    info(
        BuiltinFnId::Dict,
        "dict",
        "Build a dict from key/value pairs or keyword arguments.",
        Support::Partial,
    ),
    info(BuiltinFnId::Abs, "abs", "Return the absolute value of a number.", Support::Full),
    info(
        BuiltinFnId::Min,
        "min",
        "Return the smallest item of an iterable or of the arguments.",
        Support::Partial,
    ),
    info(
        BuiltinFnId::Max,
        "max",
        "Return the largest item of an iterable or of the arguments.",
        Support::Partial,
    ),
    info(
        BuiltinFnId::Sum,
        "sum",
        "Sum the items of an iterable, starting from an optional start value.",
        Support::Full,
    ),
    info(
        BuiltinFnId::Sorted,
        "sorted",
        "Return a new sorted list (supports `key=` and `reverse=`).",
        Support::Full,
    ),
    info(
        BuiltinFnId::Reversed,
        "reversed",
        "Return the items of a sequence in reverse order.",
        Support::Full,
    ),
    info(
        BuiltinFnId::Enumerate,
        "enumerate",
        "Pair each item of an iterable with its index.",
        Support::Full,
    ),
    info(
        BuiltinFnId::Zip,
        "zip",
        "Aggregate items from several iterables into tuples.",
        Support::Full,
    ),
    info(
        BuiltinFnId::Isinstance,
        "isinstance",
        "Check a value against a builtin type or exception class (or a tuple of them).",
        Support::Partial,
    ),
    info(BuiltinFnId::Repr, "repr", "Return the printable representation of a value.", Support::Full),
    info(
        BuiltinFnId::Round,
        "round",
        "Round a number to a given precision (banker's rounding for halves).",
        Support::Full,
    ),
    info(
        BuiltinFnId::Any,
        "any",
        "Return `True` if any item of the iterable is truthy.",
        Support::Full,
    ),
    info(
        BuiltinFnId::All,
        "all",
        "Return `True` if every item of the iterable is truthy.",
        Support::Full,
    ),
];

/// Return the canonical spelling for a builtin function.
pub fn as_str(id: BuiltinFnId) -> &'static str {
    info_for(id).canonical
}

/// Return full metadata for a builtin function.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: BuiltinFnId) -> &'static BuiltinFnInfo {
    BUILTIN_FUNCTIONS
        .iter()
        .find(|b| b.id == id)
        .expect("builtin function info missing")
}

/// Resolve a builtin function by spelling.
///
/// ## Parameters
/// - `name`: Candidate builtin name (canonical or alias).
///
/// ## Returns
/// - `Some(BuiltinFnId)` if `name` matches a canonical spelling or alias.
/// - `None` otherwise.
pub fn from_str(name: &str) -> Option<BuiltinFnId> {
    if let Some(b) = BUILTIN_FUNCTIONS.iter().find(|b| b.canonical == name) {
        return Some(b.id);
    }
    BUILTIN_FUNCTIONS
        .iter()
        .find(|b| {
            let aliases: &[&str] = b.aliases;
            aliases.contains(&name)
        })
        .map(|b| b.id)
}

const fn info(id: BuiltinFnId, canonical: &'static str, description: &'static str, support: Support) -> BuiltinFnInfo {
    LangItemInfo {
        id,
        canonical,
        aliases: &[],
        description,
        support,
        examples: &[],
    }
}
