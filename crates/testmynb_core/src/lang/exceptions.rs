//! Builtin exception vocabulary (Python-like).
//!
//! This registry exists so the executor, docs and tooling treat builtin exception names as part of the language
//! vocabulary, similar to keywords/operators/builtins. Each entry also records its base class so `except` clauses
//! can match subclasses.

use crate::errors::ExceptionKind;

use super::registry::{Example, LangItemInfo, Support};

/// Metadata for a builtin exception kind.
///
/// ## Notes
/// - `parent` is `None` only for [`ExceptionKind::Exception`], the root of the hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct ExceptionInfo {
    pub item: LangItemInfo<ExceptionKind>,
    pub parent: Option<ExceptionKind>,
}

/// Registry of builtin exception kinds.
pub const EXCEPTIONS: &[ExceptionInfo] = &[
    info(
        ExceptionKind::Exception,
        "Exception",
        None,
        "Common base class for all exceptions raised by test cells.",
        &[],
    ),
    info(
        ExceptionKind::ArithmeticError,
        "ArithmeticError",
        Some(ExceptionKind::Exception),
        "Base class for arithmetic errors.",
        &[],
    ),
    info(
        ExceptionKind::LookupError,
        "LookupError",
        Some(ExceptionKind::Exception),
        "Base class for lookup errors.",
        &[],
    ),
    info(
        ExceptionKind::AssertionError,
        "AssertionError",
        Some(ExceptionKind::Exception),
        "Raised when an `assert` statement fails. A test cell raising it is reported as failed.",
        &[Example {
            code: "assert 1 == 2, \"math is broken\"",
            note: Some("Reported as `F` with `AssertionError: math is broken`."),
        }],
    ),
    info(
        ExceptionKind::AttributeError,
        "AttributeError",
        Some(ExceptionKind::Exception),
        "Raised when an attribute or method does not exist on a value.",
        &[],
    ),
    info(
        ExceptionKind::ImportError,
        "ImportError",
        Some(ExceptionKind::Exception),
        "Raised when a name cannot be imported from a module.",
        &[],
    ),
    info(
        ExceptionKind::ModuleNotFoundError,
        "ModuleNotFoundError",
        Some(ExceptionKind::ImportError),
        "Raised when a module is not available to the executor.",
        &[Example {
            code: "import numpy",
            note: Some("Reported as `E` with `ModuleNotFoundError: No module named 'numpy'`."),
        }],
    ),
    info(
        ExceptionKind::IndexError,
        "IndexError",
        Some(ExceptionKind::LookupError),
        "Raised when a sequence index is out of range.",
        &[Example {
            code: "[1, 2, 3][99]",
            note: Some("Raises `IndexError: list index out of range`."),
        }],
    ),
    info(
        ExceptionKind::KeyError,
        "KeyError",
        Some(ExceptionKind::LookupError),
        "Raised when a dict key is missing.",
        &[Example {
            code: "{\"a\": 1}[\"b\"]",
            note: Some("Raises `KeyError: 'b'`."),
        }],
    ),
    info(
        ExceptionKind::MemoryError,
        "MemoryError",
        Some(ExceptionKind::Exception),
        "Raised when an operation cannot allocate the memory its result needs.",
        &[Example {
            code: "[0] * 10**12",
            note: Some("Raises `MemoryError` and the cell is reported as `E`."),
        }],
    ),
    info(
        ExceptionKind::NameError,
        "NameError",
        Some(ExceptionKind::Exception),
        "Raised when a name is not bound in the local, notebook or builtin scope.",
        &[],
    ),
    info(
        ExceptionKind::UnboundLocalError,
        "UnboundLocalError",
        Some(ExceptionKind::NameError),
        "Raised when a function-local name is read before assignment.",
        &[],
    ),
    info(
        ExceptionKind::NotImplementedError,
        "NotImplementedError",
        Some(ExceptionKind::RuntimeError),
        "Raised by code paths that are intentionally left unimplemented.",
        &[],
    ),
    info(
        ExceptionKind::OverflowError,
        "OverflowError",
        Some(ExceptionKind::ArithmeticError),
        "Raised when a numeric result is outside the range its type can represent.",
        &[],
    ),
    info(
        ExceptionKind::RecursionError,
        "RecursionError",
        Some(ExceptionKind::RuntimeError),
        "Raised when function calls nest deeper than the executor allows.",
        &[],
    ),
    info(
        ExceptionKind::RuntimeError,
        "RuntimeError",
        Some(ExceptionKind::Exception),
        "Raised for errors that do not fall into any other category.",
        &[],
    ),
    info(
        ExceptionKind::StopIteration,
        "StopIteration",
        Some(ExceptionKind::Exception),
        "Raised when an iterator is exhausted.",
        &[],
    ),
    info(
        ExceptionKind::SyntaxError,
        "SyntaxError",
        Some(ExceptionKind::Exception),
        "Raised when cell source cannot be tokenized or parsed.",
        &[],
    ),
    info(
        ExceptionKind::IndentationError,
        "IndentationError",
        Some(ExceptionKind::SyntaxError),
        "Raised when a cell's indentation is inconsistent.",
        &[],
    ),
    info(
        ExceptionKind::TypeError,
        "TypeError",
        Some(ExceptionKind::Exception),
        "Raised when an operation receives a value of an inappropriate type.",
        &[Example {
            code: "1 + \"a\"",
            note: Some("Raises `TypeError: unsupported operand type(s) for +: 'int' and 'str'`."),
        }],
    ),
    info(
        ExceptionKind::ValueError,
        "ValueError",
        Some(ExceptionKind::Exception),
        "Raised when an operation receives a value of the right type but an invalid value.",
        &[Example {
            code: "int(\"abc\")",
            note: Some("Raises `ValueError: invalid literal for int() with base 10: 'abc'`."),
        }],
    ),
    info(
        ExceptionKind::ZeroDivisionError,
        "ZeroDivisionError",
        Some(ExceptionKind::ArithmeticError),
        "Raised when dividing or taking modulo by zero.",
        &[Example {
            code: "1 / 0",
            note: Some("Raises `ZeroDivisionError: division by zero`."),
        }],
    ),
];

/// Return the canonical spelling for an exception kind (e.g. `"ValueError"`).
#[inline]
pub fn as_str(kind: ExceptionKind) -> &'static str {
    info_for(kind).item.canonical
}

/// Return the user-facing description for an exception kind.
#[inline]
pub fn description(kind: ExceptionKind) -> &'static str {
    info_for(kind).item.description
}

/// Return the direct base class of an exception kind.
#[inline]
pub fn parent(kind: ExceptionKind) -> Option<ExceptionKind> {
    info_for(kind).parent
}

/// Check whether `kind` is `base` or derives from it.
///
/// ## Examples
/// ```rust
/// use testmynb_core::errors::ExceptionKind;
/// use testmynb_core::lang::exceptions::is_subclass;
///
/// assert!(is_subclass(ExceptionKind::KeyError, ExceptionKind::LookupError));
/// assert!(is_subclass(ExceptionKind::KeyError, ExceptionKind::Exception));
/// assert!(!is_subclass(ExceptionKind::KeyError, ExceptionKind::IndexError));
/// ```
pub fn is_subclass(kind: ExceptionKind, base: ExceptionKind) -> bool {
    let mut current = Some(kind);
    while let Some(k) = current {
        if k == base {
            return true;
        }
        current = parent(k);
    }
    false
}

/// Resolve a spelling to an exception kind.
///
/// Matching is case-sensitive.
pub fn from_str(name: &str) -> Option<ExceptionKind> {
    EXCEPTIONS.iter().find(|e| e.item.canonical == name).map(|e| e.item.id)
}

/// Return full metadata for an exception kind.
///
/// ## Panics
/// - If the registry is missing an entry for `kind` (programming error).
pub fn info_for(kind: ExceptionKind) -> &'static ExceptionInfo {
    EXCEPTIONS
        .iter()
        .find(|e| e.item.id == kind)
        .expect("exception info missing")
}

const fn info(
    id: ExceptionKind,
    canonical: &'static str,
    parent: Option<ExceptionKind>,
    description: &'static str,
    examples: &'static [Example],
) -> ExceptionInfo {
    ExceptionInfo {
        item: LangItemInfo {
            id,
            canonical,
            aliases: &[],
            description,
            support: Support::Full,
            examples,
        },
        parent,
    }
}
