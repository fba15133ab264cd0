//! Builtin exception kinds and the shared user-facing error messages raised with them.
//!
//! The cell executor raises these kinds at runtime; the notebook layer classifies an [`ExceptionKind::AssertionError`]
//! as a *failed* test cell and every other kind as an *errored* one. Message constants live here so the executor's
//! helpers and its tests agree on the exact wording.

pub use crate::strings::{STRING_INDEX_OUT_OF_RANGE_MSG, STRING_SLICE_STEP_ZERO_MSG};

/// Identify a builtin exception class.
///
/// ## Notes
/// - The class hierarchy (`except LookupError` catching `KeyError`, …) is described by
///   [`crate::lang::exceptions::parent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    Exception,
    ArithmeticError,
    LookupError,
    AssertionError,
    AttributeError,
    ImportError,
    ModuleNotFoundError,
    IndexError,
    KeyError,
    MemoryError,
    NameError,
    UnboundLocalError,
    NotImplementedError,
    OverflowError,
    RecursionError,
    RuntimeError,
    StopIteration,
    SyntaxError,
    IndentationError,
    TypeError,
    ValueError,
    ZeroDivisionError,
}

/// Raised by `list[i]` / `tuple[i]` with an out-of-range index.
pub const LIST_INDEX_OUT_OF_RANGE_MSG: &str = "list index out of range";
/// Raised by `tuple[i]` with an out-of-range index.
pub const TUPLE_INDEX_OUT_OF_RANGE_MSG: &str = "tuple index out of range";
/// Raised by `list.pop()` on an empty list.
pub const POP_FROM_EMPTY_LIST_MSG: &str = "pop from empty list";
/// Raised by `range(a, b, 0)`.
pub const RANGE_STEP_ZERO_MSG: &str = "range() arg 3 must not be zero";
/// Raised by `/` with a zero divisor.
pub const DIVISION_BY_ZERO_MSG: &str = "division by zero";
/// Raised by `/` with a zero divisor when either operand is a float.
pub const FLOAT_DIVISION_BY_ZERO_MSG: &str = "float division by zero";
/// Raised by `//` and `%` with a zero integer divisor.
pub const INTEGER_DIVISION_BY_ZERO_MSG: &str = "integer division or modulo by zero";
/// Raised by `//` with a zero float divisor.
pub const FLOAT_FLOOR_DIVISION_BY_ZERO_MSG: &str = "float floor division by zero";
/// Raised by `%` with a zero float divisor.
pub const FLOAT_MODULO_BY_ZERO_MSG: &str = "float modulo";
/// Raised by integer `**` with a negative base of zero.
pub const ZERO_NEGATIVE_POWER_MSG: &str = "0.0 cannot be raised to a negative power";
/// Raised when a value does not fit the machine integer a builtin needs (an index, a repeat count).
pub const INTEGER_OVERFLOW_MSG: &str = "integer overflow";
/// Raised when an integer operand of a float operation is beyond the float range.
pub const INT_TOO_LARGE_FOR_FLOAT_MSG: &str = "int too large to convert to float";
/// Raised when an index-like integer does not fit a machine word.
pub const INDEX_SIZED_INTEGER_MSG: &str = "cannot fit 'int' into an index-sized integer";
/// Raised when call depth exceeds the executor's limit.
pub const RECURSION_DEPTH_MSG: &str = "maximum recursion depth exceeded";
