//! Provide shared, pure semantic helpers and canonical language vocabulary for the testmynb cell executor.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers that both:
//! - the cell lexer/parser can use for spellings and precedence, and
//! - the executor can use to apply the same arithmetic, sequence and exception semantics at runtime.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, and no executor-specific value types.
//! - Current scope: numeric policy (Python-like semantics), string and sequence semantics (Unicode-scalar
//!   indexing/slicing, shared error messages), builtin exception kinds, and canonical language vocabulary.

pub mod errors;
pub mod lang;
pub mod strings;

/// Represent the numeric category used by semantic policy.
///
/// This is not a concrete runtime type. It exists to describe “int-like” and “float-like” behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericTy {
    Int,
    Float,
}

/// Represent a numeric operator subject to promotion/coercion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `//` (Python-style floor division): returns `Int` for `Int // Int`, otherwise `Float`.
    FloorDiv,
    Mod,
    Pow,
    // Comparisons (for coercion, not result type)
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Classify the exponent for `**` so policy can decide `Int` vs `Float` results.
///
/// ## Notes
/// - The executor knows the exponent's runtime value, so the sign of an integer exponent is always known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowExponentKind {
    /// A non-negative integer (e.g., `2`, `0`)
    NonNegativeInt,
    /// A negative integer (e.g., `-1`)
    NegativeInt,
    /// A float
    Float,
}

impl PowExponentKind {
    /// Classify a `**` exponent from its runtime value.
    ///
    /// ## Parameters
    /// - `rhs_is_float`: whether the exponent is a float.
    /// - `rhs_int`: the exponent's value when it is an integer.
    ///
    /// ## Returns
    /// - (`PowExponentKind`): the derived exponent category.
    pub fn classify(rhs_is_float: bool, rhs_int: Option<i64>) -> Self {
        match (rhs_is_float, rhs_int) {
            (false, Some(val)) if val >= 0 => PowExponentKind::NonNegativeInt,
            (false, Some(_)) => PowExponentKind::NegativeInt,
            _ => PowExponentKind::Float,
        }
    }
}

/// Determine the numeric result category for a binary operation.
///
/// ## Parameters
/// - `op`: the numeric operator.
/// - `lhs`: numeric category of the left operand.
/// - `rhs`: numeric category of the right operand.
/// - `pow_exp_kind`: exponent classification for `Pow` (`**`) operations.
///
/// ## Returns
/// - (`NumericTy`): `Int` or `Float` per Python's numeric tower (restricted to int/float).
///
/// ## Notes
/// - `/` always yields `Float` (even `Int / Int`).
/// - `//`, `%`, `+`, `-`, `*` yield `Float` if either operand is `Float`, otherwise `Int`.
/// - `**` yields `Int` only for `Int ** Int` with a non-negative exponent; otherwise `Float`.
///
/// ## Examples
/// ```rust
/// use testmynb_core::{result_numeric_type, NumericOp, NumericTy, PowExponentKind};
/// assert_eq!(result_numeric_type(NumericOp::Div, NumericTy::Int, NumericTy::Int, None), NumericTy::Float);
/// assert_eq!(
///     result_numeric_type(NumericOp::Pow, NumericTy::Int, NumericTy::Int, Some(PowExponentKind::NegativeInt)),
///     NumericTy::Float
/// );
/// ```
pub fn result_numeric_type(
    op: NumericOp,
    lhs: NumericTy,
    rhs: NumericTy,
    pow_exp_kind: Option<PowExponentKind>,
) -> NumericTy {
    match op {
        NumericOp::Div => NumericTy::Float,

        NumericOp::FloorDiv | NumericOp::Mod | NumericOp::Add | NumericOp::Sub | NumericOp::Mul => {
            if lhs == NumericTy::Float || rhs == NumericTy::Float {
                NumericTy::Float
            } else {
                NumericTy::Int
            }
        }

        NumericOp::Pow => {
            if lhs == NumericTy::Int && rhs == NumericTy::Int {
                match pow_exp_kind {
                    Some(PowExponentKind::NonNegativeInt) | None => NumericTy::Int,
                    _ => NumericTy::Float,
                }
            } else {
                NumericTy::Float
            }
        }

        // Comparisons compare as Float when either side is Float.
        NumericOp::Eq | NumericOp::NotEq | NumericOp::Lt | NumericOp::LtEq | NumericOp::Gt | NumericOp::GtEq => {
            if lhs == NumericTy::Float || rhs == NumericTy::Float {
                NumericTy::Float
            } else {
                NumericTy::Int
            }
        }
    }
}

/// Check whether an operator is a numeric comparison operator.
///
/// ## Returns
/// - (`bool`): `true` for `==`, `!=`, `<`, `<=`, `>`, `>=`.
pub fn is_numeric_comparison_op(op: NumericOp) -> bool {
    matches!(
        op,
        NumericOp::Eq | NumericOp::NotEq | NumericOp::Lt | NumericOp::LtEq | NumericOp::Gt | NumericOp::GtEq
    )
}

// =====================================================================
// Runtime-facing numeric helpers (pure; shared with the executor)
// =====================================================================

/// Python-like modulo for integers (sign of divisor).
///
/// ## Parameters
/// - `a`: dividend
/// - `b`: divisor (must be non-zero)
///
/// ## Returns
/// - (`i64`): remainder with the sign of the divisor.
#[inline]
pub fn py_mod_i64(a: i64, b: i64) -> i64 {
    debug_assert!(b != 0);
    // `wrapping_rem` keeps `i64::MIN % -1` at 0 instead of overflowing.
    let r = a.wrapping_rem(b);
    if (r > 0 && b < 0) || (r < 0 && b > 0) { r + b } else { r }
}

/// Python-like floor division for integers (rounds toward negative infinity).
///
/// ## Parameters
/// - `a`: dividend
/// - `b`: divisor (must be non-zero)
///
/// ## Returns
/// - `Some(i64)`: quotient rounded toward negative infinity.
/// - `None`: if the quotient overflows (`i64::MIN // -1`).
#[inline]
pub fn py_floor_div_i64(a: i64, b: i64) -> Option<i64> {
    debug_assert!(b != 0);
    let q = a.checked_div(b)?;
    let r = a.wrapping_rem(b);
    if (r > 0 && b < 0) || (r < 0 && b > 0) { Some(q - 1) } else { Some(q) }
}

/// Python-like modulo for floats (sign of divisor).
///
/// ## Parameters
/// - `a`: dividend
/// - `b`: divisor (must be non-zero)
///
/// ## Returns
/// - (`f64`): remainder with the sign of the divisor.
#[inline]
pub fn py_mod_f64(a: f64, b: f64) -> f64 {
    debug_assert!(b != 0.0);
    let r = a % b;
    if (r > 0.0 && b < 0.0) || (r < 0.0 && b > 0.0) {
        r + b
    } else {
        r
    }
}

/// Python-like floor division for floats.
#[inline]
pub fn py_floor_div_f64(a: f64, b: f64) -> f64 {
    debug_assert!(b != 0.0);
    ((a - py_mod_f64(a, b)) / b).round()
}

/// Beyond these `ndigits` bounds rounding a finite double cannot change it (or always yields zero).
const ROUND_NDIGITS_MAX: i32 = 323;
const ROUND_NDIGITS_MIN: i32 = -308;

/// Round half to even, the way Python's `round()` does for floats.
///
/// ## Parameters
/// - `x`: value to round.
/// - `ndigits`: decimal digits to keep (may be negative).
///
/// ## Notes
/// - Past the float range of `ndigits` the result is `x` itself (very large `ndigits`) or a zero carrying `x`'s sign
///   (very negative `ndigits`), never NaN.
pub fn py_round_f64(x: f64, ndigits: i32) -> f64 {
    if !x.is_finite() || ndigits > ROUND_NDIGITS_MAX {
        return x;
    }
    if ndigits < ROUND_NDIGITS_MIN {
        return 0.0 * x;
    }
    let factor = 10f64.powi(ndigits);
    let scaled = x * factor;
    if !factor.is_finite() || !scaled.is_finite() {
        return x;
    }
    let floor = scaled.floor();
    let diff = scaled - floor;
    let rounded = if diff > 0.5 {
        floor + 1.0
    } else if diff < 0.5 {
        floor
    } else if floor % 2.0 == 0.0 {
        floor
    } else {
        floor + 1.0
    };
    rounded / factor
}

/// Format a float the way Python's `repr()` does (`1.0`, `0.1`, `1e+20`, `inf`, `nan`).
///
/// ## Examples
/// ```rust
/// use testmynb_core::py_float_repr;
///
/// assert_eq!(py_float_repr(1.0), "1.0");
/// assert_eq!(py_float_repr(0.1 + 0.2), "0.30000000000000004");
/// assert_eq!(py_float_repr(-2.5), "-2.5");
/// assert_eq!(py_float_repr(1e20), "1e+20");
/// ```
pub fn py_float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let abs = x.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        // Rust prints `1e20`; Python prints `1e+20`.
        let s = format!("{x:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp:0>2}"),
            Some((mantissa, exp)) => format!("{mantissa}e-{:0>2}", &exp[1..]),
            None => s,
        };
    }
    let s = format!("{x}");
    if s.contains('.') { s } else { format!("{s}.0") }
}
