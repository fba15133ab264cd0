//! Operators: arithmetic, sequence concatenation/repetition, comparisons and membership.
//!
//! Numeric results follow the `testmynb_core` numeric policy (`/` always yields a float, `//` and `%` floor
//! toward negative infinity, `int ** negative int` yields a float). Integer arithmetic runs on `i64` and moves to
//! arbitrary precision when a result leaves the 64-bit range.

use std::cmp::Ordering;
use std::rc::Rc;

use num_bigint::{BigInt, Sign};
use testmynb_core::errors::{
    DIVISION_BY_ZERO_MSG, ExceptionKind, FLOAT_DIVISION_BY_ZERO_MSG, FLOAT_FLOOR_DIVISION_BY_ZERO_MSG,
    FLOAT_MODULO_BY_ZERO_MSG, INDEX_SIZED_INTEGER_MSG, INT_TOO_LARGE_FOR_FLOAT_MSG, INTEGER_DIVISION_BY_ZERO_MSG,
    ZERO_NEGATIVE_POWER_MSG,
};
use testmynb_core::{
    NumericOp, NumericTy, PowExponentKind, py_floor_div_f64, py_floor_div_i64, py_mod_f64, py_mod_i64,
    result_numeric_type,
};
use testmynb_syntax::ast::{BinaryOp, CompareOp, UnaryOp};

use crate::interp::exceptions::{ExecResult, Raised};
use crate::interp::format::percent_format;
use crate::interp::value::{Value, collect_values, py_cmp, py_eq, py_is};
use crate::numeric_adapters::{numeric_op_from_ast, numeric_op_from_compare, numeric_ty_of};

// ============================================================================
// Binary operators
// ============================================================================

/// Apply an arithmetic operator. `and`/`or` short-circuit and never reach here.
pub(crate) fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> ExecResult<Value> {
    if let (Some(numeric_op), Some(lt), Some(rt)) = (numeric_op_from_ast(op), numeric_ty_of(lhs), numeric_ty_of(rhs)) {
        return numeric_binary(numeric_op, lhs, rhs, lt, rt);
    }

    match (op, lhs, rhs) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::from(format!("{a}{b}"))),
        (BinaryOp::Add, Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::Tuple(a.iter().chain(b.iter()).cloned().collect::<Vec<_>>().into()))
        }
        (BinaryOp::Add, Value::Str(_) | Value::List(_) | Value::Tuple(_), other) => Err(Raised::type_error(format!(
            "can only concatenate {} (not \"{}\") to {}",
            lhs.type_name(),
            other.type_name(),
            lhs.type_name()
        ))),
        (BinaryOp::Mul, seq @ (Value::Str(_) | Value::List(_) | Value::Tuple(_)), count)
        | (BinaryOp::Mul, count, seq @ (Value::Str(_) | Value::List(_) | Value::Tuple(_)))
            if count.as_bigint().is_some() =>
        {
            repeat(seq, repeat_count(count)?)
        }
        (BinaryOp::Mod, Value::Str(template), args) => Ok(Value::from(percent_format(template, args)?)),
        _ => Err(unsupported_operands(op, lhs, rhs)),
    }
}

fn unsupported_operands(op: BinaryOp, lhs: &Value, rhs: &Value) -> Raised {
    let spelling = match op {
        BinaryOp::Pow => "** or pow()".to_string(),
        other => other.to_string(),
    };
    Raised::type_error(format!(
        "unsupported operand type(s) for {spelling}: '{}' and '{}'",
        lhs.type_name(),
        rhs.type_name()
    ))
}

/// The repeat count of `seq * n`; negative counts repeat zero times.
///
/// ## Errors
/// - `OverflowError` when `n` does not fit a machine word.
fn repeat_count(count: &Value) -> ExecResult<usize> {
    match count {
        Value::BigInt(n) if n.sign() == Sign::Minus => Ok(0),
        Value::BigInt(_) => Err(Raised::overflow(INDEX_SIZED_INTEGER_MSG)),
        other => Ok(usize::try_from(other.as_int().unwrap_or(0)).unwrap_or(0)),
    }
}

/// `seq * count`.
///
/// ## Errors
/// - `OverflowError` when the result length does not fit a machine word.
/// - `MemoryError` when the result cannot be allocated.
fn repeat(seq: &Value, count: usize) -> ExecResult<Value> {
    let too_long = || Raised::overflow("repeated sequence is too long");
    Ok(match seq {
        Value::Str(s) => {
            let len = s.len().checked_mul(count).ok_or_else(too_long)?;
            let mut out = String::new();
            reserve(len, |len| out.try_reserve_exact(len).is_ok())?;
            for _ in 0..count {
                out.push_str(s);
            }
            Value::from(out)
        }
        Value::List(items) => Value::list(repeat_items(&items.borrow(), count)?),
        Value::Tuple(items) => Value::Tuple(repeat_items(items, count)?.into()),
        _ => seq.clone(),
    })
}

fn repeat_items(items: &[Value], count: usize) -> ExecResult<Vec<Value>> {
    let len = items
        .len()
        .checked_mul(count)
        .ok_or_else(|| Raised::overflow("repeated sequence is too long"))?;
    let mut out = Vec::new();
    reserve(len, |len| out.try_reserve_exact(len).is_ok())?;
    for _ in 0..count {
        out.extend_from_slice(items);
    }
    Ok(out)
}

/// Repeated sequences longer than this raise `MemoryError` without attempting the allocation.
const MAX_REPEAT_LEN: usize = u32::MAX as usize;

fn reserve(len: usize, try_reserve: impl FnOnce(usize) -> bool) -> ExecResult<()> {
    if len > MAX_REPEAT_LEN || !try_reserve(len) {
        return Err(out_of_memory());
    }
    Ok(())
}

fn out_of_memory() -> Raised {
    Raised::new(ExceptionKind::MemoryError, "")
}

fn numeric_binary(op: NumericOp, lhs: &Value, rhs: &Value, lt: NumericTy, rt: NumericTy) -> ExecResult<Value> {
    let pow_kind = (op == NumericOp::Pow).then(|| PowExponentKind::classify(rt == NumericTy::Float, exponent_hint(rhs)));
    match (result_numeric_type(op, lt, rt, pow_kind), lhs.as_int(), rhs.as_int()) {
        (NumericTy::Int, Some(a), Some(b)) => int_binary(op, a, b),
        (NumericTy::Int, _, _) => match (lhs.as_bigint(), rhs.as_bigint()) {
            (Some(a), Some(b)) => big_binary(op, &a, &b),
            _ => Err(Raised::type_error("unsupported operand types")),
        },
        _ => {
            let (a, b) = (float_operand(lhs)?, float_operand(rhs)?);
            let any_float = lt == NumericTy::Float || rt == NumericTy::Float;
            float_binary(op, a, b, any_float).map(Value::Float)
        }
    }
}

/// An `i64` standing in for an integer exponent when only its sign matters.
fn exponent_hint(rhs: &Value) -> Option<i64> {
    match rhs {
        Value::BigInt(n) if n.sign() == Sign::Minus => Some(-1),
        Value::BigInt(_) => Some(i64::MAX),
        other => other.as_int(),
    }
}

/// A numeric operand of a float operation.
///
/// ## Errors
/// - `OverflowError` for an integer beyond the float range.
fn float_operand(value: &Value) -> ExecResult<f64> {
    match value.as_float() {
        Some(f) if f.is_infinite() && matches!(value, Value::BigInt(_)) => {
            Err(Raised::overflow(INT_TOO_LARGE_FOR_FLOAT_MSG))
        }
        Some(f) => Ok(f),
        None => Ok(0.0),
    }
}

fn int_binary(op: NumericOp, a: i64, b: i64) -> ExecResult<Value> {
    let fits = match op {
        NumericOp::Add => a.checked_add(b),
        NumericOp::Sub => a.checked_sub(b),
        NumericOp::Mul => a.checked_mul(b),
        NumericOp::FloorDiv => {
            if b == 0 {
                return Err(Raised::zero_division(INTEGER_DIVISION_BY_ZERO_MSG));
            }
            py_floor_div_i64(a, b)
        }
        NumericOp::Mod => {
            if b == 0 {
                return Err(Raised::zero_division(INTEGER_DIVISION_BY_ZERO_MSG));
            }
            Some(py_mod_i64(a, b))
        }
        NumericOp::Pow => u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp)),
        _ => None,
    };
    match fits {
        Some(result) => Ok(Value::Int(result)),
        None => big_binary(op, &BigInt::from(a), &BigInt::from(b)),
    }
}

/// Results wider than this many bits raise `MemoryError` rather than exhausting memory.
const MAX_INT_BITS: u64 = 1 << 26;

fn big_binary(op: NumericOp, a: &BigInt, b: &BigInt) -> ExecResult<Value> {
    let result = match op {
        NumericOp::Add => a + b,
        NumericOp::Sub => a - b,
        NumericOp::Mul => {
            if a.bits() + b.bits() > MAX_INT_BITS {
                return Err(out_of_memory());
            }
            a * b
        }
        NumericOp::FloorDiv | NumericOp::Mod => {
            let (quotient, remainder) = big_divmod(a, b)?;
            if op == NumericOp::FloorDiv { quotient } else { remainder }
        }
        NumericOp::Pow => big_pow(a, b)?,
        _ => return Err(Raised::type_error(format!("unsupported integer operation {op:?}"))),
    };
    Ok(Value::from_bigint(result))
}

/// Floor division and modulo, with the remainder taking the divisor's sign.
///
/// ## Errors
/// - `ZeroDivisionError` for a zero divisor.
pub(crate) fn big_divmod(a: &BigInt, b: &BigInt) -> ExecResult<(BigInt, BigInt)> {
    if b.sign() == Sign::NoSign {
        return Err(Raised::zero_division(INTEGER_DIVISION_BY_ZERO_MSG));
    }
    let (quotient, remainder) = (a / b, a % b);
    if remainder.sign() != Sign::NoSign && remainder.sign() != b.sign() {
        Ok((quotient - 1u32, remainder + b))
    } else {
        Ok((quotient, remainder))
    }
}

/// `base ** exp` for a non-negative exponent.
fn big_pow(base: &BigInt, exp: &BigInt) -> ExecResult<BigInt> {
    let one = BigInt::from(1);
    let minus_one = BigInt::from(-1);
    if base.sign() == Sign::NoSign {
        return Ok(if exp.sign() == Sign::NoSign { one } else { BigInt::default() });
    }
    if *base == one {
        return Ok(one);
    }
    if *base == minus_one {
        let even = (exp % 2u32).sign() == Sign::NoSign;
        return Ok(if even { one } else { minus_one });
    }
    let exp = u32::try_from(exp).map_err(|_| out_of_memory())?;
    if base.bits().saturating_mul(u64::from(exp)) > MAX_INT_BITS {
        return Err(out_of_memory());
    }
    Ok(base.pow(exp))
}

fn float_binary(op: NumericOp, a: f64, b: f64, any_float: bool) -> ExecResult<f64> {
    match op {
        NumericOp::Add => Ok(a + b),
        NumericOp::Sub => Ok(a - b),
        NumericOp::Mul => Ok(a * b),
        NumericOp::Div => {
            if b == 0.0 {
                let message = if any_float { FLOAT_DIVISION_BY_ZERO_MSG } else { DIVISION_BY_ZERO_MSG };
                return Err(Raised::zero_division(message));
            }
            Ok(a / b)
        }
        NumericOp::FloorDiv => {
            if b == 0.0 {
                return Err(Raised::zero_division(FLOAT_FLOOR_DIVISION_BY_ZERO_MSG));
            }
            Ok(py_floor_div_f64(a, b))
        }
        NumericOp::Mod => {
            if b == 0.0 {
                return Err(Raised::zero_division(FLOAT_MODULO_BY_ZERO_MSG));
            }
            Ok(py_mod_f64(a, b))
        }
        NumericOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(Raised::zero_division(ZERO_NEGATIVE_POWER_MSG));
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(Raised::value_error(
                    "negative number cannot be raised to a fractional power",
                ));
            }
            let result = a.powf(b);
            if result.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(Raised::overflow("(34, 'Numerical result out of range')"));
            }
            Ok(result)
        }
        _ => Ok(f64::NAN),
    }
}

/// `target op= value`: lists are extended in place, everything else rebinds.
pub(crate) fn inplace_binary(op: BinaryOp, current: &Value, rhs: &Value) -> ExecResult<Value> {
    match (op, current) {
        (BinaryOp::Add, Value::List(items)) => {
            let extra = collect_values(rhs)?;
            items.borrow_mut().extend(extra);
            Ok(current.clone())
        }
        (BinaryOp::Mul, Value::List(items)) if rhs.as_bigint().is_some() => {
            let repeated = repeat(current, repeat_count(rhs)?)?;
            if let Value::List(repeated) = repeated {
                let repeated = Rc::try_unwrap(repeated).map(|cell| cell.into_inner()).unwrap_or_default();
                *items.borrow_mut() = repeated;
            }
            Ok(current.clone())
        }
        _ => binary(op, current, rhs),
    }
}

// ============================================================================
// Unary operators
// ============================================================================

pub(crate) fn unary(op: UnaryOp, value: &Value) -> ExecResult<Value> {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.truthy())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Value::Float(f)) => Ok(Value::Float(*f)),
        (UnaryOp::Neg, Value::BigInt(n)) => Ok(Value::from_bigint(-BigInt::clone(n))),
        (UnaryOp::Pos, v @ Value::BigInt(_)) => Ok(v.clone()),
        (UnaryOp::Neg, v) if v.as_int().is_some() => Ok(match v.as_int().and_then(i64::checked_neg) {
            Some(negated) => Value::Int(negated),
            None => Value::from_bigint(-BigInt::from(v.as_int().unwrap_or(0))),
        }),
        (UnaryOp::Pos, v) if v.as_int().is_some() => Ok(Value::Int(v.as_int().unwrap_or(0))),
        (op, v) => Err(Raised::type_error(format!(
            "bad operand type for unary {op}: '{}'",
            v.type_name()
        ))),
    }
}

// ============================================================================
// Comparisons
// ============================================================================

/// Evaluate one link of a comparison chain.
pub(crate) fn compare(op: CompareOp, lhs: &Value, rhs: &Value) -> ExecResult<bool> {
    match op {
        CompareOp::Eq => Ok(py_eq(lhs, rhs)),
        CompareOp::NotEq => Ok(!py_eq(lhs, rhs)),
        CompareOp::Is => Ok(py_is(lhs, rhs)),
        CompareOp::IsNot => Ok(!py_is(lhs, rhs)),
        CompareOp::In => contains(rhs, lhs),
        CompareOp::NotIn => contains(rhs, lhs).map(|found| !found),
        CompareOp::Lt | CompareOp::LtEq | CompareOp::Gt | CompareOp::GtEq => {
            let Some(ordering) = py_cmp(lhs, rhs, &op.to_string())? else {
                return Ok(false);
            };
            Ok(match numeric_op_from_compare(op) {
                Some(NumericOp::Lt) => ordering == Ordering::Less,
                Some(NumericOp::LtEq) => ordering != Ordering::Greater,
                Some(NumericOp::Gt) => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}

/// `item in container`.
pub(crate) fn contains(container: &Value, item: &Value) -> ExecResult<bool> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(&**needle)),
            other => Err(Raised::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(items) => Ok(items.borrow().iter().any(|x| py_is(x, item) || py_eq(x, item))),
        Value::Tuple(items) => Ok(items.iter().any(|x| py_is(x, item) || py_eq(x, item))),
        Value::Dict(dict) => dict.borrow().contains(item),
        Value::Range(range) => Ok(match item {
            Value::Float(f) if f.fract() != 0.0 => false,
            Value::BigInt(_) => false,
            _ => item.as_float().is_some_and(|f| range.contains(f as i64)),
        }),
        other => Err(Raised::type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}
