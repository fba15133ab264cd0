//! Builtin modules available to `import`.
//!
//! Only `math` is provided. Its functions are exposed as bound methods of the module value, so `math.sqrt` and
//! `from math import sqrt` both yield a callable.

use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::FromPrimitive;
use testmynb_core::errors::{ExceptionKind, INDEX_SIZED_INTEGER_MSG, INT_TOO_LARGE_FOR_FLOAT_MSG};

use super::eval::Keywords;
use super::exceptions::{ExecResult, Raised};
use super::value::{BoundMethod, Module, Value, collect_values};

const MATH: &str = "math";

const MATH_CONSTANTS: &[(&str, f64)] = &[
    ("pi", std::f64::consts::PI),
    ("e", std::f64::consts::E),
    ("tau", std::f64::consts::TAU),
    ("inf", f64::INFINITY),
    ("nan", f64::NAN),
];

const MATH_FUNCTIONS: &[&str] = &[
    "sqrt", "floor", "ceil", "trunc", "fabs", "pow", "exp", "log", "log2", "log10", "sin", "cos", "tan", "asin",
    "acos", "atan", "atan2", "hypot", "degrees", "radians", "isclose", "isfinite", "isinf", "isnan", "gcd",
    "factorial", "fsum", "prod", "copysign",
];

const MATH_DOMAIN_ERROR: &str = "math domain error";

/// Resolve `import <name>`.
///
/// ## Errors
/// - `ModuleNotFoundError` for anything but a builtin module.
pub(super) fn import(name: &str) -> ExecResult<Value> {
    match name {
        MATH => Ok(Value::Module(Rc::new(Module { name: MATH }))),
        _ => Err(Raised::new(
            ExceptionKind::ModuleNotFoundError,
            format!("No module named '{name}'"),
        )),
    }
}

/// Names bound by `from <name> import *`.
pub(super) fn public_names(name: &str) -> Vec<&'static str> {
    match name {
        MATH => MATH_CONSTANTS
            .iter()
            .map(|(name, _)| *name)
            .chain(MATH_FUNCTIONS.iter().copied())
            .collect(),
        _ => Vec::new(),
    }
}

pub(super) fn get_attr(module: &Module, value: &Value, name: &str) -> ExecResult<Value> {
    if let Some((_, constant)) = MATH_CONSTANTS.iter().find(|(n, _)| *n == name) {
        return Ok(Value::Float(*constant));
    }
    if MATH_FUNCTIONS.contains(&name) {
        return Ok(Value::BoundMethod(Rc::new(BoundMethod {
            receiver: value.clone(),
            name: name.into(),
        })));
    }
    Err(Raised::new(
        ExceptionKind::AttributeError,
        format!("module '{}' has no attribute '{name}'", module.name),
    ))
}

/// Call a module function.
pub(super) fn call(module: &Module, name: &str, args: Vec<Value>, keywords: Keywords) -> ExecResult<Value> {
    let qualified = format!("{}.{name}", module.name);
    let float_arg = |i: usize| -> ExecResult<f64> {
        let value = args.get(i).ok_or_else(|| missing_argument(&qualified, args.len()))?;
        match value.as_float() {
            Some(f) if f.is_infinite() && matches!(value, Value::BigInt(_)) => {
                Err(Raised::overflow(INT_TOO_LARGE_FOR_FLOAT_MSG))
            }
            Some(f) => Ok(f),
            None => Err(Raised::type_error(format!("must be real number, not {}", value.type_name()))),
        }
    };
    let unary = |f: fn(f64) -> f64| -> ExecResult<Value> { Ok(Value::Float(f(float_arg(0)?))) };
    let checked = |f: fn(f64) -> f64, valid: fn(f64) -> bool| -> ExecResult<Value> {
        let x = float_arg(0)?;
        if valid(x) { Ok(Value::Float(f(x))) } else { Err(Raised::value_error(MATH_DOMAIN_ERROR)) }
    };

    if name != "isclose" {
        if let Some((keyword, _)) = keywords.first() {
            return Err(Raised::type_error(format!(
                "{qualified}() takes no keyword arguments ('{keyword}' given)"
            )));
        }
    }

    match name {
        "sqrt" => checked(f64::sqrt, |x| x >= 0.0 || x.is_nan()),
        "exp" => {
            let result = float_arg(0)?.exp();
            if result.is_infinite() {
                Err(Raised::overflow("math range error"))
            } else {
                Ok(Value::Float(result))
            }
        }
        "log" => {
            let x = float_arg(0)?;
            if x <= 0.0 {
                return Err(Raised::value_error(MATH_DOMAIN_ERROR));
            }
            match args.len() {
                1 => Ok(Value::Float(x.ln())),
                _ => {
                    let base = float_arg(1)?;
                    if base <= 0.0 || base == 1.0 {
                        return Err(Raised::value_error(MATH_DOMAIN_ERROR));
                    }
                    Ok(Value::Float(x.ln() / base.ln()))
                }
            }
        }
        "log2" => checked(f64::log2, |x| x > 0.0),
        "log10" => checked(f64::log10, |x| x > 0.0),
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => unary(f64::tan),
        "asin" => checked(f64::asin, |x| (-1.0..=1.0).contains(&x)),
        "acos" => checked(f64::acos, |x| (-1.0..=1.0).contains(&x)),
        "atan" => unary(f64::atan),
        "atan2" => Ok(Value::Float(float_arg(0)?.atan2(float_arg(1)?))),
        "hypot" => {
            let mut total = 0.0f64;
            for i in 0..args.len() {
                total = total.hypot(float_arg(i)?);
            }
            Ok(Value::Float(total))
        }
        "degrees" => unary(f64::to_degrees),
        "radians" => unary(f64::to_radians),
        "fabs" => unary(f64::abs),
        "copysign" => Ok(Value::Float(float_arg(0)?.copysign(float_arg(1)?))),
        "pow" => {
            let (x, y) = (float_arg(0)?, float_arg(1)?);
            if x == 0.0 && y < 0.0 {
                return Err(Raised::value_error(MATH_DOMAIN_ERROR));
            }
            Ok(Value::Float(x.powf(y)))
        }
        "floor" | "ceil" | "trunc" => {
            let value = args.first().ok_or_else(|| missing_argument(&qualified, 0))?;
            if let Some(n) = value.as_bigint() {
                return Ok(Value::from_bigint(n));
            }
            let x = float_arg(0)?;
            let rounded = match name {
                "floor" => x.floor(),
                "ceil" => x.ceil(),
                _ => x.trunc(),
            };
            float_to_int(rounded)
        }
        "isfinite" => Ok(Value::Bool(float_arg(0)?.is_finite())),
        "isinf" => Ok(Value::Bool(float_arg(0)?.is_infinite())),
        "isnan" => Ok(Value::Bool(float_arg(0)?.is_nan())),
        "isclose" => {
            let (a, b) = (float_arg(0)?, float_arg(1)?);
            let mut rel_tol = 1e-9;
            let mut abs_tol = 0.0;
            for (keyword, value) in &keywords {
                let tolerance = value
                    .as_float()
                    .ok_or_else(|| Raised::type_error("must be real number"))?;
                match keyword.as_str() {
                    "rel_tol" => rel_tol = tolerance,
                    "abs_tol" => abs_tol = tolerance,
                    other => {
                        return Err(Raised::type_error(format!(
                            "isclose() got an unexpected keyword argument '{other}'"
                        )));
                    }
                }
            }
            if rel_tol < 0.0 || abs_tol < 0.0 {
                return Err(Raised::value_error("tolerances must be non-negative"));
            }
            let close = a == b
                || ((a - b).abs() <= (rel_tol * b.abs()).max(rel_tol * a.abs()) || (a - b).abs() <= abs_tol)
                    && a.is_finite()
                    && b.is_finite();
            Ok(Value::Bool(close))
        }
        "gcd" => {
            let mut acc = 0i64;
            for value in &args {
                let n = int_arg(value)?;
                acc = gcd(acc, n);
            }
            Ok(Value::Int(acc))
        }
        "factorial" => {
            let n = int_arg(args.first().ok_or_else(|| missing_argument(&qualified, 0))?)?;
            if n < 0 {
                return Err(Raised::value_error("factorial() not defined for negative values"));
            }
            let mut product = Value::Int(1);
            for factor in 2..=n {
                product = super::eval::ops::binary(testmynb_syntax::ast::BinaryOp::Mul, &product, &Value::Int(factor))?;
            }
            Ok(product)
        }
        "fsum" | "prod" => {
            let items = collect_values(args.first().ok_or_else(|| missing_argument(&qualified, 0))?)?;
            if name == "fsum" {
                let mut total = 0.0;
                for item in &items {
                    total += item.as_float().ok_or_else(|| {
                        Raised::type_error(format!("must be real number, not {}", item.type_name()))
                    })?;
                }
                return Ok(Value::Float(total));
            }
            let mut product = Value::Int(1);
            for item in &items {
                product = super::eval::ops::binary(testmynb_syntax::ast::BinaryOp::Mul, &product, item)?;
            }
            Ok(product)
        }
        _ => Err(Raised::new(
            ExceptionKind::AttributeError,
            format!("module '{}' has no attribute '{name}'", module.name),
        )),
    }
}

fn missing_argument(qualified: &str, given: usize) -> Raised {
    Raised::type_error(format!("{qualified}() takes more arguments ({given} given)"))
}

fn int_arg(value: &Value) -> ExecResult<i64> {
    if let Value::BigInt(_) = value {
        return Err(Raised::overflow(INDEX_SIZED_INTEGER_MSG));
    }
    value.as_int().ok_or_else(|| {
        Raised::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    i64::try_from(a).unwrap_or(i64::MAX)
}

/// Convert an integral float to `int` the way `int()`/`math.floor()` do.
pub(super) fn float_to_int(x: f64) -> ExecResult<Value> {
    if x.is_nan() {
        return Err(Raised::value_error("cannot convert float NaN to integer"));
    }
    if x.is_infinite() {
        return Err(Raised::overflow("cannot convert float infinity to integer"));
    }
    BigInt::from_f64(x.trunc())
        .map(Value::from_bigint)
        .ok_or_else(|| Raised::value_error("cannot convert float to integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math() -> (Module, Value) {
        let value = import("math").unwrap();
        (Module { name: MATH }, value)
    }

    #[test]
    fn test_unknown_module_is_not_found() {
        let err = import("numpy").unwrap_err();
        assert_eq!(err.kind(), ExceptionKind::ModuleNotFoundError);
        assert_eq!(err.exc.message(), "No module named 'numpy'");
    }

    #[test]
    fn test_constants_and_functions_resolve() {
        let (module, value) = math();
        assert!(matches!(get_attr(&module, &value, "pi"), Ok(Value::Float(p)) if p == std::f64::consts::PI));
        assert!(matches!(get_attr(&module, &value, "sqrt"), Ok(Value::BoundMethod(_))));
        let err = get_attr(&module, &value, "frobnicate").unwrap_err();
        assert_eq!(err.exc.message(), "module 'math' has no attribute 'frobnicate'");
    }

    #[test]
    fn test_domain_errors() {
        let (module, _) = math();
        let err = call(&module, "sqrt", vec![Value::Int(-1)], Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ExceptionKind::ValueError);
        assert_eq!(err.exc.message(), "math domain error");
    }

    #[test]
    fn test_floor_returns_int() {
        let (module, _) = math();
        assert!(matches!(call(&module, "floor", vec![Value::Float(-2.5)], Vec::new()), Ok(Value::Int(-3))));
        assert!(matches!(call(&module, "gcd", vec![Value::Int(12), Value::Int(-18)], Vec::new()), Ok(Value::Int(6))));
        assert!(matches!(call(&module, "factorial", vec![Value::Int(5)], Vec::new()), Ok(Value::Int(120))));
        let big = call(&module, "factorial", vec![Value::Int(25)], Vec::new()).unwrap();
        assert_eq!(big.repr(), "15511210043330985984000000");
        assert_eq!(call(&module, "floor", vec![Value::Float(1e20)], Vec::new()).unwrap().repr(), "100000000000000000000");
    }

    #[test]
    fn test_module_attributes_are_read_only() {
        let (_, value) = math();
        let err = Raised::readonly_attribute(&value, "pi", true);
        assert_eq!(err.kind(), ExceptionKind::AttributeError);
        assert_eq!(err.exc.message(), "module 'math' attribute 'pi' is read-only");
    }

    #[test]
    fn test_isclose_accepts_tolerances() {
        let (module, _) = math();
        let keywords = vec![("abs_tol".to_string(), Value::Float(0.01))];
        let close = call(&module, "isclose", vec![Value::Float(1.0), Value::Float(1.005)], keywords).unwrap();
        assert!(close.truthy());
    }
}
