//! Builtin functions (`len`, `print`, `sorted`, ...) and builtin name resolution.
//!
//! ## Notes
//! - `reversed`, `enumerate` and `zip` return lists rather than lazy iterators; test cells only iterate them.
//! - Argument-count and keyword errors use CPython's wording so tracebacks read the same.

use std::cmp::Ordering;
use std::io::Write;

use num_bigint::{BigInt, Sign};
use testmynb_core::errors::{ExceptionKind, INDEX_SIZED_INTEGER_MSG, INTEGER_OVERFLOW_MSG, RANGE_STEP_ZERO_MSG};
use testmynb_core::lang::builtins::{self, BuiltinFnId};
use testmynb_core::lang::exceptions::{self, is_subclass};
use testmynb_core::py_round_f64;
use testmynb_syntax::ast::BinaryOp;

use super::eval::Keywords;
use super::eval::ops;
use super::exceptions::{ExecResult, Raised};
use super::modules::float_to_int;
use super::value::{Dict, RangeValue, Value, collect_values, iter_values, py_cmp};
use super::Interpreter;

/// The value a builtin name resolves to when no binding shadows it.
pub(super) fn builtin_value(name: &str) -> Option<Value> {
    builtins::from_str(name)
        .map(Value::Builtin)
        .or_else(|| exceptions::from_str(name).map(Value::ExceptionType))
}

/// Call-site view of a builtin's arguments.
struct Args<'a> {
    name: &'a str,
    positional: Vec<Value>,
    keywords: Keywords,
}

impl<'a> Args<'a> {
    /// Reject keywords outside `allowed`.
    fn accept_keywords(&self, allowed: &[&str]) -> ExecResult<()> {
        match self.keywords.iter().find(|(k, _)| !allowed.contains(&k.as_str())) {
            Some((keyword, _)) if allowed.is_empty() => Err(Raised::type_error(format!(
                "{}() takes no keyword arguments ('{keyword}' given)",
                self.name
            ))),
            Some((keyword, _)) => Err(Raised::type_error(format!(
                "'{keyword}' is an invalid keyword argument for {}()",
                self.name
            ))),
            None => Ok(()),
        }
    }

    fn exactly_one(&self) -> ExecResult<&Value> {
        match self.positional.as_slice() {
            [value] => Ok(value),
            other => Err(Raised::type_error(format!(
                "{}() takes exactly one argument ({} given)",
                self.name,
                other.len()
            ))),
        }
    }

    fn between(&self, min: usize, max: usize) -> ExecResult<()> {
        let given = self.positional.len();
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        if given < min {
            return Err(Raised::type_error(format!(
                "{} expected at least {min} argument{}, got {given}",
                self.name,
                plural(min)
            )));
        }
        if given > max {
            return Err(Raised::type_error(format!(
                "{} expected at most {max} argument{}, got {given}",
                self.name,
                plural(max)
            )));
        }
        Ok(())
    }

    fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
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

impl Interpreter {
    pub(super) fn call_builtin(&mut self, id: BuiltinFnId, positional: Vec<Value>, keywords: Keywords) -> ExecResult<Value> {
        let args = Args {
            name: builtins::as_str(id),
            positional,
            keywords,
        };
        match id {
            BuiltinFnId::Print => self.builtin_print(args),
            BuiltinFnId::Len => {
                args.accept_keywords(&[])?;
                builtin_len(args.exactly_one()?)
            }
            BuiltinFnId::Range => builtin_range(&args),
            BuiltinFnId::Str => {
                args.accept_keywords(&[])?;
                args.between(0, 1)?;
                Ok(Value::from(args.positional.first().map(Value::to_str).unwrap_or_default()))
            }
            BuiltinFnId::Int => builtin_int(&args),
            BuiltinFnId::Float => builtin_float(&args),
            BuiltinFnId::Bool => {
                args.accept_keywords(&[])?;
                args.between(0, 1)?;
                Ok(Value::Bool(args.positional.first().is_some_and(Value::truthy)))
            }
            BuiltinFnId::List | BuiltinFnId::Tuple => {
                args.accept_keywords(&[])?;
                args.between(0, 1)?;
                let items = match args.positional.first() {
                    Some(iterable) => collect_values(iterable)?,
                    None => Vec::new(),
                };
                Ok(if id == BuiltinFnId::List { Value::list(items) } else { Value::tuple(items) })
            }
            BuiltinFnId::Dict => builtin_dict(args),
            BuiltinFnId::Abs => {
                args.accept_keywords(&[])?;
                match args.exactly_one()? {
                    Value::Float(f) => Ok(Value::Float(f.abs())),
                    value => match value.as_bigint() {
                        Some(n) if n.sign() == Sign::Minus => Ok(Value::from_bigint(-n)),
                        Some(n) => Ok(Value::from_bigint(n)),
                        None => Err(Raised::type_error(format!(
                            "bad operand type for abs(): '{}'",
                            value.type_name()
                        ))),
                    },
                }
            }
            BuiltinFnId::Min => self.builtin_min_max(args, Ordering::Less),
            BuiltinFnId::Max => self.builtin_min_max(args, Ordering::Greater),
            BuiltinFnId::Sum => builtin_sum(&args),
            BuiltinFnId::Sorted => {
                args.accept_keywords(&["key", "reverse"])?;
                let mut items = collect_values(args.exactly_one()?)?;
                let key = args.keyword("key").filter(|k| !matches!(k, Value::None)).cloned();
                let reverse = args.keyword("reverse").is_some_and(Value::truthy);
                self.sort_values(&mut items, key.as_ref(), reverse)?;
                Ok(Value::list(items))
            }
            BuiltinFnId::Reversed => {
                args.accept_keywords(&[])?;
                let seq = args.exactly_one()?;
                match seq {
                    Value::List(_) | Value::Tuple(_) | Value::Str(_) | Value::Range(_) | Value::Dict(_) => {
                        let mut items = collect_values(seq)?;
                        items.reverse();
                        Ok(Value::list(items))
                    }
                    other => Err(Raised::type_error(format!(
                        "'{}' object is not reversible",
                        other.type_name()
                    ))),
                }
            }
            BuiltinFnId::Enumerate => {
                args.accept_keywords(&["start"])?;
                args.between(1, 2)?;
                let start = match args.positional.get(1).or_else(|| args.keyword("start")) {
                    Some(value) => int_arg(value)?,
                    None => 0,
                };
                let mut out = Vec::new();
                for (i, item) in iter_values(&args.positional[0])?.enumerate() {
                    let index = start
                        .checked_add(i as i64)
                        .ok_or_else(|| Raised::overflow(INTEGER_OVERFLOW_MSG))?;
                    out.push(Value::tuple(vec![Value::Int(index), item]));
                }
                Ok(Value::list(out))
            }
            BuiltinFnId::Zip => {
                args.accept_keywords(&["strict"])?;
                let mut iters = args
                    .positional
                    .iter()
                    .map(iter_values)
                    .collect::<ExecResult<Vec<_>>>()?;
                let mut out = Vec::new();
                if iters.is_empty() {
                    return Ok(Value::list(out));
                }
                'rows: loop {
                    let mut row = Vec::with_capacity(iters.len());
                    for iter in &mut iters {
                        match iter.next() {
                            Some(item) => row.push(item),
                            None => break 'rows,
                        }
                    }
                    out.push(Value::tuple(row));
                }
                Ok(Value::list(out))
            }
            BuiltinFnId::Isinstance => {
                args.accept_keywords(&[])?;
                if args.positional.len() != 2 {
                    return Err(Raised::type_error(format!(
                        "isinstance expected 2 arguments, got {}",
                        args.positional.len()
                    )));
                }
                isinstance(&args.positional[0], &args.positional[1]).map(Value::Bool)
            }
            BuiltinFnId::Repr => {
                args.accept_keywords(&[])?;
                Ok(Value::from(args.exactly_one()?.repr()))
            }
            BuiltinFnId::Round => builtin_round(&args),
            BuiltinFnId::Any | BuiltinFnId::All => {
                args.accept_keywords(&[])?;
                let mut items = iter_values(args.exactly_one()?)?;
                Ok(Value::Bool(if id == BuiltinFnId::Any {
                    items.any(|v| v.truthy())
                } else {
                    items.all(|v| v.truthy())
                }))
            }
        }
    }

    fn builtin_print(&mut self, args: Args<'_>) -> ExecResult<Value> {
        args.accept_keywords(&["sep", "end", "flush"])?;
        let text_keyword = |name: &str, default: &str| -> ExecResult<String> {
            match args.keyword(name) {
                None | Some(Value::None) => Ok(default.to_string()),
                Some(Value::Str(s)) => Ok(s.to_string()),
                Some(other) => Err(Raised::type_error(format!(
                    "{name} must be None or a string, not {}",
                    other.type_name()
                ))),
            }
        };
        let sep = text_keyword("sep", " ")?;
        let end = text_keyword("end", "\n")?;
        let line = args.positional.iter().map(Value::to_str).collect::<Vec<_>>().join(&sep);
        write!(self.out, "{line}{end}")
            .map_err(|error| Raised::new(ExceptionKind::RuntimeError, format!("print failed: {error}")))?;
        Ok(Value::None)
    }

    fn builtin_min_max(&mut self, args: Args<'_>, want: Ordering) -> ExecResult<Value> {
        args.accept_keywords(&["key", "default"])?;
        let name = args.name;
        let items = match args.positional.as_slice() {
            [] => {
                return Err(Raised::type_error(format!(
                    "{name} expected at least 1 argument, got 0"
                )));
            }
            [iterable] => collect_values(iterable)?,
            many => {
                if args.keyword("default").is_some() {
                    return Err(Raised::type_error(format!(
                        "Cannot specify a default for {name}() with multiple positional arguments"
                    )));
                }
                many.to_vec()
            }
        };
        if items.is_empty() {
            return args
                .keyword("default")
                .cloned()
                .ok_or_else(|| Raised::value_error(format!("{name}() iterable argument is empty")));
        }

        let key = args.keyword("key").filter(|k| !matches!(k, Value::None)).cloned();
        let op = if want == Ordering::Less { "<" } else { ">" };
        let mut best: Option<(Value, Value)> = None;
        for item in items {
            let item_key = match &key {
                Some(func) => self.call_value(func, vec![item.clone()], Vec::new())?,
                None => item.clone(),
            };
            best = match best {
                None => Some((item, item_key)),
                Some((current, current_key)) => {
                    if py_cmp(&item_key, &current_key, op)? == Some(want) {
                        Some((item, item_key))
                    } else {
                        Some((current, current_key))
                    }
                }
            };
        }
        Ok(best.map(|(item, _)| item).unwrap_or(Value::None))
    }

    /// Stable sort with an optional key function, shared by `sorted()` and `list.sort()`.
    ///
    /// ## Errors
    /// - Whatever the key function raises.
    /// - `TypeError` when two keys cannot be ordered.
    pub(super) fn sort_values(&mut self, items: &mut Vec<Value>, key: Option<&Value>, reverse: bool) -> ExecResult<()> {
        let keys = match key {
            Some(func) => items
                .iter()
                .map(|item| self.call_value(func, vec![item.clone()], Vec::new()))
                .collect::<ExecResult<Vec<_>>>()?,
            None => items.clone(),
        };

        let mut order: Vec<usize> = (0..items.len()).collect();
        if reverse {
            order.reverse();
        }
        let mut failure = None;
        order.sort_by(|&a, &b| {
            if failure.is_some() {
                return Ordering::Equal;
            }
            match py_cmp(&keys[a], &keys[b], "<") {
                Ok(ordering) => ordering.unwrap_or(Ordering::Equal),
                Err(raised) => {
                    failure = Some(raised);
                    Ordering::Equal
                }
            }
        });
        if let Some(raised) = failure {
            return Err(raised);
        }
        if reverse {
            order.reverse();
        }
        let sorted = order.into_iter().map(|i| items[i].clone()).collect();
        *items = sorted;
        Ok(())
    }
}

fn builtin_len(value: &Value) -> ExecResult<Value> {
    let len = match value {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Tuple(items) => items.len(),
        Value::Dict(dict) => dict.borrow().len(),
        Value::Range(range) => range.len(),
        other => {
            return Err(Raised::type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )));
        }
    };
    Ok(Value::Int(len as i64))
}

fn builtin_range(args: &Args<'_>) -> ExecResult<Value> {
    args.accept_keywords(&[])?;
    args.between(1, 3)?;
    let ints = args.positional.iter().map(int_arg).collect::<ExecResult<Vec<_>>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step, ..] => (*start, *stop, *step),
        [] => (0, 0, 1),
    };
    if step == 0 {
        return Err(Raised::value_error(RANGE_STEP_ZERO_MSG));
    }
    Ok(Value::Range(RangeValue { start, stop, step }))
}

fn builtin_int(args: &Args<'_>) -> ExecResult<Value> {
    args.accept_keywords(&["base"])?;
    args.between(0, 2)?;
    let base = match args.positional.get(1).or_else(|| args.keyword("base")) {
        Some(base) => Some(int_arg(base)?),
        None => None,
    };
    let Some(value) = args.positional.first() else {
        return Ok(Value::Int(0));
    };
    match (value, base) {
        (Value::Str(s), base) => parse_int(s, base.unwrap_or(10)),
        (_, Some(_)) => Err(Raised::type_error("int() can't convert non-string with explicit base")),
        (Value::Float(f), None) => float_to_int(f.trunc()),
        (other, None) => other.as_bigint().map(Value::from_bigint).ok_or_else(|| {
            Raised::type_error(format!(
                "int() argument must be a string, a bytes-like object or a real number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

/// `int(text, base)`, accepting surrounding whitespace, a sign, `_` separators and a base prefix.
fn parse_int(text: &str, base: i64) -> ExecResult<Value> {
    let invalid = || {
        Raised::value_error(format!(
            "invalid literal for int() with base {base}: {}",
            testmynb_core::strings::str_repr(text)
        ))
    };
    if base != 0 && !(2..=36).contains(&base) {
        return Err(Raised::value_error("int() base must be >= 2 and <= 36, or 0"));
    }
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = match (base, lower.get(..2)) {
        (0 | 16, Some("0x")) => (16, &digits[2..]),
        (0 | 8, Some("0o")) => (8, &digits[2..]),
        (0 | 2, Some("0b")) => (2, &digits[2..]),
        (0, _) => (10, digits),
        (base, _) => (base as u32, digits),
    };
    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return Err(invalid());
    }
    let cleaned: String = body.chars().filter(|&c| c != '_').collect();
    if !cleaned.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    let magnitude = BigInt::parse_bytes(cleaned.as_bytes(), radix).ok_or_else(invalid)?;
    Ok(Value::from_bigint(if negative { -magnitude } else { magnitude }))
}

fn builtin_float(args: &Args<'_>) -> ExecResult<Value> {
    args.accept_keywords(&[])?;
    args.between(0, 1)?;
    let Some(value) = args.positional.first() else {
        return Ok(Value::Float(0.0));
    };
    match value {
        Value::Str(s) => parse_float(s).map(Value::Float),
        other => other.as_float().map(Value::Float).ok_or_else(|| {
            Raised::type_error(format!(
                "float() argument must be a string or a real number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

fn parse_float(text: &str) -> ExecResult<f64> {
    let trimmed = text.trim();
    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let special = match unsigned.to_ascii_lowercase().as_str() {
        "inf" | "infinity" => Some(f64::INFINITY),
        "nan" => Some(f64::NAN),
        _ => None,
    };
    if let Some(value) = special {
        return Ok(sign * value);
    }
    let valid = !unsigned.is_empty()
        && unsigned.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && unsigned.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '.');
    valid
        .then(|| unsigned.parse::<f64>().ok())
        .flatten()
        .map(|f| sign * f)
        .ok_or_else(|| {
            Raised::value_error(format!(
                "could not convert string to float: {}",
                testmynb_core::strings::str_repr(text)
            ))
        })
}

fn builtin_dict(args: Args<'_>) -> ExecResult<Value> {
    args.between(0, 1)?;
    let mut dict = Dict::default();
    if let Some(source) = args.positional.first() {
        match source {
            Value::Dict(other) => {
                for (key, value) in other.borrow().iter() {
                    dict.insert(key.clone(), value.clone())?;
                }
            }
            iterable => {
                for (i, pair) in iter_values(iterable)?.enumerate() {
                    let items = collect_values(&pair).map_err(|_| {
                        Raised::type_error(format!(
                            "cannot convert dictionary update sequence element #{i} to a sequence"
                        ))
                    })?;
                    let [key, value] = <[Value; 2]>::try_from(items).map_err(|items| {
                        Raised::value_error(format!(
                            "dictionary update sequence element #{i} has length {}; 2 is required",
                            items.len()
                        ))
                    })?;
                    dict.insert(key, value)?;
                }
            }
        }
    }
    for (key, value) in args.keywords {
        dict.insert(Value::from(key), value)?;
    }
    Ok(Value::dict(dict))
}

fn builtin_sum(args: &Args<'_>) -> ExecResult<Value> {
    args.accept_keywords(&["start"])?;
    args.between(1, 2)?;
    let start = args
        .positional
        .get(1)
        .or_else(|| args.keyword("start"))
        .cloned()
        .unwrap_or(Value::Int(0));
    if matches!(start, Value::Str(_)) {
        return Err(Raised::type_error("sum() can't sum strings [use ''.join(seq) instead]"));
    }
    let mut total = start;
    for item in iter_values(&args.positional[0])? {
        total = ops::binary(BinaryOp::Add, &total, &item)?;
    }
    Ok(total)
}

fn builtin_round(args: &Args<'_>) -> ExecResult<Value> {
    args.accept_keywords(&["ndigits"])?;
    args.between(1, 2)?;
    let ndigits = match args.positional.get(1).or_else(|| args.keyword("ndigits")) {
        None | Some(Value::None) => None,
        Some(value) => Some(int_arg(value)?),
    };
    match (&args.positional[0], ndigits) {
        (Value::Float(f), None) => float_to_int(py_round_f64(*f, 0)),
        (Value::Float(f), Some(n)) => {
            let n = i32::try_from(n.clamp(-400, 400)).unwrap_or(0);
            Ok(Value::Float(py_round_f64(*f, n)))
        }
        (value, ndigits) => {
            let n = value.as_bigint().ok_or_else(|| {
                Raised::type_error(format!(
                    "type {} doesn't define __round__ method",
                    value.type_name()
                ))
            })?;
            match ndigits {
                Some(digits) if digits < 0 => round_int(&n, digits.unsigned_abs()).map(Value::from_bigint),
                _ => Ok(Value::from_bigint(n)),
            }
        }
    }
}

/// Round an integer to a multiple of `10**digits`, half to even.
fn round_int(value: &BigInt, digits: u64) -> ExecResult<BigInt> {
    // 10**digits is more than twice any value with fewer decimal digits.
    let width = value.magnitude().to_string().len();
    let Some(digits) = u32::try_from(digits).ok().filter(|&d| d as usize <= width) else {
        return Ok(BigInt::default());
    };
    let unit = BigInt::from(10).pow(digits);
    let (quotient, rest) = ops::big_divmod(value, &unit)?;
    let floor = &quotient * &unit;
    let round_up = match (rest * 2u32).cmp(&unit) {
        Ordering::Less => false,
        Ordering::Greater => true,
        Ordering::Equal => (quotient % 2u32).sign() != Sign::NoSign,
    };
    Ok(if round_up { floor + unit } else { floor })
}

fn isinstance(value: &Value, class: &Value) -> ExecResult<bool> {
    match class {
        Value::Tuple(classes) => {
            for class in classes.iter() {
                if isinstance(value, class)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::ExceptionType(base) => Ok(matches!(value, Value::Exception(exc) if is_subclass(exc.kind, *base))),
        Value::Builtin(id) if super::value::is_type_builtin(*id) => Ok(match id {
            BuiltinFnId::Int => matches!(value, Value::Int(_) | Value::BigInt(_) | Value::Bool(_)),
            BuiltinFnId::Float => matches!(value, Value::Float(_)),
            BuiltinFnId::Str => matches!(value, Value::Str(_)),
            BuiltinFnId::Bool => matches!(value, Value::Bool(_)),
            BuiltinFnId::List => matches!(value, Value::List(_)),
            BuiltinFnId::Tuple => matches!(value, Value::Tuple(_)),
            BuiltinFnId::Dict => matches!(value, Value::Dict(_)),
            BuiltinFnId::Range => matches!(value, Value::Range(_)),
            _ => false,
        }),
        _ => Err(Raised::type_error(
            "isinstance() arg 2 must be a type, a tuple of types, or a union",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_resolve() {
        assert!(matches!(builtin_value("len"), Some(Value::Builtin(BuiltinFnId::Len))));
        assert!(matches!(
            builtin_value("KeyError"),
            Some(Value::ExceptionType(ExceptionKind::KeyError))
        ));
        assert!(builtin_value("numpy").is_none());
    }

    #[test]
    fn test_parse_int_forms() {
        assert!(matches!(parse_int(" 42 ", 10), Ok(Value::Int(42))));
        assert!(matches!(parse_int("-1_000", 10), Ok(Value::Int(-1000))));
        assert!(matches!(parse_int("ff", 16), Ok(Value::Int(255))));
        assert!(matches!(parse_int("0b101", 0), Ok(Value::Int(5))));
        let err = parse_int("4.5", 10).unwrap_err();
        assert_eq!(err.exc.message(), "invalid literal for int() with base 10: '4.5'");
        let err = parse_int("--5", 10).unwrap_err();
        assert_eq!(err.exc.message(), "invalid literal for int() with base 10: '--5'");
    }

    #[test]
    fn test_parse_int_beyond_64_bits() {
        assert_eq!(parse_int("123456789012345678901234567890", 10).unwrap().repr(), "123456789012345678901234567890");
        assert_eq!(parse_int("-0x1_0000_0000_0000_0000", 0).unwrap().repr(), "-18446744073709551616");
        assert!(matches!(parse_int("-9223372036854775808", 10), Ok(Value::Int(i64::MIN))));
    }

    #[test]
    fn test_parse_float_forms() {
        assert_eq!(parse_float("2.5").unwrap(), 2.5);
        assert_eq!(parse_float(" -1e3\n").unwrap(), -1000.0);
        assert!(parse_float("-inf").unwrap().is_infinite());
        assert!(parse_float("nan").unwrap().is_nan());
        let err = parse_float("abc").unwrap_err();
        assert_eq!(err.exc.message(), "could not convert string to float: 'abc'");
    }

    #[test]
    fn test_round_int_half_even() {
        let round = |value: i64, digits: u64| round_int(&BigInt::from(value), digits).unwrap().to_string();
        assert_eq!(round(1250, 2), "1200");
        assert_eq!(round(1350, 2), "1400");
        assert_eq!(round(-151, 2), "-200");
        assert_eq!(round(99, 2), "100");
        assert_eq!(round(5, 1), "0");
        assert_eq!(round(123, 400), "0");
    }

    #[test]
    fn test_isinstance_treats_bool_as_int() {
        let int = Value::Builtin(BuiltinFnId::Int);
        assert!(isinstance(&Value::Bool(true), &int).unwrap());
        assert!(!isinstance(&Value::Int(1), &Value::Builtin(BuiltinFnId::Bool)).unwrap());
        let classes = Value::tuple(vec![Value::Builtin(BuiltinFnId::Str), int]);
        assert!(isinstance(&Value::Int(3), &classes).unwrap());
        assert!(isinstance(&Value::Int(3), &Value::Int(3)).is_err());
    }
}
