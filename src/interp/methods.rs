//! Methods of builtin types (`str.split`, `list.append`, `dict.get`, ...).
//!
//! Dict views (`keys()`, `values()`, `items()`) are returned as lists.

use testmynb_core::errors::{ExceptionKind, INDEX_SIZED_INTEGER_MSG, POP_FROM_EMPTY_LIST_MSG};
use testmynb_core::strings::{
    normalize_index, str_capitalize, str_count, str_find, str_join, str_lstrip, str_rstrip, str_split, str_strip,
    str_title,
};

use super::eval::Keywords;
use super::exceptions::{ExecResult, Raised};
use super::format::str_format;
use super::modules;
use super::value::{Dict, Value, collect_values, iter_values, py_eq};
use super::Interpreter;

const STR_METHODS: &[&str] = &[
    "upper", "lower", "strip", "lstrip", "rstrip", "split", "join", "replace", "startswith", "endswith", "find",
    "rfind", "index", "count", "format", "capitalize", "title", "swapcase", "isdigit", "isalpha", "isalnum",
    "isspace", "isupper", "islower", "zfill", "center", "ljust", "rjust", "splitlines",
];
const LIST_METHODS: &[&str] = &[
    "append", "extend", "insert", "pop", "remove", "index", "count", "reverse", "sort", "clear", "copy",
];
const TUPLE_METHODS: &[&str] = &["count", "index"];
const DICT_METHODS: &[&str] = &[
    "get", "keys", "values", "items", "pop", "popitem", "setdefault", "update", "clear", "copy",
];
const FLOAT_METHODS: &[&str] = &["is_integer"];

/// Whether `value.name` is a method of its builtin type.
pub(super) fn has_method(value: &Value, name: &str) -> bool {
    let table = match value {
        Value::Str(_) => STR_METHODS,
        Value::List(_) => LIST_METHODS,
        Value::Tuple(_) => TUPLE_METHODS,
        Value::Dict(_) => DICT_METHODS,
        Value::Float(_) => FLOAT_METHODS,
        _ => return false,
    };
    table.contains(&name)
}

/// Positional-argument count check with CPython's method wording.
fn expect_args(name: &str, args: &[Value], min: usize, max: usize) -> ExecResult<()> {
    let given = args.len();
    if (min..=max).contains(&given) {
        return Ok(());
    }
    let message = match (min, max) {
        (0, 0) => format!("{name}() takes no arguments ({given} given)"),
        (1, 1) => format!("{name}() takes exactly one argument ({given} given)"),
        _ if given < min => format!(
            "{name} expected at least {min} argument{}, got {given}",
            if min == 1 { "" } else { "s" }
        ),
        _ => format!("{name} expected at most {max} arguments, got {given}"),
    };
    Err(Raised::type_error(message))
}

fn no_keywords(name: &str, keywords: &Keywords) -> ExecResult<()> {
    match keywords.first() {
        Some((keyword, _)) => Err(Raised::type_error(format!(
            "{name}() takes no keyword arguments ('{keyword}' given)"
        ))),
        None => Ok(()),
    }
}

fn str_arg<'v>(method: &str, value: &'v Value) -> ExecResult<&'v str> {
    value.as_str().ok_or_else(|| {
        Raised::type_error(format!(
            "{method}() argument must be str, not {}",
            value.type_name()
        ))
    })
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
    /// Call `receiver.name(*args, **keywords)`.
    ///
    /// ## Errors
    /// - `AttributeError` if the receiver's type has no such method.
    /// - Whatever the method raises.
    pub(super) fn call_method(
        &mut self,
        receiver: Value,
        name: &str,
        args: Vec<Value>,
        keywords: Keywords,
    ) -> ExecResult<Value> {
        match &receiver {
            Value::Module(module) => {
                let callee = modules::get_attr(module, &receiver, name)?;
                match callee {
                    Value::BoundMethod(_) => modules::call(module, name, args, keywords),
                    other => self.call_value(&other, args, keywords),
                }
            }
            Value::Str(s) if has_method(&receiver, name) => str_method(s, name, args, keywords),
            Value::List(_) if has_method(&receiver, name) => self.list_method(&receiver, name, args, keywords),
            Value::Tuple(items) if has_method(&receiver, name) => {
                no_keywords(name, &keywords)?;
                sequence_method("tuple", items, name, &args)
            }
            Value::Dict(_) if has_method(&receiver, name) => dict_method(&receiver, name, args, keywords),
            Value::Float(f) if name == "is_integer" => {
                no_keywords(name, &keywords)?;
                expect_args(name, &args, 0, 0)?;
                Ok(Value::Bool(f.is_finite() && f.fract() == 0.0))
            }
            _ => {
                let callee = self.get_attr(&receiver, name)?;
                self.call_value(&callee, args, keywords)
            }
        }
    }

    fn list_method(&mut self, receiver: &Value, name: &str, args: Vec<Value>, keywords: Keywords) -> ExecResult<Value> {
        let Value::List(list) = receiver else {
            return Err(Raised::attribute_error(receiver, name));
        };
        if name == "sort" {
            expect_args(name, &args, 0, 0)?;
            let mut key = None;
            let mut reverse = false;
            for (keyword, value) in keywords {
                match keyword.as_str() {
                    "key" if !matches!(value, Value::None) => key = Some(value),
                    "key" => {}
                    "reverse" => reverse = value.truthy(),
                    other => {
                        return Err(Raised::type_error(format!(
                            "'{other}' is an invalid keyword argument for sort()"
                        )));
                    }
                }
            }
            let mut items = std::mem::take(&mut *list.borrow_mut());
            let result = self.sort_values(&mut items, key.as_ref(), reverse);
            *list.borrow_mut() = items;
            return result.map(|()| Value::None);
        }

        no_keywords(name, &keywords)?;
        match name {
            "append" => {
                expect_args(name, &args, 1, 1)?;
                list.borrow_mut().extend(args);
                Ok(Value::None)
            }
            "extend" => {
                expect_args(name, &args, 1, 1)?;
                let items = collect_values(&args[0])?;
                list.borrow_mut().extend(items);
                Ok(Value::None)
            }
            "insert" => {
                expect_args(name, &args, 2, 2)?;
                let mut items = list.borrow_mut();
                let len = items.len() as i64;
                let index = int_arg(&args[0])?;
                let position = if index < 0 { (index + len).max(0) } else { index.min(len) };
                items.insert(position as usize, args[1].clone());
                Ok(Value::None)
            }
            "pop" => {
                expect_args(name, &args, 0, 1)?;
                let mut items = list.borrow_mut();
                if items.is_empty() {
                    return Err(Raised::index_error(POP_FROM_EMPTY_LIST_MSG));
                }
                let index = match args.first() {
                    Some(value) => int_arg(value)?,
                    None => -1,
                };
                let position =
                    normalize_index(items.len(), index).ok_or_else(|| Raised::index_error("pop index out of range"))?;
                Ok(items.remove(position))
            }
            "remove" => {
                expect_args(name, &args, 1, 1)?;
                let mut items = list.borrow_mut();
                let position = items
                    .iter()
                    .position(|item| py_eq(item, &args[0]))
                    .ok_or_else(|| Raised::value_error("list.remove(x): x not in list"))?;
                items.remove(position);
                Ok(Value::None)
            }
            "reverse" => {
                expect_args(name, &args, 0, 0)?;
                list.borrow_mut().reverse();
                Ok(Value::None)
            }
            "clear" => {
                expect_args(name, &args, 0, 0)?;
                list.borrow_mut().clear();
                Ok(Value::None)
            }
            "copy" => {
                expect_args(name, &args, 0, 0)?;
                Ok(Value::list(list.borrow().clone()))
            }
            _ => {
                let items = list.borrow().clone();
                sequence_method("list", &items, name, &args)
            }
        }
    }
}

/// `count` and `index`, shared by lists and tuples.
fn sequence_method(type_name: &str, items: &[Value], name: &str, args: &[Value]) -> ExecResult<Value> {
    match name {
        "count" => {
            expect_args(name, args, 1, 1)?;
            Ok(Value::Int(items.iter().filter(|item| py_eq(item, &args[0])).count() as i64))
        }
        "index" => {
            expect_args(name, args, 1, 3)?;
            let len = items.len() as i64;
            let clamp = |value: Option<&Value>, default: i64| -> ExecResult<usize> {
                let i = match value {
                    Some(v) => int_arg(v)?,
                    None => default,
                };
                Ok(if i < 0 { (i + len).max(0) } else { i.min(len) } as usize)
            };
            let start = clamp(args.get(1), 0)?;
            let stop = clamp(args.get(2), len)?;
            (start..stop.max(start))
                .find(|&i| py_eq(&items[i], &args[0]))
                .map(|i| Value::Int(i as i64))
                .ok_or_else(|| match type_name {
                    "list" => Raised::value_error(format!("{} is not in list", args[0].repr())),
                    _ => Raised::value_error("tuple.index(x): x not in tuple"),
                })
        }
        _ => Err(Raised::new(
            ExceptionKind::AttributeError,
            format!("'{type_name}' object has no attribute '{name}'"),
        )),
    }
}

fn str_method(s: &str, name: &str, args: Vec<Value>, keywords: Keywords) -> ExecResult<Value> {
    match name {
        "format" => return str_format(s, &args, &keywords).map(Value::from),
        "split" => {
            expect_args(name, &args, 0, 2)?;
            let mut sep = args.first().cloned();
            let mut maxsplit = args.get(1).cloned();
            for (keyword, value) in keywords {
                match keyword.as_str() {
                    "sep" => sep = Some(value),
                    "maxsplit" => maxsplit = Some(value),
                    other => {
                        return Err(Raised::type_error(format!(
                            "split() got an unexpected keyword argument '{other}'"
                        )));
                    }
                }
            }
            let sep = match &sep {
                None | Some(Value::None) => None,
                Some(value) => Some(str_arg(name, value)?),
            };
            if sep == Some("") {
                return Err(Raised::value_error("empty separator"));
            }
            let maxsplit = match &maxsplit {
                Some(value) => int_arg(value)?,
                None => -1,
            };
            let parts = str_split(s, sep, maxsplit).into_iter().map(Value::from).collect();
            return Ok(Value::list(parts));
        }
        _ => no_keywords(name, &keywords)?,
    }

    let optional_chars = |args: &[Value]| -> ExecResult<Option<String>> {
        expect_args(name, args, 0, 1)?;
        match args.first() {
            None | Some(Value::None) => Ok(None),
            Some(value) => Ok(Some(str_arg(name, value)?.to_string())),
        }
    };
    let text = |value: String| -> ExecResult<Value> { Ok(Value::from(value)) };
    let predicate = |test: fn(char) -> bool| -> ExecResult<Value> {
        expect_args(name, &args, 0, 0)?;
        Ok(Value::Bool(!s.is_empty() && s.chars().all(test)))
    };

    match name {
        "upper" => text(s.to_uppercase()),
        "lower" => text(s.to_lowercase()),
        "swapcase" => text(
            s.chars()
                .map(|c| {
                    if c.is_uppercase() {
                        c.to_lowercase().collect::<String>()
                    } else {
                        c.to_uppercase().collect()
                    }
                })
                .collect(),
        ),
        "capitalize" => text(str_capitalize(s)),
        "title" => text(str_title(s)),
        "strip" => text(str_strip(s, optional_chars(&args)?.as_deref())),
        "lstrip" => text(str_lstrip(s, optional_chars(&args)?.as_deref())),
        "rstrip" => text(str_rstrip(s, optional_chars(&args)?.as_deref())),
        "join" => {
            expect_args(name, &args, 1, 1)?;
            let mut parts = Vec::new();
            for (i, item) in iter_values(&args[0])?.enumerate() {
                match item {
                    Value::Str(part) => parts.push(part),
                    other => {
                        return Err(Raised::type_error(format!(
                            "sequence item {i}: expected str instance, {} found",
                            other.type_name()
                        )));
                    }
                }
            }
            text(str_join(s, &parts))
        }
        "replace" => {
            expect_args(name, &args, 2, 3)?;
            let old = str_arg(name, &args[0])?;
            let new = str_arg(name, &args[1])?;
            match args.get(2).map(int_arg).transpose()? {
                Some(count) if count >= 0 => text(s.replacen(old, new, count as usize)),
                _ => text(s.replace(old, new)),
            }
        }
        "startswith" | "endswith" => {
            expect_args(name, &args, 1, 1)?;
            let candidates = match &args[0] {
                Value::Tuple(items) => items.to_vec(),
                other => vec![other.clone()],
            };
            for candidate in &candidates {
                let affix = candidate.as_str().ok_or_else(|| {
                    Raised::type_error(format!(
                        "{name} first arg must be str or a tuple of str, not {}",
                        candidate.type_name()
                    ))
                })?;
                let hit = if name == "startswith" { s.starts_with(affix) } else { s.ends_with(affix) };
                if hit {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        "find" | "index" => {
            expect_args(name, &args, 1, 1)?;
            let position = str_find(s, str_arg(name, &args[0])?);
            if position < 0 && name == "index" {
                return Err(Raised::value_error("substring not found"));
            }
            Ok(Value::Int(position))
        }
        "rfind" => {
            expect_args(name, &args, 1, 1)?;
            let needle = str_arg(name, &args[0])?;
            Ok(Value::Int(
                s.rfind(needle).map_or(-1, |byte| s[..byte].chars().count() as i64),
            ))
        }
        "count" => {
            expect_args(name, &args, 1, 1)?;
            Ok(Value::Int(str_count(s, str_arg(name, &args[0])?) as i64))
        }
        "isdigit" => predicate(|c| c.is_ascii_digit()),
        "isalpha" => predicate(char::is_alphabetic),
        "isalnum" => predicate(char::is_alphanumeric),
        "isspace" => predicate(char::is_whitespace),
        "isupper" | "islower" => {
            expect_args(name, &args, 0, 0)?;
            let mut cased = s.chars().filter(|c| c.is_alphabetic()).peekable();
            let has_cased = cased.peek().is_some();
            let all = if name == "isupper" {
                cased.all(|c| !c.is_lowercase())
            } else {
                cased.all(|c| !c.is_uppercase())
            };
            Ok(Value::Bool(has_cased && all))
        }
        "zfill" => {
            expect_args(name, &args, 1, 1)?;
            let width = int_arg(&args[0])?.max(0) as usize;
            let len = s.chars().count();
            if len >= width {
                return text(s.to_string());
            }
            let zeros = "0".repeat(width - len);
            match s.chars().next() {
                Some(sign @ ('+' | '-')) => text(format!("{sign}{zeros}{}", &s[1..])),
                _ => text(format!("{zeros}{s}")),
            }
        }
        "center" | "ljust" | "rjust" => {
            expect_args(name, &args, 1, 2)?;
            let width = int_arg(&args[0])?.max(0) as usize;
            let fill = match args.get(1) {
                Some(value) => {
                    let fill = str_arg(name, value)?;
                    let mut chars = fill.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => c,
                        _ => {
                            return Err(Raised::type_error(
                                "The fill character must be exactly one character long",
                            ));
                        }
                    }
                }
                None => ' ',
            };
            let len = s.chars().count();
            if len >= width {
                return text(s.to_string());
            }
            let padding = width - len;
            let repeat = |n: usize| fill.to_string().repeat(n);
            text(match name {
                "ljust" => format!("{s}{}", repeat(padding)),
                "rjust" => format!("{}{s}", repeat(padding)),
                _ => {
                    // Odd padding with an odd width puts the extra fill on the left.
                    let left = padding / 2 + (padding & width & 1);
                    format!("{}{s}{}", repeat(left), repeat(padding - left))
                }
            })
        }
        "splitlines" => {
            expect_args(name, &args, 0, 1)?;
            Ok(Value::list(s.lines().map(Value::from).collect()))
        }
        _ => Err(Raised::attribute_error(&Value::from(s), name)),
    }
}

fn dict_method(receiver: &Value, name: &str, args: Vec<Value>, keywords: Keywords) -> ExecResult<Value> {
    let Value::Dict(dict) = receiver else {
        return Err(Raised::attribute_error(receiver, name));
    };
    if name == "update" {
        expect_args(name, &args, 0, 1)?;
        let mut merged = Vec::new();
        if let Some(source) = args.first() {
            match source {
                Value::Dict(other) => merged.extend(other.borrow().iter().map(|(k, v)| (k.clone(), v.clone()))),
                iterable => {
                    for pair in iter_values(iterable)? {
                        let items = collect_values(&pair)?;
                        let [key, value] = <[Value; 2]>::try_from(items).map_err(|items| {
                            Raised::value_error(format!(
                                "dictionary update sequence element has length {}; 2 is required",
                                items.len()
                            ))
                        })?;
                        merged.push((key, value));
                    }
                }
            }
        }
        merged.extend(keywords.into_iter().map(|(k, v)| (Value::from(k), v)));
        let mut dict = dict.borrow_mut();
        for (key, value) in merged {
            dict.insert(key, value)?;
        }
        return Ok(Value::None);
    }

    no_keywords(name, &keywords)?;
    match name {
        "get" => {
            expect_args(name, &args, 1, 2)?;
            let found = dict.borrow().get(&args[0])?;
            Ok(found.unwrap_or_else(|| args.get(1).cloned().unwrap_or(Value::None)))
        }
        "keys" | "values" | "items" => {
            expect_args(name, &args, 0, 0)?;
            let dict = dict.borrow();
            Ok(Value::list(match name {
                "keys" => dict.keys(),
                "values" => dict.values(),
                _ => dict.items(),
            }))
        }
        "pop" => {
            expect_args(name, &args, 1, 2)?;
            let removed = dict.borrow_mut().remove(&args[0])?;
            match (removed, args.get(1)) {
                (Some(value), _) => Ok(value),
                (None, Some(default)) => Ok(default.clone()),
                (None, None) => Err(Raised::key_error(args[0].clone())),
            }
        }
        "popitem" => {
            expect_args(name, &args, 0, 0)?;
            let mut dict = dict.borrow_mut();
            let last = dict.keys().pop().ok_or_else(|| {
                Raised::new(
                    ExceptionKind::KeyError,
                    "popitem(): dictionary is empty",
                )
            })?;
            let value = dict.remove(&last)?.unwrap_or(Value::None);
            Ok(Value::tuple(vec![last, value]))
        }
        "setdefault" => {
            expect_args(name, &args, 1, 2)?;
            let mut dict = dict.borrow_mut();
            if let Some(existing) = dict.get(&args[0])? {
                return Ok(existing);
            }
            let default = args.get(1).cloned().unwrap_or(Value::None);
            dict.insert(args[0].clone(), default.clone())?;
            Ok(default)
        }
        "clear" => {
            expect_args(name, &args, 0, 0)?;
            dict.borrow_mut().clear();
            Ok(Value::None)
        }
        "copy" => {
            expect_args(name, &args, 0, 0)?;
            let copy: Dict = dict.borrow().clone();
            Ok(Value::dict(copy))
        }
        _ => Err(Raised::attribute_error(receiver, name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_str(s: &str, name: &str, args: Vec<Value>) -> Value {
        str_method(s, name, args, Vec::new()).unwrap()
    }

    #[test]
    fn test_method_tables() {
        assert!(has_method(&Value::from("x"), "upper"));
        assert!(has_method(&Value::list(Vec::new()), "append"));
        assert!(!has_method(&Value::tuple(Vec::new()), "append"));
        assert!(!has_method(&Value::Int(1), "upper"));
    }

    #[test]
    fn test_str_methods() {
        assert_eq!(call_str("a,b", "split", vec![Value::from(",")]).repr(), "['a', 'b']");
        assert_eq!(call_str("-", "join", vec![Value::list(vec!["x".into(), "y".into()])]).repr(), "'x-y'");
        assert_eq!(call_str("-42", "zfill", vec![Value::Int(5)]).repr(), "'-0042'");
        assert_eq!(call_str("ab", "center", vec![Value::Int(5), Value::from("*")]).repr(), "'**ab*'");
        assert_eq!(call_str("hello", "find", vec![Value::from("l")]).repr(), "2");
        assert_eq!(call_str("Hello World", "isupper", Vec::new()).repr(), "False");
        let err = str_method("abc", "index", vec![Value::from("z")], Vec::new()).unwrap_err();
        assert_eq!(err.exc.message(), "substring not found");
    }

    #[test]
    fn test_join_rejects_non_strings() {
        let err = str_method(",", "join", vec![Value::list(vec![Value::Int(1)])], Vec::new()).unwrap_err();
        assert_eq!(err.exc.message(), "sequence item 0: expected str instance, int found");
    }

    #[test]
    fn test_dict_methods() {
        let dict = Value::dict(Dict::default());
        dict_method(&dict, "setdefault", vec!["a".into(), Value::Int(1)], Vec::new()).unwrap();
        dict_method(&dict, "update", Vec::new(), vec![("b".to_string(), Value::Int(2))]).unwrap();
        assert_eq!(dict.repr(), "{'a': 1, 'b': 2}");
        let missing = dict_method(&dict, "get", vec!["z".into(), Value::Int(0)], Vec::new()).unwrap();
        assert_eq!(missing.repr(), "0");
        let err = dict_method(&dict, "pop", vec!["z".into()], Vec::new()).unwrap_err();
        assert_eq!(err.exc.message(), "'z'");
    }

    #[test]
    fn test_tuple_index_errors() {
        let err = sequence_method("tuple", &[Value::Int(1)], "index", &[Value::Int(2)]).unwrap_err();
        assert_eq!(err.exc.message(), "tuple.index(x): x not in tuple");
    }
}
