//! String formatting: the format-spec mini-language (`f"{x:>8.2f}"`, `format()`, `str.format`) and printf-style
//! `%` formatting.

use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use testmynb_core::py_float_repr;

use super::eval::Keywords;
use super::exceptions::{ExecResult, Raised};
use super::value::Value;

// ============================================================================
// Format specs
// ============================================================================

/// Widths and precisions above this are rejected, as CPython rejects those beyond `Py_ssize_t`.
const MAX_FORMAT_DIGITS: usize = isize::MAX as usize;

/// A parsed `[[fill]align][sign][#][0][width][grouping][.precision][type]`.
#[derive(Debug, Clone, Default, PartialEq)]
struct FormatSpec {
    fill: Option<char>,
    align: Option<char>,
    sign: Option<char>,
    alternate: bool,
    width: Option<usize>,
    grouping: Option<char>,
    precision: Option<usize>,
    ty: Option<char>,
}

impl FormatSpec {
    fn parse(spec: &str) -> ExecResult<Self> {
        let chars: Vec<char> = spec.chars().collect();
        let mut out = FormatSpec::default();
        let mut i = 0;
        let is_align = |c: char| matches!(c, '<' | '>' | '^' | '=');

        if chars.len() >= 2 && is_align(chars[1]) {
            out.fill = Some(chars[0]);
            out.align = Some(chars[1]);
            i = 2;
        } else if chars.first().is_some_and(|&c| is_align(c)) {
            out.align = Some(chars[0]);
            i = 1;
        }
        if let Some(&c) = chars.get(i) {
            if matches!(c, '+' | '-' | ' ') {
                out.sign = Some(c);
                i += 1;
            }
        }
        if chars.get(i) == Some(&'#') {
            out.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            if out.fill.is_none() {
                out.fill = Some('0');
            }
            if out.align.is_none() {
                out.align = Some('=');
            }
            i += 1;
        }
        let digits = |i: &mut usize| -> ExecResult<Option<usize>> {
            let start = *i;
            while chars.get(*i).is_some_and(char::is_ascii_digit) {
                *i += 1;
            }
            if start == *i {
                return Ok(None);
            }
            let text: String = chars[start..*i].iter().collect();
            match text.parse::<usize>() {
                Ok(n) if n <= MAX_FORMAT_DIGITS => Ok(Some(n)),
                _ => Err(Raised::value_error("Too many decimal digits in format string")),
            }
        };
        out.width = digits(&mut i)?;
        if let Some(&c) = chars.get(i) {
            if c == ',' || c == '_' {
                out.grouping = Some(c);
                i += 1;
            }
        }
        if chars.get(i) == Some(&'.') {
            i += 1;
            out.precision = Some(digits(&mut i)?.ok_or_else(|| Raised::value_error("Format specifier missing precision"))?);
        }
        if let Some(&c) = chars.get(i) {
            out.ty = Some(c);
            i += 1;
        }
        if i != chars.len() {
            return Err(Raised::value_error("Invalid format specifier"));
        }
        Ok(out)
    }
}

/// Python's `format(value, spec)`.
///
/// ## Errors
/// - `ValueError` for malformed specs or a presentation type the value does not support.
/// - `TypeError` for a non-empty spec on a value without `__format__` support (`None`, containers).
pub(super) fn format_value(value: &Value, spec: &str) -> ExecResult<String> {
    if spec.is_empty() {
        return Ok(value.to_str());
    }
    let parsed = FormatSpec::parse(spec)?;
    match value {
        Value::Str(s) => format_str(s, &parsed),
        Value::Int(i) => format_int(&BigInt::from(*i), &parsed),
        Value::BigInt(n) => format_int(n, &parsed),
        Value::Bool(b) => format_int(&BigInt::from(i64::from(*b)), &parsed),
        Value::Float(f) => format_float(*f, &parsed),
        other => Err(Raised::type_error(format!(
            "unsupported format string passed to {}.__format__",
            other.type_name()
        ))),
    }
}

/// Apply a `!r`/`!s`/`!a` conversion.
pub(super) fn convert_field(value: Value, conversion: Option<char>) -> Value {
    match conversion {
        Some('r') | Some('a') => Value::from(value.repr()),
        Some('s') => Value::from(value.to_str()),
        _ => value,
    }
}

fn unknown_code(ty: char, value_type: &str) -> Raised {
    Raised::value_error(format!("Unknown format code '{ty}' for object of type '{value_type}'"))
}

fn format_str(s: &str, spec: &FormatSpec) -> ExecResult<String> {
    if let Some(ty) = spec.ty.filter(|&t| t != 's') {
        return Err(unknown_code(ty, "str"));
    }
    if spec.sign.is_some() {
        return Err(Raised::value_error("Sign not allowed in string format specifier"));
    }
    if spec.align == Some('=') {
        return Err(Raised::value_error("'=' alignment not allowed in string format specifier"));
    }
    let text: String = match spec.precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_string(),
    };
    Ok(pad(String::new(), text, spec, '<'))
}

fn format_int(i: &BigInt, spec: &FormatSpec) -> ExecResult<String> {
    let ty = spec.ty.unwrap_or('d');
    if matches!(ty, 'e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%') {
        let x = i
            .to_f64()
            .filter(|x| x.is_finite())
            .ok_or_else(|| Raised::overflow(testmynb_core::errors::INT_TOO_LARGE_FOR_FLOAT_MSG))?;
        return format_float(x, spec);
    }
    if spec.precision.is_some() {
        return Err(Raised::value_error("Precision not allowed in integer format specifier"));
    }
    let magnitude = i.magnitude();
    let (prefix, digits) = match ty {
        'd' | 'n' => ("", magnitude.to_string()),
        'b' => ("0b", format!("{magnitude:b}")),
        'o' => ("0o", format!("{magnitude:o}")),
        'x' => ("0x", format!("{magnitude:x}")),
        'X' => ("0X", format!("{magnitude:X}")),
        'c' => {
            let c = u32::try_from(i)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| Raised::overflow("%c arg not in range(0x110000)"))?;
            return Ok(pad(String::new(), c.to_string(), spec, '<'));
        }
        other => return Err(unknown_code(other, "int")),
    };
    let digits = match spec.grouping {
        Some(sep) => group_digits(&digits, sep, if ty == 'd' || ty == 'n' { 3 } else { 4 }),
        None => digits,
    };
    let mut head = sign_prefix(i.sign() == Sign::Minus, spec.sign).to_string();
    if spec.alternate {
        head.push_str(prefix);
    }
    Ok(pad(head, digits, spec, '>'))
}

fn format_float(x: f64, spec: &FormatSpec) -> ExecResult<String> {
    let negative = x.is_sign_negative() && !x.is_nan();
    let magnitude = x.abs();
    let body = match spec.ty {
        None => match spec.precision {
            None => {
                let repr = py_float_repr(magnitude);
                match spec.grouping {
                    Some(sep) => group_fixed(&repr, sep),
                    None => repr,
                }
            }
            Some(p) => {
                let general = format_general(magnitude, p.max(1), spec.alternate);
                if general.contains(['.', 'e', 'n', 'i']) { general } else { format!("{general}.0") }
            }
        },
        Some('f') | Some('F') => {
            let fixed = format_fixed(magnitude, spec.precision.unwrap_or(6), spec.alternate);
            let fixed = if spec.ty == Some('F') { fixed.to_uppercase() } else { fixed };
            match spec.grouping {
                Some(sep) => group_fixed(&fixed, sep),
                None => fixed,
            }
        }
        Some('e') | Some('E') => {
            let sci = format_exponent(magnitude, spec.precision.unwrap_or(6), spec.alternate);
            if spec.ty == Some('E') { sci.to_uppercase() } else { sci }
        }
        Some('g') | Some('G') | Some('n') => {
            let general = format_general(magnitude, spec.precision.unwrap_or(6).max(1), spec.alternate);
            if spec.ty == Some('G') { general.to_uppercase() } else { general }
        }
        Some('%') => format!("{}%", format_fixed(magnitude * 100.0, spec.precision.unwrap_or(6), spec.alternate)),
        Some(other) => return Err(unknown_code(other, "float")),
    };
    Ok(pad(sign_prefix(negative, spec.sign).to_string(), body, spec, '>'))
}

fn sign_prefix(negative: bool, sign: Option<char>) -> &'static str {
    match (negative, sign) {
        (true, _) => "-",
        (false, Some('+')) => "+",
        (false, Some(' ')) => " ",
        _ => "",
    }
}

fn non_finite(x: f64) -> Option<String> {
    if x.is_nan() {
        Some("nan".to_string())
    } else if x.is_infinite() {
        Some("inf".to_string())
    } else {
        None
    }
}

fn format_fixed(x: f64, precision: usize, alternate: bool) -> String {
    if let Some(s) = non_finite(x) {
        return s;
    }
    let s = format!("{x:.precision$}");
    if alternate && precision == 0 { format!("{s}.") } else { s }
}

/// `d.ddde+XX`, with at least two exponent digits.
fn format_exponent(x: f64, precision: usize, alternate: bool) -> String {
    if let Some(s) = non_finite(x) {
        return s;
    }
    let rust = format!("{x:.precision$e}");
    let (mantissa, exponent) = rust.split_once('e').unwrap_or((&rust, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    let dot = if alternate && precision == 0 { "." } else { "" };
    format!("{mantissa}{dot}e{sign}{:02}", exponent.abs())
}

/// The `g` presentation: `precision` significant digits, scientific outside `1e-4 <= x < 10**precision`.
fn format_general(x: f64, precision: usize, alternate: bool) -> String {
    if let Some(s) = non_finite(x) {
        return s;
    }
    let digits_after = precision - 1;
    if x == 0.0 {
        return if alternate { format!("{:.digits_after$}", 0.0) } else { "0".to_string() };
    }
    let sci = format!("{x:.digits_after$e}");
    let exponent: i64 = sci.split_once('e').and_then(|(_, e)| e.parse().ok()).unwrap_or(0);
    if exponent >= -4 && exponent < precision as i64 {
        let decimals = (precision as i64 - 1 - exponent).max(0) as usize;
        let fixed = format!("{x:.decimals$}");
        return if alternate { fixed } else { strip_trailing_zeros(&fixed) };
    }
    let formatted = format_exponent(x, digits_after, alternate);
    if alternate {
        return formatted;
    }
    match formatted.split_once('e') {
        Some((mantissa, exp)) => format!("{}e{exp}", strip_trailing_zeros(mantissa)),
        None => formatted,
    }
}

fn strip_trailing_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

fn group_digits(digits: &str, sep: char, every: usize) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / every);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % every == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

fn group_fixed(fixed: &str, sep: char) -> String {
    match fixed.split_once('.') {
        Some((int, frac)) => format!("{}.{frac}", group_digits(int, sep, 3)),
        None if fixed.bytes().all(|b| b.is_ascii_digit()) => group_digits(fixed, sep, 3),
        None => fixed.to_string(),
    }
}

/// Pad `head + body` (sign/prefix and digits) to the spec's width.
fn pad(head: String, body: String, spec: &FormatSpec, default_align: char) -> String {
    let len = head.chars().count() + body.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        return head + &body;
    }
    let fill = spec.fill.unwrap_or(' ');
    let padding = width - len;
    let repeat = |n: usize| fill.to_string().repeat(n);
    match spec.align.unwrap_or(default_align) {
        '<' => format!("{head}{body}{}", repeat(padding)),
        '^' => format!("{}{head}{body}{}", repeat(padding / 2), repeat(padding - padding / 2)),
        '=' => format!("{head}{}{body}", repeat(padding)),
        _ => format!("{}{head}{body}", repeat(padding)),
    }
}

// ============================================================================
// str.format
// ============================================================================

/// `template.format(*args, **kwargs)`.
///
/// ## Notes
/// - Field names may be empty (automatic numbering), an index, or a keyword name, optionally followed by
///   `[key]` item lookups. Nested `{}` fields inside a format spec are substituted first.
pub(super) fn str_format(template: &str, args: &[Value], keywords: &Keywords) -> ExecResult<String> {
    let mut out = String::new();
    let mut auto_index = 0usize;
    let mut manual = false;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(Raised::value_error("Single '}' encountered in format string")),
            '{' => {
                let mut field = String::new();
                let mut depth = 1;
                loop {
                    match chars.next() {
                        Some('{') => {
                            depth += 1;
                            field.push('{');
                        }
                        Some('}') => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                            field.push('}');
                        }
                        Some(other) => field.push(other),
                        None => return Err(Raised::value_error("expected '}' before end of string")),
                    }
                }
                let (name, conversion, spec) = split_field(&field)?;
                let value = resolve_field(name, args, keywords, &mut auto_index, &mut manual)?;
                let spec = if spec.contains('{') {
                    str_format_nested(spec, args, keywords, &mut auto_index, &mut manual)?
                } else {
                    spec.to_string()
                };
                out.push_str(&format_value(&convert_field(value, conversion), &spec)?);
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn str_format_nested(
    spec: &str,
    args: &[Value],
    keywords: &Keywords,
    auto_index: &mut usize,
    manual: &mut bool,
) -> ExecResult<String> {
    let mut out = String::new();
    let mut rest = spec;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let close = rest[open..]
            .find('}')
            .ok_or_else(|| Raised::value_error("unmatched '{' in format spec"))?;
        let name = &rest[open + 1..open + close];
        out.push_str(&resolve_field(name, args, keywords, auto_index, manual)?.to_str());
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn split_field(field: &str) -> ExecResult<(&str, Option<char>, &str)> {
    let (head, spec) = match field.find(':') {
        Some(i) => (&field[..i], &field[i + 1..]),
        None => (field, ""),
    };
    match head.split_once('!') {
        Some((name, conv)) => {
            let mut conv_chars = conv.chars();
            match (conv_chars.next(), conv_chars.next()) {
                (Some(c @ ('r' | 's' | 'a')), None) => Ok((name, Some(c), spec)),
                _ => Err(Raised::value_error(format!("Unknown conversion specifier {conv}"))),
            }
        }
        None => Ok((head, None, spec)),
    }
}

fn resolve_field(
    name: &str,
    args: &[Value],
    keywords: &Keywords,
    auto_index: &mut usize,
    manual: &mut bool,
) -> ExecResult<Value> {
    let (base, lookups) = match name.find('[') {
        Some(i) => (&name[..i], &name[i..]),
        None => (name, ""),
    };

    let mut value = if base.is_empty() {
        if *manual {
            return Err(Raised::value_error(
                "cannot switch from manual field specification to automatic field numbering",
            ));
        }
        let index = *auto_index;
        *auto_index += 1;
        positional(args, index)?
    } else if let Ok(index) = base.parse::<usize>() {
        if *auto_index > 0 {
            return Err(Raised::value_error(
                "cannot switch from automatic field numbering to manual field specification",
            ));
        }
        *manual = true;
        positional(args, index)?
    } else {
        keywords
            .iter()
            .find(|(k, _)| k == base)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| Raised::key_error(Value::from(base)))?
    };

    let mut rest = lookups;
    while let Some(stripped) = rest.strip_prefix('[') {
        let close = stripped
            .find(']')
            .ok_or_else(|| Raised::value_error("Missing ']' in format string"))?;
        let key = &stripped[..close];
        value = lookup_item(&value, key)?;
        rest = &stripped[close + 1..];
    }
    Ok(value)
}

fn positional(args: &[Value], index: usize) -> ExecResult<Value> {
    args.get(index).cloned().ok_or_else(|| {
        Raised::index_error(format!(
            "Replacement index {index} out of range for positional args tuple"
        ))
    })
}

fn lookup_item(value: &Value, key: &str) -> ExecResult<Value> {
    match (value, key.parse::<i64>()) {
        (Value::List(items), Ok(i)) => usize::try_from(i)
            .ok()
            .and_then(|i| items.borrow().get(i).cloned())
            .ok_or_else(|| Raised::index_error("list index out of range")),
        (Value::Tuple(items), Ok(i)) => usize::try_from(i)
            .ok()
            .and_then(|i| items.get(i).cloned())
            .ok_or_else(|| Raised::index_error("tuple index out of range")),
        (Value::Dict(dict), parsed) => {
            let key = match parsed {
                Ok(i) => Value::Int(i),
                Err(_) => Value::from(key),
            };
            dict.borrow().get(&key)?.ok_or_else(|| Raised::key_error(key))
        }
        (other, _) => Err(Raised::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

// ============================================================================
// printf-style formatting
// ============================================================================

/// `template % args`.
///
/// ## Errors
/// - `TypeError` for argument count mismatches and non-numeric values given to numeric conversions.
/// - `ValueError` for an unsupported conversion character.
pub(super) fn percent_format(template: &str, args: &Value) -> ExecResult<String> {
    let (values, mapping) = match args {
        Value::Tuple(items) => (items.to_vec(), None),
        Value::Dict(_) => (Vec::new(), Some(args)),
        other => (vec![other.clone()], None),
    };
    let mut next = values.iter();
    let mut out = String::new();
    let chars: Vec<char> = template.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '%' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        i += 1;
        let mut key = None;
        if chars.get(i) == Some(&'(') {
            let close = chars[i..]
                .iter()
                .position(|&c| c == ')')
                .ok_or_else(|| Raised::value_error("incomplete format key"))?;
            key = Some(chars[i + 1..i + close].iter().collect::<String>());
            i += close + 1;
        }
        let mut spec = FormatSpec::default();
        while let Some(&flag) = chars.get(i) {
            match flag {
                '-' => spec.align = Some('<'),
                '+' => spec.sign = Some('+'),
                ' ' if spec.sign.is_none() => spec.sign = Some(' '),
                ' ' => {}
                '#' => spec.alternate = true,
                '0' => {
                    if spec.align.is_none() {
                        spec.align = Some('=');
                        spec.fill = Some('0');
                    }
                }
                _ => break,
            }
            i += 1;
        }
        if spec.align == Some('<') {
            spec.fill = None;
        }
        let start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        spec.width = percent_number(&chars[start..i], "width too big")?;
        if chars.get(i) == Some(&'.') {
            i += 1;
            let start = i;
            while chars.get(i).is_some_and(char::is_ascii_digit) {
                i += 1;
            }
            spec.precision = Some(percent_number(&chars[start..i], "precision too big")?.unwrap_or(0));
        }
        let conversion = *chars
            .get(i)
            .ok_or_else(|| Raised::value_error("incomplete format"))?;
        i += 1;
        if conversion == '%' {
            out.push('%');
            continue;
        }

        let value = match (&key, mapping) {
            (Some(name), Some(Value::Dict(dict))) => {
                let key = Value::from(name.as_str());
                dict.borrow().get(&key)?.ok_or_else(|| Raised::key_error(key))?
            }
            (Some(_), _) => return Err(Raised::type_error("format requires a mapping")),
            (None, Some(dict)) => dict.clone(),
            (None, None) => next
                .next()
                .cloned()
                .ok_or_else(|| Raised::type_error("not enough arguments for format string"))?,
        };
        out.push_str(&percent_convert(&value, conversion, &spec)?);
    }

    if mapping.is_none() && next.next().is_some() {
        return Err(Raised::type_error(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(out)
}

/// A `%` width or precision; `None` when absent.
fn percent_number(digits: &[char], too_big: &str) -> ExecResult<Option<usize>> {
    if digits.is_empty() {
        return Ok(None);
    }
    match digits.iter().collect::<String>().parse::<usize>() {
        Ok(n) if n <= MAX_FORMAT_DIGITS => Ok(Some(n)),
        _ => Err(Raised::value_error(too_big)),
    }
}

fn percent_convert(value: &Value, conversion: char, spec: &FormatSpec) -> ExecResult<String> {
    let number_required = || {
        Raised::type_error(format!(
            "%{conversion} format: a real number is required, not {}",
            value.type_name()
        ))
    };
    match conversion {
        's' | 'r' | 'a' => {
            let text = if conversion == 's' { value.to_str() } else { value.repr() };
            let text = match spec.precision {
                Some(p) => text.chars().take(p).collect(),
                None => text,
            };
            Ok(pad(String::new(), text, spec, '>'))
        }
        'd' | 'i' | 'u' => {
            let i = match value {
                Value::Float(f) => super::modules::float_to_int(f.trunc())?.as_bigint().unwrap_or_default(),
                other => other.as_bigint().ok_or_else(number_required)?,
            };
            format_int(&i, &FormatSpec { ty: Some('d'), precision: None, ..spec.clone() })
        }
        'x' | 'X' | 'o' => {
            let i = value.as_bigint().ok_or_else(|| {
                Raised::type_error(format!(
                    "%{conversion} format: an integer is required, not {}",
                    value.type_name()
                ))
            })?;
            format_int(&i, &FormatSpec { ty: Some(conversion), precision: None, ..spec.clone() })
        }
        'c' => match value {
            Value::Str(s) if s.chars().count() == 1 => Ok(pad(String::new(), s.to_string(), spec, '>')),
            other => {
                let i = other.as_bigint().ok_or_else(|| Raised::type_error("%c requires int or char"))?;
                format_int(&i, &FormatSpec { ty: Some('c'), align: spec.align.or(Some('>')), ..spec.clone() })
            }
        },
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
            let x = value.as_float().ok_or_else(number_required)?;
            format_float(x, &FormatSpec { ty: Some(conversion), ..spec.clone() })
        }
        other => Err(Raised::value_error(format!(
            "unsupported format character '{other}' ({:#x})",
            other as u32
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(value: impl Into<Value>, spec: &str) -> String {
        format_value(&value.into(), spec).unwrap()
    }

    #[test]
    fn test_float_presentations() {
        assert_eq!(fmt(3.14159, ".2f"), "3.14");
        assert_eq!(fmt(1234.5, ",.1f"), "1,234.5");
        assert_eq!(fmt(0.000123, "e"), "1.230000e-04");
        assert_eq!(fmt(1234567.0, "g"), "1.23457e+06");
        assert_eq!(fmt(0.5, ".0%"), "50%");
        assert_eq!(fmt(2.5, ""), "2.5");
        assert_eq!(fmt(1.0, ".3"), "1.0");
        assert_eq!(fmt(-1.5, "+08.2f"), "-0001.50");
    }

    #[test]
    fn test_int_presentations() {
        assert_eq!(fmt(255i64, "x"), "ff");
        assert_eq!(fmt(255i64, "#X"), "0XFF");
        assert_eq!(fmt(5i64, "b"), "101");
        assert_eq!(fmt(1234567i64, ","), "1,234,567");
        assert_eq!(fmt(42i64, "05d"), "00042");
        assert_eq!(fmt(-42i64, "=+6"), "-   42");
        assert_eq!(fmt(7i64, "^5"), "  7  ");
    }

    #[test]
    fn test_big_int_presentations() {
        let big = Value::from_bigint(BigInt::from(1u8) << 70);
        assert_eq!(format_value(&big, ",").unwrap(), "1,180,591,620,717,411,303,424");
        assert_eq!(format_value(&big, "#x").unwrap(), "0x400000000000000000");
        assert_eq!(format_value(&big, ".3e").unwrap(), "1.181e+21");
        assert_eq!(percent_format("%d", &big).unwrap(), "1180591620717411303424");
    }

    #[test]
    fn test_oversized_widths_are_rejected() {
        let err = str_format("{:99999999999999999999}", &[Value::Int(1)], &Vec::new()).unwrap_err();
        assert_eq!(err.kind(), testmynb_core::errors::ExceptionKind::ValueError);
        assert_eq!(err.exc.message(), "Too many decimal digits in format string");
        let err = format_value(&Value::Float(1.0), ".99999999999999999999f").unwrap_err();
        assert_eq!(err.exc.message(), "Too many decimal digits in format string");
        let err = percent_format("%99999999999999999999d", &Value::Int(1)).unwrap_err();
        assert_eq!(err.exc.message(), "width too big");
    }

    #[test]
    fn test_str_alignment_and_truncation() {
        assert_eq!(fmt("ab", "*>5"), "***ab");
        assert_eq!(fmt("ab", "<4"), "ab  ");
        assert_eq!(fmt("abcdef", ".3"), "abc");
        let err = format_value(&Value::from("ab"), "d").unwrap_err();
        assert_eq!(err.exc.message(), "Unknown format code 'd' for object of type 'str'");
    }

    #[test]
    fn test_none_rejects_non_empty_spec() {
        assert_eq!(format_value(&Value::None, "").unwrap(), "None");
        assert!(format_value(&Value::None, ">4").is_err());
    }

    #[test]
    fn test_str_format_fields() {
        let args = [Value::Int(1), Value::from("two")];
        let keywords = vec![("name".to_string(), Value::Float(0.5))];
        assert_eq!(str_format("{} and {}", &args, &keywords).unwrap(), "1 and two");
        assert_eq!(str_format("{1}{0}", &args, &keywords).unwrap(), "two1");
        assert_eq!(str_format("{name:.2f} {{x}}", &args, &keywords).unwrap(), "0.50 {x}");
        assert_eq!(str_format("{1!r:>6}", &args, &keywords).unwrap(), " 'two'");
        let err = str_format("{5}", &args, &keywords).unwrap_err();
        assert_eq!(err.kind(), testmynb_core::errors::ExceptionKind::IndexError);
    }

    #[test]
    fn test_percent_format() {
        let args = Value::tuple(vec![Value::from("x"), Value::Int(3), Value::Float(2.0)]);
        assert_eq!(percent_format("%s=%03d (%.1f%%)", &args).unwrap(), "x=003 (2.0%)");
        assert_eq!(percent_format("%r", &Value::from("q")).unwrap(), "'q'");
        let err = percent_format("%s %s", &Value::from("only")).unwrap_err();
        assert_eq!(err.exc.message(), "not enough arguments for format string");
        let err = percent_format("%d", &Value::from("x")).unwrap_err();
        assert_eq!(err.exc.message(), "%d format: a real number is required, not str");
    }
}
