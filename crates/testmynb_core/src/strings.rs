//! Define shared string and sequence semantics (policy + pure helpers).
//!
//! This module holds **pure/deterministic** helpers the cell executor uses for Python-compatible indexing,
//! slicing and string methods, kept out of the executor so they can be tested without running cells.
//!
//! ## Notes
//! - **Indexing model**: Unicode scalar indexing (Rust `char`), not bytes or grapheme clusters.
//! - **Negative indices**: supported (Python-style): `s[-1]` is the last scalar.
//! - **Slicing**: Python-like `start`, `end`, `step` (default `step = 1`), with negative indices and bounds
//!   clamping. [`slice_indices`] is shared with list and tuple slicing.
//! - **Error messages**: message constants exported here are reused by the executor when raising.

/// Describe a string index-out-of-range error message.
pub const STRING_INDEX_OUT_OF_RANGE_MSG: &str = "string index out of range";
/// Describe a slice step-zero error message.
pub const STRING_SLICE_STEP_ZERO_MSG: &str = "slice step cannot be zero";

/// Represent sequence access errors produced by semantic-core helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringAccessError {
    IndexOutOfRange,
    SliceStepZero,
}

impl StringAccessError {
    /// Return the canonical error message for this access error on a `str`.
    ///
    /// ## Returns
    /// - (`&'static str`): the shared error message string.
    pub fn message(self) -> &'static str {
        match self {
            StringAccessError::IndexOutOfRange => STRING_INDEX_OUT_OF_RANGE_MSG,
            StringAccessError::SliceStepZero => STRING_SLICE_STEP_ZERO_MSG,
        }
    }
}

/// Return the string length in Unicode scalars (Rust `char`).
///
/// ## Parameters
/// - `s`: the string to measure.
///
/// ## Returns
/// - (`usize`): number of Unicode scalar values in `s`.
pub fn str_len(s: &str) -> usize {
    s.chars().count()
}

/// Normalize an index (supports negatives). Returns `None` if out of range.
///
/// ## Parameters
/// - `len`: length of the indexed sequence.
/// - `idx`: Python-style index; `-1` is the last element.
pub fn normalize_index(len: usize, idx: i64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len_i = len as i64;
    let mut i = idx;
    if i < 0 {
        i += len_i;
    }
    if i < 0 || i >= len_i { None } else { Some(i as usize) }
}

/// Compute the element positions selected by a Python slice.
///
/// ## Parameters
/// - `len`: length of the sliced sequence.
/// - `start`: Optional start index (inclusive).
/// - `end`: Optional end index (exclusive).
/// - `step`: Optional step; defaults to `1`. Negative steps walk backwards.
///
/// ## Returns
/// - `Ok(Vec<usize>)`: the selected positions, in output order.
/// - `Err(StringAccessError::SliceStepZero)`: if `step == 0`.
///
/// ## Examples
/// ```rust
/// use testmynb_core::strings::slice_indices;
///
/// assert_eq!(slice_indices(5, Some(1), None, None).unwrap(), vec![1, 2, 3, 4]);
/// assert_eq!(slice_indices(5, None, None, Some(-2)).unwrap(), vec![4, 2, 0]);
/// assert_eq!(slice_indices(3, Some(-10), Some(10), None).unwrap(), vec![0, 1, 2]);
/// ```
pub fn slice_indices(
    len: usize,
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
) -> Result<Vec<usize>, StringAccessError> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(StringAccessError::SliceStepZero);
    }

    let len = len as i64;

    let default_start = if step > 0 { 0 } else { len - 1 };
    let default_end = if step > 0 { len } else { -1 };

    let mut start_idx = match start {
        Some(s) if s < 0 => s + len,
        Some(s) => s,
        None => default_start,
    };
    let mut end_idx = match end {
        Some(e) if e < 0 => e + len,
        Some(e) => e,
        None => default_end,
    };

    if step > 0 {
        start_idx = start_idx.clamp(0, len);
        end_idx = end_idx.clamp(0, len);
    } else {
        start_idx = start_idx.clamp(-1, len - 1);
        // An explicit end that normalizes below zero means "walk to the front".
        end_idx = end_idx.clamp(-1, len - 1);
    }

    let mut out = Vec::new();
    let mut i = start_idx;
    if step > 0 {
        while i < end_idx {
            out.push(i as usize);
            i += step;
        }
    } else {
        while i > end_idx {
            out.push(i as usize);
            i += step; // negative
        }
    }
    Ok(out)
}

/// Index a string by Unicode scalar index.
///
/// ## Parameters
/// - `s`: String to index.
/// - `idx`: Index (supports negative indices; Python-style).
///
/// ## Returns
/// - `Ok(String)`: Single-character string (one Unicode scalar).
/// - `Err(StringAccessError)`: If the index is out of range.
pub fn str_char_at(s: &str, idx: i64) -> Result<String, StringAccessError> {
    let Some(pos) = normalize_index(str_len(s), idx) else {
        return Err(StringAccessError::IndexOutOfRange);
    };
    s.chars()
        .nth(pos)
        .map(|ch| ch.to_string())
        .ok_or(StringAccessError::IndexOutOfRange)
}

/// Slice a string over Unicode scalars (Python-like semantics).
///
/// ## Returns
/// - `Ok(String)`: Sliced string.
/// - `Err(StringAccessError)`: If `step == 0`.
pub fn str_slice(
    s: &str,
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
) -> Result<String, StringAccessError> {
    let chars: Vec<char> = s.chars().collect();
    let positions = slice_indices(chars.len(), start, end, step)?;
    Ok(positions.into_iter().filter_map(|i| chars.get(i)).collect())
}

// ---- String methods (shared policy) -------------------------------------------------------------

/// Split a string Python-style.
///
/// ## Parameters
/// - `s`: Input string.
/// - `sep`: Separator; `None` splits on runs of whitespace and drops empty parts.
/// - `maxsplit`: Maximum number of splits; negative means unlimited.
///
/// ## Returns
/// - `Vec<String>`: Split parts as owned strings.
///
/// ## Examples
/// ```rust
/// use testmynb_core::strings::str_split;
///
/// assert_eq!(str_split("  a  b ", None, -1), vec!["a", "b"]);
/// assert_eq!(str_split("a,,b", Some(","), -1), vec!["a", "", "b"]);
/// assert_eq!(str_split("a,b,c", Some(","), 1), vec!["a", "b,c"]);
/// ```
pub fn str_split(s: &str, sep: Option<&str>, maxsplit: i64) -> Vec<String> {
    match sep {
        Some(sep) => {
            if maxsplit < 0 {
                s.split(sep).map(str::to_string).collect()
            } else {
                s.splitn(maxsplit as usize + 1, sep).map(str::to_string).collect()
            }
        }
        None => {
            let mut parts = Vec::new();
            let mut rest = s.trim_start();
            while !rest.is_empty() {
                if maxsplit >= 0 && parts.len() as i64 == maxsplit {
                    parts.push(rest.to_string());
                    break;
                }
                match rest.find(char::is_whitespace) {
                    Some(end) => {
                        parts.push(rest[..end].to_string());
                        rest = rest[end..].trim_start();
                    }
                    None => {
                        parts.push(rest.to_string());
                        break;
                    }
                }
            }
            parts
        }
    }
}

/// Strip characters from both ends of a string.
///
/// ## Parameters
/// - `s`: Input string.
/// - `chars`: Characters to strip; `None` strips whitespace.
pub fn str_strip(s: &str, chars: Option<&str>) -> String {
    match chars {
        Some(set) => s.trim_matches(|c| set.contains(c)).to_string(),
        None => s.trim().to_string(),
    }
}

/// Strip characters from the start of a string (`str.lstrip`).
pub fn str_lstrip(s: &str, chars: Option<&str>) -> String {
    match chars {
        Some(set) => s.trim_start_matches(|c| set.contains(c)).to_string(),
        None => s.trim_start().to_string(),
    }
}

/// Strip characters from the end of a string (`str.rstrip`).
pub fn str_rstrip(s: &str, chars: Option<&str>) -> String {
    match chars {
        Some(set) => s.trim_end_matches(|c| set.contains(c)).to_string(),
        None => s.trim_end().to_string(),
    }
}

/// Join items with a separator.
///
/// ## Parameters
/// - `sep`: Separator placed between items.
/// - `items`: Items to join.
///
/// ## Returns
/// - `String`: Joined string.
pub fn str_join<S: AsRef<str>>(sep: &str, items: &[S]) -> String {
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(sep)
}

/// Return the scalar index of the first occurrence of `needle`, or `-1` (`str.find`).
pub fn str_find(haystack: &str, needle: &str) -> i64 {
    match haystack.find(needle) {
        Some(byte_pos) => haystack[..byte_pos].chars().count() as i64,
        None => -1,
    }
}

/// Count non-overlapping occurrences of `needle` (`str.count`).
///
/// ## Notes
/// - Like Python, an empty needle matches between every scalar: `"ab".count("") == 3`.
pub fn str_count(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return str_len(haystack) + 1;
    }
    haystack.matches(needle).count()
}

/// Uppercase the first scalar and lowercase the rest (`str.capitalize`).
pub fn str_capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Uppercase the first letter of every word (`str.title`).
pub fn str_title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if prev_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_is_letter = c.is_alphabetic();
    }
    out
}

/// Render a string the way Python's `repr()` does.
///
/// ## Notes
/// - Single quotes are preferred; double quotes are used when the text contains `'` but no `"`.
/// - Backslash, the chosen quote, and the common control characters are escaped.
///
/// ## Examples
/// ```rust
/// use testmynb_core::strings::str_repr;
///
/// assert_eq!(str_repr("b"), "'b'");
/// assert_eq!(str_repr("it's"), "\"it's\"");
/// assert_eq!(str_repr("a\nb"), "'a\\nb'");
/// ```
pub fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_at_negative_index() {
        assert_eq!(str_char_at("héllo", -4).unwrap(), "é");
        assert_eq!(str_char_at("abc", 3), Err(StringAccessError::IndexOutOfRange));
        assert_eq!(str_char_at("", 0), Err(StringAccessError::IndexOutOfRange));
    }

    #[test]
    fn test_slice_reverse() {
        assert_eq!(str_slice("abcdef", None, None, Some(-1)).unwrap(), "fedcba");
        assert_eq!(str_slice("abcdef", Some(4), Some(1), Some(-1)).unwrap(), "edc");
        assert_eq!(str_slice("abcdef", Some(1), Some(4), Some(0)), Err(StringAccessError::SliceStepZero));
    }

    #[test]
    fn test_slice_indices_empty_when_bounds_cross() {
        assert!(slice_indices(5, Some(3), Some(1), None).unwrap().is_empty());
        assert!(slice_indices(0, None, None, Some(-1)).unwrap().is_empty());
    }

    #[test]
    fn test_split_whitespace_maxsplit() {
        assert_eq!(str_split("a b  c", None, 1), vec!["a", "b  c"]);
        assert!(str_split("   ", None, -1).is_empty());
    }

    #[test]
    fn test_strip_with_chars() {
        assert_eq!(str_strip("xxhixx", Some("x")), "hi");
        assert_eq!(str_lstrip("  hi  ", None), "hi  ");
        assert_eq!(str_rstrip("  hi  ", None), "  hi");
    }

    #[test]
    fn test_find_and_count() {
        assert_eq!(str_find("héllo", "l"), 2);
        assert_eq!(str_find("abc", "z"), -1);
        assert_eq!(str_count("banana", "an"), 2);
        assert_eq!(str_count("ab", ""), 3);
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(str_capitalize("hELLO world"), "Hello world");
        assert_eq!(str_title("hello wORLD"), "Hello World");
    }

    #[test]
    fn test_repr_escapes_quotes_and_backslashes() {
        assert_eq!(str_repr("a'b\"c"), "'a\\'b\"c'");
        assert_eq!(str_repr("back\\slash"), "'back\\\\slash'");
        assert_eq!(str_repr("\u{1}"), "'\\x01'");
    }
}
