//! String scanning for the cell lexer
//!
//! Handles plain, raw, triple-quoted and f-string literals. Byte strings are recognised only so they can
//! be rejected with a useful message.

use super::Lexer;
use super::tokens::{FStringPart, Token, TokenKind};
use crate::ast::Span;
use crate::diagnostics::CompileError;

// ============================================================================
// String prefixes
// ============================================================================

/// Letters that may precede a string's opening quote (`r`, `f`, `b`, `u`, in either case).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct StringPrefix {
    pub raw: bool,
    pub format: bool,
    pub bytes: bool,
}

impl StringPrefix {
    /// Parse an identifier spelling as a string prefix.
    ///
    /// Returns `None` when the spelling is an ordinary identifier (so `rb`, `Rf` and `u` are prefixes but
    /// `fu`, `bf` and `raw` are not).
    pub(super) fn parse(spelling: &str) -> Option<Self> {
        if spelling.is_empty() || spelling.len() > 2 {
            return None;
        }
        let mut prefix = Self::default();
        for c in spelling.chars() {
            match c.to_ascii_lowercase() {
                'r' if !prefix.raw => prefix.raw = true,
                'f' if !prefix.format => prefix.format = true,
                'b' if !prefix.bytes => prefix.bytes = true,
                'u' if spelling.len() == 1 => {}
                _ => return None,
            }
        }
        if prefix.format && prefix.bytes {
            return None;
        }
        Some(prefix)
    }
}

// ============================================================================
// Escape sequence handling
// ============================================================================

/// Result of processing an escape sequence
enum EscapeResult {
    /// Successfully parsed escape character
    Char(char),
    /// Backslash-newline: the line break is dropped
    Continuation,
    /// Unknown escape - preserve as-is (backslash + char)
    Unknown(char),
    /// Malformed `\x`, `\u` or `\U` escape
    Invalid(&'static str),
    /// End of input during escape
    Eof,
}

impl<'a> Lexer<'a> {
    /// Process a text escape sequence. Called after consuming the backslash.
    fn scan_text_escape(&mut self) -> EscapeResult {
        match self.advance() {
            Some('\n') => EscapeResult::Continuation,
            Some('n') => EscapeResult::Char('\n'),
            Some('t') => EscapeResult::Char('\t'),
            Some('r') => EscapeResult::Char('\r'),
            Some('a') => EscapeResult::Char('\x07'),
            Some('b') => EscapeResult::Char('\x08'),
            Some('f') => EscapeResult::Char('\x0c'),
            Some('v') => EscapeResult::Char('\x0b'),
            Some(c @ ('\\' | '\'' | '"')) => EscapeResult::Char(c),
            Some(c @ '0'..='7') => {
                let mut value = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.advance();
                        }
                        None => break,
                    }
                }
                char::from_u32(value).map_or(EscapeResult::Invalid("invalid octal escape"), EscapeResult::Char)
            }
            Some('x') => self.scan_hex_escape(2, "truncated \\xXX escape"),
            Some('u') => self.scan_hex_escape(4, "truncated \\uXXXX escape"),
            Some('U') => self.scan_hex_escape(8, "truncated \\UXXXXXXXX escape"),
            Some(c) => EscapeResult::Unknown(c),
            None => EscapeResult::Eof,
        }
    }

    fn scan_hex_escape(&mut self, digits: usize, message: &'static str) -> EscapeResult {
        let mut value: u32 = 0;
        for _ in 0..digits {
            match self.peek().and_then(|d| d.to_digit(16)) {
                Some(d) => {
                    value = value * 16 + d;
                    self.advance();
                }
                None => return EscapeResult::Invalid(message),
            }
        }
        char::from_u32(value).map_or(EscapeResult::Invalid("illegal Unicode character"), EscapeResult::Char)
    }

    /// Handle a backslash inside a literal body, appending the result to `value`.
    ///
    /// Returns `false` when input ran out.
    fn push_escape(&mut self, raw: bool, start: usize, value: &mut String) -> bool {
        if raw {
            // Raw strings keep the backslash and never end on an escaped quote.
            value.push('\\');
            match self.advance() {
                Some(c) => {
                    value.push(c);
                    return true;
                }
                None => return false,
            }
        }
        match self.scan_text_escape() {
            EscapeResult::Char(c) => value.push(c),
            EscapeResult::Continuation => {}
            EscapeResult::Unknown(c) => {
                value.push('\\');
                value.push(c);
            }
            EscapeResult::Invalid(message) => {
                self.errors
                    .push(CompileError::syntax(message.to_string(), Span::new(start, self.current_pos)));
            }
            EscapeResult::Eof => return false,
        }
        true
    }
}

// ============================================================================
// String scanning
// ============================================================================

impl<'a> Lexer<'a> {
    /// Scan a string literal. The opening quote has already been consumed.
    pub(super) fn scan_string(&mut self, start: usize, quote: char, prefix: StringPrefix) {
        // Check for triple-quoted string
        let triple = self.peek_nth(0) == Some(quote) && self.peek_nth(1) == Some(quote);
        if triple {
            self.advance(); // consume second quote
            self.advance(); // consume third quote
        }

        if prefix.format {
            self.scan_fstring(start, quote, triple, prefix.raw);
            return;
        }

        let mut value = String::new();
        let mut terminated = false;

        loop {
            if self.at_closing_quote(quote, triple) {
                self.consume_closing_quote(triple);
                terminated = true;
                break;
            }
            match self.peek() {
                None => break,
                Some('\n') if !triple => break,
                Some('\\') => {
                    self.advance();
                    if !self.push_escape(prefix.raw, start, &mut value) {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        if !terminated {
            self.unterminated(start, triple);
            return;
        }

        if prefix.bytes {
            self.errors.push(CompileError::syntax(
                "bytes literals are not supported".to_string(),
                Span::new(start, self.current_pos),
            ));
            return;
        }

        self.tokens
            .push(Token::new(TokenKind::String(value), Span::new(start, self.current_pos)));
    }

    fn at_closing_quote(&self, quote: char, triple: bool) -> bool {
        self.peek_nth(0) == Some(quote)
            && (!triple || (self.peek_nth(1) == Some(quote) && self.peek_nth(2) == Some(quote)))
    }

    fn consume_closing_quote(&mut self, triple: bool) {
        let count = if triple { 3 } else { 1 };
        for _ in 0..count {
            self.advance();
        }
    }

    fn unterminated(&mut self, start: usize, triple: bool) {
        let message = if triple {
            "unterminated triple-quoted string literal"
        } else {
            "unterminated string literal"
        };
        self.errors
            .push(CompileError::syntax(message.to_string(), Span::new(start, self.current_pos)));
    }

    // ------------------------------------------------------------------------
    // f-strings
    // ------------------------------------------------------------------------

    fn scan_fstring(&mut self, start: usize, quote: char, triple: bool, raw: bool) {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut terminated = false;

        loop {
            if self.at_closing_quote(quote, triple) {
                self.consume_closing_quote(triple);
                terminated = true;
                break;
            }
            match self.peek() {
                None => break,
                Some('\n') if !triple => break,
                Some('{') => {
                    self.advance();
                    if self.peek() == Some('{') {
                        // Escaped brace
                        self.advance();
                        literal.push('{');
                    } else {
                        if !literal.is_empty() {
                            parts.push(FStringPart::Literal(std::mem::take(&mut literal)));
                        }
                        if let Some(part) = self.scan_fstring_expr(start, quote, triple) {
                            parts.push(part);
                        }
                    }
                }
                Some('}') => {
                    self.advance();
                    if self.peek() == Some('}') {
                        self.advance();
                        literal.push('}');
                    } else {
                        self.errors.push(CompileError::syntax(
                            "f-string: single '}' is not allowed".to_string(),
                            Span::new(start, self.current_pos),
                        ));
                    }
                }
                Some('\\') => {
                    self.advance();
                    if !self.push_escape(raw, start, &mut literal) {
                        break;
                    }
                }
                Some(c) => {
                    literal.push(c);
                    self.advance();
                }
            }
        }

        if !terminated {
            self.unterminated(start, triple);
            return;
        }

        if !literal.is_empty() {
            parts.push(FStringPart::Literal(literal));
        }

        self.tokens
            .push(Token::new(TokenKind::FString(parts), Span::new(start, self.current_pos)));
    }

    /// Scan one replacement field. The opening `{` has already been consumed.
    ///
    /// Splits `expr!conv:spec` at the top level; brackets and nested string literals inside the expression
    /// are skipped over. Returns `None` if the field is malformed or the literal ends inside it.
    fn scan_fstring_expr(&mut self, start: usize, quote: char, triple: bool) -> Option<FStringPart> {
        let mut source = String::new();
        let mut depth = 0usize;
        let mut conversion = None;
        let mut format_spec = None;

        loop {
            if self.at_closing_quote(quote, triple) {
                return None;
            }
            let c = self.peek()?;
            match c {
                '\n' if !triple => return None,
                '(' | '[' | '{' => {
                    depth += 1;
                    source.push(c);
                    self.advance();
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    source.push(c);
                    self.advance();
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    source.push(c);
                    self.advance();
                }
                '}' => {
                    self.advance();
                    break;
                }
                '\'' | '"' => self.copy_nested_string(c, &mut source)?,
                '!' if depth == 0 && self.peek_next() != Some('=') => {
                    self.advance();
                    match self.advance() {
                        Some(ch @ ('r' | 's' | 'a')) => conversion = Some(ch),
                        _ => {
                            self.errors.push(CompileError::syntax(
                                "f-string: invalid conversion character: expected 's', 'r', or 'a'".to_string(),
                                Span::new(start, self.current_pos),
                            ));
                            return None;
                        }
                    }
                    match self.advance() {
                        Some('}') => {}
                        Some(':') => format_spec = Some(self.scan_format_spec(start, quote, triple)?),
                        _ => {
                            self.errors.push(CompileError::syntax(
                                "f-string: expecting '}'".to_string(),
                                Span::new(start, self.current_pos),
                            ));
                            return None;
                        }
                    }
                    break;
                }
                ':' if depth == 0 => {
                    self.advance();
                    format_spec = Some(self.scan_format_spec(start, quote, triple)?);
                    break;
                }
                _ => {
                    source.push(c);
                    self.advance();
                }
            }
        }

        if source.trim().is_empty() {
            self.errors.push(CompileError::syntax(
                "f-string: empty expression not allowed".to_string(),
                Span::new(start, self.current_pos),
            ));
            return None;
        }

        Some(FStringPart::Expr { source, conversion, format_spec })
    }

    /// Copy a string literal nested inside a replacement field verbatim.
    fn copy_nested_string(&mut self, quote: char, source: &mut String) -> Option<()> {
        source.push(quote);
        self.advance();
        loop {
            match self.peek()? {
                '\n' => return None,
                '\\' => {
                    source.push('\\');
                    self.advance();
                    source.push(self.advance()?);
                }
                c => {
                    source.push(c);
                    self.advance();
                    if c == quote {
                        return Some(());
                    }
                }
            }
        }
    }

    /// Scan a format spec up to and including the closing `}`.
    fn scan_format_spec(&mut self, start: usize, quote: char, triple: bool) -> Option<String> {
        let mut spec = String::new();
        loop {
            if self.at_closing_quote(quote, triple) {
                return None;
            }
            match self.peek()? {
                '\n' if !triple => return None,
                '}' => {
                    self.advance();
                    return Some(spec);
                }
                '{' => {
                    self.errors.push(CompileError::syntax(
                        "f-string: nested replacement fields in format specs are not supported".to_string(),
                        Span::new(start, self.current_pos),
                    ));
                    return None;
                }
                c => {
                    spec.push(c);
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{FStringPart, TokenKind, lex};

    fn single(source: &str) -> TokenKind {
        lex(source).unwrap().remove(0).kind
    }

    #[test]
    fn test_escapes() {
        assert_eq!(single(r#""a\tb\x41é\101\q""#), TokenKind::String("a\tbAéA\\q".to_string()));
    }

    #[test]
    fn test_raw_string_keeps_escaped_quote() {
        assert_eq!(single(r#"r'it\'s'"#), TokenKind::String("it\\'s".to_string()));
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        assert_eq!(single("R'x'"), TokenKind::String("x".to_string()));
        assert_eq!(single("u'x'"), TokenKind::String("x".to_string()));
        assert!(matches!(single("Rf'{x}'"), TokenKind::FString(_)));
    }

    #[test]
    fn test_identifier_that_looks_like_prefix() {
        assert_eq!(single("rb"), TokenKind::Ident("rb".to_string()));
    }

    #[test]
    fn test_bytes_are_rejected() {
        let errors = lex("b'abc'").unwrap_err();
        assert!(errors[0].message.contains("bytes literals are not supported"));
    }

    #[test]
    fn test_fstring_nested_quotes_and_brackets() {
        match single(r#"f"{d['k']} {f(1, 2)!s} {a != b}""#) {
            TokenKind::FString(parts) => {
                let sources: Vec<_> = parts
                    .iter()
                    .filter_map(|p| match p {
                        FStringPart::Expr { source, .. } => Some(source.as_str()),
                        FStringPart::Literal(_) => None,
                    })
                    .collect();
                assert_eq!(sources, vec!["d['k']", "f(1, 2)", "a != b"]);
            }
            other => panic!("Expected FString token, got {other:?}"),
        }
    }

    #[test]
    fn test_fstring_errors() {
        let errors = lex("f'{}'").unwrap_err();
        assert!(errors[0].message.contains("empty expression"));
        let errors = lex("f'a}b'").unwrap_err();
        assert!(errors[0].message.contains("single '}'"));
    }

    #[test]
    fn test_unterminated_triple_quoted() {
        let errors = lex("'''abc\n").unwrap_err();
        assert!(errors[0].message.contains("unterminated triple-quoted string literal"));
    }
}
