//! Lexer for test-cell sources
//!
//! Handles tokenization including:
//! - Keywords (if, def, try, lambda, etc.) and identifiers
//! - Literals (int, float, string, f-string), including string prefixes and triple quotes
//! - Operators and punctuation (`**=`, `//`, `->`, `;`, etc.)
//! - Indentation-based blocks (INDENT/DEDENT tokens)
//! - Implicit line continuation inside brackets and explicit continuation with a trailing `\`
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token, FStringPart)
//! - `strings` - String/f-string scanning
//! - `numbers` - Numeric literal scanning
//! - `indent` - INDENT/DEDENT handling

mod indent;
mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{FStringPart, Token, TokenKind, keyword_id};

use crate::ast::Span;
use crate::diagnostics::CompileError;
use strings::StringPrefix;
use testmynb_core::lang::operators::OperatorId;
use testmynb_core::lang::punctuation::PunctuationId;

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// Lexer state diagram (simplified):
//
// [Start of line] → measure indent → [Inside code]
//                                       ↓
//                                      see '(' → [bracket_depth++]
//                                       ↓
//                                      see '\n' → skip (inside brackets)
//                                       ↓
//                                      see ')' → [bracket_depth--]
// ============================================================================

/// Lexer for cell source code.
///
/// Converts source text into a stream of tokens, handling:
/// - Keywords and identifiers
/// - Numeric and string literals (including f-strings and raw strings)
/// - Operators and punctuation
/// - Python-style indentation (INDENT/DEDENT tokens)
/// - Implicit line continuation inside brackets
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    indent_stack: Vec<usize>,
    pending_dedents: usize,
    at_line_start: bool,
    /// Bracket depth for implicit line continuation (parens, brackets, braces)
    bracket_depth: usize,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            indent_stack: vec![0],
            pending_dedents: 0,
            at_line_start: true,
            bracket_depth: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// Returns a vector of tokens on success, or a vector of errors on failure.
    /// The token stream always ends with an `Eof` token, and the last logical line is always terminated by
    /// a `Newline` even when the source has no trailing newline.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<CompileError>> {
        while !self.is_at_end() {
            self.scan_token();
        }

        if self.bracket_depth > 0 {
            self.errors.push(CompileError::syntax(
                "unexpected end of input: bracket was never closed".to_string(),
                Span::new(self.current_pos, self.current_pos),
            ));
        }

        let ends_logical_line = matches!(
            self.tokens.last().map(|t| &t.kind),
            None | Some(TokenKind::Newline) | Some(TokenKind::Dedent) | Some(TokenKind::Indent)
        );
        if !ends_logical_line {
            self.tokens.push(Token::new(
                TokenKind::Newline,
                Span::new(self.current_pos, self.current_pos),
            ));
        }

        // Emit remaining dedents at EOF
        self.pending_dedents = 0;
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.tokens.push(Token::new(
                TokenKind::Dedent,
                Span::new(self.current_pos, self.current_pos),
            ));
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(self.current_pos, self.current_pos),
        ));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none() && self.pending_dedents == 0
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        self.peek_nth(1)
    }

    /// Look `n` scalars past the current one without consuming anything (`peek_nth(0)` is `peek`).
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.current_pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        // Handle pending dedents first
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            self.tokens.push(Token::new(
                TokenKind::Dedent,
                Span::new(self.current_pos, self.current_pos),
            ));
            return;
        }

        // Handle indentation at line start
        if self.at_line_start {
            self.handle_indentation();
            return;
        }

        // Skip whitespace (but not newlines)
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\x0c' {
                self.advance();
            } else {
                break;
            }
        }

        let start = self.current_pos;

        let Some(c) = self.advance() else {
            return;
        };

        match c {
            // Comments
            '#' => {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            }

            // Newlines
            '\n' => {
                // Implicit line continuation: skip newlines inside brackets
                if self.bracket_depth > 0 {
                    return;
                }
                let last_is_layout = matches!(
                    self.tokens.last().map(|t| &t.kind),
                    None | Some(TokenKind::Newline)
                );
                if !last_is_layout {
                    self.tokens
                        .push(Token::new(TokenKind::Newline, Span::new(start, self.current_pos)));
                }
                self.at_line_start = true;
            }

            // Skip carriage return
            '\r' => {}

            // Explicit line continuation
            '\\' => {
                if self.peek() == Some('\r') {
                    self.advance();
                }
                if !self.match_char('\n') {
                    self.errors.push(CompileError::syntax(
                        "unexpected character after line continuation character".to_string(),
                        Span::new(start, self.current_pos),
                    ));
                }
            }

            // Operators and punctuation
            '+' => self.operator(start, OperatorId::Plus, &[('=', OperatorId::PlusEq)]),
            '-' => {
                if self.match_char('>') {
                    self.add_punct(PunctuationId::Arrow, start);
                } else if self.match_char('=') {
                    self.add_op(OperatorId::MinusEq, start);
                } else {
                    self.add_op(OperatorId::Minus, start);
                }
            }
            '*' => {
                if self.match_char('*') {
                    if self.match_char('=') {
                        self.add_op(OperatorId::StarStarEq, start);
                    } else {
                        self.add_op(OperatorId::StarStar, start);
                    }
                } else if self.match_char('=') {
                    self.add_op(OperatorId::StarEq, start);
                } else {
                    self.add_op(OperatorId::Star, start);
                }
            }
            '/' => self.scan_slash(start),
            '%' => self.operator(start, OperatorId::Percent, &[('=', OperatorId::PercentEq)]),
            ',' => self.add_punct(PunctuationId::Comma, start),
            ';' => self.add_punct(PunctuationId::Semicolon, start),
            ':' => self.add_punct(PunctuationId::Colon, start),
            '(' => self.open_bracket(PunctuationId::LParen, start),
            ')' => self.close_bracket(PunctuationId::RParen, start),
            '[' => self.open_bracket(PunctuationId::LBracket, start),
            ']' => self.close_bracket(PunctuationId::RBracket, start),
            '{' => self.open_bracket(PunctuationId::LBrace, start),
            '}' => self.close_bracket(PunctuationId::RBrace, start),
            '=' => self.operator(start, OperatorId::Eq, &[('=', OperatorId::EqEq)]),
            '!' => {
                if self.match_char('=') {
                    self.add_op(OperatorId::NotEq, start);
                } else {
                    self.errors.push(CompileError::syntax(
                        "invalid syntax: unexpected character '!'".to_string(),
                        Span::new(start, self.current_pos),
                    ));
                }
            }
            '<' => self.operator(start, OperatorId::Lt, &[('=', OperatorId::LtEq)]),
            '>' => self.operator(start, OperatorId::Gt, &[('=', OperatorId::GtEq)]),
            '.' => {
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number(start, '.');
                } else {
                    self.add_punct(PunctuationId::Dot, start);
                }
            }

            // Strings
            '"' | '\'' => self.scan_string(start, c, StringPrefix::default()),

            // Numbers
            '0'..='9' => self.scan_number(start, c),

            // Identifiers, keywords and prefixed strings (f"", r'', ...)
            _ if is_ident_start(c) => self.scan_identifier(start),

            _ => {
                self.errors.push(CompileError::syntax(
                    format!("invalid character '{}' (U+{:04X})", c, c as u32),
                    Span::new(start, self.current_pos),
                ));
            }
        }
    }

    // ========================================================================
    // Operator helpers
    // ========================================================================

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, Span::new(start, self.current_pos)));
    }

    fn add_op(&mut self, id: OperatorId, start: usize) {
        self.add_token(TokenKind::Operator(id), start);
    }

    fn add_punct(&mut self, id: PunctuationId, start: usize) {
        self.add_token(TokenKind::Punctuation(id), start);
    }

    /// Try to match compound operator, fallback to simple.
    fn operator(&mut self, start: usize, simple: OperatorId, compounds: &[(char, OperatorId)]) {
        for (c, id) in compounds {
            if self.match_char(*c) {
                self.add_op(*id, start);
                return;
            }
        }
        self.add_op(simple, start);
    }

    /// Scan slash operators: `/`, `/=`, `//`, `//=`.
    fn scan_slash(&mut self, start: usize) {
        if self.match_char('/') {
            if self.match_char('=') {
                self.add_op(OperatorId::SlashSlashEq, start);
            } else {
                self.add_op(OperatorId::SlashSlash, start);
            }
        } else if self.match_char('=') {
            self.add_op(OperatorId::SlashEq, start);
        } else {
            self.add_op(OperatorId::Slash, start);
        }
    }

    /// Emit a bracket token and track bracket depth.
    fn open_bracket(&mut self, kind: PunctuationId, start: usize) {
        self.bracket_depth += 1;
        self.add_punct(kind, start);
    }

    /// Emit a closing bracket token and decrement bracket depth.
    /// Produces an error if there's no matching opening bracket.
    fn close_bracket(&mut self, kind: PunctuationId, start: usize) {
        if self.bracket_depth == 0 {
            self.errors.push(CompileError::syntax(
                "unmatched closing bracket".to_string(),
                Span::new(start, self.current_pos),
            ));
        } else {
            self.bracket_depth -= 1;
        }
        self.add_punct(kind, start);
    }

    // ========================================================================
    // Identifier scanning
    // ========================================================================

    fn scan_identifier(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }

        let source = self.source;
        let spelling = &source[start..self.current_pos];

        // A short run of prefix letters directly followed by a quote starts a string literal.
        if let Some(quote) = self.peek().filter(|c| *c == '"' || *c == '\'') {
            if let Some(prefix) = StringPrefix::parse(spelling) {
                self.advance();
                self.scan_string(start, quote, prefix);
                return;
            }
        }

        if let Some(id) = keyword_id(spelling) {
            self.add_token(TokenKind::Keyword(id), start);
        } else {
            self.add_token(TokenKind::Ident(spelling.to_string()), start);
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Convenience function to lex a source string.
///
/// This is a shorthand for `Lexer::new(source).tokenize()`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    Lexer::new(source).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use testmynb_core::lang::keywords::KeywordId;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        let tokens = lex("def lambda assert try except").unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::Keyword(KeywordId::Def)));
        assert!(matches!(tokens[1].kind, TokenKind::Keyword(KeywordId::Lambda)));
        assert!(matches!(tokens[2].kind, TokenKind::Keyword(KeywordId::Assert)));
        assert!(matches!(tokens[3].kind, TokenKind::Keyword(KeywordId::Try)));
        assert!(matches!(tokens[4].kind, TokenKind::Keyword(KeywordId::Except)));
    }

    #[test]
    fn test_operators() {
        let tokens = lex("+ - * / // ** -> == != **= //=").unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::Operator(OperatorId::Plus)));
        assert!(matches!(tokens[1].kind, TokenKind::Operator(OperatorId::Minus)));
        assert!(matches!(tokens[2].kind, TokenKind::Operator(OperatorId::Star)));
        assert!(matches!(tokens[3].kind, TokenKind::Operator(OperatorId::Slash)));
        assert!(matches!(tokens[4].kind, TokenKind::Operator(OperatorId::SlashSlash)));
        assert!(matches!(tokens[5].kind, TokenKind::Operator(OperatorId::StarStar)));
        assert!(matches!(tokens[6].kind, TokenKind::Punctuation(PunctuationId::Arrow)));
        assert!(matches!(tokens[7].kind, TokenKind::Operator(OperatorId::EqEq)));
        assert!(matches!(tokens[8].kind, TokenKind::Operator(OperatorId::NotEq)));
        assert!(matches!(tokens[9].kind, TokenKind::Operator(OperatorId::StarStarEq)));
        assert!(matches!(tokens[10].kind, TokenKind::Operator(OperatorId::SlashSlashEq)));
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_numbers() {
        let tokens = lex("42 3.14 1_000_000 1e10 .5 0x1F 0o17 0b101 7.").unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::Int(42)));
        assert!(matches!(tokens[1].kind, TokenKind::Float(f) if (f - 3.14).abs() < 0.001));
        assert!(matches!(tokens[2].kind, TokenKind::Int(1000000)));
        assert!(matches!(tokens[3].kind, TokenKind::Float(_)));
        assert!(matches!(tokens[4].kind, TokenKind::Float(f) if f == 0.5));
        assert!(matches!(tokens[5].kind, TokenKind::Int(31)));
        assert!(matches!(tokens[6].kind, TokenKind::Int(15)));
        assert!(matches!(tokens[7].kind, TokenKind::Int(5)));
        assert!(matches!(tokens[8].kind, TokenKind::Float(f) if f == 7.0));
    }

    #[test]
    fn test_wide_integer_literals() {
        let tokens = lex("9223372036854775807 9223372036854775808 0xFFFF_FFFF_FFFF_FFFF_FF 1_0000000000000000000").unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::Int(i64::MAX)));
        assert!(matches!(&tokens[1].kind, TokenKind::BigInt { digits, radix: 10 } if digits == "9223372036854775808"));
        assert!(matches!(&tokens[2].kind, TokenKind::BigInt { digits, radix: 16 } if digits == "FFFFFFFFFFFFFFFFFF"));
        assert!(matches!(&tokens[3].kind, TokenKind::BigInt { digits, radix: 10 } if digits == "10000000000000000000"));

        let errors = lex("0b102").unwrap_err();
        assert_eq!(errors[0].message, "invalid binary literal");
        let errors = lex("0x").unwrap_err();
        assert_eq!(errors[0].message, "invalid hexadecimal literal");
    }

    #[test]
    fn test_strings_and_prefixes() {
        let tokens = lex(r#""hello" 'world' r'a\nb' '''x
y'''"#)
        .unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::String(s) if s == "hello"));
        assert!(matches!(&tokens[1].kind, TokenKind::String(s) if s == "world"));
        assert!(matches!(&tokens[2].kind, TokenKind::String(s) if s == "a\\nb"));
        assert!(matches!(&tokens[3].kind, TokenKind::String(s) if s == "x\ny"));
    }

    #[test]
    fn test_fstring_parts() {
        let tokens = lex(r#"f"Hello {name!r:>10} {{ok}}""#).unwrap();
        match &tokens[0].kind {
            TokenKind::FString(parts) => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(&parts[0], FStringPart::Literal(s) if s == "Hello "));
                assert_eq!(
                    parts[1],
                    FStringPart::Expr {
                        source: "name".to_string(),
                        conversion: Some('r'),
                        format_spec: Some(">10".to_string()),
                    }
                );
                assert!(matches!(&parts[2], FStringPart::Literal(s) if s == " {ok}"));
            }
            other => panic!("Expected FString token, got {other:?}"),
        }
    }

    #[test]
    fn test_semicolons_and_continuation() {
        let k = kinds("x = 1; y = \\\n  2\n");
        assert_eq!(k.iter().filter(|k| matches!(k, TokenKind::Newline)).count(), 1);
        assert!(k.contains(&TokenKind::Punctuation(PunctuationId::Semicolon)));
        assert!(!k.contains(&TokenKind::Indent));
    }

    #[test]
    fn test_indentation() {
        let source = "def foo():\n    x = 1\n    y = 2\nx = 3";
        let tokens = lex(source).unwrap();

        let indent_count = tokens.iter().filter(|t| matches!(t.kind, TokenKind::Indent)).count();
        let dedent_count = tokens.iter().filter(|t| matches!(t.kind, TokenKind::Dedent)).count();

        assert_eq!(indent_count, 1, "Should have 1 INDENT token");
        assert_eq!(dedent_count, 1, "Should have 1 DEDENT token");
    }

    #[test]
    fn test_multiple_dedents() {
        let source = "def foo():\n  if True:\n    x = 1\ny = 2";
        let tokens = lex(source).unwrap();

        let indent_count = tokens.iter().filter(|t| matches!(t.kind, TokenKind::Indent)).count();
        let dedent_count = tokens.iter().filter(|t| matches!(t.kind, TokenKind::Dedent)).count();

        assert_eq!(indent_count, 2, "Should have 2 INDENT tokens");
        assert_eq!(dedent_count, 2, "Should have 2 DEDENT tokens");
    }

    #[test]
    fn test_dedent_to_unknown_level_is_error() {
        let errors = lex("if x:\n    a = 1\n  b = 2\n").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unindent does not match"));
    }

    #[test]
    fn test_newlines_inside_brackets() {
        let source = "foo(\n  x,\n  y\n)";
        let tokens = lex(source).unwrap();

        let newline_count = tokens.iter().filter(|t| matches!(t.kind, TokenKind::Newline)).count();
        assert_eq!(newline_count, 1, "Only the synthetic end-of-line Newline");
    }

    #[test]
    fn test_missing_trailing_newline_is_synthesized() {
        let k = kinds("assert x");
        assert_eq!(k[k.len() - 2], TokenKind::Newline);
        assert_eq!(k[k.len() - 1], TokenKind::Eof);
    }

    #[test]
    fn test_unmatched_closing_bracket() {
        let result = lex(")");
        assert!(result.is_err(), "Unmatched ) should produce an error");
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unmatched closing bracket"));
    }

    #[test]
    fn test_unclosed_bracket_at_eof() {
        let errors = lex("print(1").unwrap_err();
        assert!(errors[0].message.contains("never closed"));
    }

    #[test]
    fn test_unterminated_string() {
        let errors = lex("x = 'abc\n").unwrap_err();
        assert!(errors[0].message.contains("unterminated string literal"));
    }
}
