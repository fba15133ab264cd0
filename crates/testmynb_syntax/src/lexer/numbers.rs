//! Number scanning for the cell lexer
//!
//! Handles integer literals (decimal, hex, octal, binary) and floating-point literals. Integer literals wider than
//! 64 bits become [`TokenKind::BigInt`].

use super::Lexer;
use super::tokens::TokenKind;
use crate::ast::Span;
use crate::diagnostics::CompileError;

impl<'a> Lexer<'a> {
    /// Scan a numeric literal whose first character (a digit or a leading `.`) was already consumed.
    pub(super) fn scan_number(&mut self, start: usize, first: char) {
        if first == '0' {
            let radix = match self.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.scan_radix_int(start, radix);
                return;
            }
        }

        let mut value = String::from(first);
        let mut is_float = first == '.';

        // Integer part (or the fraction, for `.5`)
        self.push_digits(&mut value);

        // Decimal part
        if !is_float && self.peek() == Some('.') {
            // `1.5` and `1.` are floats; `1.real` is left for the parser to reject.
            let next = self.peek_next();
            if !next.is_some_and(|c| super::is_ident_start(c) && c != 'e' && c != 'E') {
                is_float = true;
                value.push('.');
                self.advance();
                self.push_digits(&mut value);
            }
        }

        // Exponent part
        if matches!(self.peek(), Some('e' | 'E')) {
            let after = self.peek_next();
            let signed_digit = matches!(after, Some('+' | '-')) && self.peek_nth(2).is_some_and(|c| c.is_ascii_digit());
            if after.is_some_and(|c| c.is_ascii_digit()) || signed_digit {
                is_float = true;
                value.push('e');
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    value.push(sign);
                    self.advance();
                }
                self.push_digits(&mut value);
            }
        }

        if matches!(self.peek(), Some('j' | 'J')) {
            self.advance();
            self.errors.push(CompileError::syntax(
                "complex literals are not supported".to_string(),
                Span::new(start, self.current_pos),
            ));
            return;
        }

        if self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                self.advance();
            }
            self.errors.push(CompileError::syntax(
                "invalid decimal literal".to_string(),
                Span::new(start, self.current_pos),
            ));
            return;
        }

        if is_float {
            match value.parse::<f64>() {
                Ok(f) => self.add_token(TokenKind::Float(f), start),
                Err(_) => {
                    self.errors.push(CompileError::syntax(
                        format!("invalid float literal: {}", value),
                        Span::new(start, self.current_pos),
                    ));
                }
            }
        } else {
            // Only ASCII digits reach here, so a failed parse means the value is wider than 64 bits.
            match value.parse::<i64>() {
                Ok(i) => self.add_token(TokenKind::Int(i), start),
                Err(_) => self.add_token(TokenKind::BigInt { digits: value, radix: 10 }, start),
            }
        }
    }

    /// Append decimal digits, dropping `_` separators.
    fn push_digits(&mut self, value: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                if c != '_' {
                    value.push(c);
                }
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Scan the digits of a `0x` / `0o` / `0b` literal (prefix already consumed).
    fn scan_radix_int(&mut self, start: usize, radix: u32) {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c == '_' {
                self.advance();
            } else if c.is_ascii_alphanumeric() {
                digits.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            let base = match radix {
                16 => "hexadecimal",
                8 => "octal",
                _ => "binary",
            };
            self.errors.push(CompileError::syntax(
                format!("invalid {base} literal"),
                Span::new(start, self.current_pos),
            ));
            return;
        }
        match i64::from_str_radix(&digits, radix) {
            Ok(i) => self.add_token(TokenKind::Int(i), start),
            Err(_) => self.add_token(TokenKind::BigInt { digits, radix }, start),
        }
    }
}
