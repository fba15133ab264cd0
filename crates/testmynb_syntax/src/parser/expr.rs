/// Expression parsing methods.
///
/// This chunk implements the expression grammar using a precedence ladder:
/// `lambda` / conditional → `or` → `and` → `not` → comparison → additive → multiplicative → unary →
/// power → postfix → primary.
///
/// ## Notes
/// - Operator identities are carried by [`TokenKind::Operator`] / [`OperatorId`] rather than string spellings.
/// - Comparisons keep their chain (`a < b <= c`) in a single [`Expr::Compare`] node.
/// - Generator expressions are parsed as list comprehensions.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    /// `lambda` | `or_expr ['if' or_expr 'else' expression]`
    fn expression(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.current_span().start;

        if self.match_keyword(KeywordId::Lambda) {
            let params = self.params(true)?;
            self.expect_punct(PunctuationId::Colon, "expected ':' after lambda parameters")?;
            let body = self.expression()?;
            let span = Span::new(start, body.span.end);
            return Ok(Spanned::new(Expr::Lambda(params, Box::new(body)), span));
        }

        let then_expr = self.or_expr()?;
        if !self.match_keyword(KeywordId::If) {
            return Ok(then_expr);
        }
        let condition = self.or_expr()?;
        self.expect_keyword(KeywordId::Else, "expected 'else' after 'if' expression")?;
        let else_expr = self.expression()?;
        let span = Span::new(start, else_expr.span.end);
        Ok(Spanned::new(
            Expr::IfExp(Box::new(IfExpr {
                condition,
                then_expr,
                else_expr,
            })),
            span,
        ))
    }

    /// A comma-separated expression list; more than one item (or a trailing comma) makes a tuple.
    fn expr_list(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let first = self.expression()?;
        if !self.check_punct(PunctuationId::Comma) {
            return Ok(first);
        }
        let start = first.span.start;
        let mut items = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if !self.is_at_expr_start() {
                break;
            }
            items.push(self.expression()?);
        }
        let span = Span::new(start, self.previous_end());
        Ok(Spanned::new(Expr::Tuple(items), span))
    }

    fn or_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.and_expr()?;
        while self.match_keyword(KeywordId::Or) {
            let right = self.and_expr()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(Expr::Binary(Box::new(left), BinaryOp::Or, Box::new(right)), span);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.not_expr()?;
        while self.match_keyword(KeywordId::And) {
            let right = self.not_expr()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(Expr::Binary(Box::new(left), BinaryOp::And, Box::new(right)), span);
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        if self.match_keyword(KeywordId::Not) {
            let start = self.tokens[self.pos - 1].span.start;
            let expr = self.not_expr()?;
            let span = Span::new(start, expr.span.end);
            Ok(Spanned::new(Expr::Unary(UnaryOp::Not, Box::new(expr)), span))
        } else {
            self.comparison()
        }
    }

    fn comparison(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let left = self.additive()?;
        let mut chain = Vec::new();

        loop {
            let op = if self.match_op(OperatorId::EqEq) {
                CompareOp::Eq
            } else if self.match_op(OperatorId::NotEq) {
                CompareOp::NotEq
            } else if self.match_op(OperatorId::Lt) {
                CompareOp::Lt
            } else if self.match_op(OperatorId::Gt) {
                CompareOp::Gt
            } else if self.match_op(OperatorId::LtEq) {
                CompareOp::LtEq
            } else if self.match_op(OperatorId::GtEq) {
                CompareOp::GtEq
            } else if self.match_keyword(KeywordId::In) {
                CompareOp::In
            } else if self.check_keyword(KeywordId::Not) && self.peek_next().kind.is_keyword(KeywordId::In) {
                self.advance(); // not
                self.advance(); // in
                CompareOp::NotIn
            } else if self.match_keyword(KeywordId::Is) {
                if self.match_keyword(KeywordId::Not) {
                    CompareOp::IsNot
                } else {
                    CompareOp::Is
                }
            } else {
                break;
            };

            chain.push((op, self.additive()?));
        }

        if chain.is_empty() {
            return Ok(left);
        }
        let span = Span::new(left.span.start, self.previous_end());
        Ok(Spanned::new(Expr::Compare(Box::new(left), chain), span))
    }

    fn additive(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.multiplicative()?;

        loop {
            let op = if self.match_op(OperatorId::Plus) {
                BinaryOp::Add
            } else if self.match_op(OperatorId::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };

            let right = self.multiplicative()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span);
        }

        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.unary()?;

        loop {
            let op = if self.match_op(OperatorId::Star) {
                BinaryOp::Mul
            } else if self.match_op(OperatorId::SlashSlash) {
                BinaryOp::FloorDiv
            } else if self.match_op(OperatorId::Slash) {
                BinaryOp::Div
            } else if self.match_op(OperatorId::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };

            let right = self.unary()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span);
        }

        Ok(left)
    }

    /// Unary minus/plus bind looser than `**`: `-2 ** 2 == -4`.
    fn unary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let op = if self.match_op(OperatorId::Minus) {
            UnaryOp::Neg
        } else if self.match_op(OperatorId::Plus) {
            UnaryOp::Pos
        } else {
            return self.power();
        };
        let start = self.tokens[self.pos - 1].span.start;
        let expr = self.unary()?;
        let span = Span::new(start, expr.span.end);
        Ok(Spanned::new(Expr::Unary(op, Box::new(expr)), span))
    }

    fn power(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let base = self.postfix()?;

        // Right-associative: 2**3**2 = 2**(3**2)
        if self.match_op(OperatorId::StarStar) {
            let exponent = self.unary()?;
            let span = base.span.merge(exponent.span);
            return Ok(Spanned::new(
                Expr::Binary(Box::new(base), BinaryOp::Pow, Box::new(exponent)),
                span,
            ));
        }

        Ok(base)
    }

    fn postfix(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut expr = self.primary()?;

        loop {
            if self.match_punct(PunctuationId::Dot) {
                let name = self.identifier()?;
                if self.match_punct(PunctuationId::LParen) {
                    let args = self.call_args()?;
                    self.expect_punct(PunctuationId::RParen, "expected ')' after arguments")?;
                    let span = Span::new(expr.span.start, self.tokens[self.pos - 1].span.end);
                    expr = Spanned::new(Expr::MethodCall(Box::new(expr), name, args), span);
                } else {
                    let span = Span::new(expr.span.start, self.tokens[self.pos - 1].span.end);
                    expr = Spanned::new(Expr::Field(Box::new(expr), name), span);
                }
            } else if self.match_punct(PunctuationId::LBracket) {
                let result = self.index_or_slice()?;
                self.expect_punct(PunctuationId::RBracket, "expected ']' after index/slice")?;
                let span = Span::new(expr.span.start, self.tokens[self.pos - 1].span.end);
                expr = match result {
                    IndexOrSlice::Index(index) => Spanned::new(Expr::Index(Box::new(expr), Box::new(index)), span),
                    IndexOrSlice::Slice(slice) => Spanned::new(Expr::Slice(Box::new(expr), slice), span),
                };
            } else if self.match_punct(PunctuationId::LParen) {
                let args = self.call_args()?;
                self.expect_punct(PunctuationId::RParen, "expected ')' after arguments")?;
                let span = Span::new(expr.span.start, self.tokens[self.pos - 1].span.end);
                expr = Spanned::new(Expr::Call(Box::new(expr), args), span);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse index or slice expression inside brackets
    /// Handles: [expr], [a, b], [start:end], [start:end:step], [:end], [start:], [::step]
    fn index_or_slice(&mut self) -> Result<IndexOrSlice, CompileError> {
        if self.check_punct(PunctuationId::Colon) {
            return self.parse_slice(None);
        }

        if self.check_punct(PunctuationId::RBracket) {
            return Err(CompileError::syntax("invalid syntax: empty subscript".to_string(), self.current_span()));
        }

        let first = self.expression()?;

        if self.check_punct(PunctuationId::Colon) {
            return self.parse_slice(Some(first));
        }

        // `d[1, 2]` indexes with a tuple
        if self.check_punct(PunctuationId::Comma) {
            let start = first.span.start;
            let mut items = vec![first];
            while self.match_punct(PunctuationId::Comma) {
                if self.check_punct(PunctuationId::RBracket) {
                    break;
                }
                items.push(self.expression()?);
            }
            let span = Span::new(start, self.previous_end());
            return Ok(IndexOrSlice::Index(Spanned::new(Expr::Tuple(items), span)));
        }

        Ok(IndexOrSlice::Index(first))
    }

    /// Parse slice syntax after optional start expression
    fn parse_slice(&mut self, start: Option<Spanned<Expr>>) -> Result<IndexOrSlice, CompileError> {
        self.expect_punct(PunctuationId::Colon, "expected ':' in slice")?;

        let end = if !self.check_punct(PunctuationId::RBracket) && !self.check_punct(PunctuationId::Colon) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        let step = if self.match_punct(PunctuationId::Colon) {
            if !self.check_punct(PunctuationId::RBracket) {
                Some(Box::new(self.expression()?))
            } else {
                None
            }
        } else {
            None
        };

        Ok(IndexOrSlice::Slice(SliceExpr {
            start: start.map(Box::new),
            end,
            step,
        }))
    }

    fn primary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.current_span().start;

        if self.peek().kind.is_unsupported_keyword() {
            return Err(self.unsupported_keyword());
        }

        // Literals
        if let Some(lit) = self.try_literal() {
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Spanned::new(Expr::Literal(lit), Span::new(start, end)));
        }

        // Strings and f-strings (adjacent literals concatenate)
        if matches!(self.peek().kind, TokenKind::String(_) | TokenKind::FString(_)) {
            return self.string_atom(start);
        }

        // List literal or comprehension
        if self.match_punct(PunctuationId::LBracket) {
            return self.list_or_comp(start);
        }

        // Dict literal or comprehension
        if self.match_punct(PunctuationId::LBrace) {
            return self.dict_or_comp(start);
        }

        // Parenthesized expression, tuple, or generator expression
        if self.match_punct(PunctuationId::LParen) {
            return self.paren_or_tuple(start);
        }

        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Spanned::new(Expr::Ident(name), Span::new(start, end)));
        }

        Err(self.error_here("expected expression"))
    }

    fn try_literal(&mut self) -> Option<Literal> {
        match &self.peek().kind {
            TokenKind::Int(n) => {
                let n = *n;
                self.advance();
                Some(Literal::Int(n))
            }
            TokenKind::BigInt { digits, radix } => {
                let literal = Literal::BigInt {
                    digits: digits.clone(),
                    radix: *radix,
                };
                self.advance();
                Some(literal)
            }
            TokenKind::Float(f) => {
                let f = *f;
                self.advance();
                Some(Literal::Float(f))
            }
            TokenKind::Keyword(KeywordId::True) => {
                self.advance();
                Some(Literal::Bool(true))
            }
            TokenKind::Keyword(KeywordId::False) => {
                self.advance();
                Some(Literal::Bool(false))
            }
            TokenKind::Keyword(KeywordId::None) => {
                self.advance();
                Some(Literal::None)
            }
            _ => None,
        }
    }

    /// Concatenate a run of adjacent string and f-string tokens.
    ///
    /// The result is a plain string literal unless at least one piece is an f-string.
    fn string_atom(&mut self, start: usize) -> Result<Spanned<Expr>, CompileError> {
        let mut parts: Vec<FStringPart> = Vec::new();
        let mut formatted = false;

        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::String(s) => {
                    self.advance();
                    push_literal(&mut parts, s);
                }
                TokenKind::FString(lex_parts) => {
                    self.advance();
                    formatted = true;
                    for part in self.convert_fstring_parts(&lex_parts, token.span)? {
                        match part {
                            FStringPart::Literal(s) => push_literal(&mut parts, s),
                            expr => parts.push(expr),
                        }
                    }
                }
                _ => break,
            }
        }

        let span = Span::new(start, self.previous_end());
        if formatted {
            return Ok(Spanned::new(Expr::FString(parts), span));
        }
        let text = match parts.pop() {
            Some(FStringPart::Literal(s)) => s,
            _ => String::new(),
        };
        Ok(Spanned::new(Expr::Literal(Literal::String(text)), span))
    }

    fn convert_fstring_parts(&self, parts: &[LexFStringPart], fstring_span: Span) -> Result<Vec<FStringPart>, CompileError> {
        parts
            .iter()
            .map(|p| match p {
                LexFStringPart::Literal(s) => Ok(FStringPart::Literal(s.clone())),
                LexFStringPart::Expr {
                    source,
                    conversion,
                    format_spec,
                } => Ok(FStringPart::Expr {
                    expr: parse_fstring_expr(source, fstring_span)?,
                    conversion: *conversion,
                    format_spec: format_spec.clone(),
                }),
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Displays and comprehensions
    // ------------------------------------------------------------------------

    /// Parse one or more `for target in iter [if cond]...` clauses.
    fn comprehension_clauses(&mut self) -> Result<Vec<Comprehension>, CompileError> {
        let mut generators = Vec::new();
        while self.match_keyword(KeywordId::For) {
            let target = self.target_list()?;
            self.expect_keyword(KeywordId::In, "expected 'in' in comprehension")?;
            let iter = self.or_expr()?;
            let mut conditions = Vec::new();
            while self.match_keyword(KeywordId::If) {
                conditions.push(self.or_expr()?);
            }
            generators.push(Comprehension {
                target,
                iter,
                conditions,
            });
        }
        Ok(generators)
    }

    fn list_or_comp(&mut self, start: usize) -> Result<Spanned<Expr>, CompileError> {
        if self.match_punct(PunctuationId::RBracket) {
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Spanned::new(Expr::List(Vec::new()), Span::new(start, end)));
        }

        let first = self.expression()?;

        if self.check_keyword(KeywordId::For) {
            let generators = self.comprehension_clauses()?;
            self.expect_punct(PunctuationId::RBracket, "expected ']' after comprehension")?;
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Spanned::new(
                Expr::ListComp(Box::new(ListComp { expr: first, generators })),
                Span::new(start, end),
            ));
        }

        let mut elements = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if self.check_punct(PunctuationId::RBracket) {
                break;
            }
            elements.push(self.expression()?);
        }
        self.expect_punct(PunctuationId::RBracket, "expected ']' after list")?;
        let end = self.tokens[self.pos - 1].span.end;
        Ok(Spanned::new(Expr::List(elements), Span::new(start, end)))
    }

    fn dict_or_comp(&mut self, start: usize) -> Result<Spanned<Expr>, CompileError> {
        if self.match_punct(PunctuationId::RBrace) {
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Spanned::new(Expr::Dict(Vec::new()), Span::new(start, end)));
        }

        let first = self.expression()?;

        if !self.match_punct(PunctuationId::Colon) {
            return Err(CompileError::syntax(
                "set literals are not supported".to_string(),
                Span::new(start, first.span.end),
            ));
        }

        let first_value = self.expression()?;

        if self.check_keyword(KeywordId::For) {
            let generators = self.comprehension_clauses()?;
            self.expect_punct(PunctuationId::RBrace, "expected '}' after comprehension")?;
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Spanned::new(
                Expr::DictComp(Box::new(DictComp {
                    key: first,
                    value: first_value,
                    generators,
                })),
                Span::new(start, end),
            ));
        }

        let mut entries = vec![(first, first_value)];
        while self.match_punct(PunctuationId::Comma) {
            if self.check_punct(PunctuationId::RBrace) {
                break;
            }
            let key = self.expression()?;
            self.expect_punct(PunctuationId::Colon, "expected ':' in dict entry")?;
            let value = self.expression()?;
            entries.push((key, value));
        }
        self.expect_punct(PunctuationId::RBrace, "expected '}' after dict")?;
        let end = self.tokens[self.pos - 1].span.end;
        Ok(Spanned::new(Expr::Dict(entries), Span::new(start, end)))
    }

    fn paren_or_tuple(&mut self, start: usize) -> Result<Spanned<Expr>, CompileError> {
        if self.match_punct(PunctuationId::RParen) {
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Spanned::new(Expr::Tuple(Vec::new()), Span::new(start, end)));
        }

        let first = self.expression()?;

        // Generator expression, evaluated eagerly
        if self.check_keyword(KeywordId::For) {
            let generators = self.comprehension_clauses()?;
            self.expect_punct(PunctuationId::RParen, "expected ')' after generator expression")?;
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Spanned::new(
                Expr::ListComp(Box::new(ListComp { expr: first, generators })),
                Span::new(start, end),
            ));
        }

        if self.match_punct(PunctuationId::Comma) {
            let mut elements = vec![first];
            while !self.check_punct(PunctuationId::RParen) {
                elements.push(self.expression()?);
                if !self.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
            self.expect_punct(PunctuationId::RParen, "expected ')' after tuple")?;
            let end = self.tokens[self.pos - 1].span.end;
            return Ok(Spanned::new(Expr::Tuple(elements), Span::new(start, end)));
        }

        self.expect_punct(PunctuationId::RParen, "expected ')'")?;
        let end = self.tokens[self.pos - 1].span.end;
        Ok(Spanned::new(Expr::Paren(Box::new(first)), Span::new(start, end)))
    }

    fn call_args(&mut self) -> Result<Vec<CallArg>, CompileError> {
        let mut args = Vec::new();
        loop {
            // Allow trailing comma: check for ) at start of loop iteration
            if self.check_punct(PunctuationId::RParen) {
                break;
            }

            if self.match_op(OperatorId::StarStar) {
                args.push(CallArg::DoubleStar(self.expression()?));
            } else if self.match_op(OperatorId::Star) {
                args.push(CallArg::Star(self.expression()?));
            } else if matches!(self.peek().kind, TokenKind::Ident(_)) && self.peek_next().kind.is_operator(OperatorId::Eq) {
                let name = self.identifier()?;
                self.advance(); // consume =
                args.push(CallArg::Named(name, self.expression()?));
            } else {
                let expr = self.expression()?;
                // `sum(x for x in xs)`: a bare generator as the only argument
                if self.check_keyword(KeywordId::For) && args.is_empty() {
                    let start = expr.span.start;
                    let generators = self.comprehension_clauses()?;
                    let span = Span::new(start, self.previous_end());
                    args.push(CallArg::Positional(Spanned::new(
                        Expr::ListComp(Box::new(ListComp { expr, generators })),
                        span,
                    )));
                    break;
                }
                args.push(CallArg::Positional(expr));
            }

            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        Ok(args)
    }
}
