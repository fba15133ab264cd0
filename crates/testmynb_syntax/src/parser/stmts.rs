/// Statement parsing methods.
///
/// This chunk parses compound statements (`if`, `while`, `for`, `try`), simple statements
/// (assignments, `assert`, `raise`, `del`, `global`, imports) and indentation-based suites.
///
/// ## Notes
/// - Block parsing relies on `Indent` / `Dedent` layout tokens produced by the lexer.
/// - A logical line may hold several simple statements separated by `;`, so statement parsing
///   returns a `Vec`.
impl<'a> Parser<'a> {
    // ========================================================================
    // Statements
    // ========================================================================

    fn block(&mut self) -> Result<Block, CompileError> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.check(&TokenKind::Dedent) && !self.is_at_end() {
            stmts.extend(self.statement()?);
            self.skip_newlines();
        }
        Ok(stmts)
    }

    /// Parse the body that follows a compound statement's `:`.
    ///
    /// Either an indented block on the following lines, or simple statements on the same line.
    fn suite(&mut self, owner: &str) -> Result<Block, CompileError> {
        if self.match_token(&TokenKind::Newline) {
            if !self.check(&TokenKind::Indent) {
                return Err(CompileError::indentation(
                    format!("expected an indented block after {owner}"),
                    self.current_span(),
                ));
            }
            self.advance();
            let body = self.block()?;
            self.expect(&TokenKind::Dedent, "expected dedent after block")?;
            Ok(body)
        } else {
            self.simple_statements()
        }
    }

    fn statement(&mut self) -> Result<Vec<Spanned<Statement>>, CompileError> {
        if self.check(&TokenKind::Indent) {
            return Err(CompileError::indentation(
                "unexpected indent".to_string(),
                self.current_span(),
            ));
        }
        if self.peek().kind.is_unsupported_keyword() {
            return Err(self.unsupported_keyword());
        }

        let start = self.current_span().start;
        let stmt = if self.check_keyword(KeywordId::If) {
            self.if_stmt()?
        } else if self.check_keyword(KeywordId::While) {
            self.while_stmt()?
        } else if self.check_keyword(KeywordId::For) {
            self.for_stmt()?
        } else if self.check_keyword(KeywordId::Try) {
            self.try_stmt()?
        } else if self.check_keyword(KeywordId::Def) {
            self.function_def()?
        } else {
            return self.simple_statements();
        };

        Ok(vec![Spanned::new(stmt, Span::new(start, self.previous_end()))])
    }

    /// Parse `small_stmt (';' small_stmt)* [';'] NEWLINE`.
    fn simple_statements(&mut self) -> Result<Vec<Spanned<Statement>>, CompileError> {
        let mut stmts = vec![self.small_statement()?];
        while self.match_punct(PunctuationId::Semicolon) {
            if matches!(self.peek().kind, TokenKind::Newline | TokenKind::Eof) {
                break;
            }
            stmts.push(self.small_statement()?);
        }
        if !self.is_at_end() {
            self.expect(&TokenKind::Newline, "invalid syntax")?;
        }
        Ok(stmts)
    }

    fn small_statement(&mut self) -> Result<Spanned<Statement>, CompileError> {
        if self.peek().kind.is_unsupported_keyword() {
            return Err(self.unsupported_keyword());
        }

        let start = self.current_span().start;
        let stmt = match self.peek().kind.keyword_id() {
            Some(KeywordId::Pass) => {
                self.advance();
                Statement::Pass
            }
            Some(KeywordId::Break) => {
                self.advance();
                Statement::Break
            }
            Some(KeywordId::Continue) => {
                self.advance();
                Statement::Continue
            }
            Some(KeywordId::Return) => self.return_stmt()?,
            Some(KeywordId::Raise) => self.raise_stmt()?,
            Some(KeywordId::Assert) => self.assert_stmt()?,
            Some(KeywordId::Del) => self.del_stmt()?,
            Some(KeywordId::Global) => {
                self.advance();
                Statement::Global(self.identifier_list()?)
            }
            Some(KeywordId::Import) => self.import_stmt()?,
            Some(KeywordId::From) => self.from_import_stmt()?,
            Some(
                KeywordId::If
                | KeywordId::Elif
                | KeywordId::Else
                | KeywordId::While
                | KeywordId::For
                | KeywordId::Try
                | KeywordId::Except
                | KeywordId::Finally
                | KeywordId::Def,
            ) => return Err(self.error_here("invalid syntax")),
            _ => self.expr_statement()?,
        };

        Ok(Spanned::new(stmt, Span::new(start, self.previous_end())))
    }

    fn return_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Return, "expected 'return'")?;
        let value = if self.is_at_statement_end() {
            None
        } else {
            Some(self.expr_list()?)
        };
        Ok(Statement::Return(value))
    }

    /// `raise [expr [from expr]]`. The `from` cause is parsed but not recorded.
    fn raise_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Raise, "expected 'raise'")?;
        if self.is_at_statement_end() {
            return Ok(Statement::Raise(None));
        }
        let exc = self.expression()?;
        if self.match_keyword(KeywordId::From) {
            self.expression()?;
        }
        Ok(Statement::Raise(Some(exc)))
    }

    fn assert_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Assert, "expected 'assert'")?;
        let test = self.expression()?;
        let msg = if self.match_punct(PunctuationId::Comma) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Statement::Assert(AssertStmt { test, msg }))
    }

    fn del_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Del, "expected 'del'")?;
        let mut targets = Vec::new();
        loop {
            let expr = self.expression()?;
            let span = expr.span;
            match Self::expr_to_target(expr) {
                Ok(target) => targets.push(target),
                Err(e) => {
                    return Err(CompileError::syntax(e.message.replace("assign to", "delete"), span));
                }
            }
            if !self.match_punct(PunctuationId::Comma) || self.is_at_statement_end() {
                break;
            }
        }
        Ok(Statement::Del(targets))
    }

    /// Expression statements and the three assignment forms.
    ///
    /// ```text
    /// a = b = expr        # Assign, two targets
    /// x, y = pair         # Assign, tuple target
    /// total += n          # AugAssign
    /// count: int = 0      # AnnAssign
    /// ```
    fn expr_statement(&mut self) -> Result<Statement, CompileError> {
        let first = self.expr_list()?;

        // Annotated assignment
        if self.match_punct(PunctuationId::Colon) {
            if matches!(first.node, Expr::Tuple(_)) {
                return Err(CompileError::syntax(
                    "only single target (not tuple) can be annotated".to_string(),
                    first.span,
                ));
            }
            let target = Self::expr_to_target(first)?;
            let annotation = self.expression()?;
            let value = if self.match_op(OperatorId::Eq) {
                Some(self.expr_list()?)
            } else {
                None
            };
            return Ok(Statement::AnnAssign(AnnAssignStmt {
                target,
                annotation,
                value,
            }));
        }

        // Augmented assignment
        let aug_op = self
            .peek()
            .operator_id()
            .filter(|id| operators::augmented_base(*id).is_some())
            .and_then(BinaryOp::from_operator);
        if let Some(op) = aug_op {
            self.advance();
            if matches!(first.node, Expr::Tuple(_) | Expr::List(_)) {
                return Err(CompileError::syntax(
                    format!("'{}' is an illegal expression for augmented assignment", expr_description(&first.node)),
                    first.span,
                ));
            }
            let target = Self::expr_to_target(first)?;
            let value = self.expr_list()?;
            return Ok(Statement::AugAssign(AugAssignStmt { target, op, value }));
        }

        // Plain (possibly chained) assignment
        if self.check_op(OperatorId::Eq) {
            let mut exprs = vec![first];
            while self.match_op(OperatorId::Eq) {
                exprs.push(self.expr_list()?);
            }
            let value = exprs.pop().ok_or_else(|| self.error_here("invalid syntax"))?;
            let targets = exprs
                .into_iter()
                .map(Self::expr_to_target)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Statement::Assign(AssignStmt { targets, value }));
        }

        Ok(Statement::Expr(first))
    }

    fn if_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::If, "expected 'if'")?;
        let condition = self.expression()?;
        self.expect_punct(PunctuationId::Colon, "expected ':' after if condition")?;
        let then_body = self.suite("'if' statement")?;

        let mut elif_branches = vec![];
        while self.match_keyword(KeywordId::Elif) {
            let elif_condition = self.expression()?;
            self.expect_punct(PunctuationId::Colon, "expected ':' after elif condition")?;
            let elif_body = self.suite("'elif' statement")?;
            elif_branches.push((elif_condition, elif_body));
        }

        let else_body = self.else_clause()?;

        Ok(Statement::If(IfStmt {
            condition,
            then_body,
            elif_branches,
            else_body,
        }))
    }

    fn else_clause(&mut self) -> Result<Option<Block>, CompileError> {
        if self.match_keyword(KeywordId::Else) {
            self.expect_punct(PunctuationId::Colon, "expected ':' after else")?;
            Ok(Some(self.suite("'else' statement")?))
        } else {
            Ok(None)
        }
    }

    fn while_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::While, "expected 'while'")?;
        let condition = self.expression()?;
        self.expect_punct(PunctuationId::Colon, "expected ':' after while condition")?;
        let body = self.suite("'while' statement")?;
        let else_body = self.else_clause()?;

        Ok(Statement::While(WhileStmt {
            condition,
            body,
            else_body,
        }))
    }

    fn for_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::For, "expected 'for'")?;
        let target = self.target_list()?;
        self.expect_keyword(KeywordId::In, "expected 'in' after for target")?;
        let iter = self.expr_list()?;
        self.expect_punct(PunctuationId::Colon, "expected ':' after for expression")?;
        let body = self.suite("'for' statement")?;
        let else_body = self.else_clause()?;

        Ok(Statement::For(ForStmt {
            target,
            iter,
            body,
            else_body,
        }))
    }

    fn try_stmt(&mut self) -> Result<Statement, CompileError> {
        let try_span = self.current_span();
        self.expect_keyword(KeywordId::Try, "expected 'try'")?;
        self.expect_punct(PunctuationId::Colon, "expected ':' after try")?;
        let body = self.suite("'try' statement")?;

        let mut handlers = Vec::new();
        while self.check_keyword(KeywordId::Except) {
            let start = self.current_span().start;
            self.advance();
            let kind = if self.check_punct(PunctuationId::Colon) {
                None
            } else {
                Some(self.expression()?)
            };
            let name = if self.match_keyword(KeywordId::As) {
                Some(self.identifier()?)
            } else {
                None
            };
            self.expect_punct(PunctuationId::Colon, "expected ':' after except clause")?;
            let handler_body = self.suite("'except' statement")?;
            handlers.push(Spanned::new(
                ExceptHandler {
                    kind,
                    name,
                    body: handler_body,
                },
                Span::new(start, self.previous_end()),
            ));
        }

        let else_body = if handlers.is_empty() { None } else { self.else_clause()? };

        let finally_body = if self.match_keyword(KeywordId::Finally) {
            self.expect_punct(PunctuationId::Colon, "expected ':' after finally")?;
            Some(self.suite("'finally' statement")?)
        } else {
            None
        };

        if handlers.is_empty() && finally_body.is_none() {
            return Err(CompileError::syntax(
                "expected 'except' or 'finally' block".to_string(),
                try_span,
            ));
        }

        Ok(Statement::Try(TryStmt {
            body,
            handlers,
            else_body,
            finally_body,
        }))
    }

    // ------------------------------------------------------------------------
    // Assignment targets
    // ------------------------------------------------------------------------

    /// Parse the target of a `for` loop or comprehension (stops before `in`).
    fn target_list(&mut self) -> Result<Spanned<Target>, CompileError> {
        let first = self.additive()?;
        if !self.check_punct(PunctuationId::Comma) {
            return Self::expr_to_target(first);
        }
        let start = first.span.start;
        let mut items = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if self.check_keyword(KeywordId::In) {
                break;
            }
            items.push(self.additive()?);
        }
        let span = Span::new(start, self.previous_end());
        Self::expr_to_target(Spanned::new(Expr::Tuple(items), span))
    }

    /// Convert a parsed expression into an assignment target.
    fn expr_to_target(expr: Spanned<Expr>) -> Result<Spanned<Target>, CompileError> {
        let span = expr.span;
        let target = match expr.node {
            Expr::Ident(name) => Target::Name(name),
            Expr::Field(obj, name) => Target::Attribute(obj, name),
            Expr::Index(obj, index) => Target::Index(obj, index),
            Expr::Slice(obj, slice) => Target::Slice(obj, slice),
            Expr::Tuple(items) | Expr::List(items) => Target::Tuple(
                items
                    .into_iter()
                    .map(Self::expr_to_target)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Expr::Paren(inner) => return Self::expr_to_target(*inner),
            other => {
                return Err(CompileError::syntax(
                    format!("cannot assign to {}", expr_description(&other)),
                    span,
                ));
            }
        };
        Ok(Spanned::new(target, span))
    }
}
