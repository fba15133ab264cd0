/// Definition and import parsing methods.
///
/// This chunk parses `def` statements, parameter lists (shared with `lambda`), and the two
/// import forms.
///
/// ## Notes
/// - Parameter and return annotations are parsed and discarded; the executor is untyped.
/// - The `/` and bare `*` parameter markers are accepted; parameters after them bind like
///   ordinary parameters.
impl<'a> Parser<'a> {
    // ========================================================================
    // Definitions
    // ========================================================================

    fn function_def(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Def, "expected 'def'")?;
        let name = self.identifier()?;
        self.expect_punct(PunctuationId::LParen, "expected '(' after function name")?;
        let params = self.params(false)?;
        self.expect_punct(PunctuationId::RParen, "expected ')' after parameters")?;

        if self.match_punct(PunctuationId::Arrow) {
            self.expression()?;
        }

        self.expect_punct(PunctuationId::Colon, "expected ':' after function signature")?;
        let body = self.suite("function definition")?;

        Ok(Statement::FunctionDef(FunctionDef { name, params, body }))
    }

    /// Parse a parameter list up to (not including) `)` for `def`, or `:` for `lambda`.
    fn params(&mut self, lambda: bool) -> Result<Vec<Spanned<Param>>, CompileError> {
        let mut params: Vec<Spanned<Param>> = Vec::new();
        let mut seen_default = false;
        let mut keyword_only = false;

        loop {
            let at_end = if lambda {
                self.check_punct(PunctuationId::Colon)
            } else {
                self.check_punct(PunctuationId::RParen)
            };
            if at_end {
                break;
            }

            let start = self.current_span().start;

            // Positional-only marker
            if self.match_op(OperatorId::Slash) {
                if !self.match_punct(PunctuationId::Comma) {
                    break;
                }
                continue;
            }

            let kind = if self.match_op(OperatorId::StarStar) {
                ParamKind::KwArgs
            } else if self.match_op(OperatorId::Star) {
                if !matches!(self.peek().kind, TokenKind::Ident(_)) {
                    // Bare `*`: the remaining parameters are keyword-only.
                    keyword_only = true;
                    if !self.match_punct(PunctuationId::Comma) {
                        break;
                    }
                    continue;
                }
                keyword_only = true;
                ParamKind::VarArgs
            } else {
                ParamKind::Normal
            };

            let name = self.identifier()?;
            if !lambda && self.match_punct(PunctuationId::Colon) {
                self.expression()?;
            }

            let default = if self.match_op(OperatorId::Eq) {
                if kind != ParamKind::Normal {
                    return Err(CompileError::syntax(
                        "var-positional and var-keyword parameters cannot have default values".to_string(),
                        self.current_span(),
                    ));
                }
                Some(self.expression()?)
            } else {
                None
            };

            if kind == ParamKind::Normal {
                if default.is_some() {
                    seen_default = true;
                } else if seen_default && !keyword_only {
                    return Err(CompileError::syntax(
                        "parameter without a default follows parameter with a default".to_string(),
                        Span::new(start, self.previous_end()),
                    ));
                }
            }

            if params.iter().any(|p| p.node.name == name) {
                let owner = if lambda { "lambda" } else { "function definition" };
                return Err(CompileError::syntax(
                    format!("duplicate argument '{name}' in {owner}"),
                    Span::new(start, self.previous_end()),
                ));
            }

            params.push(Spanned::new(Param { name, kind, default }, Span::new(start, self.previous_end())));

            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }

        Ok(params)
    }

    // ========================================================================
    // Imports
    // ========================================================================

    /// `import a.b [as c], d`
    fn import_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Import, "expected 'import'")?;
        let mut names = Vec::new();
        loop {
            let path = self.dotted_name()?;
            let alias = if self.match_keyword(KeywordId::As) {
                Some(self.identifier()?)
            } else {
                None
            };
            names.push(ImportName { path, alias });
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        Ok(Statement::Import(names))
    }

    /// `from a.b import x [as y], z`, `from a import (x, y)` or `from a import *`
    fn from_import_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::From, "expected 'from'")?;
        if self.check_punct(PunctuationId::Dot) {
            return Err(CompileError::syntax(
                "relative imports are not supported".to_string(),
                self.current_span(),
            ));
        }
        let module = self.dotted_name()?;
        self.expect_keyword(KeywordId::Import, "expected 'import'")?;

        if self.match_op(OperatorId::Star) {
            return Ok(Statement::FromImport(FromImportStmt {
                module,
                names: Vec::new(),
                star: true,
            }));
        }

        let parenthesized = self.match_punct(PunctuationId::LParen);
        let mut names = Vec::new();
        loop {
            let name = self.identifier()?;
            let alias = if self.match_keyword(KeywordId::As) {
                Some(self.identifier()?)
            } else {
                None
            };
            names.push((name, alias));
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
            if parenthesized && self.check_punct(PunctuationId::RParen) {
                break;
            }
        }
        if parenthesized {
            self.expect_punct(PunctuationId::RParen, "expected ')' after imported names")?;
        }

        Ok(Statement::FromImport(FromImportStmt {
            module,
            names,
            star: false,
        }))
    }
}
