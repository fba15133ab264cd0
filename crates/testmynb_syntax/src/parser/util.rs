/// Miscellaneous parser utilities.
///
/// This chunk contains small shared parsing helpers that don’t cleanly fit into
/// “decl”, “stmt”, or “expr” (identifier parsing, f-string sub-parsing, error wording).
impl<'a> Parser<'a> {
    // ========================================================================
    // Utilities
    // ========================================================================

    fn identifier(&mut self) -> Result<Ident, CompileError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_here("expected identifier")),
        }
    }

    fn identifier_list(&mut self) -> Result<Vec<Ident>, CompileError> {
        let mut idents = vec![self.identifier()?];
        while self.match_punct(PunctuationId::Comma) {
            idents.push(self.identifier()?);
        }
        Ok(idents)
    }

    /// Parse `name ('.' name)*`.
    fn dotted_name(&mut self) -> Result<Vec<Ident>, CompileError> {
        let mut path = vec![self.identifier()?];
        while self.match_punct(PunctuationId::Dot) {
            path.push(self.identifier()?);
        }
        Ok(path)
    }

    /// Error for a reserved keyword the executor has no semantics for.
    fn unsupported_keyword(&self) -> CompileError {
        let spelling = match &self.peek().kind {
            TokenKind::Keyword(id) => keywords::as_str(*id),
            _ => "construct",
        };
        CompileError::syntax(format!("'{spelling}' is not supported"), self.current_span())
            .with_note("test cells run in an embedded interpreter for a subset of Python")
    }
}

/// Append literal text, merging with a preceding literal part.
fn push_literal(parts: &mut Vec<FStringPart>, text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(FStringPart::Literal(prev)) = parts.last_mut() {
        prev.push_str(&text);
    } else {
        parts.push(FStringPart::Literal(text));
    }
}

/// Parse the source of one f-string replacement field.
///
/// The field is lexed in parentheses so it may span lines, and every node gets the span of the
/// enclosing f-string token.
fn parse_fstring_expr(source: &str, fstring_span: Span) -> Result<Spanned<Expr>, CompileError> {
    let to_fstring_error = |e: &CompileError| CompileError::syntax(format!("f-string: {}", e.message), fstring_span);

    let wrapped = format!("({})", source.trim());
    let tokens: Vec<Token> = lexer::lex(&wrapped)
        .map_err(|errors| {
            errors.first().map_or_else(
                || CompileError::syntax("f-string: invalid syntax".to_string(), fstring_span),
                |e| to_fstring_error(e),
            )
        })?
        .into_iter()
        .map(|t| Token::new(t.kind, fstring_span))
        .collect();

    let mut parser = Parser::new(&tokens);
    let expr = parser.expr_list().map_err(|e| to_fstring_error(&e))?;
    parser.skip_newlines();
    if !parser.is_at_end() {
        return Err(to_fstring_error(&parser.error_here("invalid syntax")));
    }

    let node = match expr.node {
        Expr::Paren(inner) => inner.node,
        other => other,
    };
    Ok(Spanned::new(node, fstring_span))
}

/// Short description of an expression for "cannot assign to ..." style messages.
fn expr_description(expr: &Expr) -> &'static str {
    match expr {
        Expr::Call(..) | Expr::MethodCall(..) => "function call",
        Expr::Literal(Literal::None) | Expr::Literal(Literal::Bool(_)) => "keyword",
        Expr::Literal(_) | Expr::FString(_) => "literal",
        Expr::Compare(..) => "comparison",
        Expr::Lambda(..) => "lambda",
        Expr::IfExp(_) => "conditional expression",
        Expr::ListComp(_) => "list comprehension",
        Expr::DictComp(_) => "dict comprehension",
        Expr::Dict(_) => "dict literal",
        Expr::Tuple(_) => "tuple",
        Expr::List(_) => "list",
        _ => "expression",
    }
}
