#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on correctness of specific syntactic forms and on the parser’s
/// error reporting for constructs the executor rejects.
mod tests {
    use super::*;
    use crate::lexer;

    fn parse_str(source: &str) -> Result<Program, Vec<CompileError>> {
        let tokens = lexer::lex(source).map_err(|_| vec![])?;
        parse(&tokens)
    }

    fn first_error(source: &str) -> String {
        let errors = parse_str(source).expect_err("source should be rejected");
        errors[0].message.clone()
    }

    fn single_expr(source: &str) -> Expr {
        let program = parse_str(source).unwrap();
        match &program.body[0].node {
            Statement::Expr(e) => e.node.clone(),
            other => panic!("Expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_indent_at_toplevel_is_single_clear_error() {
        let err = parse_str("  x = 1\n").expect_err("Top-level indentation should be rejected by the parser");
        assert_eq!(err.len(), 1, "Parser should return exactly one error (no cascade)");
        assert_eq!(err[0].message, "unexpected indent");
        assert_eq!(err[0].kind, crate::diagnostics::ErrorKind::Indentation);
    }

    #[test]
    fn test_semicolons_split_statements() {
        let program = parse_str("a = 1; b = 2;\nassert a < b\n").unwrap();
        assert_eq!(program.body.len(), 3);
        assert!(matches!(program.body[2].node, Statement::Assert(_)));
    }

    #[test]
    fn test_chained_and_tuple_assignment() {
        let program = parse_str("a = b = 1\nx, (y, z) = 1, (2, 3)\n").unwrap();
        match &program.body[0].node {
            Statement::Assign(a) => assert_eq!(a.targets.len(), 2),
            other => panic!("Expected assignment, got {other:?}"),
        }
        match &program.body[1].node {
            Statement::Assign(a) => match &a.targets[0].node {
                Target::Tuple(items) => {
                    assert_eq!(items.len(), 2);
                    assert!(matches!(items[1].node, Target::Tuple(_)));
                }
                other => panic!("Expected tuple target, got {other:?}"),
            },
            other => panic!("Expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_augmented_and_annotated_assignment() {
        let program = parse_str("total += 2\ncount: int = 0\nd['k'] **= 2\n").unwrap();
        assert!(matches!(
            &program.body[0].node,
            Statement::AugAssign(AugAssignStmt { op: BinaryOp::Add, .. })
        ));
        assert!(matches!(&program.body[1].node, Statement::AnnAssign(a) if a.value.is_some()));
        assert!(matches!(
            &program.body[2].node,
            Statement::AugAssign(AugAssignStmt { op: BinaryOp::Pow, target, .. }) if matches!(target.node, Target::Index(..))
        ));
    }

    #[test]
    fn test_comparison_chain() {
        match single_expr("1 < x <= 3 != y not in z is not None\n") {
            Expr::Compare(_, chain) => {
                let ops: Vec<_> = chain.iter().map(|(op, _)| *op).collect();
                assert_eq!(
                    ops,
                    vec![CompareOp::Lt, CompareOp::LtEq, CompareOp::NotEq, CompareOp::NotIn, CompareOp::IsNot]
                );
            }
            other => panic!("Expected comparison, got {other:?}"),
        }
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        match single_expr("-2 ** 2\n") {
            Expr::Unary(UnaryOp::Neg, inner) => {
                assert!(matches!(inner.node, Expr::Binary(_, BinaryOp::Pow, _)));
            }
            other => panic!("Expected unary minus, got {other:?}"),
        }
    }

    #[test]
    fn test_conditional_and_lambda() {
        assert!(matches!(single_expr("a if cond else b\n"), Expr::IfExp(_)));
        match single_expr("lambda x, y=2: x + y\n") {
            Expr::Lambda(params, _) => {
                assert_eq!(params.len(), 2);
                assert!(params[1].node.default.is_some());
            }
            other => panic!("Expected lambda, got {other:?}"),
        }
    }

    #[test]
    fn test_if_elif_else_blocks() {
        let source = "if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n";
        let program = parse_str(source).unwrap();
        match &program.body[0].node {
            Statement::If(stmt) => {
                assert_eq!(stmt.then_body.len(), 1);
                assert_eq!(stmt.elif_branches.len(), 1);
                assert!(stmt.else_body.is_some());
            }
            other => panic!("Expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_inline_suite() {
        let program = parse_str("if x: y = 1; z = 2\n").unwrap();
        match &program.body[0].node {
            Statement::If(stmt) => assert_eq!(stmt.then_body.len(), 2),
            other => panic!("Expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_blocks_with_else_after_double_dedent() {
        let source = "for i in range(3):\n    if i:\n        pass\nelse:\n    done = True\n";
        let program = parse_str(source).unwrap();
        match &program.body[0].node {
            Statement::For(stmt) => {
                assert!(matches!(stmt.target.node, Target::Name(ref n) if n == "i"));
                assert!(stmt.else_body.is_some());
            }
            other => panic!("Expected for, got {other:?}"),
        }
    }

    #[test]
    fn test_function_def_params() {
        let source = "def f(a, b: int = 1, *args, key=None, **kwargs) -> int:\n    return a\n";
        let program = parse_str(source).unwrap();
        match &program.body[0].node {
            Statement::FunctionDef(def) => {
                assert_eq!(def.name, "f");
                let kinds: Vec<_> = def.params.iter().map(|p| p.node.kind).collect();
                assert_eq!(
                    kinds,
                    vec![
                        ParamKind::Normal,
                        ParamKind::Normal,
                        ParamKind::VarArgs,
                        ParamKind::Normal,
                        ParamKind::KwArgs
                    ]
                );
            }
            other => panic!("Expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_try_statement() {
        let source = "try:\n    x = 1 / 0\nexcept (ZeroDivisionError, ValueError) as e:\n    pass\nexcept:\n    pass\nelse:\n    pass\nfinally:\n    pass\n";
        let program = parse_str(source).unwrap();
        match &program.body[0].node {
            Statement::Try(stmt) => {
                assert_eq!(stmt.handlers.len(), 2);
                assert_eq!(stmt.handlers[0].node.name.as_deref(), Some("e"));
                assert!(stmt.handlers[1].node.kind.is_none());
                assert!(stmt.else_body.is_some());
                assert!(stmt.finally_body.is_some());
            }
            other => panic!("Expected try, got {other:?}"),
        }
    }

    #[test]
    fn test_try_without_handlers_is_rejected() {
        assert!(first_error("try:\n    pass\nx = 1\n").contains("'except' or 'finally'"));
    }

    #[test]
    fn test_comprehensions() {
        match single_expr("[x * y for x in a for y in b if x if y]\n") {
            Expr::ListComp(comp) => {
                assert_eq!(comp.generators.len(), 2);
                assert_eq!(comp.generators[1].conditions.len(), 2);
            }
            other => panic!("Expected list comprehension, got {other:?}"),
        }
        assert!(matches!(single_expr("{k: v for k, v in pairs}\n"), Expr::DictComp(_)));
        match single_expr("sum(x for x in xs)\n") {
            Expr::Call(_, args) => {
                assert!(matches!(&args[0], CallArg::Positional(e) if matches!(e.node, Expr::ListComp(_))));
            }
            other => panic!("Expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_subscripts_and_calls() {
        assert!(matches!(single_expr("s[::-1]\n"), Expr::Slice(..)));
        match single_expr("d[1, 2]\n") {
            Expr::Index(_, index) => assert!(matches!(index.node, Expr::Tuple(_))),
            other => panic!("Expected index, got {other:?}"),
        }
        match single_expr("obj.method(1, *rest, key=2, **extra)\n") {
            Expr::MethodCall(_, name, args) => {
                assert_eq!(name, "method");
                assert!(matches!(args[0], CallArg::Positional(_)));
                assert!(matches!(args[1], CallArg::Star(_)));
                assert!(matches!(args[2], CallArg::Named(ref n, _) if n == "key"));
                assert!(matches!(args[3], CallArg::DoubleStar(_)));
            }
            other => panic!("Expected method call, got {other:?}"),
        }
    }

    #[test]
    fn test_fstring_fields_are_parsed() {
        match single_expr("f\"{a + 1!r:>4} and {b}\"\n") {
            Expr::FString(parts) => {
                assert_eq!(parts.len(), 3);
                match &parts[0] {
                    FStringPart::Expr {
                        expr,
                        conversion,
                        format_spec,
                    } => {
                        assert!(matches!(expr.node, Expr::Binary(_, BinaryOp::Add, _)));
                        assert_eq!(*conversion, Some('r'));
                        assert_eq!(format_spec.as_deref(), Some(">4"));
                    }
                    other => panic!("Expected field, got {other:?}"),
                }
            }
            other => panic!("Expected f-string, got {other:?}"),
        }
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        assert_eq!(
            single_expr("'ab' \"cd\"\n"),
            Expr::Literal(Literal::String("abcd".to_string()))
        );
        match single_expr("'x = ' f'{x}'\n") {
            Expr::FString(parts) => assert!(matches!(&parts[0], FStringPart::Literal(s) if s == "x = ")),
            other => panic!("Expected f-string, got {other:?}"),
        }
    }

    #[test]
    fn test_imports() {
        let program = parse_str("import math as m, os.path\nfrom math import (sqrt, pi as PI,)\nfrom math import *\n").unwrap();
        match &program.body[0].node {
            Statement::Import(names) => {
                assert_eq!(names[0].alias.as_deref(), Some("m"));
                assert_eq!(names[1].dotted(), "os.path");
            }
            other => panic!("Expected import, got {other:?}"),
        }
        assert!(matches!(&program.body[1].node, Statement::FromImport(f) if f.names.len() == 2));
        assert!(matches!(&program.body[2].node, Statement::FromImport(f) if f.star));
    }

    #[test]
    fn test_global_and_del() {
        let program = parse_str("global a, b\ndel x[0], y\n").unwrap();
        assert!(matches!(&program.body[0].node, Statement::Global(names) if names.len() == 2));
        assert!(matches!(&program.body[1].node, Statement::Del(targets) if targets.len() == 2));
    }

    #[test]
    fn test_unsupported_keywords() {
        assert_eq!(first_error("class Foo:\n    pass\n"), "'class' is not supported");
        assert_eq!(first_error("with open(p) as f:\n    pass\n"), "'with' is not supported");
        assert_eq!(first_error("x = yield 1\n"), "'yield' is not supported");
    }

    #[test]
    fn test_invalid_targets_and_literals() {
        assert_eq!(first_error("f() = 1\n"), "cannot assign to function call");
        assert_eq!(first_error("s = {1, 2}\n"), "set literals are not supported");
        assert!(first_error("if x:\npass\n").starts_with("expected an indented block after 'if' statement"));
    }

    /// One `line: statement kind` entry per top-level statement.
    fn outline(source: &str) -> String {
        let program = parse_str(source).unwrap();
        program
            .body
            .iter()
            .map(|stmt| {
                let debug = format!("{:?}", stmt.node);
                let kind = debug.split(['(', ' ', '{']).next().unwrap_or_default().to_string();
                format!("{}: {kind}", crate::diagnostics::line_col(source, stmt.span.start).0)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_cell_outline_snapshot() {
        let source = "import math\nfrom os import path as p\ntotal: int = 0\nfor i in range(3):\n    total += i\n\ndef double(x):\n    return x * 2\n\ntry:\n    del total\nexcept NameError:\n    pass\nassert double(2) == 4, 'double'\nraise ValueError('done')\n";
        insta::assert_snapshot!(outline(source), @r"
        1: Import
        2: FromImport
        3: AnnAssign
        4: For
        7: FunctionDef
        10: Try
        14: Assert
        15: Raise
        ");
    }

    #[test]
    fn test_rejected_constructs_snapshot() {
        let sources = [
            "class Foo:\n    pass\n",
            "with open(p) as f:\n    pass\n",
            "x = yield 1\n",
            "f() = 1\n",
            "s = {1, 2}\n",
            "  x = 1\n",
        ];
        let report = sources
            .iter()
            .map(|source| format!("{source:?} -> {}", first_error(source)))
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!(report, @r#"
        "class Foo:\n    pass\n" -> 'class' is not supported
        "with open(p) as f:\n    pass\n" -> 'with' is not supported
        "x = yield 1\n" -> 'yield' is not supported
        "f() = 1\n" -> cannot assign to function call
        "s = {1, 2}\n" -> set literals are not supported
        "  x = 1\n" -> unexpected indent
        "#);
    }

    #[test]
    fn test_statement_spans_start_on_their_line() {
        let source = "x = 1\nif x:\n    y = 2\nassert y == 3\n";
        let program = parse_str(source).unwrap();
        let lines: Vec<_> = program
            .body
            .iter()
            .map(|s| crate::diagnostics::line_col(source, s.span.start).0)
            .collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }
}
