#[cfg(test)]
mod parser_tests {
    use rox as lox;

    use lox::ast::{Expr, ExprKind, Stmt};
    use lox::ast_printer::Ast;
    use lox::error::{LoxError, Reporter};
    use lox::parser::Parser;
    use lox::scanner::scan_tokens;
    use lox::token::TokenType;
    use lox::value::Value;

    fn parse(source: &str) -> (Vec<Stmt>, Reporter) {
        let mut reporter = Reporter::new();
        let tokens = scan_tokens(source, &mut reporter);
        let statements = Parser::new(&tokens, &mut reporter).parse();
        (statements, reporter)
    }

    fn parse_ok(source: &str) -> Vec<Stmt> {
        let (statements, reporter) = parse(source);
        assert!(
            !reporter.had_error(),
            "unexpected errors: {:?}",
            reporter.diagnostics()
        );
        statements
    }

    fn render(source: &str) -> Vec<String> {
        parse_ok(source)
            .iter()
            .map(|stmt| Ast.print_stmt(stmt))
            .collect()
    }

    fn messages(reporter: &Reporter) -> Vec<String> {
        reporter.diagnostics().iter().map(LoxError::to_string).collect()
    }

    fn single_expr(source: &str) -> Expr {
        match parse_ok(source).into_iter().next() {
            Some(Stmt::Expression(expr)) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_number_literal() {
        let expr = single_expr("42;");
        assert!(matches!(expr.kind, ExprKind::Literal(Value::Number(n)) if n == 42.0));
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        assert_eq!(render("1 + 2 * 3;"), vec!["(; (+ 1.0 (* 2.0 3.0)))"]);
        assert_eq!(render("1 * 2 + 3;"), vec!["(; (+ (* 1.0 2.0) 3.0))"]);

        let expr = single_expr("1 + 2 * 3;");
        match expr.kind {
            ExprKind::Binary {
                operator, right, ..
            } => {
                assert_eq!(operator.token_type, TokenType::PLUS);
                assert!(matches!(
                    right.kind,
                    ExprKind::Binary { ref operator, .. } if operator.token_type == TokenType::STAR
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_binary_operators_are_left_associative() {
        assert_eq!(render("1 - 2 - 3;"), vec!["(; (- (- 1.0 2.0) 3.0))"]);
        assert_eq!(render("8 / 4 / 2;"), vec!["(; (/ (/ 8.0 4.0) 2.0))"]);
    }

    #[test]
    fn test_precedence_ladder() {
        assert_eq!(
            render("!a == b < c + -d * e or f and g;"),
            vec!["(; (or (== (! a) (< b (+ c (* (- d) e)))) (and f g)))"]
        );
        assert_eq!(render("(1 + 2) * 3;"), vec!["(; (* (group (+ 1.0 2.0)) 3.0))"]);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(render("a = b = 1;"), vec!["(; (= a (= b 1.0)))"]);
    }

    #[test]
    fn test_invalid_assignment_target_is_reported_not_raised() {
        let (statements, reporter) = parse("1 + 2 = 3; print 4;");

        assert_eq!(
            messages(&reporter),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
        // Both statements survive: the error did not trigger recovery.
        assert_eq!(statements.len(), 2);
        assert_eq!(Ast.print_stmt(&statements[0]), "(; (+ 1.0 2.0))");
    }

    #[test]
    fn test_call_chains() {
        assert_eq!(render("f(1, 2)(3)();"), vec!["(; (call (call (call f 1.0 2.0) 3.0)))"]);

        let expr = single_expr("f(\n1\n);");
        match expr.kind {
            ExprKind::Call { paren, arguments, .. } => {
                assert_eq!(paren.token_type, TokenType::RIGHT_PAREN);
                assert_eq!(paren.line, 3);
                assert_eq!(arguments.len(), 1);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_statements() {
        assert_eq!(
            render("var x = 5; var y; print x; { var z; } if (x) print 1; else print 2; while (true) x = x - 1;"),
            vec![
                "(var x 5.0)",
                "(var y)",
                "(print x)",
                "(block (var z))",
                "(if x (print 1.0) (print 2.0))",
                "(while true (; (= x (- x 1.0))))",
            ]
        );
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        assert_eq!(
            render("if (a) if (b) print 1; else print 2;"),
            vec!["(if a (if b (print 1.0) (print 2.0)))"]
        );
    }

    #[test]
    fn test_function_declaration() {
        let statements = parse_ok("fun add(a, b) { return a + b; } fun greet() { print \"hi\"; return; }");

        match &statements[0] {
            Stmt::Function(decl) => {
                assert_eq!(decl.name.lexeme, "add");
                assert_eq!(decl.params.len(), 2);
                assert_eq!(decl.body.len(), 1);
            }
            other => panic!("expected function, got {:?}", other),
        }

        assert_eq!(
            Ast.print_stmt(&statements[1]),
            "(fun greet () (print hi) (return))"
        );
    }

    #[test]
    fn test_for_loop_is_desugared() {
        assert_eq!(
            render("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec!["(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"]
        );
        assert_eq!(render("for (;;) print 1;"), vec!["(while true (print 1.0))"]);
        assert_eq!(
            render("for (x = 0; x < 1;) print x;"),
            vec!["(block (; (= x 0.0)) (while (< x 1.0) (print x)))"]
        );
    }

    #[test]
    fn test_missing_semicolon_reports_at_next_token() {
        let (_, reporter) = parse("print 1\nprint 2;");
        assert_eq!(
            messages(&reporter),
            vec!["[line 2] Error at 'print': Expect ';' after value."]
        );
    }

    #[test]
    fn test_error_at_end() {
        let (_, reporter) = parse("print");
        assert_eq!(
            messages(&reporter),
            vec!["[line 1] Error at end: Expect expression."]
        );
    }

    #[test]
    fn test_synchronize_recovers_at_statement_boundary() {
        let (statements, reporter) = parse("var = 1; print 2; var 3; fun f() {} print );\nprint 4;");

        assert_eq!(reporter.diagnostics().len(), 3);
        let rendered: Vec<String> = statements.iter().map(|s| Ast.print_stmt(s)).collect();
        assert_eq!(rendered, vec!["(print 2.0)", "(fun f ())", "(print 4.0)"]);
    }

    #[test]
    fn test_class_keyword_is_not_a_declaration() {
        let (statements, reporter) = parse("class Foo {} print 1;");

        assert!(reporter.had_error());
        assert_eq!(
            messages(&reporter)[0],
            "[line 1] Error at 'class': Expect expression."
        );
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_too_many_arguments_is_reported_but_parsed() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));
        let (statements, reporter) = parse(&source);

        assert_eq!(
            messages(&reporter),
            vec!["[line 1] Error at '255': Can't have more than 255 arguments."]
        );
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_too_many_parameters_is_reported_but_parsed() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));
        let (statements, reporter) = parse(&source);

        assert_eq!(
            messages(&reporter),
            vec!["[line 1] Error at 'p255': Can't have more than 255 parameters."]
        );
        match &statements[0] {
            Stmt::Function(decl) => assert_eq!(decl.params.len(), 256),
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "fun f(x) { if (x > 1) return x * f(x - 1); return 1; } print f(5);";
        assert_eq!(render(source), render(source));
    }

    #[test]
    fn test_expression_ids_are_unique() {
        let statements = parse_ok("a; a;");
        let ids: Vec<_> = statements
            .iter()
            .map(|s| match s {
                Stmt::Expression(e) => e.id,
                other => panic!("unexpected {:?}", other),
            })
            .collect();

        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_parse_expression_rejects_trailing_tokens() {
        let mut reporter = Reporter::new();
        let tokens = scan_tokens("1 + 2 3", &mut reporter);
        let expr = Parser::new(&tokens, &mut reporter).parse_expression();

        assert!(expr.is_none());
        assert_eq!(
            messages(&reporter),
            vec!["[line 1] Error at '3': Expect end of expression."]
        );
    }
}
