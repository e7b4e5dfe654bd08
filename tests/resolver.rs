#[cfg(test)]
mod resolver_tests {
    use rox as lox;

    use lox::ast::{ExprKind, Stmt};
    use lox::error::Reporter;
    use lox::interpreter::Interpreter;
    use lox::output::SharedBuffer;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::scan_tokens;

    /// Parse and resolve `source`, returning the tree, the interpreter that
    /// received the depth annotations, and the collected diagnostics.
    fn resolve(source: &str) -> (Vec<Stmt>, Interpreter, Vec<String>) {
        let mut reporter = Reporter::new();
        let tokens = scan_tokens(source, &mut reporter);
        let statements = Parser::new(&tokens, &mut reporter).parse();
        assert!(!reporter.had_error(), "parse failed: {:?}", reporter.diagnostics());

        let mut interpreter = Interpreter::with_output(Box::new(SharedBuffer::new()));
        Resolver::new(&mut interpreter, &mut reporter).resolve(&statements);

        let messages = reporter.take().iter().map(|e| e.to_string()).collect();
        (statements, interpreter, messages)
    }

    #[test]
    fn test_valid_programs_resolve_cleanly() {
        for source in [
            "var x = 1; print x;",
            "var x; print x;",
            "{ var a = 1; { var b = a; print b; } }",
            "fun f(a, b) { return a + b; } print f(1, 2);",
            "fun outer() { var x = 1; fun inner() { return x; } return inner; }",
            "var i = 0; while (i < 3) { i = i + 1; }",
            "if (true and false) print 1; else print 2;",
            "",
        ] {
            let (_, _, messages) = resolve(source);
            assert!(messages.is_empty(), "{}: {:?}", source, messages);
        }
    }

    #[test]
    fn test_read_in_own_initializer() {
        let (_, _, messages) = resolve("{ var a = a; }");
        assert_eq!(
            messages,
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_global_self_reference_is_allowed() {
        let (_, _, messages) = resolve("var a = a;");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_shadowing_outer_in_initializer_is_an_error() {
        let (_, _, messages) = resolve("var a = 1; { var a = a + 1; }");
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_duplicate_local() {
        let (_, _, messages) = resolve("fun f() {\n var a = 1;\n var a = 2;\n}");
        assert_eq!(
            messages,
            vec!["[line 3] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_duplicate_parameter() {
        let (_, _, messages) = resolve("fun f(a, a) {}");
        assert_eq!(
            messages,
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_duplicate_globals_are_allowed() {
        let (_, _, messages) = resolve("var a = 1; var a = 2;");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_top_level_return() {
        let (_, _, messages) = resolve("return 1;");
        assert_eq!(
            messages,
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn test_resolution_continues_after_errors() {
        let (_, _, messages) = resolve("return;\n{ var a; var a; }\n{ var b = b; }");
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn test_depths_are_recorded_for_locals_only() {
        let (statements, interpreter, _) = resolve("var g = 0; { var a = 1; { print a; print g; } }");

        let Stmt::Block(outer) = &statements[1] else {
            panic!("expected block");
        };
        let Stmt::Block(inner) = &outer[1] else {
            panic!("expected inner block");
        };

        let depth_of = |stmt: &Stmt| match stmt {
            Stmt::Print(expr) => {
                assert!(matches!(expr.kind, ExprKind::Variable(_)));
                interpreter.local_depth(expr.id)
            }
            other => panic!("expected print, got {:?}", other),
        };

        assert_eq!(depth_of(&inner[0]), Some(1));
        assert_eq!(depth_of(&inner[1]), None);
    }

    #[test]
    fn test_function_parameters_resolve_at_depth_zero() {
        let (statements, interpreter, _) = resolve("fun f(x) { return x; }");

        let Stmt::Function(decl) = &statements[0] else {
            panic!("expected function");
        };
        let Stmt::Return {
            value: Some(expr), ..
        } = &decl.body[0]
        else {
            panic!("expected return");
        };

        assert_eq!(interpreter.local_depth(expr.id), Some(0));
    }

    #[test]
    fn test_resolving_diverging_program_terminates() {
        let (_, _, messages) = resolve("fun spin() { while (true) {} } spin();");
        assert!(messages.is_empty());
    }
}
