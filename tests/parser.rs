#[cfg(test)]
mod parser_tests {
    use lumen::ast::Stmt;
    use lumen::ast_printer::Ast;
    use lumen::parser::Parser;
    use lumen::scanner::scan_all;

    /// Parse a single expression and render it in prefix form.
    fn parse_expr(source: &str) -> String {
        let tokens = scan_all(source.as_bytes()).unwrap();
        let mut parser = Parser::new(&tokens);
        let expr = parser.parse_expression().unwrap();

        Ast.print(&expr)
    }

    fn parse_program(source: &str) -> Vec<Stmt> {
        let tokens = scan_all(source.as_bytes()).unwrap();
        let mut parser = Parser::new(&tokens);

        parser.parse().unwrap()
    }

    fn parse_error(source: &str) -> String {
        let tokens = scan_all(source.as_bytes()).unwrap();
        let mut parser = Parser::new(&tokens);

        parser.parse().unwrap_err().to_string()
    }

    #[test]
    fn test_parser_01_left_associative_subtraction() {
        assert_eq!(parse_expr("5 - 1 - 2"), "(- (- 5.0 1.0) 2.0)");
    }

    #[test]
    fn test_parser_02_factor_binds_tighter_than_term() {
        assert_eq!(parse_expr("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(parse_expr("10 % 4 - 1"), "(- (% 10.0 4.0) 1.0)");
    }

    #[test]
    fn test_parser_03_unary_chains() {
        assert_eq!(parse_expr("!!true"), "(! (! true))");
        assert_eq!(parse_expr("-5 * 2"), "(* (- 5.0) 2.0)");
    }

    #[test]
    fn test_parser_04_grouping() {
        assert_eq!(parse_expr("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
    }

    #[test]
    fn test_parser_05_assignment_right_associative() {
        assert_eq!(parse_expr("a = b = 3"), "(= a (= b 3.0))");
    }

    #[test]
    fn test_parser_06_logical_precedence() {
        // 'and' binds tighter than 'or'
        assert_eq!(parse_expr("a or b and c"), "(or a (and b c))");
    }

    #[test]
    fn test_parser_07_comparison_and_equality() {
        assert_eq!(parse_expr("1 < 2 == true"), "(== (< 1.0 2.0) true)");
    }

    #[test]
    fn test_parser_08_calls_and_property_chains() {
        assert_eq!(parse_expr("a.b(1).c"), "(get (call (get a b) 1.0) c)");
        assert_eq!(parse_expr("f(1, 2)"), "(call f 1.0 2.0)");
    }

    #[test]
    fn test_parser_09_property_assignment() {
        assert_eq!(parse_expr("a.b = 2"), "(set a b 2.0)");
    }

    #[test]
    fn test_parser_10_this_and_super() {
        assert_eq!(parse_expr("this.x"), "(get this x)");
        assert_eq!(parse_expr("super.foo"), "(super foo)");
    }

    #[test]
    fn test_parser_11_array_literal_and_indexing() {
        assert_eq!(parse_expr("[1, 2]"), "(array 1.0 2.0)");
        assert_eq!(parse_expr("a[0]"), "(index a 0.0)");
        assert_eq!(parse_expr("a[0] = 5"), "(index-set a 0.0 5.0)");
        assert_eq!(parse_expr("[1, 2][1]"), "(index (array 1.0 2.0) 1.0)");
    }

    #[test]
    fn test_parser_12_string_interpolation() {
        assert_eq!(parse_expr(r#""x=%{a}""#), "(interp x= a)");

        // Interpolation-free strings collapse to plain literals.
        assert_eq!(parse_expr(r#""abc""#), "abc");
        assert_eq!(parse_expr(r#""""#), "");
    }

    #[test]
    fn test_parser_13_invalid_assignment_target() {
        let err = parse_error("1 = 2;");
        assert!(err.contains("Invalid assignment target"));
    }

    #[test]
    fn test_parser_14_missing_semicolon() {
        let err = parse_error("var a = 1");
        assert!(err.contains("Expected ';'"));
    }

    #[test]
    fn test_parser_15_for_desugars_to_while() {
        let statements = parse_program("for (var i = 0; i < 3; i = i + 1) print i;");

        assert_eq!(statements.len(), 1);

        let Stmt::Block(parts) = &statements[0] else {
            panic!("for should desugar to a block");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], Stmt::Var { .. }));

        let Stmt::While { body, .. } = &parts[1] else {
            panic!("for should desugar to a while loop");
        };

        // Loop body is the original statement followed by the increment.
        let Stmt::Block(loop_parts) = body.as_ref() else {
            panic!("loop body should be a block");
        };
        assert_eq!(loop_parts.len(), 2);
        assert!(matches!(loop_parts[0], Stmt::Print(_)));
        assert!(matches!(loop_parts[1], Stmt::Expression(_)));
    }

    #[test]
    fn test_parser_16_for_without_clauses() {
        let statements = parse_program("for (;;) break;");

        let Stmt::Block(parts) = &statements[0] else {
            panic!("for should desugar to a block");
        };
        assert_eq!(parts.len(), 1);
        assert!(matches!(parts[0], Stmt::While { .. }));
    }

    #[test]
    fn test_parser_17_if_elif_else_structure() {
        let statements = parse_program("if (a) b = 1; elif (c) b = 2; elif (d) b = 3; else b = 4;");

        let Stmt::If {
            elif_branches,
            else_branch,
            ..
        } = &statements[0]
        else {
            panic!("expected an if statement");
        };

        assert_eq!(elif_branches.len(), 2);
        assert!(else_branch.is_some());
    }

    #[test]
    fn test_parser_18_class_declaration() {
        let statements = parse_program("class Dog < Animal { bark() { return 1; } }");

        let Stmt::Class {
            name,
            superclass,
            methods,
        } = &statements[0]
        else {
            panic!("expected a class statement");
        };

        assert_eq!(name.lexeme, "Dog");
        assert!(superclass.is_some());
        assert_eq!(methods.len(), 1);
    }

    #[test]
    fn test_parser_19_break_statement() {
        let statements = parse_program("while (true) break;");

        let Stmt::While { body, .. } = &statements[0] else {
            panic!("expected a while statement");
        };
        assert!(matches!(body.as_ref(), Stmt::Break(_)));
    }

    #[test]
    fn test_parser_20_trailing_input_after_expression() {
        let tokens = scan_all(b"1 + 2 3").unwrap();
        let mut parser = Parser::new(&tokens);

        let err = parser.parse_expression().unwrap_err().to_string();
        assert!(err.contains("Expected end of expression"));
    }
}
