#[cfg(test)]
mod interpreter_tests {
    use lumen::error::Result;
    use lumen::interpreter::Interpreter;
    use lumen::parser::Parser;
    use lumen::resolver::Resolver;
    use lumen::scanner::scan_all;
    use lumen::value::Value;

    /// Run a program through the full pipeline and return the interpreter so
    /// tests can inspect global bindings.
    fn run(source: &str) -> Result<Interpreter> {
        let tokens = scan_all(source.as_bytes())?;
        let mut parser = Parser::new(&tokens);
        let statements = parser.parse()?;
        let locals = Resolver::new().resolve(&statements)?;

        let mut interpreter = Interpreter::new();
        interpreter.interpret(&statements, locals)?;

        Ok(interpreter)
    }

    fn global(source: &str, name: &str) -> Value {
        run(source)
            .unwrap()
            .get_global(name)
            .unwrap_or_else(|| panic!("global '{}' not defined", name))
    }

    fn run_error(source: &str) -> String {
        run(source).unwrap_err().to_string()
    }

    // ───────────────────── expressions and operators ─────────────────────

    #[test]
    fn test_interp_01_arithmetic_associativity() {
        assert_eq!(global("var r = 5 - 1 - 2;", "r"), Value::Number(2.0));
        assert_eq!(global("var r = 1 + 2 * 3;", "r"), Value::Number(7.0));
        assert_eq!(global("var r = 7 % 3;", "r"), Value::Number(1.0));
    }

    #[test]
    fn test_interp_02_string_concatenation() {
        assert_eq!(
            global(r#"var r = "a" + "b";"#, "r"),
            Value::Str("ab".to_string())
        );
    }

    #[test]
    fn test_interp_03_mixed_operand_type_errors() {
        assert!(run_error(r#"1 + "b";"#).contains("two numbers or two strings"));
        assert!(run_error(r#"1 - "b";"#).contains("Operands must be numbers"));
        assert!(run_error(r#"2 * "x";"#).contains("Operands must be numbers"));
        assert!(run_error(r#""a" < "b";"#).contains("Operands must be numbers"));
    }

    #[test]
    fn test_interp_04_division_and_modulo_by_zero() {
        assert!(run_error("1 / 0;").contains("Division by zero"));
        assert!(run_error("5 % 0;").contains("Modulo by zero"));
    }

    #[test]
    fn test_interp_05_truthiness() {
        // Only false and nil are falsy; zero and "" are truthy.
        assert_eq!(global(r#"var r = 0 or "x";"#, "r"), Value::Number(0.0));
        assert_eq!(global(r#"var r = "" and 1;"#, "r"), Value::Number(1.0));
        assert_eq!(global("var r = !nil;", "r"), Value::Bool(true));
        assert_eq!(global("var r = !0;", "r"), Value::Bool(false));
    }

    #[test]
    fn test_interp_06_logic_returns_operand_values() {
        assert_eq!(
            global(r#"var r = nil or "x";"#, "r"),
            Value::Str("x".to_string())
        );
        assert_eq!(global("var r = 1 and 2;", "r"), Value::Number(2.0));
    }

    #[test]
    fn test_interp_07_short_circuit_skips_right_operand() {
        // 'boom' is undefined; short-circuiting must never evaluate it.
        assert_eq!(
            global("var r = false and boom();", "r"),
            Value::Bool(false)
        );
        assert_eq!(global("var r = 1 or boom();", "r"), Value::Number(1.0));
    }

    #[test]
    fn test_interp_08_equality_without_coercion() {
        assert_eq!(global(r#"var r = 1 == "1";"#, "r"), Value::Bool(false));
        assert_eq!(global("var r = nil == nil;", "r"), Value::Bool(true));
        assert_eq!(global("var r = [1, 2] == [1, 2];", "r"), Value::Bool(true));
        assert_eq!(global("var r = [1] == [2];", "r"), Value::Bool(false));
    }

    #[test]
    fn test_interp_09_string_interpolation() {
        assert_eq!(
            global(r#"var name = "world"; var r = "hi %{name}!";"#, "r"),
            Value::Str("hi world!".to_string())
        );
        assert_eq!(
            global(r#"var r = "n=%{1 + 2}";"#, "r"),
            Value::Str("n=3".to_string())
        );
    }

    // ───────────────────── statements and control flow ───────────────────

    #[test]
    fn test_interp_10_elif_chain() {
        let source = r#"
            var r = "";
            var x = 2;
            if (x == 1) r = "one"; elif (x == 2) r = "two"; else r = "other";
        "#;

        assert_eq!(global(source, "r"), Value::Str("two".to_string()));
    }

    #[test]
    fn test_interp_11_for_loop() {
        let source = "
            var sum = 0;
            for (var i = 0; i < 5; i = i + 1) { sum = sum + i; }
        ";

        assert_eq!(global(source, "sum"), Value::Number(10.0));
    }

    #[test]
    fn test_interp_12_break_exits_innermost_loop_only() {
        let source = "
            var outer = 0;
            var inner_total = 0;
            while (true) {
                var j = 0;
                while (true) {
                    j = j + 1;
                    if (j == 3) break;
                }
                inner_total = inner_total + j;
                outer = outer + 1;
                if (outer == 2) break;
            }
        ";

        let interpreter = run(source).unwrap();
        assert_eq!(interpreter.get_global("outer"), Some(Value::Number(2.0)));
        assert_eq!(
            interpreter.get_global("inner_total"),
            Some(Value::Number(6.0))
        );
    }

    #[test]
    fn test_interp_13_break_through_nested_block() {
        let source = "
            var n = 0;
            while (true) { { n = n + 1; break; } }
        ";

        assert_eq!(global(source, "n"), Value::Number(1.0));
    }

    #[test]
    fn test_interp_14_block_scoping_and_shadowing() {
        let source = r#"
            var r = "";
            var x = "outer";
            {
                var x = "inner";
                r = r + x;
            }
            r = r + x;
        "#;

        assert_eq!(global(source, "r"), Value::Str("innerouter".to_string()));
    }

    // ───────────────────────── functions and closures ────────────────────

    #[test]
    fn test_interp_15_closure_captures_environment() {
        let source = "
            fun make_counter() {
                var count = 0;
                fun increment() {
                    count = count + 1;
                    return count;
                }
                return increment;
            }
            var counter = make_counter();
            counter();
            var r = counter();
        ";

        assert_eq!(global(source, "r"), Value::Number(2.0));
    }

    #[test]
    fn test_interp_16_closure_binding_is_lexical() {
        // Both calls must see the declaration-time binding, not the later
        // shadowing one.
        let source = r#"
            var r1 = ""; var r2 = "";
            var a = "global";
            {
                fun show() { return a; }
                r1 = show();
                var a = "block";
                r2 = show();
            }
        "#;

        let interpreter = run(source).unwrap();
        assert_eq!(
            interpreter.get_global("r1"),
            Some(Value::Str("global".to_string()))
        );
        assert_eq!(
            interpreter.get_global("r2"),
            Some(Value::Str("global".to_string()))
        );
    }

    #[test]
    fn test_interp_17_recursion() {
        let source = "
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            var r = fib(10);
        ";

        assert_eq!(global(source, "r"), Value::Number(55.0));
    }

    #[test]
    fn test_interp_18_function_without_return_yields_nil() {
        assert_eq!(global("fun f() {} var r = f();", "r"), Value::Nil);
    }

    #[test]
    fn test_interp_19_arity_mismatch() {
        let err = run_error("fun f(a) { return a; } f(1, 2);");
        assert!(err.contains("Expected 1 arguments but got 2"));
    }

    #[test]
    fn test_interp_20_calling_a_non_callable() {
        let err = run_error("var x = 5; x();");
        assert!(err.contains("Can only call functions and classes"));
    }

    // ─────────────────────────── classes ─────────────────────────────────

    #[test]
    fn test_interp_21_init_and_method_on_this() {
        let source = "
            class Point {
                init(x) { this.x = x; }
                double() { return this.x + this.x; }
            }
            var p = Point(21);
            var r = p.double();
        ";

        assert_eq!(global(source, "r"), Value::Number(42.0));
    }

    #[test]
    fn test_interp_22_construction_always_yields_instance() {
        let source = "
            class Box { init() { this.v = 1; return; } }
            var b = Box();
            var r = b.v;
        ";

        let interpreter = run(source).unwrap();
        assert_eq!(interpreter.get_global("r"), Some(Value::Number(1.0)));
        assert!(matches!(
            interpreter.get_global("b"),
            Some(Value::Instance(_))
        ));
    }

    #[test]
    fn test_interp_23_inheritance_and_super() {
        let source = r#"
            class Animal {
                speak() { return "generic"; }
                name() { return "animal"; }
            }
            class Dog < Animal {
                speak() { return "woof " + super.speak(); }
            }
            var d = Dog();
            var r1 = d.speak();
            var r2 = d.name();
        "#;

        let interpreter = run(source).unwrap();
        assert_eq!(
            interpreter.get_global("r1"),
            Some(Value::Str("woof generic".to_string()))
        );
        assert_eq!(
            interpreter.get_global("r2"),
            Some(Value::Str("animal".to_string()))
        );
    }

    #[test]
    fn test_interp_24_fields_shadow_methods() {
        let source = r#"
            class Thing { tag() { return "method"; } }
            var t = Thing();
            t.tag = "field";
            var r = t.tag;
        "#;

        assert_eq!(global(source, "r"), Value::Str("field".to_string()));
    }

    #[test]
    fn test_interp_25_superclass_must_be_a_class() {
        let err = run_error("var NotAClass = 1; class A < NotAClass {}");
        assert!(err.contains("Superclass must be a class"));
    }

    #[test]
    fn test_interp_26_undefined_property() {
        let err = run_error("class A {} var a = A(); a.missing;");
        assert!(err.contains("Undefined property 'missing'"));
    }

    #[test]
    fn test_interp_27_properties_on_non_instances() {
        let err = run_error("var x = 3; x.y;");
        assert!(err.contains("Only instances have properties"));
    }

    // ─────────────────────────── arrays ──────────────────────────────────

    #[test]
    fn test_interp_28_array_write_then_read() {
        let source = "
            var a = [1, 2, 3];
            a[1] = 9;
            var r = a[1];
        ";

        assert_eq!(global(source, "r"), Value::Number(9.0));
    }

    #[test]
    fn test_interp_29_array_index_errors() {
        assert!(run_error("var a = [1]; a[3];").contains("out of range"));
        assert!(run_error(r#"var a = [1]; a["x"];"#).contains("non-negative integer"));
        assert!(run_error("var a = [1]; a[0.5];").contains("non-negative integer"));
        assert!(run_error("var n = 1; n[0];").contains("Cannot index"));
    }

    #[test]
    fn test_interp_30_arrays_share_identity() {
        let source = "
            var a = [1];
            var b = a;
            b[0] = 7;
            var r = a[0];
        ";

        assert_eq!(global(source, "r"), Value::Number(7.0));
    }

    // ────────────────────── natives and error handling ───────────────────

    #[test]
    fn test_interp_31_coerce_to_i() {
        assert_eq!(
            global(r#"var r = coerce_to_i("42");"#, "r"),
            Value::Number(42.0)
        );
        assert_eq!(global("var r = coerce_to_i(3.9);", "r"), Value::Number(3.0));
        assert!(run_error(r#"coerce_to_i("abc");"#).contains("Cannot coerce"));
    }

    #[test]
    fn test_interp_32_clock_returns_a_positive_number() {
        match global("var t = clock();", "t") {
            Value::Number(n) => assert!(n > 0.0),
            other => panic!("clock() should return a number, got {:?}", other),
        }
    }

    #[test]
    fn test_interp_33_undefined_variable() {
        assert!(run_error("print missing;").contains("Undefined variable 'missing'"));
        assert!(run_error("missing = 1;").contains("Undefined variable 'missing'"));
    }

    #[test]
    fn test_interp_34_runtime_error_aborts_remaining_statements() {
        let tokens = scan_all(br#"var a = 1; a = a + "x"; var b = 2;"#).unwrap();
        let mut parser = Parser::new(&tokens);
        let statements = parser.parse().unwrap();
        let locals = Resolver::new().resolve(&statements).unwrap();

        let mut interpreter = Interpreter::new();
        assert!(interpreter.interpret(&statements, locals).is_err());

        // The first statement ran; the one after the failure never did.
        assert_eq!(interpreter.get_global("a"), Some(Value::Number(1.0)));
        assert_eq!(interpreter.get_global("b"), None);
    }

    #[test]
    fn test_interp_35_error_message_format() {
        let err = run_error("var x = 3;\nx.y;");
        assert_eq!(err, "[line 2] Error at 'y': Only instances have properties");
    }

    #[test]
    fn test_interp_36_evaluate_single_expression() {
        let tokens = scan_all(b"(1 + 2) * 3").unwrap();
        let mut parser = Parser::new(&tokens);
        let expr = parser.parse_expression().unwrap();

        let mut interpreter = Interpreter::new();
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Value::Number(9.0));
    }
}
