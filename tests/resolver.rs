#[cfg(test)]
mod resolver_tests {
    use lumen::error::Result;
    use lumen::parser::Parser;
    use lumen::resolver::{Locals, Resolver};
    use lumen::scanner::scan_all;

    fn resolve_source(source: &str) -> Result<Locals> {
        let tokens = scan_all(source.as_bytes())?;
        let mut parser = Parser::new(&tokens);
        let statements = parser.parse()?;

        Resolver::new().resolve(&statements)
    }

    fn resolve_error(source: &str) -> String {
        resolve_source(source).unwrap_err().to_string()
    }

    #[test]
    fn test_resolver_01_read_in_own_initializer_top_level() {
        let err = resolve_error("var a = a;");
        assert!(err.contains("own initializer"));
    }

    #[test]
    fn test_resolver_02_read_in_own_initializer_in_block() {
        let err = resolve_error("var a = 1; { var a = a; }");
        assert!(err.contains("own initializer"));
    }

    #[test]
    fn test_resolver_03_duplicate_declaration_in_scope() {
        let err = resolve_error("{ var x = 1; var x = 2; }");
        assert!(err.contains("Already a variable"));
    }

    #[test]
    fn test_resolver_04_duplicate_parameters() {
        let err = resolve_error("fun f(a, a) { return a; }");
        assert!(err.contains("Already a variable"));
    }

    #[test]
    fn test_resolver_05_shadowing_in_inner_scope_is_legal() {
        assert!(resolve_source("var x = 1; { var x = 2; print x; }").is_ok());
    }

    #[test]
    fn test_resolver_06_return_at_top_level() {
        let err = resolve_error("return 1;");
        assert!(err.contains("top-level"));
    }

    #[test]
    fn test_resolver_07_return_value_from_initializer() {
        let err = resolve_error("class A { init() { return 5; } }");
        assert!(err.contains("initializer"));
    }

    #[test]
    fn test_resolver_08_bare_return_from_initializer_is_legal() {
        assert!(resolve_source("class A { init() { return; } }").is_ok());
    }

    #[test]
    fn test_resolver_09_this_outside_class() {
        let err = resolve_error("print this;");
        assert!(err.contains("'this'"));
    }

    #[test]
    fn test_resolver_10_super_outside_class() {
        let err = resolve_error("print super.m;");
        assert!(err.contains("'super'"));
    }

    #[test]
    fn test_resolver_11_class_inheriting_from_itself() {
        let err = resolve_error("class A < A {}");
        assert!(err.contains("inherit from itself"));
    }

    #[test]
    fn test_resolver_12_break_outside_loop() {
        let err = resolve_error("break;");
        assert!(err.contains("'break'"));
    }

    #[test]
    fn test_resolver_13_break_does_not_cross_function_boundary() {
        // The function body suspends the surrounding loop context.
        let err = resolve_error("while (true) { fun f() { break; } f(); }");
        assert!(err.contains("'break'"));
    }

    #[test]
    fn test_resolver_14_break_inside_loop_is_legal() {
        assert!(resolve_source("while (true) { break; }").is_ok());
        assert!(resolve_source("for (;;) break;").is_ok());
    }

    #[test]
    fn test_resolver_15_distance_counts_intervening_scopes() {
        // The single recorded reference sits one block away from its
        // declaration.
        let locals = resolve_source("{ var a = 1; { print a; } }").unwrap();

        assert_eq!(locals.len(), 1);
        assert_eq!(locals.values().copied().next(), Some(1));
    }

    #[test]
    fn test_resolver_16_same_scope_reference_has_distance_zero() {
        let locals = resolve_source("{ var a = 1; print a; }").unwrap();

        assert_eq!(locals.len(), 1);
        assert_eq!(locals.values().copied().next(), Some(0));
    }

    #[test]
    fn test_resolver_17_undeclared_names_stay_global() {
        // Natives are defined by the interpreter, not declared in any scope,
        // so their references must stay absent from the map.
        let locals = resolve_source("print clock;").unwrap();

        assert!(locals.is_empty());
    }

    #[test]
    fn test_resolver_18_methods_may_use_this_and_super() {
        let source = "
            class A { m() { return 1; } }
            class B < A { m() { return this.x + super.m(); } }
        ";

        assert!(resolve_source(source).is_ok());
    }
}
