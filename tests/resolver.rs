#[cfg(test)]
mod resolver_tests {
    use pretty_assertions::assert_eq;

    use rox::session::{Capture, EXIT_STATIC_ERROR};
    use rox::Lox;

    struct Outcome {
        out: Vec<String>,
        err: Vec<String>,
        code: i32,
    }

    fn run(source: &str) -> Outcome {
        let out = Capture::default();
        let err = Capture::default();
        let mut lox = Lox::with_sinks(out.clone(), err.clone());

        lox.run(source);

        Outcome {
            out: out.lines(),
            err: err.lines(),
            code: lox.exit_code(),
        }
    }

    fn assert_static_error(source: &str, expected: &str) {
        let outcome = run(source);

        assert_eq!(outcome.err, vec![expected.to_string()]);
        assert!(outcome.out.is_empty(), "nothing may run: {:?}", outcome.out);
        assert_eq!(outcome.code, EXIT_STATIC_ERROR);
    }

    #[test]
    fn test_closure_binds_at_declaration() {
        let outcome = run(r#"
            var a = "global";
            {
                fun showA() { print a; }
                showA();
                var a = "block";
                showA();
            }
        "#);

        assert_eq!(outcome.out, vec!["global", "global"]);
        assert_eq!(outcome.code, 0);
    }

    #[test]
    fn test_global_redeclaration_is_allowed() {
        let outcome = run("var a = 1; var a = 2; print a;");

        assert_eq!(outcome.out, vec!["2"]);
        assert!(outcome.err.is_empty());
    }

    #[test]
    fn test_local_redeclaration() {
        assert_static_error(
            "fun f() { var a = 1; var a = 2; }",
            "[line 1] Error at 'a': Already a variable with this name in this scope.",
        );
    }

    #[test]
    fn test_duplicate_parameter() {
        assert_static_error(
            "fun f(a, a) {}",
            "[line 1] Error at 'a': Already a variable with this name in this scope.",
        );
    }

    #[test]
    fn test_read_in_own_initializer() {
        assert_static_error(
            "{ var a = 1; { var a = a; } }",
            "[line 1] Error at 'a': Can't read local variable in its own initializer.",
        );
    }

    #[test]
    fn test_top_level_return() {
        assert_static_error(
            "print 1;\nreturn 2;",
            "[line 2] Error at 'return': Can't return from top-level code.",
        );
    }

    #[test]
    fn test_value_returned_from_initializer() {
        assert_static_error(
            "class A { init() { return 1; } }",
            "[line 1] Error at 'return': Can't return a value from an initializer.",
        );
    }

    #[test]
    fn test_bare_return_in_initializer_is_allowed() {
        let outcome = run("class A { init() { return; } } print A();");

        assert_eq!(outcome.out, vec!["A instance"]);
        assert_eq!(outcome.code, 0);
    }

    #[test]
    fn test_this_outside_class() {
        assert_static_error(
            "fun f() { print this; }",
            "[line 1] Error at 'this': Can't use 'this' outside of a class.",
        );
    }

    #[test]
    fn test_super_outside_class() {
        assert_static_error(
            "super.f();",
            "[line 1] Error at 'super': Can't use 'super' outside of a class.",
        );
    }

    #[test]
    fn test_super_without_superclass() {
        assert_static_error(
            "class A { f() { super.f(); } }",
            "[line 1] Error at 'super': Can't use 'super' in a class with no superclass.",
        );
    }

    #[test]
    fn test_class_inheriting_from_itself() {
        assert_static_error(
            "class A < A {}",
            "[line 1] Error at 'A': A class can't inherit from itself.",
        );
    }

    #[test]
    fn test_every_error_is_reported() {
        let outcome = run("return 1;\nprint this;\n{ var b; var b; }");

        assert_eq!(outcome.err, vec![
            "[line 1] Error at 'return': Can't return from top-level code.",
            "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            "[line 3] Error at 'b': Already a variable with this name in this scope.",
        ]);
        assert_eq!(outcome.code, EXIT_STATIC_ERROR);
    }

    #[test]
    fn test_hop_counts_survive_across_runs() {
        let out = Capture::default();
        let mut lox = Lox::with_sinks(out.clone(), Capture::default());

        lox.run("fun makeCounter() { var i = 0; fun count() { i = i + 1; print i; } return count; }");
        lox.run("var c = makeCounter(); c(); c();");

        assert_eq!(out.lines(), vec!["1", "2"]);
    }
}
