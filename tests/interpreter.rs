#[cfg(test)]
mod interpreter_tests {
    use pretty_assertions::assert_eq;

    use rox::session::{Capture, EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR};
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

    fn assert_prints(source: &str, expected: &[&str]) {
        let outcome = run(source);

        assert!(outcome.err.is_empty(), "unexpected errors: {:?}", outcome.err);
        assert_eq!(outcome.out, expected);
        assert_eq!(outcome.code, 0);
    }

    /// Output printed before the failure, then the two-line runtime report.
    fn assert_runtime_error(source: &str, printed: &[&str], message: &str, line: usize) {
        let outcome = run(source);

        assert_eq!(outcome.out, printed);
        assert_eq!(outcome.err, vec![message.to_string(), format!("[line {}]", line)]);
        assert_eq!(outcome.code, EXIT_RUNTIME_ERROR);
    }

    // ───────────────────────────── expressions ─────────────────────────────

    #[test]
    fn test_arithmetic_precedence() {
        assert_prints("print 1 + 2 * 3;", &["7"]);
        assert_prints("print (1 + 2) * 3;", &["9"]);
        assert_prints("print 10 - 4 - 3;", &["3"]);
        assert_prints("print 7 / 2;", &["3.5"]);
        assert_prints("print -(2 * 3);", &["-6"]);
    }

    #[test]
    fn test_comparison_and_equality() {
        assert_prints(
            "print 1 < 2; print 2 <= 2; print 3 > 4; print 3 >= 4; print 1 == 1; print \"a\" != \"a\";",
            &["true", "true", "false", "false", "true", "false"],
        );
    }

    #[test]
    fn test_equality_across_types() {
        assert_prints(
            "print nil == nil; print nil == false; print 0 == \"0\"; print \"ab\" == \"a\" + \"b\";",
            &["true", "false", "false", "true"],
        );
    }

    #[test]
    fn test_truthiness() {
        assert_prints(
            "print !nil; print !false; print !0; print !\"\"; if (0) print \"zero is true\";",
            &["true", "true", "false", "false", "zero is true"],
        );
    }

    #[test]
    fn test_string_concatenation() {
        assert_prints("print \"a\" + \"b\";", &["ab"]);
    }

    #[test]
    fn test_mixed_addition_is_an_error() {
        assert_runtime_error(
            "print \"a\" + 1;",
            &[],
            "Operands must be two numbers or two strings.",
            1,
        );
    }

    #[test]
    fn test_unary_minus_requires_number() {
        assert_runtime_error("print -\"x\";", &[], "Operand must be a number.", 1);
    }

    #[test]
    fn test_comparison_requires_numbers() {
        assert_runtime_error("print 1;\nprint 1 < \"2\";", &["1"], "Operands must be numbers.", 2);
    }

    #[test]
    fn test_logical_operators_return_operands() {
        assert_prints(
            "print nil or \"yes\"; print 0 or 1; print nil and 1; print 1 and 2;",
            &["yes", "0", "nil", "2"],
        );
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        assert_prints(
            "var hit = false; fun f() { hit = true; return 1; } print false and f(); print hit; print true or f(); print hit;",
            &["false", "false", "true", "false"],
        );
    }

    #[test]
    fn test_number_display() {
        assert_prints(
            "print 100000000000000000000 * 10; print 1 / 0; print -1 / 0; print 0.5;",
            &["1E+21", "Infinity", "-Infinity", "0.5"],
        );
    }

    #[test]
    fn test_division_by_zero_is_not_an_error() {
        let outcome = run("print 1 / 0 > 1000;");

        assert_eq!(outcome.out, vec!["true"]);
        assert_eq!(outcome.code, 0);
    }

    // ───────────────────────────── statements ─────────────────────────────

    #[test]
    fn test_block_scoping_and_shadowing() {
        assert_prints(
            "var a = 1; { var a = 2; print a; } print a;",
            &["2", "1"],
        );
    }

    #[test]
    fn test_nested_scopes_assign_outward() {
        assert_prints(
            r#"
            var a = "global a";
            var b = "global b";
            {
                var a = "outer a";
                {
                    b = "assigned b";
                    print a;
                }
            }
            print a;
            print b;
            "#,
            &["outer a", "global a", "assigned b"],
        );
    }

    #[test]
    fn test_uninitialized_variable_is_nil() {
        assert_prints("var a; print a;", &["nil"]);
    }

    #[test]
    fn test_assignment_is_an_expression() {
        assert_prints("var a; var b; a = b = 3; print a; print b;", &["3", "3"]);
    }

    #[test]
    fn test_undefined_variable() {
        assert_runtime_error("print x;", &[], "Undefined variable 'x'.", 1);
        assert_runtime_error("x = 1;", &[], "Undefined variable 'x'.", 1);
    }

    #[test]
    fn test_if_else() {
        assert_prints(
            "if (1 > 2) print \"then\"; else print \"else\"; if (nil) print \"skipped\";",
            &["else"],
        );
    }

    #[test]
    fn test_while_loop() {
        assert_prints("var i = 0; while (i < 3) { print i; i = i + 1; }", &["0", "1", "2"]);
    }

    #[test]
    fn test_for_loop_fibonacci() {
        assert_prints(
            "var a = 0; var temp; for (var b = 1; a < 30; b = temp + b) { print a; temp = a; a = b; }",
            &["0", "1", "1", "2", "3", "5", "8", "13", "21"],
        );
    }

    #[test]
    fn test_for_loop_variable_is_scoped_to_loop() {
        assert_runtime_error(
            "for (var i = 0; i < 1; i = i + 1) print i;\nprint i;",
            &["0"],
            "Undefined variable 'i'.",
            2,
        );
    }

    #[test]
    fn test_runtime_error_aborts_remaining_statements() {
        assert_runtime_error(
            "print 1;\nprint nil + 1;\nprint 3;",
            &["1"],
            "Operands must be two numbers or two strings.",
            2,
        );
    }

    // ───────────────────────────── functions ─────────────────────────────

    #[test]
    fn test_function_call_and_return() {
        assert_prints(
            "fun add(a, b) { return a + b; } print add(1, 2); fun noop() {} print noop();",
            &["3", "nil"],
        );
    }

    #[test]
    fn test_recursion() {
        assert_prints(
            "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(15);",
            &["610"],
        );
    }

    #[test]
    fn test_return_unwinds_loops_and_blocks() {
        assert_prints(
            "fun first() { var i = 0; while (true) { { if (i == 3) return i; } i = i + 1; } } print first();",
            &["3"],
        );
    }

    #[test]
    fn test_counter_closure() {
        assert_prints(
            r#"
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    print i;
                }
                return count;
            }
            var counter = makeCounter();
            counter();
            counter();
            "#,
            &["1", "2"],
        );
    }

    #[test]
    fn test_closures_share_captured_environment() {
        assert_prints(
            r#"
            var get;
            var set;
            fun pair() {
                var v = "initial";
                fun g() { return v; }
                fun s(x) { v = x; }
                get = g;
                set = s;
            }
            pair();
            set("updated");
            print get();
            "#,
            &["updated"],
        );
    }

    #[test]
    fn test_functions_are_values() {
        assert_prints(
            "fun f() {} print f; print clock; var g = f; print g == f;",
            &["<fn f>", "<native fn>", "true"],
        );
    }

    #[test]
    fn test_clock_returns_seconds() {
        assert_prints("print clock() > 1000000000;", &["true"]);
    }

    #[test]
    fn test_deep_recursion_completes() {
        assert_prints(
            "fun c(n) { if (n > 0) return c(n - 1); return 0; } print c(3000);",
            &["0"],
        );
    }

    #[test]
    fn test_runaway_recursion_is_a_runtime_error() {
        assert_runtime_error(
            "fun c(n) {\n  return c(n + 1);\n}\nprint \"start\";\nc(0);",
            &["start"],
            "Stack overflow.",
            2,
        );
    }

    #[test]
    fn test_call_depth_unwinds_after_overflow() {
        let out = Capture::default();
        let mut lox = Lox::with_sinks(out.clone(), Capture::default());

        lox.run("fun down() { down(); } down();");
        assert!(lox.had_runtime_error());

        lox.reset();
        lox.run("fun c(n) { if (n > 0) return c(n - 1); return n; } print c(4000);");
        assert_eq!(lox.exit_code(), 0);
        assert_eq!(out.lines(), vec!["0"]);
    }

    #[test]
    fn test_wrong_arity() {
        assert_runtime_error(
            "fun f(a, b) {}\nf(1);",
            &[],
            "Expected 2 arguments but got 1.",
            2,
        );
    }

    #[test]
    fn test_calling_a_non_callable() {
        assert_runtime_error("\"not a fn\"();", &[], "Can only call functions and classes.", 1);
    }

    // ───────────────────────────── classes ─────────────────────────────

    #[test]
    fn test_class_and_instance_display() {
        assert_prints("class Bagel {} print Bagel; print Bagel();", &["Bagel", "Bagel instance"]);
    }

    #[test]
    fn test_fields_and_methods() {
        assert_prints(
            r#"
            class Point {
                init(x, y) { this.x = x; this.y = y; }
                sum() { return this.x + this.y; }
            }
            var p = Point(1, 2);
            print p.sum();
            p.x = 10;
            print p.sum();
            p.z = "new field";
            print p.z;
            "#,
            &["3", "12", "new field"],
        );
    }

    #[test]
    fn test_bound_method_keeps_this() {
        assert_prints(
            r#"
            class Person {
                init(name) { this.name = name; }
                greet() { print "hi " + this.name; }
            }
            var greet = Person("jane").greet;
            greet();
            "#,
            &["hi jane"],
        );
    }

    #[test]
    fn test_fields_shadow_methods() {
        assert_prints(
            "class A { m() { return \"method\"; } } var a = A(); a.m = \"field\"; print a.m;",
            &["field"],
        );
    }

    #[test]
    fn test_initializer_returns_this() {
        assert_prints(
            r#"
            class Foo {
                init() { this.n = 1; return; }
            }
            var foo = Foo();
            print foo.init();
            print foo.init() == foo;
            "#,
            &["Foo instance", "true"],
        );
    }

    #[test]
    fn test_class_without_init_takes_no_arguments() {
        assert_runtime_error("class A {}\nA(1);", &[], "Expected 0 arguments but got 1.", 2);
    }

    #[test]
    fn test_initializer_arity_is_checked() {
        assert_runtime_error(
            "class A { init(a) {} }\nA();",
            &[],
            "Expected 1 arguments but got 0.",
            2,
        );
    }

    #[test]
    fn test_undefined_property() {
        assert_runtime_error(
            "class A {}\nvar a = A();\nprint a.missing;",
            &[],
            "Undefined property 'missing'.",
            3,
        );
    }

    #[test]
    fn test_properties_need_instances() {
        assert_runtime_error("var x = 1;\nprint x.y;", &[], "Only instances have properties.", 2);
        assert_runtime_error("var x = 1;\nx.y = 2;", &[], "Only instances have fields.", 2);
    }

    #[test]
    fn test_methods_can_name_their_class() {
        assert_prints(
            "class Node { make() { return Node(); } } print Node().make();",
            &["Node instance"],
        );
    }

    // ───────────────────────────── inheritance ─────────────────────────────

    #[test]
    fn test_inherited_methods() {
        assert_prints(
            "class A { hello() { print \"hello from A\"; } } class B < A {} B().hello();",
            &["hello from A"],
        );
    }

    #[test]
    fn test_super_dispatch() {
        assert_prints(
            r#"
            class A { method() { print "A"; } }
            class B < A {
                method() {
                    super.method();
                    print "B";
                }
            }
            B().method();
            "#,
            &["A", "B"],
        );
    }

    #[test]
    fn test_super_binds_to_the_declaring_class() {
        assert_prints(
            r#"
            class A { method() { print "A method"; } }
            class B < A {
                method() { print "B method"; }
                test() { super.method(); }
            }
            class C < B {}
            C().test();
            "#,
            &["A method"],
        );
    }

    #[test]
    fn test_super_initializer_chain() {
        assert_prints(
            r#"
            class Base { init(a) { this.a = a; } }
            class Derived < Base {
                init(a, b) { super.init(a); this.b = b; }
            }
            var d = Derived(1, 2);
            print d.a + d.b;
            "#,
            &["3"],
        );
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        assert_runtime_error(
            "var NotAClass = \"so not a class\";\nclass Sub < NotAClass {}",
            &[],
            "Superclass must be a class.",
            2,
        );
    }

    #[test]
    fn test_undefined_super_method() {
        assert_runtime_error(
            "class A {}\nclass B < A { m() { super.missing(); } }\nB().m();",
            &[],
            "Undefined property 'missing'.",
            2,
        );
    }

    // ───────────────────────────── session ─────────────────────────────

    #[test]
    fn test_static_errors_prevent_execution() {
        let outcome = run("print 1;\nprint ;");

        assert!(outcome.out.is_empty());
        assert_eq!(outcome.err, vec!["[line 2] Error at ';': Expect expression."]);
        assert_eq!(outcome.code, EXIT_STATIC_ERROR);
    }

    #[test]
    fn test_lexical_errors_prevent_execution() {
        let outcome = run("print 1;\n@");

        assert!(outcome.out.is_empty());
        assert_eq!(outcome.err, vec!["[line 2] Error: Unexpected character."]);
        assert_eq!(outcome.code, EXIT_STATIC_ERROR);
    }

    #[test]
    fn test_globals_survive_between_runs() {
        let out = Capture::default();
        let mut lox = Lox::with_sinks(out.clone(), Capture::default());

        lox.run("var a = 1;");
        lox.run("print nope;");
        assert!(lox.had_runtime_error());

        lox.reset();
        assert_eq!(lox.exit_code(), 0);

        lox.run("a = a + 1; print a;");
        assert_eq!(out.lines(), vec!["2"]);
    }

    #[test]
    fn test_evaluate_single_expression() {
        let err = Capture::default();
        let mut lox = Lox::with_sinks(Capture::default(), err.clone());

        assert_eq!(lox.evaluate("(1 + 2) * 3").as_deref(), Some("9"));
        assert_eq!(lox.evaluate("\"a\" + \"b\"").as_deref(), Some("ab"));

        assert_eq!(lox.evaluate("1 +"), None);
        assert!(lox.had_error());
        assert_eq!(err.lines(), vec!["[line 1] Error at end: Expect expression."]);

        lox.reset();
        err.clear();
        assert_eq!(lox.evaluate("1 2"), None);
        assert_eq!(err.lines(), vec!["[line 1] Error at '2': Expect end of expression."]);

        lox.reset();
        assert_eq!(lox.evaluate("-nil"), None);
        assert!(lox.had_runtime_error());
    }

    #[test]
    fn test_evaluate_resolves_before_running() {
        let err = Capture::default();
        let mut lox = Lox::with_sinks(Capture::default(), err.clone());

        assert_eq!(lox.evaluate("this"), None);
        assert!(lox.had_error());
        assert!(!lox.had_runtime_error());
        assert_eq!(lox.exit_code(), EXIT_STATIC_ERROR);
        assert_eq!(err.lines(), vec![
            "[line 1] Error at 'this': Can't use 'this' outside of a class."
        ]);
    }
}
