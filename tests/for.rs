#[macro_use]
mod common;

#[cfg(test)]
mod _for {
    tests! {
        class_declaration_is_not_a_valid_loop_body is ERR "for (;;) class Foo {}"
    }

    tests! {
        function_declaration_is_not_a_valid_loop_body is ERR "for (;;) fun foo() {}"
    }

    tests! {
        closures_in_the_body_see_each_iterations_value is OK r#"
            for (var i = 1; i < 4; i = i + 1) {
                var j = i;
                fun show() { print j; }
                show();
            }
        "#;
        "1", "2", "3"
    }

    tests! {
        increment_runs_once_per_iteration_including_after_continue is OK r#"
            for (var i = 0; i < 5; i = i + 1) {
                if (i == 2) continue;
                print i;
            }
        "#;
        "0", "1", "3", "4"
    }

    tests! {
        all_clauses_are_optional is OK r#"
            var i = 0;
            for (;;) {
                if (i >= 3) break;
                print i;
                i = i + 1;
            }
        "#;
        "0", "1", "2"
    }

    tests! {
        return_inside_a_for_loop_exits_the_function is OK r#"
            fun f() {
                for (var i = 0; i < 10; i = i + 1) {
                    if (i == 2) return "early";
                }
                return "late";
            }
            print f();
        "#;
        "early"
    }
}
