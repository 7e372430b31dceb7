#[macro_use]
mod common;

#[cfg(test)]
mod _while {
    tests! {
        a_class_declaration_as_the_loop_body_is_a_parse_error is ERR r#"
            while (true) class Foo {}
        "#
    }

    tests! {
        a_fun_declaration_as_the_loop_body_is_a_parse_error is ERR r#"
            while (true) fun f() {}
        "#
    }

    tests! {
        a_var_declaration_as_the_loop_body_is_a_parse_error is ERR r#"
            while (true) var x = 1;
        "#
    }

    tests! {
        a_closure_created_each_iteration_captures_that_iterations_variable is OK r#"
            var i = 1;
            while (i <= 3) {
                var j = i;
                fun show() { print j; }
                show();
                i = i + 1;
            }
        "#;
        "1", "2", "3"
    }

    tests! {
        return_from_inside_a_while_loop_stops_the_loop is OK r#"
            fun f() {
                var i = 0;
                while (true) {
                    i = i + 1;
                    if (i == 3) return i;
                }
            }
            print f();
        "#;
        "3"
    }

    tests! {
        basic_counting_loop is OK r#"
            var i = 0;
            while (i < 3) {
                print i;
                i = i + 1;
            }
        "#;
        "0", "1", "2"
    }
}
