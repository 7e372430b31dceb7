#[macro_use]
mod common;

#[cfg(test)]
mod assignment {
    tests! {
        associativity is OK r#"
            var a = "a";
            var b = "b";
            var c = "c";
            a = b = c;
            print a;
            print b;
            print c;
        "#;
        "c", "c", "c"
    }

    tests! {
        global is OK r#"
            var a = "before";
            print a;
            a = "after";
            print a;
        "#;
        "before", "after"
    }

    tests! {
        assignment_is_an_expression is OK r#"
            var a = 1;
            print a = 2;
            print a;
        "#;
        "2", "2"
    }

    tests! {
        local is OK r#"
            fun f() {
                var a = "before";
                print a;
                a = "after";
                print a;
            }
            f();
        "#;
        "before", "after"
    }

    tests! {
        undefined_variable_is_runtime_error is ERR "unknown = 1;"
    }

    tests! {
        grouping_is_not_a_valid_target is ERR "var a = 1; (a) = 2;"
    }

    tests! {
        this_is_not_a_valid_target is ERR r#"
            class Foo {
                bar() { this = 1; }
            }
        "#
    }
}
