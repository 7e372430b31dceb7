#[macro_use]
mod common;

#[cfg(test)]
mod regression {
    tests! {
        printing_a_class_itself_shows_its_name is OK r#"
            class B {}
            print B;
        "#;
        "<class B>"
    }

    tests! {
        printing_a_top_level_function_shows_its_name is OK r#"
            fun f() {}
            print f;
        "#;
        "<fn f>"
    }

    tests! {
        returning_from_the_middle_of_a_nested_loop_unwinds_both is OK r#"
            fun find() {
                for (var i = 0; i < 5; i = i + 1) {
                    while (true) {
                        return i;
                    }
                }
                return -1;
            }
            print find();
        "#;
        "0"
    }

    tests! {
        a_field_shadowing_a_method_name_reads_back_the_field is OK r#"
            class Box {
                value() { return "method"; }
            }
            var box = Box();
            box.value = "field";
            print box.value;
        "#;
        "field"
    }

    tests! {
        closures_created_in_a_loop_each_capture_their_own_iteration_variable is OK r#"
            fun run() {
                for (var i = 0; i < 3; i = i + 1) {
                    fun show() { print i; }
                    show();
                }
            }
            run();
        "#;
        "0", "1", "2"
    }
}
