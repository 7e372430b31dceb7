#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        redeclaring_a_local_in_the_same_scope_is_a_resolve_error is ERR r#"
            {
                var a = "first";
                var a = "second";
            }
        "#
    }

    tests! {
        a_parameter_colliding_with_a_local_is_a_resolve_error is ERR r#"
            fun f(a) {
                var a = "local";
            }
        "#
    }

    tests! {
        duplicate_parameter_names_are_a_resolve_error is ERR "fun f(arg, arg) {}"
    }

    tests! {
        a_closure_sees_updates_to_the_variable_it_closed_over is OK r#"
            var x = "before";
            fun showX() { print x; }
            showX();
            x = "after";
            showX();
        "#;
        "before", "after"
    }

    tests! {
        globals_may_be_redeclared_with_var is OK r#"
            var a = "first";
            var a = "second";
            print a;
        "#;
        "second"
    }

    tests! {
        globals_may_be_reassigned_without_var is OK r#"
            var a = 1;
            a = 2;
            print a;
        "#;
        "2"
    }

    tests! {
        a_nested_block_sees_the_enclosing_local is OK r#"
            {
                var outer = "outer";
                {
                    print outer;
                }
            }
        "#;
        "outer"
    }

    tests! {
        a_local_shadows_the_same_named_global_only_inside_its_block is OK r#"
            var a = "global";
            {
                var a = "shadow";
                print a;
            }
            print a;
        "#;
        "shadow", "global"
    }

    tests! {
        a_local_shadows_an_enclosing_local_only_inside_its_block is OK r#"
            {
                var a = "outer";
                {
                    var a = "inner";
                    print a;
                }
                print a;
            }
        "#;
        "inner", "outer"
    }

    tests! {
        separate_sibling_blocks_may_each_declare_their_own_local_without_colliding is OK r#"
            {
                var a = "first";
                print a;
            }
            {
                var a = "second";
                print a;
            }
        "#;
        "first", "second"
    }

    tests! {
        reading_an_undefined_global_is_a_runtime_error is ERR "print notDefined;"
    }

    tests! {
        reading_an_undefined_local_is_a_runtime_error is ERR r#"
            {
                print notDefined;
            }
        "#
    }

    tests! {
        a_declaration_with_no_initializer_is_nil is OK "var a; print a;"; "nil"
    }

    tests! {
        a_branch_that_never_runs_is_not_evaluated is OK r#"
            if (false) {
                print notDefined;
            }
            print "ok";
        "#;
        "ok"
    }

    tests! {
        using_false_as_a_variable_name_is_a_parse_error is ERR "var false = 1;"
    }

    tests! {
        using_nil_as_a_variable_name_is_a_parse_error is ERR "var nil = 1;"
    }

    tests! {
        using_this_as_a_variable_name_is_a_parse_error is ERR "var this = 1;"
    }

    tests! {
        a_global_initializer_may_reference_another_global is OK r#"
            var a = "value";
            var b = a;
            print b;
        "#;
        "value"
    }

    tests! {
        a_local_initializer_referencing_its_own_name_is_a_resolve_error is ERR r#"
            var a = "outer";
            {
                var a = a;
            }
        "#
    }
}
