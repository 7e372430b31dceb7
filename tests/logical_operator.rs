#[macro_use]
mod common;

#[cfg(test)]
mod logical_operator {
    tests! {
        and_returns_the_operand_value_not_a_coerced_bool is OK r#"
            print false and 1;
            print true and 1;
            print 1 and 2 and 3;
            print 1 and false and 2;
        "#;
        "false", "1", "3", "false"
    }

    tests! {
        and_short_circuits_on_the_first_falsy_value is OK r#"
            fun sideEffect() { print "evaluated"; return true; }
            print false and sideEffect();
            print nil and sideEffect();
        "#;
        "false", "nil"
    }

    tests! {
        or_returns_the_operand_value_not_a_coerced_bool is OK r#"
            print 1 or 2;
            print false or 1;
            print nil or false;
            print false or nil;
        "#;
        "1", "1", "false", "nil"
    }

    tests! {
        or_short_circuits_on_the_first_truthy_value is OK r#"
            fun sideEffect() { print "evaluated"; return false; }
            print true or sideEffect();
            print 1 or sideEffect();
        "#;
        "true", "1"
    }
}
