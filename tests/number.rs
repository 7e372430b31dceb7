#[macro_use]
mod common;

#[cfg(test)]
mod number {
    tests! {
        trailing_dot_without_a_digit_is_a_parse_error is ERR "1.;"
    }

    tests! {
        leading_dot_is_a_parse_error is ERR ".5;"
    }

    tests! {
        literals_print_without_a_trailing_fraction is OK r#"
            print 123;
            print 987654;
            print 0;
            print 123.456;
            print -0.001;
        "#;
        "123", "987654", "0", "123.456", "-0.001"
    }

    tests! {
        division_by_zero_follows_ieee_754 is OK r#"
            print 1 / 0;
            print -1 / 0;
        "#;
        "Infinity", "-Infinity"
    }

    tests! {
        nan_is_never_equal_to_itself is OK r#"
            print (0 / 0) == (0 / 0);
            print (0 / 0) != (0 / 0);
        "#;
        "false", "true"
    }

    tests! {
        nan_compares_false_in_every_direction is OK r#"
            var nan = 0 / 0;
            print nan < 1;
            print nan > 1;
            print nan <= nan;
        "#;
        "false", "false", "false"
    }
}
