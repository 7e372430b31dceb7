#[macro_use]
mod common;

#[cfg(test)]
mod misc {
    tests! {
        empty_file_produces_no_output is OK "";
    }

    tests! {
        only_whitespace_and_comments_produce_no_output is OK "  \n\t// just a comment\n  ";
    }

    tests! {
        arithmetic_precedence is OK r#"
            print 2 + 3 * 4;
            print (2 + 3) * 4;
            print 2 * 3 % 4;
            print 6 - 2 - 4;
            print 1 < 2 and 2 < 3;
            print 1 == 1.0;
            print 10 - 5 > 2 * 2;
            print !(1 == 1) or 2 == 2;
        "#;
        "14", "20", "2", "0", "true", "true", "true", "true"
    }

    tests! {
        unexpected_character_is_a_scan_error is ERR "var x = 1 | 2;"
    }
}
