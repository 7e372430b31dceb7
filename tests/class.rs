#[macro_use]
mod common;

#[cfg(test)]
mod class {
    tests! {
        empty_class_prints_its_name is OK r#"
            class Foo {}
            print Foo;
        "#;
        "<class Foo>"
    }

    tests! {
        inherit_self_is_resolve_error is ERR "class Foo < Foo {}"
    }

    tests! {
        inherited_method_is_visible_through_instance is OK r#"
            class A {
                foo() { print "in foo"; }
            }
            class B < A {
                bar() { print "in bar"; }
            }
            class C < B {
                baz() { print "in baz"; }
            }

            var c = C();
            c.foo();
            c.bar();
            c.baz();
        "#;
        "in foo", "in bar", "in baz"
    }

    tests! {
        reference_self_inside_a_method is OK r#"
            class Foo {
                identity() { return Foo; }
            }
            print Foo().identity();
        "#;
        "<class Foo>"
    }

    tests! {
        inherit_from_non_class_is_runtime_error is ERR r#"
            var NotAClass = 123;
            class Foo < NotAClass {}
        "#
    }
}
