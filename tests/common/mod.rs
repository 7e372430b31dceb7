use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use rocks_lang::Lox;

struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Runs `source` and returns whatever it printed. Panics if a static or
/// runtime error was reported, since `is OK` tests are expected to succeed.
pub fn run_ok(source: &str) -> String {
    let (output, had_error, had_runtime_error) = run(source);
    assert!(!had_error && !had_runtime_error, "expected no error, got output: {output:?}");
    output
}

/// Runs `source` and asserts that either a static or a runtime error was
/// reported, returning whatever it printed before failing.
pub fn run_err(source: &str) -> String {
    let (output, had_error, had_runtime_error) = run(source);
    assert!(had_error || had_runtime_error, "expected an error, got output: {output:?}");
    output
}

fn run(source: &str) -> (String, bool, bool) {
    rocks_lang::error::reset_error();
    let buffer: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));

    let mut lox = Lox::with_writer(Box::new(SharedBuffer(Rc::clone(&buffer))));
    lox.run_source(source);

    let had_error = rocks_lang::error::did_error();
    let had_runtime_error = rocks_lang::error::did_runtime_error();
    rocks_lang::error::reset_error();

    let bytes = buffer.borrow().clone();
    (String::from_utf8(bytes).expect("program output is valid utf8"), had_error, had_runtime_error)
}

/// `tests! { name is OK "source"; "line1", "line2" }` asserts the printed
/// output, line by line. `tests! { name is ERR "source" }` only asserts that
/// running the source reported an error, since exact diagnostic text is an
/// implementation detail the tests shouldn't pin down.
#[macro_export]
macro_rules! tests {
    ($name:ident is OK $source:expr; $($expected:expr),* $(,)?) => {
        #[test]
        fn $name() {
            let mut expected = vec![$($expected),*];
            let expected = if expected.is_empty() {
                String::new()
            } else {
                expected.push("");
                expected.join("\n")
            };

            assert_eq!($crate::common::run_ok($source), expected);
        }
    };

    ($name:ident is ERR $source:expr) => {
        #[test]
        fn $name() {
            $crate::common::run_err($source);
        }
    };
}
