#![allow(clippy::needless_return)]

//! Rocks is a programming language written in Rust. It is a dynamically typed language with
//! lexical scoping and first-class functions. Rocks is a tree-walk interpreter with a hand-written
//! recursive descent parser.
//!
//! Rocks is a dynamically typed language. This means that the type of a variable is determined at
//! runtime. This is in contrast to statically typed languages, where the type of a variable is
//! determined at compile time. Dynamically typed languages are often easier to use, but are
//! generally slower than statically typed languages.
//!
//! Rocks is a tree-walk interpreter. This means that the interpreter walks the abstract syntax tree
//! (AST) and evaluates each node. This is in contrast to a compiler, which would convert the AST
//! into bytecode or machine code. Tree-walk interpreters are generally easier to implement than
//! compilers, but are generally slower than compilers.
//!
//! This project is inspired by the [Crafting Interpreters](https://craftinginterpreters.com/) book
//! by Bob Nystrom, extended with a handful of conveniences (ternaries, the comma operator, getters,
//! static methods, `break`/`continue`, and a couple of native functions) beyond the book's Lox.
//!
//! ## Scanning
//! The first step in the interpreter is scanning. Scanning is the process of converting a string of
//! characters into a list of tokens. A token is a single unit of a programming language. For
//! example, the string `1 + 2` would be converted into the following tokens:
//! ```text
//! [Number(1), Plus, Number(2)]
//! ```
//! The scanner is implemented in the [`scanner`](scanner) module as an iterator over the characters
//! in the source code.
//!
//! The scanner reports syntax errors in the source code as a [`ScanError`](error::ScanError).
//! Scan errors are reported as soon as they are encountered, and scanning continues afterward so
//! the user can see every lexical problem in one pass.
//!
//! ## Parsing
//! The second step in the interpreter is parsing. Parsing is the process of converting a list of
//! tokens into an abstract syntax tree (AST). The parser is implemented in the [`parser`](parser)
//! module as a recursive descent parser. [`Expressions`](expr::Expr) are pieces of code that
//! produce a value, specifically an [`Object`](object::Object). [`Statements`](stmt::Stmt) are
//! pieces of code that perform some side effect instead of producing a value.
//!
//! The parser reports syntax errors in the source code as a [`ParseError`](error::ParseError) and
//! recovers from them via synchronization, so it too can report more than one error per run.
//!
//! ## Resolving
//! The third step in the interpreter is resolving: a static pass over the AST that assigns every
//! variable reference a `(depth, slot)` address ahead of time, so the interpreter never has to walk
//! environments by name at runtime. The resolver is implemented in the [`resolver`](resolver)
//! module and reports errors as a [`ResolveError`](error::ResolveError) — problems that are
//! syntactically valid but semantically invalid, such as reading a local variable in its own
//! initializer.
//!
//! ## Interpreting
//! The final step is interpreting: walking the resolved AST and evaluating it. The interpreter is
//! implemented in the [`interpreter`](interpreter) module and reports errors as a
//! [`RuntimeError`](error::RuntimeError) — failures that can only be caught while the program is
//! running, such as adding a string to a number. The interpreter also owns the chain of
//! [`Environment`](environment::Environment) frames that implements lexical scoping.

use std::io::{self, Write};
use std::{fs, process};

pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use parser::{Parser, ReplOutcome};
use resolver::Resolver;
use scanner::Scanner;

/// The driving end of the interpreter pipeline: owns the long-lived
/// [`Interpreter`](interpreter::Interpreter) (so top-level declarations and
/// closures survive across REPL lines) and dispatches source through
/// scanning, parsing, resolving, and interpreting in turn, stopping early at
/// the first stage that reports an error.
pub struct Lox {
    interpreter: interpreter::Interpreter,
}

impl Lox {
    pub fn new() -> Self {
        Lox { interpreter: interpreter::Interpreter::new(Box::new(io::stdout())) }
    }

    /// Builds a `Lox` whose `print` statements write to `writer` instead of
    /// stdout, for capturing output in tests.
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Lox { interpreter: interpreter::Interpreter::new(writer) }
    }

    pub fn run_file(&mut self, path: &str) {
        let contents = fs::read_to_string(path).unwrap_or_else(|err| {
            eprintln!("Could not read file '{path}': {err}");
            process::exit(64);
        });

        self.run(&contents);
        self.exit_with_pending_error();
    }

    /// Runs `source` directly without touching the filesystem or the exit
    /// code, for embedding the interpreter in another process (or a test).
    pub fn run_source(&mut self, source: &str) {
        self.run(source);
    }

    pub fn run_prompt(&mut self) {
        let mut editor = rustyline::DefaultEditor::new().expect("failed to initialize line editor");

        let history_path = home::home_dir().map(|mut home| {
            home.push(".rocks_history");
            home
        });
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        loop {
            let line = match editor.readline("> ") {
                Ok(line) => line,
                Err(_) => break,
            };

            let trimmed = line.trim().trim_end_matches(';').trim();
            if trimmed == "exit()" {
                break;
            }

            let _ = editor.add_history_entry(line.as_str());
            self.run_repl_line(&line);
            error::reset_error();
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }
    }

    fn run_repl_line(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan_tokens();
        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        match parser.parse_repl() {
            ReplOutcome::Expression(expr) => {
                let mut resolver = Resolver::new(&mut self.interpreter);
                resolver.resolve_expression(&expr);
                if error::did_error() {
                    return;
                }

                if let Some(value) = self.interpreter.interpret_expression(&expr) {
                    println!("= {}", self.interpreter.stringify(&value));
                }
            }
            ReplOutcome::Statements(statements) => {
                let mut resolver = Resolver::new(&mut self.interpreter);
                resolver.resolve(&statements);
                if error::did_error() {
                    return;
                }

                self.interpreter.interpret(&statements);
            }
        }
    }

    fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan_tokens();
        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();
        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);
        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }

    /// Exits the process with the conventional code for whichever error
    /// category (if any) was reported, favoring a static error over a
    /// runtime one when somehow both occurred.
    fn exit_with_pending_error(&self) {
        if error::did_error() {
            process::exit(65);
        }
        if error::did_runtime_error() {
            process::exit(70);
        }
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}
