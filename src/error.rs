use std::sync::atomic::{AtomicBool, Ordering};

use crate::object::Object;
use crate::token::{Token, Type};

static HAD_ERROR: AtomicBool = AtomicBool::new(false);
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// True once any static (scan/parse/resolve) error has been reported.
pub fn did_error() -> bool {
    HAD_ERROR.load(Ordering::SeqCst)
}

/// True once a runtime error has been reported.
pub fn did_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.load(Ordering::SeqCst)
}

/// Resets both flags. Used between REPL lines so one bad line doesn't
/// poison the exit-code bookkeeping for the rest of the session.
pub fn reset_error() {
    HAD_ERROR.store(false, Ordering::SeqCst);
    HAD_RUNTIME_ERROR.store(false, Ordering::SeqCst);
}

/// Every error kind implements this; `throw` formats to stderr and flips
/// the shared flag the driver consults for exit-code selection.
pub trait Error {
    fn throw(&self);
}

/// Lexical error: unterminated string, unexpected character, and the like.
#[derive(Debug, Clone)]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl Error for ScanError {
    fn throw(&self) {
        eprintln!("[line {line}] Error: {message}", line = self.line, message = self.message);
        HAD_ERROR.store(true, Ordering::SeqCst);
    }
}

/// Grammar violation caught by the parser; recovered from via `synchronize`.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Error for ParseError {
    fn throw(&self) {
        if self.token.r#type == Type::EOF {
            eprintln!("[line {line}] Error at end: {message}", line = self.token.line, message = self.message);
        } else {
            eprintln!(
                "[line {line}] Error at '{lexeme}': {message}",
                line = self.token.line,
                lexeme = self.token.lexeme,
                message = self.message
            );
        }
        HAD_ERROR.store(true, Ordering::SeqCst);
    }
}

/// Static scoping violation (bad `this`/`super`/`break`/`return`, shadowing
/// in the same scope, unused local) caught by the resolver.
#[derive(Debug, Clone)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Error for ResolveError {
    fn throw(&self) {
        if self.token.r#type == Type::EOF {
            eprintln!("[line {line}] Error at end: {message}", line = self.token.line, message = self.message);
        } else {
            eprintln!(
                "[line {line}] Error at '{lexeme}': {message}",
                line = self.token.line,
                lexeme = self.token.lexeme,
                message = self.message
            );
        }
        HAD_ERROR.store(true, Ordering::SeqCst);
    }
}

/// An operand-type, arity, or unknown-name failure raised while executing.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Error for RuntimeError {
    fn throw(&self) {
        eprintln!("{message}\n[line {line}]", message = self.message, line = self.token.line);
        HAD_RUNTIME_ERROR.store(true, Ordering::SeqCst);
    }
}

/// Every non-local exit the evaluator can produce. `Return`/`Break`/
/// `Continue`/`Exit` carry no user-visible message and are caught exactly
/// once by the construct that owns them (function call, loop, `interpret`);
/// `Error` is the only variant that ever reaches the shared error sink.
#[derive(Debug, Clone)]
pub enum Signal {
    Return(Object),
    Break,
    Continue,
    Exit,
    Error(RuntimeError),
}

impl From<RuntimeError> for Signal {
    fn from(error: RuntimeError) -> Self {
        Signal::Error(error)
    }
}
