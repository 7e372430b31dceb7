use std::cell::RefCell;
use std::fmt::Debug;
use std::fmt::Display;
use std::rc::Rc;

use crate::class::{Class, Instance, Metaclass};
use crate::environment::{EnvRef, Environment};
use crate::error::{RuntimeError, Signal};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::Stmt;
use crate::token::{Token, Type};

/// Distinguishes how a `Function` should stringify; has no effect on calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Method,
    Lambda,
}

/// A user-defined function, method, or getter. `params` is `None` for a
/// getter body (`name -> expr;`); `closure` is the frame chain captured at
/// definition time, shared (not copied) across every call.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Option<Token>,
    pub params: Option<Vec<Token>>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Option<EnvRef>,
    pub is_initializer: bool,
    pub kind: FunctionKind,
}

impl Function {
    pub fn new(
        name: Option<Token>,
        params: Option<Vec<Token>>,
        body: Rc<Vec<Stmt>>,
        closure: Option<EnvRef>,
        is_initializer: bool,
        kind: FunctionKind,
    ) -> Self {
        Function { name, params, body, closure, is_initializer, kind }
    }

    /// Produces a copy of this method whose closure is a fresh frame with
    /// `this` bound to `instance`, enclosing the method's original closure.
    /// Used both for instance methods and, with the class object itself as
    /// the bound value, for static methods.
    pub fn bind(&self, this: Object) -> Function {
        let mut environment = Environment::new(self.closure.clone());
        environment.define(this);
        Function { closure: Some(Rc::new(RefCell::new(environment))), ..self.clone() }
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Signal> {
        let mut environment = Environment::new(self.closure.clone());
        for argument in arguments {
            environment.define(argument);
        }
        let environment = Rc::new(RefCell::new(environment));

        let this_value = || self.closure.as_ref().map(|closure| closure.borrow().get_at(0, 0));

        match interpreter.execute_block(&self.body, environment) {
            Ok(()) => Ok(if self.is_initializer {
                this_value().expect("initializer always has a bound `this`")
            } else {
                Object::from(Literal::Nil)
            }),
            Err(Signal::Return(value)) => Ok(if self.is_initializer {
                this_value().expect("initializer always has a bound `this`")
            } else {
                value
            }),
            Err(other) => Err(other),
        }
    }

    fn arity(&self) -> usize {
        self.params.as_ref().map_or(0, Vec::len)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, &self.name) {
            (FunctionKind::Lambda, _) => write!(f, "<lambda>"),
            (FunctionKind::Method, Some(name)) => write!(f, "<method {}>", name.lexeme),
            (FunctionKind::Function, Some(name)) => write!(f, "<fn {}>", name.lexeme),
            (_, None) => write!(f, "<lambda>"),
        }
    }
}

/// A builtin implemented in Rust rather than Lox. `arity` is tracked
/// alongside the function pointer since, unlike `Function`, there is no
/// parameter list to count.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, Signal>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Signal> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    /// The builtins installed into globals at interpreter construction.
    pub fn builtins() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: "clock",
                arity: 0,
                function: |_, _| {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .expect("system clock is before the epoch")
                        .as_secs_f64();
                    Ok(Object::from(now))
                },
            },
            NativeFunction {
                name: "input",
                arity: 0,
                function: |_, _| {
                    let mut input = String::new();
                    std::io::stdin()
                        .read_line(&mut input)
                        .map_err(|err| Signal::Error(RuntimeError {
                            token: Token::new(Type::Identifier, "input".to_string(), None, 0),
                            message: format!("Failed to read from stdin: {err}"),
                        }))?;
                    Ok(Object::from(input.trim_end_matches(['\n', '\r']).to_string()))
                },
            },
            NativeFunction {
                name: "number",
                arity: 1,
                function: |_, mut arguments| {
                    let argument = arguments.remove(0);
                    Ok(match &argument {
                        Object::Literal(Literal::Number(_)) => argument,
                        Object::Literal(Literal::String(s)) => {
                            s.trim().parse::<f64>().map(Object::from).unwrap_or(Object::from(Literal::Nil))
                        }
                        _ => Object::from(Literal::Nil),
                    })
                },
            },
            NativeFunction {
                name: "exit",
                arity: 0,
                function: |_, _| Err(Signal::Exit),
            },
        ]
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
