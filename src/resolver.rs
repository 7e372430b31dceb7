use std::collections::HashMap;
use std::mem;

use crate::error::{Error, ResolveError};
use crate::expr::{
    AssignData, BinaryData, CallData, ConditionalData, FunctionExprData, GetData, GroupingData,
    LogicalData, SetData, SuperData, ThisData, UnaryData, VariableData,
};
use crate::expr::{Expr, ExprVisitor};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::Token;

#[derive(PartialEq, Clone, Copy)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
    StaticMethod,
}

#[derive(PartialEq, Clone, Copy)]
enum ClassType {
    None,
    Class,
    Subclass,
}

#[derive(PartialEq, Clone, Copy)]
enum VarState {
    Declared,
    Defined,
    Read,
}

struct VarInfo {
    slot: usize,
    state: VarState,
    token: Token,
}

struct Scope {
    vars: HashMap<String, VarInfo>,
    next_slot: usize,
}

impl Scope {
    fn new() -> Self {
        Scope { vars: HashMap::new(), next_slot: 0 }
    }
}

/// Walks the parsed tree once before evaluation, assigning every local
/// variable a `(depth, slot)` address the interpreter's positional
/// environment frames can index directly, instead of looking names up by
/// string at runtime. A name left unresolved here (found in no scope) is a
/// global, addressed by name instead.
pub struct Resolver<'a> {
    interpreter: &'a mut Interpreter,
    scopes: Vec<Scope>,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(interpreter: &'a mut Interpreter) -> Self {
        Resolver {
            interpreter,
            scopes: vec![],
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    /// Resolves a single bare expression, for the REPL's trailing-expression
    /// form which never goes through [`Resolver::resolve`]'s statement list.
    pub fn resolve_expression(&mut self, expr: &Expr) {
        self.resolve_expr(expr);
    }

    fn resolve_function_body(&mut self, params: Option<&Vec<Token>>, body: &[Stmt], kind: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, kind);

        self.begin_scope();
        if let Some(params) = params {
            for param in params {
                self.declare(param);
                self.define(param);
            }
        }
        self.resolve(body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    fn end_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            for (name, info) in scope.vars.iter() {
                if info.state != VarState::Read && name != "this" && name != "super" {
                    eprintln!(
                        "[line {line}] Warning: local variable '{name}' is never used.",
                        line = info.token.line
                    );
                }
            }
        }
    }

    /// Declares `name` in the innermost scope, assigning it the next free
    /// slot. A no-op at the top level: globals are addressed by name.
    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };

        if scope.vars.contains_key(&name.lexeme) {
            ResolveError {
                token: name.clone(),
                message: format!("A variable is already defined with name '{}' in this scope.", name.lexeme),
            }
            .throw();
        }

        let slot = scope.next_slot;
        scope.next_slot += 1;
        scope.vars.insert(name.lexeme.clone(), VarInfo { slot, state: VarState::Declared, token: name.clone() });
    }

    fn define(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        if let Some(info) = scope.vars.get_mut(&name.lexeme) {
            info.state = VarState::Defined;
        }
    }

    /// Defines a synthetic binding (`this`, `super`) already marked read so
    /// it never triggers the unused-local warning even when a method body
    /// never refers to it directly.
    fn define_synthetic(&mut self, name: &str) -> usize {
        let scope = self.scopes.last_mut().expect("synthetic bindings are always defined inside a scope");
        let slot = scope.next_slot;
        scope.next_slot += 1;
        scope.vars.insert(
            name.to_string(),
            VarInfo { slot, state: VarState::Read, token: Token::new(crate::token::Type::This, name.to_string(), None, 0) },
        );
        slot
    }

    fn resolve_local(&mut self, id: u64, name: &Token) {
        for (depth, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(info) = scope.vars.get_mut(&name.lexeme) {
                info.state = VarState::Read;
                self.interpreter.resolve(id, depth, info.slot);
                return;
            }
        }
    }

    fn resolve_function_stmt(&mut self, stmt: &Stmt, kind: FunctionType) {
        let Stmt::Function(function) = stmt else { unreachable!() };
        self.resolve_function_body(function.params.as_ref(), &function.body, kind);
    }
}

impl<'a> ExprVisitor<()> for Resolver<'a> {
    fn visit_literal_expr(&mut self, _data: &Literal) {}

    fn visit_unary_expr(&mut self, data: &UnaryData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) {
        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_logical_expr(&mut self, data: &LogicalData) {
        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_conditional_expr(&mut self, data: &ConditionalData) {
        self.resolve_expr(&data.condition);
        self.resolve_expr(&data.then_branch);
        self.resolve_expr(&data.else_branch);
    }

    fn visit_variable_expr(&mut self, data: &VariableData) {
        if let Some(scope) = self.scopes.last() {
            if let Some(info) = scope.vars.get(&data.name.lexeme) {
                if info.state == VarState::Declared {
                    ResolveError {
                        token: data.name.clone(),
                        message: "Cannot read local variable in its own initializer.".to_string(),
                    }
                    .throw();
                }
            }
        }

        self.resolve_local(data.id, &data.name);
    }

    fn visit_assign_expr(&mut self, data: &AssignData) {
        self.resolve_expr(&data.value);
        self.resolve_local(data.id, &data.name);
    }

    fn visit_call_expr(&mut self, data: &CallData) {
        self.resolve_expr(&data.callee);
        for argument in &data.arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get_expr(&mut self, data: &GetData) {
        self.resolve_expr(&data.object);
    }

    fn visit_set_expr(&mut self, data: &SetData) {
        self.resolve_expr(&data.value);
        self.resolve_expr(&data.object);
    }

    fn visit_this_expr(&mut self, data: &ThisData) {
        if self.current_class == ClassType::None {
            ResolveError {
                token: data.keyword.clone(),
                message: "Cannot use 'this' outside of a class.".to_string(),
            }
            .throw();
            return;
        }

        self.resolve_local(data.id, &data.keyword);
    }

    fn visit_super_expr(&mut self, data: &SuperData) {
        match self.current_class {
            ClassType::Subclass => (),
            ClassType::None => ResolveError {
                token: data.keyword.clone(),
                message: "Cannot use 'super' outside of a class.".to_string(),
            }
            .throw(),
            ClassType::Class => ResolveError {
                token: data.keyword.clone(),
                message: "Cannot use 'super' in a class with no superclass.".to_string(),
            }
            .throw(),
        }

        self.resolve_local(data.id, &data.keyword);

        if self.current_function == FunctionType::StaticMethod {
            self.interpreter.mark_static_super(data.id);
        }
    }

    fn visit_function_expr(&mut self, data: &FunctionExprData) {
        self.resolve_function_body(data.params.as_ref(), &data.body, FunctionType::Function);
    }
}

impl<'a> StmtVisitor<()> for Resolver<'a> {
    fn visit_block_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Block(block) = stmt else { unreachable!() };

        self.begin_scope();
        self.resolve(&block.statements);
        self.end_scope();
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Var(var) = stmt else { unreachable!() };

        self.declare(&var.name);
        if let Some(initializer) = &var.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&var.name);
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Function(function) = stmt else { unreachable!() };

        self.declare(&function.name);
        self.define(&function.name);

        self.resolve_function_stmt(stmt, FunctionType::Function);
    }

    fn visit_expression_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Expression(expr) = stmt else { unreachable!() };
        self.resolve_expr(&expr.expr);
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) {
        let Stmt::If(if_stmt) = stmt else { unreachable!() };

        self.resolve_expr(&if_stmt.condition);
        self.resolve_stmt(&if_stmt.then_branch);
        if let Some(else_branch) = &if_stmt.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Print(print) = stmt else { unreachable!() };
        self.resolve_expr(&print.expr);
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Return(return_stmt) = stmt else { unreachable!() };

        if self.current_function == FunctionType::None {
            ResolveError {
                token: return_stmt.keyword.clone(),
                message: "Cannot return from top-level code.".to_string(),
            }
            .throw();
        }

        if let Some(value) = &return_stmt.value {
            if self.current_function == FunctionType::Initializer {
                ResolveError {
                    token: return_stmt.keyword.clone(),
                    message: "Cannot return a value from an initializer.".to_string(),
                }
                .throw();
                return;
            }

            self.resolve_expr(value);
        }
    }

    fn visit_break_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Break(keyword) = stmt else { unreachable!() };
        if self.loop_depth == 0 {
            ResolveError { token: keyword.clone(), message: "Cannot use 'break' outside of a loop.".to_string() }.throw();
        }
    }

    fn visit_continue_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Continue(keyword) = stmt else { unreachable!() };
        if self.loop_depth == 0 {
            ResolveError { token: keyword.clone(), message: "Cannot use 'continue' outside of a loop.".to_string() }.throw();
        }
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) {
        let Stmt::While(while_stmt) = stmt else { unreachable!() };

        self.resolve_expr(&while_stmt.condition);
        self.loop_depth += 1;
        self.resolve_stmt(&while_stmt.body);
        if let Some(increment) = &while_stmt.for_increment {
            self.resolve_expr(increment);
        }
        self.loop_depth -= 1;
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Class(class_stmt) = stmt else { unreachable!() };

        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(&class_stmt.name);
        self.define(&class_stmt.name);

        if let Some(superclass) = &class_stmt.superclass {
            let Expr::Variable(variable) = superclass else { unreachable!() };
            if class_stmt.name.lexeme == variable.name.lexeme {
                ResolveError {
                    token: variable.name.clone(),
                    message: "A class cannot inherit from itself.".to_string(),
                }
                .throw();
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);
        }

        // Instance methods: an outer `super` frame (if any), then `this`.
        if class_stmt.superclass.is_some() {
            self.begin_scope();
            self.define_synthetic("super");
        }
        self.begin_scope();
        self.define_synthetic("this");

        for method in &class_stmt.methods {
            let Stmt::Function(function) = method else { unreachable!() };
            let kind = if function.name.lexeme == "init" { FunctionType::Initializer } else { FunctionType::Method };
            self.resolve_function_stmt(method, kind);
        }

        self.end_scope();
        if class_stmt.superclass.is_some() {
            self.end_scope();
        }

        // Static methods: their own `super`/`this` pair, bound at runtime to
        // the superclass and this class object themselves rather than to an
        // instance — see `class.rs`.
        if class_stmt.superclass.is_some() {
            self.begin_scope();
            self.define_synthetic("super");
        }
        self.begin_scope();
        self.define_synthetic("this");

        for method in &class_stmt.class_methods {
            let Stmt::Function(function) = method else { unreachable!() };
            self.resolve_function_stmt(method, FunctionType::StaticMethod);
        }

        self.end_scope();
        if class_stmt.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn visit_init_super_stmt(&mut self, stmt: &Stmt) {
        let Stmt::InitSuper(init_super) = stmt else { unreachable!() };

        if self.current_class != ClassType::Subclass {
            ResolveError {
                token: init_super.keyword.clone(),
                message: "Cannot use 'super' in a class with no superclass.".to_string(),
            }
            .throw();
        }

        for argument in &init_super.arguments {
            self.resolve_expr(argument);
        }

        self.resolve_local(init_super.id, &init_super.keyword);
    }
}
