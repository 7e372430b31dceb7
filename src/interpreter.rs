use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::rc::Rc;

use crate::class::{Class, Instance, Metaclass};
use crate::environment::{EnvRef, Environment, Globals};
use crate::error::{RuntimeError, Signal};
use crate::expr::{
    AssignData, BinaryData, CallData, ConditionalData, Expr, ExprId, ExprVisitor, FunctionExprData,
    GetData, GroupingData, LogicalData, SetData, SuperData, ThisData, UnaryData, VariableData,
};
use crate::function::{Function, FunctionKind, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::{Token, Type};

/// Walks the resolved tree, evaluating expressions and executing statements
/// against a chain of positional [`Environment`] frames rooted at [`Globals`].
/// `environment` is `None` whenever execution is at top level — the same
/// convention the resolver's (empty) scope stack uses — and `Some` inside any
/// block, function body, or method body.
pub struct Interpreter {
    globals: Globals,
    environment: Option<EnvRef>,
    locals: HashMap<ExprId, (usize, usize)>,
    static_supers: HashSet<ExprId>,
    stdout: Box<dyn Write>,
}

impl Interpreter {
    pub fn new(stdout: Box<dyn Write>) -> Self {
        let mut globals = Globals::default();
        for native in NativeFunction::builtins() {
            globals.put_by_name(native.name, Object::from(native));
        }

        Interpreter { globals, environment: None, locals: HashMap::new(), static_supers: HashSet::new(), stdout }
    }

    /// Recorded by the resolver for every name-referring expression it finds
    /// in some enclosing scope; absent entries are addressed by name through
    /// [`Globals`] instead.
    pub fn resolve(&mut self, id: ExprId, depth: usize, slot: usize) {
        self.locals.insert(id, (depth, slot));
    }

    /// Marks a `super` expression (or bare `super(...)` call) as appearing
    /// inside a static method, so its method lookup goes through the
    /// superclass's metaclass rather than its instance methods.
    pub fn mark_static_super(&mut self, id: ExprId) {
        self.static_supers.insert(id);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            if let Err(signal) = self.execute(statement) {
                self.handle_top_level_signal(signal);
                return;
            }
        }
    }

    /// Evaluates a single bare expression for the REPL's trailing-expression
    /// form, returning `None` (having already reported or silently absorbed
    /// the signal) rather than a value when one doesn't come back.
    pub fn interpret_expression(&mut self, expr: &Expr) -> Option<Object> {
        match self.evaluate(expr) {
            Ok(value) => Some(value),
            Err(signal) => {
                self.handle_top_level_signal(signal);
                None
            }
        }
    }

    fn handle_top_level_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Error(err) => {
                use crate::error::Error;
                err.throw();
            }
            Signal::Exit => {}
            Signal::Return(_) | Signal::Break | Signal::Continue => {
                unreachable!("break/continue/return must be caught before reaching top level")
            }
        }
    }

    pub fn stringify(&self, object: &Object) -> String {
        match object {
            Object::Instance(instance) => self.stringify_instance(instance, &mut Vec::new()),
            other => other.to_string(),
        }
    }

    fn stringify_instance(&self, instance: &Rc<RefCell<Instance>>, visiting: &mut Vec<*const RefCell<Instance>>) -> String {
        let ptr = Rc::as_ptr(instance);
        let class_name = instance.borrow().class.borrow().name.clone();

        if visiting.contains(&ptr) {
            return format!("<{class_name}> {{...}}");
        }
        visiting.push(ptr);

        let fields = instance.borrow().fields.clone();
        let mut keys: Vec<&String> = fields.keys().collect();
        keys.sort();

        let rendered: Vec<String> = keys
            .into_iter()
            .map(|key| {
                let value = &fields[key];
                let value = match value {
                    Object::Instance(inner) => self.stringify_instance(inner, visiting),
                    other => self.stringify(other),
                };
                format!("{key}: {value}")
            })
            .collect();

        visiting.pop();
        format!("<{class_name}> {{ {} }}", rendered.join(", "))
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, Signal> {
        expr.accept(self)
    }

    /// Runs `body` with `environment` as the active frame, restoring whatever
    /// was active before on every exit path (normal, signal, or error).
    pub fn execute_block(&mut self, body: &[Stmt], environment: EnvRef) -> Result<(), Signal> {
        let previous = self.environment.replace(environment);

        let mut result = Ok(());
        for statement in body {
            if let Err(signal) = self.execute(statement) {
                result = Err(signal);
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn lookup_variable(&self, id: ExprId, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(&(depth, slot)) => {
                let environment = self.environment.as_ref().expect("a resolved local implies an active frame");
                Ok(environment.borrow().get_at(depth, slot))
            }
            None => self.globals.get_by_name(name),
        }
    }

    fn assign_variable(&mut self, id: ExprId, name: &Token, value: Object) -> Result<(), RuntimeError> {
        match self.locals.get(&id) {
            Some(&(depth, slot)) => {
                let environment = self.environment.as_ref().expect("a resolved local implies an active frame");
                environment.borrow_mut().assign_at(depth, slot, value);
                Ok(())
            }
            None => self.globals.assign_by_name(name, value),
        }
    }

    /// Defines `name` in whatever scope is active: a fresh slot in the
    /// current frame if one exists, or by name in [`Globals`] at top level.
    /// Mirrors the resolver's declare/define, which is likewise a no-op on
    /// an empty scope stack.
    fn define_variable(&mut self, name: &Token, value: Object) {
        match &self.environment {
            Some(environment) => {
                environment.borrow_mut().define(value);
            }
            None => self.globals.put_by_name(&name.lexeme, value),
        }
    }

    fn check_arity(&self, expected: usize, got: usize, token: &Token) -> Result<(), Signal> {
        if expected == got {
            Ok(())
        } else {
            Err(RuntimeError { token: token.clone(), message: format!("Expected {expected} arguments but got {got}.") }.into())
        }
    }

    fn is_num_or_str(object: &Object) -> bool {
        matches!(object, Object::Literal(Literal::Number(_)) | Object::Literal(Literal::String(_)))
    }

    fn numeric_operands(&self, left: &Object, right: &Object, token: &Token) -> Result<(f64, f64), Signal> {
        match (left.as_number(), right.as_number()) {
            (Some(l), Some(r)) => Ok((l, r)),
            _ => Err(RuntimeError { token: token.clone(), message: "Operands must be numbers.".to_string() }.into()),
        }
    }

    fn compare(&self, left: &Object, right: &Object, operator: &Token) -> Result<Object, Signal> {
        use std::cmp::Ordering;

        let ordering = match (left, right) {
            (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => l.partial_cmp(r),
            (Object::Literal(Literal::String(l)), Object::Literal(Literal::String(r))) => Some(l.cmp(r)),
            _ if Self::is_num_or_str(left) && Self::is_num_or_str(right) => {
                Some(self.stringify(left).cmp(&self.stringify(right)))
            }
            _ => {
                return Err(RuntimeError {
                    token: operator.clone(),
                    message: "Operands must be numbers or strings.".to_string(),
                }
                .into())
            }
        };

        // NaN is incomparable: every ordered comparison against it is false.
        let Some(ordering) = ordering else { return Ok(Object::from(false)) };

        let result = match operator.r#type {
            Type::Greater => ordering == Ordering::Greater,
            Type::GreaterEqual => ordering != Ordering::Less,
            Type::Less => ordering == Ordering::Less,
            Type::LessEqual => ordering != Ordering::Greater,
            _ => unreachable!("compare is only called for the four relational operators"),
        };

        Ok(Object::from(result))
    }

    /// Builds the frame methods close over: one enclosing `Environment` with
    /// `super` bound at slot 0 if `superclass` is present, otherwise just the
    /// class's own declaration environment unchanged.
    fn super_frame(&self, superclass: &Option<Rc<RefCell<Class>>>) -> Option<EnvRef> {
        match superclass {
            Some(superclass) => {
                let mut environment = Environment::new(self.environment.clone());
                environment.define(Object::Class(Rc::clone(superclass)));
                Some(Rc::new(RefCell::new(environment)))
            }
            None => self.environment.clone(),
        }
    }
}

impl ExprVisitor<Result<Object, Signal>> for Interpreter {
    fn visit_literal_expr(&mut self, data: &Literal) -> Result<Object, Signal> {
        Ok(Object::from(data.clone()))
    }

    fn visit_unary_expr(&mut self, data: &UnaryData) -> Result<Object, Signal> {
        let right = self.evaluate(&data.expr)?;
        match data.operator.r#type {
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            Type::Minus => {
                let n = right.as_number().ok_or_else(|| RuntimeError {
                    token: data.operator.clone(),
                    message: "Operand must be a number.".to_string(),
                })?;
                Ok(Object::from(-n))
            }
            _ => unreachable!("the parser only produces ! and - unary operators"),
        }
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) -> Result<Object, Signal> {
        // The comma operator: evaluate the left side purely for effect.
        if data.operator.r#type == Type::Comma {
            self.evaluate(&data.left)?;
            return self.evaluate(&data.right);
        }

        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;

        match data.operator.r#type {
            Type::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => Ok(Object::from(l + r)),
                _ if matches!(left, Object::Literal(Literal::String(_))) || matches!(right, Object::Literal(Literal::String(_))) => {
                    Ok(Object::from(format!("{}{}", self.stringify(&left), self.stringify(&right))))
                }
                _ => Err(RuntimeError {
                    token: data.operator.clone(),
                    message: "Operands must be two numbers or contain a string.".to_string(),
                }
                .into()),
            },
            Type::Minus => {
                let (l, r) = self.numeric_operands(&left, &right, &data.operator)?;
                Ok(Object::from(l - r))
            }
            Type::Star => {
                let (l, r) = self.numeric_operands(&left, &right, &data.operator)?;
                Ok(Object::from(l * r))
            }
            Type::Slash => {
                let (l, r) = self.numeric_operands(&left, &right, &data.operator)?;
                Ok(Object::from(l / r))
            }
            Type::Percent => {
                let (l, r) = self.numeric_operands(&left, &right, &data.operator)?;
                Ok(Object::from(l % r))
            }
            Type::Greater | Type::GreaterEqual | Type::Less | Type::LessEqual => {
                self.compare(&left, &right, &data.operator)
            }
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),
            _ => unreachable!("no other operator reaches a binary expression"),
        }
    }

    fn visit_logical_expr(&mut self, data: &LogicalData) -> Result<Object, Signal> {
        let left = self.evaluate(&data.left)?;

        match data.operator.r#type {
            Type::Or if left.is_truthy() => Ok(left),
            Type::Or => self.evaluate(&data.right),
            Type::And if !left.is_truthy() => Ok(left),
            Type::And => self.evaluate(&data.right),
            _ => unreachable!("the parser only produces and/or logical operators"),
        }
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) -> Result<Object, Signal> {
        self.evaluate(&data.expr)
    }

    fn visit_conditional_expr(&mut self, data: &ConditionalData) -> Result<Object, Signal> {
        if self.evaluate(&data.condition)?.is_truthy() {
            self.evaluate(&data.then_branch)
        } else {
            self.evaluate(&data.else_branch)
        }
    }

    fn visit_variable_expr(&mut self, data: &VariableData) -> Result<Object, Signal> {
        Ok(self.lookup_variable(data.id, &data.name)?)
    }

    fn visit_assign_expr(&mut self, data: &AssignData) -> Result<Object, Signal> {
        let value = self.evaluate(&data.value)?;
        self.assign_variable(data.id, &data.name, value.clone())?;
        Ok(value)
    }

    fn visit_call_expr(&mut self, data: &CallData) -> Result<Object, Signal> {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        match callee {
            Object::Function(function) => {
                self.check_arity(function.arity(), arguments.len(), &data.paren)?;
                function.call(self, arguments)
            }
            Object::NativeFunction(function) => {
                self.check_arity(function.arity(), arguments.len(), &data.paren)?;
                function.call(self, arguments)
            }
            Object::Class(class) => {
                let instance = Object::from(Instance::new(Rc::clone(&class)));
                let initializer = class.borrow().find_initializer();
                let arity = initializer.as_ref().map_or(0, Callable::arity);
                self.check_arity(arity, arguments.len(), &data.paren)?;
                if let Some(init) = initializer {
                    init.bind(instance.clone()).call(self, arguments)?;
                }
                Ok(instance)
            }
            _ => Err(RuntimeError { token: data.paren.clone(), message: "Can only call functions and classes.".to_string() }.into()),
        }
    }

    fn visit_get_expr(&mut self, data: &GetData) -> Result<Object, Signal> {
        let object = self.evaluate(&data.object)?;

        let method = match &object {
            Object::Instance(instance) => {
                if let Some(field) = instance.borrow().fields.get(&data.name.lexeme) {
                    return Ok(field.clone());
                }
                instance.borrow().class.borrow().get_method(&data.name.lexeme)
            }
            Object::Class(class) => class.borrow().get_static_method(&data.name.lexeme),
            _ => return Err(RuntimeError { token: data.name.clone(), message: "Only instances have properties.".to_string() }.into()),
        };

        match method {
            Some(method) => {
                let bound = method.bind(object);
                if bound.params.is_none() {
                    bound.call(self, vec![])
                } else {
                    Ok(Object::from(bound))
                }
            }
            None => Err(RuntimeError {
                token: data.name.clone(),
                message: format!("Undefined property '{}'.", data.name.lexeme),
            }
            .into()),
        }
    }

    fn visit_set_expr(&mut self, data: &SetData) -> Result<Object, Signal> {
        let object = self.evaluate(&data.object)?;
        let Object::Instance(instance) = &object else {
            return Err(RuntimeError { token: data.name.clone(), message: "Only instances have fields.".to_string() }.into());
        };

        let value = self.evaluate(&data.value)?;
        instance.borrow_mut().set(&data.name, value.clone());
        Ok(value)
    }

    fn visit_this_expr(&mut self, data: &ThisData) -> Result<Object, Signal> {
        let (depth, slot) = *self.locals.get(&data.id).expect("the resolver always resolves `this`");
        let environment = self.environment.as_ref().expect("`this` implies an active frame");
        Ok(environment.borrow().get_at(depth, slot))
    }

    fn visit_super_expr(&mut self, data: &SuperData) -> Result<Object, Signal> {
        let (depth, slot) = *self.locals.get(&data.id).expect("the resolver always resolves `super`");
        let environment = self.environment.as_ref().expect("`super` implies an active frame");
        let superclass = environment.borrow().get_at(depth, slot);
        let Object::Class(superclass) = superclass else {
            unreachable!("`super` always resolves to a class object")
        };
        // `this` always lives one frame closer than `super`, at slot 0 — see
        // how class bodies and `bind` build the environment chain.
        let this_value = environment.borrow().get_at(depth - 1, 0);

        let method = if self.static_supers.contains(&data.id) {
            superclass.borrow().get_static_method(&data.method.lexeme)
        } else {
            superclass.borrow().get_method(&data.method.lexeme)
        };

        match method {
            Some(method) => Ok(Object::from(method.bind(this_value))),
            None => Err(RuntimeError {
                token: data.method.clone(),
                message: format!("Undefined property '{}'.", data.method.lexeme),
            }
            .into()),
        }
    }

    fn visit_function_expr(&mut self, data: &FunctionExprData) -> Result<Object, Signal> {
        let function = Function::new(
            None,
            data.params.clone(),
            Rc::new(data.body.clone()),
            self.environment.clone(),
            false,
            FunctionKind::Lambda,
        );
        Ok(Object::from(function))
    }
}

impl StmtVisitor<Result<(), Signal>> for Interpreter {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Expression(data) = stmt else { unreachable!() };
        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Print(data) = stmt else { unreachable!() };
        let value = self.evaluate(&data.expr)?;
        let rendered = self.stringify(&value);
        let _ = writeln!(self.stdout, "{rendered}");
        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Var(data) = stmt else { unreachable!() };
        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };
        self.define_variable(&data.name, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Block(data) = stmt else { unreachable!() };
        let environment = Rc::new(RefCell::new(Environment::new(self.environment.clone())));
        self.execute_block(&data.statements, environment)
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::If(data) = stmt else { unreachable!() };
        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::While(data) = stmt else { unreachable!() };

        while self.evaluate(&data.condition)?.is_truthy() {
            match self.execute(&data.body) {
                Ok(()) => {}
                Err(Signal::Break) => break,
                Err(Signal::Continue) => {}
                Err(other) => return Err(other),
            }

            if let Some(increment) = &data.for_increment {
                self.evaluate(increment)?;
            }
        }

        Ok(())
    }

    fn visit_break_stmt(&mut self, _stmt: &Stmt) -> Result<(), Signal> {
        Err(Signal::Break)
    }

    fn visit_continue_stmt(&mut self, _stmt: &Stmt) -> Result<(), Signal> {
        Err(Signal::Continue)
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Return(data) = stmt else { unreachable!() };
        let value = match &data.value {
            Some(expr) => self.evaluate(expr)?,
            None => Object::from(Literal::Nil),
        };
        Err(Signal::Return(value))
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Function(data) = stmt else { unreachable!() };
        let function = Function::new(
            Some(data.name.clone()),
            data.params.clone(),
            Rc::new(data.body.clone()),
            self.environment.clone(),
            false,
            FunctionKind::Function,
        );
        self.define_variable(&data.name, Object::from(function));
        Ok(())
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::Class(data) = stmt else { unreachable!() };

        let superclass = match &data.superclass {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                let Object::Class(class) = value else {
                    let Expr::Variable(variable) = expr else { unreachable!("a superclass expression is always a Variable") };
                    return Err(RuntimeError { token: variable.name.clone(), message: "Superclass must be a class.".to_string() }.into());
                };
                Some(class)
            }
            None => None,
        };

        // Instance and static methods each get their own `super`-holding
        // frame (only when there is a superclass) enclosing the class's
        // declaration environment; `bind` layers `this` on top of it later.
        let method_env = self.super_frame(&superclass);
        let mut methods = HashMap::new();
        for method_stmt in &data.methods {
            let Stmt::Function(f) = method_stmt else { unreachable!() };
            let is_initializer = f.name.lexeme == "init";
            let function = Function::new(
                Some(f.name.clone()),
                f.params.clone(),
                Rc::new(f.body.clone()),
                method_env.clone(),
                is_initializer,
                FunctionKind::Method,
            );
            methods.insert(f.name.lexeme.clone(), function);
        }

        let static_method_env = self.super_frame(&superclass);
        let mut class_methods = HashMap::new();
        for method_stmt in &data.class_methods {
            let Stmt::Function(f) = method_stmt else { unreachable!() };
            let function = Function::new(
                Some(f.name.clone()),
                f.params.clone(),
                Rc::new(f.body.clone()),
                static_method_env.clone(),
                false,
                FunctionKind::Method,
            );
            class_methods.insert(f.name.lexeme.clone(), function);
        }

        let metaclass_superclass = superclass.as_ref().map(|sc| Rc::clone(&sc.borrow().metaclass));
        let metaclass = Rc::new(RefCell::new(Metaclass { methods: class_methods, superclass: metaclass_superclass }));

        let class = Rc::new(RefCell::new(Class::new(data.name.lexeme.clone(), superclass, methods, metaclass)));
        self.define_variable(&data.name, Object::from(class));
        Ok(())
    }

    fn visit_init_super_stmt(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        let Stmt::InitSuper(data) = stmt else { unreachable!() };

        let (depth, slot) = *self.locals.get(&data.id).expect("the resolver always resolves `super`");
        let environment = self.environment.as_ref().expect("`super` implies an active frame");
        let superclass = environment.borrow().get_at(depth, slot);
        let Object::Class(superclass) = superclass else {
            unreachable!("`super` always resolves to a class object")
        };
        let this_value = environment.borrow().get_at(depth - 1, 0);

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        if let Some(init) = superclass.borrow().find_initializer() {
            let bound = init.bind(this_value);
            self.check_arity(bound.arity(), arguments.len(), &data.paren)?;
            bound.call(self, arguments)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);
    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn run(source: &str) -> String {
        crate::error::reset_error();
        let buffer: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));

        let mut interpreter = Interpreter::new(Box::new(SharedBuffer(Rc::clone(&buffer))));
        let tokens = Scanner::new(source).scan_tokens();
        let statements = Parser::new(tokens).parse();
        Resolver::new(&mut interpreter).resolve(&statements);
        interpreter.interpret(&statements);

        let bytes = buffer.borrow().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn arithmetic_and_precedence() {
        assert_eq!(run("print 1 + 2 * 3;"), "7\n");
        assert_eq!(run("print (1 + 2) * 3;"), "9\n");
        assert_eq!(run("print 7 % 3;"), "1\n");
    }

    #[test]
    fn string_concatenation_stringifies_numbers() {
        assert_eq!(run(r#"print "n = " + 3;"#), "n = 3\n");
    }

    #[test]
    fn mixed_comparison_falls_back_to_lexicographic() {
        assert_eq!(run(r#"print 9 < "10";"#), "false\n");
    }

    #[test]
    fn closures_capture_by_reference() {
        let source = r#"
            fun counter() {
                var n = 0;
                fun inc() { n = n + 1; return n; }
                return inc;
            }
            var c = counter();
            print c();
            print c();
        "#;
        assert_eq!(run(source), "1\n2\n");
    }

    #[test]
    fn classes_and_inheritance() {
        let source = r#"
            class Animal {
                init(name) { this.name = name; }
                speak() { return this.name + " makes a sound."; }
            }
            class Dog < Animal {
                speak() { return super.speak() + " Woof!"; }
            }
            print Dog("Rex").speak();
        "#;
        assert_eq!(run(source), "Rex makes a sound. Woof!\n");
    }

    #[test]
    fn getters_invoke_without_call_syntax() {
        let source = r#"
            class Circle {
                init(r) { this.r = r; }
                area -> 3 * this.r * this.r;
            }
            print Circle(2).area;
        "#;
        assert_eq!(run(source), "12\n");
    }

    #[test]
    fn static_methods_share_class_identity() {
        let source = r#"
            class M {
                static id() { return M; }
            }
            print M.id() == M;
        "#;
        assert_eq!(run(source), "true\n");
    }

    #[test]
    fn break_and_continue_still_run_for_increment() {
        let source = r#"
            for (var i = 0; i < 5; i = i + 1) {
                if (i == 2) continue;
                if (i == 4) break;
                print i;
            }
        "#;
        assert_eq!(run(source), "0\n1\n3\n");
    }

    #[test]
    fn instance_stringification_dumps_fields_sorted() {
        let source = r#"
            class Point { }
            var p = Point();
            p.y = 2;
            p.x = 1;
            print p;
        "#;
        assert_eq!(run(source), "<Point> { x: 1, y: 2 }\n");
    }

    #[test]
    fn cyclic_instance_field_does_not_recurse_forever() {
        let source = r#"
            class Node { }
            var a = Node();
            var b = Node();
            a.next = b;
            b.next = a;
            print a;
        "#;
        let output = run(source);
        assert!(output.contains("{...}"));
    }
}
