use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::function::Function;
use crate::object::Object;
use crate::token::Token;

/// The metaclass holding a class's static methods. `this` inside a static
/// method resolves to the `Class` object itself (see `Class::get_static_method`
/// and `Interpreter::visit_this_expr`), not to an instance of this struct —
/// `Metaclass` only exists to own the static method table and its own
/// superclass chain, mirroring how `Class` owns instance methods.
#[derive(Debug, Clone, Default)]
pub struct Metaclass {
    pub methods: HashMap<String, Function>,
    pub superclass: Option<Rc<RefCell<Metaclass>>>,
}

impl Metaclass {
    pub fn get_method(&self, name: &str) -> Option<Function> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }
        self.superclass.as_ref().and_then(|superclass| superclass.borrow().get_method(name))
    }
}

#[derive(Clone)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<RefCell<Class>>>,
    pub methods: HashMap<String, Function>,
    pub metaclass: Rc<RefCell<Metaclass>>,
}

impl Class {
    pub fn new(
        name: String,
        superclass: Option<Rc<RefCell<Class>>>,
        methods: HashMap<String, Function>,
        metaclass: Rc<RefCell<Metaclass>>,
    ) -> Self {
        Class { name, superclass, methods, metaclass }
    }

    pub fn get_method(&self, name: &str) -> Option<Function> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }
        self.superclass.as_ref().and_then(|superclass| superclass.borrow().get_method(name))
    }

    pub fn get_static_method(&self, name: &str) -> Option<Function> {
        self.metaclass.borrow().get_method(name)
    }

    pub fn find_initializer(&self) -> Option<Function> {
        self.get_method("init")
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

#[derive(Clone)]
pub struct Instance {
    pub class: Rc<RefCell<Class>>,
    pub fields: HashMap<String, Object>,
}

impl Instance {
    pub fn new(class: Rc<RefCell<Class>>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance of {}>", self.class.borrow().name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance of {}>", self.class.borrow().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_class(name: &str, methods: HashMap<String, Function>) -> Rc<RefCell<Class>> {
        Rc::new(RefCell::new(Class::new(
            name.to_string(),
            None,
            methods,
            Rc::new(RefCell::new(Metaclass::default())),
        )))
    }

    #[test]
    fn method_lookup_walks_superclass_chain() {
        let base = make_class("Base", HashMap::new());
        let derived = Rc::new(RefCell::new(Class::new(
            "Derived".to_string(),
            Some(Rc::clone(&base)),
            HashMap::new(),
            Rc::new(RefCell::new(Metaclass::default())),
        )));
        assert!(derived.borrow().get_method("missing").is_none());
    }

    #[test]
    fn field_set_then_get_round_trips() {
        let class = make_class("Point", HashMap::new());
        let mut instance = Instance::new(class);
        let name = Token::new(crate::token::Type::Identifier, "x".to_string(), None, 1);
        instance.set(&name, Object::from(1.0));
        assert_eq!(instance.fields.get("x"), Some(&Object::from(1.0)));
    }
}
