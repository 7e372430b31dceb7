use std::sync::atomic::{AtomicU64, Ordering};

use crate::literal::Literal;
use crate::stmt::Stmt;
use crate::token::Token;

/// Identifies a single name-referring expression node so the resolver's
/// side table can key off it without needing pointer identity.
pub type ExprId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

pub fn next_id() -> ExprId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Unary(UnaryData),
    Binary(BinaryData),
    Logical(LogicalData),
    Grouping(GroupingData),
    Conditional(ConditionalData),
    Variable(VariableData),
    Assign(AssignData),
    Call(CallData),
    Get(GetData),
    Set(SetData),
    This(ThisData),
    Super(SuperData),
    Function(FunctionExprData),
}

#[derive(Debug, Clone)]
pub struct UnaryData {
    pub operator: Token,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct BinaryData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct LogicalData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct GroupingData {
    pub expr: Box<Expr>,
}

/// The ternary `cond ? then : else`.
#[derive(Debug, Clone)]
pub struct ConditionalData {
    pub condition: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct VariableData {
    pub id: ExprId,
    pub name: Token,
}

impl VariableData {
    pub fn new(name: Token) -> Self {
        VariableData { id: next_id(), name }
    }
}

#[derive(Debug, Clone)]
pub struct AssignData {
    pub id: ExprId,
    pub name: Token,
    pub value: Box<Expr>,
}

impl AssignData {
    pub fn new(name: Token, value: Expr) -> Self {
        AssignData { id: next_id(), name, value: Box::new(value) }
    }
}

#[derive(Debug, Clone)]
pub struct CallData {
    pub callee: Box<Expr>,
    pub paren: Token,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct GetData {
    pub object: Box<Expr>,
    pub name: Token,
}

#[derive(Debug, Clone)]
pub struct SetData {
    pub object: Box<Expr>,
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct ThisData {
    pub id: ExprId,
    pub keyword: Token,
}

impl ThisData {
    pub fn new(keyword: Token) -> Self {
        ThisData { id: next_id(), keyword }
    }
}

#[derive(Debug, Clone)]
pub struct SuperData {
    pub id: ExprId,
    pub keyword: Token,
    pub method: Token,
}

impl SuperData {
    pub fn new(keyword: Token, method: Token) -> Self {
        SuperData { id: next_id(), keyword, method }
    }
}

/// A function literal: `params` is `None` when this is a getter body
/// (`name -> expr;`), distinguishing it from a zero-argument method.
#[derive(Debug, Clone)]
pub struct FunctionExprData {
    pub params: Option<Vec<Token>>,
    pub body: Vec<Stmt>,
}

impl Expr {
    pub fn accept<T>(&self, visitor: &mut dyn ExprVisitor<T>) -> T {
        match self {
            Expr::Literal(data) => visitor.visit_literal_expr(data),
            Expr::Unary(data) => visitor.visit_unary_expr(data),
            Expr::Binary(data) => visitor.visit_binary_expr(data),
            Expr::Logical(data) => visitor.visit_logical_expr(data),
            Expr::Grouping(data) => visitor.visit_grouping_expr(data),
            Expr::Conditional(data) => visitor.visit_conditional_expr(data),
            Expr::Variable(data) => visitor.visit_variable_expr(data),
            Expr::Assign(data) => visitor.visit_assign_expr(data),
            Expr::Call(data) => visitor.visit_call_expr(data),
            Expr::Get(data) => visitor.visit_get_expr(data),
            Expr::Set(data) => visitor.visit_set_expr(data),
            Expr::This(data) => visitor.visit_this_expr(data),
            Expr::Super(data) => visitor.visit_super_expr(data),
            Expr::Function(data) => visitor.visit_function_expr(data),
        }
    }
}

pub trait ExprVisitor<T> {
    fn visit_literal_expr(&mut self, data: &Literal) -> T;
    fn visit_unary_expr(&mut self, data: &UnaryData) -> T;
    fn visit_binary_expr(&mut self, data: &BinaryData) -> T;
    fn visit_logical_expr(&mut self, data: &LogicalData) -> T;
    fn visit_grouping_expr(&mut self, data: &GroupingData) -> T;
    fn visit_conditional_expr(&mut self, data: &ConditionalData) -> T;
    fn visit_variable_expr(&mut self, data: &VariableData) -> T;
    fn visit_assign_expr(&mut self, data: &AssignData) -> T;
    fn visit_call_expr(&mut self, data: &CallData) -> T;
    fn visit_get_expr(&mut self, data: &GetData) -> T;
    fn visit_set_expr(&mut self, data: &SetData) -> T;
    fn visit_this_expr(&mut self, data: &ThisData) -> T;
    fn visit_super_expr(&mut self, data: &SuperData) -> T;
    fn visit_function_expr(&mut self, data: &FunctionExprData) -> T;
}
