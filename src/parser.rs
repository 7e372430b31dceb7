use crate::error::{Error, ParseError};
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, Type};

type ParseResult<T> = Result<T, ParseError>;

/// Returns whether the next token is any of the given types, consuming it
/// if so.
macro_rules! matches {
    ( $self:ident, $( $type:expr ),+ ) => {
        {
            if $( $self.check($type) ) ||* {
                $self.advance();
                true
            } else {
                false
            }
        }
    }
}

/// What `parse_repl` produced from one line of input.
pub enum ReplOutcome {
    Statements(Vec<Stmt>),
    /// The input was a single expression statement missing its trailing
    /// `;` at EOF; the driver evaluates and prints it with a `= ` prefix.
    Expression(Expr),
}

const MAX_ARGS: usize = 255;

/// Recursive-descent parser. Precedence, loosest to tightest:
/// comma, conditional (`?:`), assignment, or, and, equality, comparison,
/// term, factor, unary, call, primary. Parse errors are reported through
/// the shared sink and recovered from via `synchronize`; the public entry
/// points never propagate an `Err` out.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// True while parsing the body of a method named `init`, so a bare
    /// `super(...)` at statement position is recognized as `Stmt::InitSuper`
    /// rather than failing to parse as a `Super` expression.
    in_initializer: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0, in_initializer: false }
    }

    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    pub fn parse_repl(&mut self) -> ReplOutcome {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(expr) = self.try_trailing_expression() {
                return ReplOutcome::Expression(expr);
            }
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        ReplOutcome::Statements(statements)
    }

    /// Speculatively parses the next declaration as a bare expression with
    /// no trailing `;` reaching EOF. Rewinds on any other outcome so the
    /// normal `declaration` path handles it (including reporting errors).
    fn try_trailing_expression(&mut self) -> Option<Expr> {
        if std::matches!(
            self.peek().r#type,
            Type::Class | Type::Fun | Type::Var | Type::For | Type::If | Type::Print
                | Type::Return | Type::LeftBrace | Type::Break | Type::Continue
        ) {
            return None;
        }

        let checkpoint = self.current;
        match self.expression() {
            Ok(expr) if self.is_at_end() => Some(expr),
            _ => {
                self.current = checkpoint;
                None
            }
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> &Token {
        &self.tokens[(self.current + 1).min(self.tokens.len() - 1)]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    fn check(&self, r#type: Type) -> bool {
        !self.is_at_end() && self.peek().r#type == r#type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn consume(&mut self, r#type: Type, message: &str) -> ParseResult<&Token> {
        if self.check(r#type) {
            return Ok(self.advance());
        }
        Err(ParseError { token: self.peek().clone(), message: message.to_string() })
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let statement = if matches!(self, Type::Class) {
            self.class_declaration()
        } else if self.check(Type::Fun) && self.peek_next().r#type == Type::Identifier {
            self.advance();
            self.function_declaration("function")
        } else if matches!(self, Type::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match statement {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                error.throw();
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect class name.")?.clone();

        let superclass = if matches!(self, Type::Less) {
            let super_name = self.consume(Type::Identifier, "Expect superclass name.")?.clone();
            Some(Expr::Variable(VariableData::new(super_name)))
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        let mut class_methods = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            let is_static = matches!(self, Type::Static);
            let method = self.method()?;
            if is_static {
                class_methods.push(method);
            } else {
                methods.push(method);
            }
        }

        self.consume(Type::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods, class_methods }))
    }

    /// Parses one class member: either a getter (`name -> expr;`, desugared
    /// to `{ return expr; }`) or a regular method/initializer.
    fn method(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect method name.")?.clone();
        let is_init = name.lexeme == "init";

        if matches!(self, Type::Arrow) {
            let keyword = name.clone();
            let expr = self.expression()?;
            self.consume(Type::Semicolon, "Expect ';' after getter body.")?;
            let body = vec![Stmt::Return(ReturnData { keyword, value: Some(expr) })];
            return Ok(Stmt::Function(FunctionData { name, params: None, body }));
        }

        self.consume(Type::LeftParen, "Expect '(' after method name.")?;
        let params = self.parameters()?;
        self.consume(Type::RightParen, "Expect ')' after parameters.")?;
        self.consume(Type::LeftBrace, "Expect '{' before method body.")?;

        let previously_in_initializer = self.in_initializer;
        self.in_initializer = is_init;
        let body = self.block();
        self.in_initializer = previously_in_initializer;

        Ok(Stmt::Function(FunctionData { name, params: Some(params), body: body? }))
    }

    fn parameters(&mut self) -> ParseResult<Vec<Token>> {
        let mut params = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    ParseError { token: self.peek().clone(), message: "Can't have more than 255 parameters.".to_string() }.throw();
                }
                params.push(self.consume(Type::Identifier, "Expect parameter name.")?.clone());
                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }
        Ok(params)
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect variable name.")?.clone();

        let initializer = if matches!(self, Type::Equal) { Some(self.expression()?) } else { None };

        self.consume(Type::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    fn function_declaration(&mut self, kind: &str) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, &format!("Expect {kind} name."))?.clone();
        self.consume(Type::LeftParen, &format!("Expect '(' after {kind} name."))?;
        let params = self.parameters()?;
        self.consume(Type::RightParen, "Expect ')' after parameters.")?;
        self.consume(Type::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;

        Ok(Stmt::Function(FunctionData { name, params: Some(params), body }))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if matches!(self, Type::Break) {
            let keyword = self.previous().clone();
            self.consume(Type::Semicolon, "Expect ';' after 'break'.")?;
            return Ok(Stmt::Break(keyword));
        }

        if matches!(self, Type::Continue) {
            let keyword = self.previous().clone();
            self.consume(Type::Semicolon, "Expect ';' after 'continue'.")?;
            return Ok(Stmt::Continue(keyword));
        }

        if matches!(self, Type::For) {
            return self.for_statement();
        }

        if matches!(self, Type::If) {
            return self.if_statement();
        }

        if matches!(self, Type::Print) {
            return self.print_statement();
        }

        if matches!(self, Type::Return) {
            return self.return_statement();
        }

        if matches!(self, Type::While) {
            return self.while_statement();
        }

        if matches!(self, Type::LeftBrace) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        self.expression_statement()
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if matches!(self, Type::Semicolon) {
            None
        } else if matches!(self, Type::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(Type::RightParen) { Some(self.expression()?) } else { None };
        self.consume(Type::RightParen, "Expect ')' after for clauses.")?;

        let body = self.statement()?;

        // The increment is carried as `for_increment`, not appended to the
        // body, so `continue` can run it exactly once per iteration.
        let mut loop_stmt = Stmt::While(WhileData {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
            for_increment: increment,
        });

        if let Some(initializer) = initializer {
            loop_stmt = Stmt::Block(BlockData { statements: vec![initializer, loop_stmt] });
        }

        Ok(loop_stmt)
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While(WhileData { condition, body, for_increment: None }))
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if matches!(self, Type::Else) { Some(Box::new(self.statement()?)) } else { None };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(PrintData { expr }))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        if self.in_initializer && self.check(Type::Super) && self.peek_next().r#type == Type::LeftParen {
            return self.init_super_statement();
        }

        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    fn init_super_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance().clone(); // 'super'
        let paren = self.advance().clone(); // '('

        let mut arguments = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    ParseError { token: self.peek().clone(), message: "Can't have more than 255 arguments.".to_string() }.throw();
                }
                arguments.push(self.expression()?);
                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }
        self.consume(Type::RightParen, "Expect ')' after superclass constructor arguments.")?;
        self.consume(Type::Semicolon, "Expect ';' after superclass constructor call.")?;

        Ok(Stmt::InitSuper(InitSuperData::new(keyword, paren, arguments)))
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(Type::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.comma()
    }

    fn comma(&mut self) -> ParseResult<Expr> {
        let mut expr = self.conditional()?;

        while matches!(self, Type::Comma) {
            let operator = self.previous().clone();
            let right = self.conditional()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn conditional(&mut self) -> ParseResult<Expr> {
        let expr = self.assignment()?;

        if matches!(self, Type::Question) {
            let then_branch = self.expression()?;
            self.consume(Type::Colon, "Expect ':' after then branch of conditional expression.")?;
            let else_branch = self.conditional()?;
            return Ok(Expr::Conditional(ConditionalData {
                condition: Box::new(expr),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            }));
        }

        Ok(expr)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if matches!(self, Type::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return Ok(match expr {
                Expr::Variable(data) => Expr::Assign(AssignData::new(data.name, value)),
                Expr::Get(data) => Expr::Set(SetData { object: data.object, name: data.name, value: Box::new(value) }),
                other => {
                    ParseError { token: equals, message: "Invalid assignment target.".to_string() }.throw();
                    other
                }
            });
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while matches!(self, Type::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while matches!(self, Type::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;
        while matches!(self, Type::BangEqual, Type::EqualEqual) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;
        while matches!(self, Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;
        while matches!(self, Type::Minus, Type::Plus) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;
        while matches!(self, Type::Slash, Type::Star, Type::Percent) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::Bang, Type::Minus) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(UnaryData { operator, expr: Box::new(right) }));
        }
        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if matches!(self, Type::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if matches!(self, Type::Dot) {
                let name = self.consume(Type::Identifier, "Expect property name after '.'.")?.clone();
                expr = Expr::Get(GetData { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    ParseError { token: self.peek().clone(), message: "Can't have more than 255 arguments.".to_string() }.throw();
                }
                arguments.push(self.conditional()?);
                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments.")?.clone();

        Ok(Expr::Call(CallData { callee: Box::new(callee), paren, arguments }))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::False) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }
        if matches!(self, Type::True) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }
        if matches!(self, Type::Nil) {
            return Ok(Expr::Literal(Literal::Nil));
        }
        if matches!(self, Type::Number, Type::String) {
            return Ok(Expr::Literal(
                self.previous().literal.clone().expect("number or string token always carries a literal"),
            ));
        }
        if matches!(self, Type::Super) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Type::Identifier, "Expect superclass method name.")?.clone();
            return Ok(Expr::Super(SuperData::new(keyword, method)));
        }
        if matches!(self, Type::This) {
            return Ok(Expr::This(ThisData::new(self.previous().clone())));
        }
        if matches!(self, Type::Identifier) {
            return Ok(Expr::Variable(VariableData::new(self.previous().clone())));
        }
        if matches!(self, Type::Fun) {
            self.consume(Type::LeftParen, "Expect '(' after 'fun'.")?;
            let params = self.parameters()?;
            self.consume(Type::RightParen, "Expect ')' after parameters.")?;
            self.consume(Type::LeftBrace, "Expect '{' before function body.")?;
            let body = self.block()?;
            return Ok(Expr::Function(FunctionExprData { params: Some(params), body }));
        }
        if matches!(self, Type::LeftParen) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(ParseError { token: self.peek().clone(), message: "Expect expression.".to_string() })
    }

    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Class | Type::Fun | Type::Var | Type::For | Type::If | Type::While
                | Type::Print | Type::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> Vec<Stmt> {
        let tokens = Scanner::new(source).scan_tokens();
        Parser::new(tokens).parse()
    }

    #[test]
    fn for_loop_carries_increment_separately_from_body() {
        let stmts = parse("for (var i = 0; i < 3; i = i + 1) print i;");
        let Stmt::Block(block) = &stmts[0] else { panic!("expected desugared block") };
        let Stmt::While(while_data) = &block.statements[1] else { panic!("expected while") };
        assert!(while_data.for_increment.is_some());
        let Stmt::Print(_) = while_data.body.as_ref() else { panic!("body should be just the print") };
    }

    #[test]
    fn getter_desugars_to_return() {
        let stmts = parse("class Foo { bar -> 1; }");
        let Stmt::Class(class) = &stmts[0] else { panic!("expected class") };
        let Stmt::Function(method) = &class.methods[0] else { panic!("expected method") };
        assert!(method.params.is_none());
        assert_eq!(method.body.len(), 1);
    }

    #[test]
    fn static_methods_go_to_class_methods() {
        let stmts = parse("class Foo { static bar() { return 1; } }");
        let Stmt::Class(class) = &stmts[0] else { panic!("expected class") };
        assert_eq!(class.methods.len(), 0);
        assert_eq!(class.class_methods.len(), 1);
    }

    #[test]
    fn bare_super_call_in_init_becomes_init_super() {
        let stmts = parse("class B < A { init(x) { super(x); } }");
        let Stmt::Class(class) = &stmts[0] else { panic!("expected class") };
        let Stmt::Function(init) = &class.methods[0] else { panic!("expected init") };
        assert!(std::matches!(init.body[0], Stmt::InitSuper(_)));
    }

    #[test]
    fn ternary_is_right_associative() {
        let stmts = parse("var x = true ? 1 : false ? 2 : 3;");
        let Stmt::Var(var) = &stmts[0] else { panic!("expected var") };
        assert!(std::matches!(var.initializer, Some(Expr::Conditional(_))));
    }

    #[test]
    fn repl_trailing_expression_without_semicolon() {
        let tokens = Scanner::new("1 + 2").scan_tokens();
        let mut parser = Parser::new(tokens);
        match parser.parse_repl() {
            ReplOutcome::Expression(_) => (),
            ReplOutcome::Statements(_) => panic!("expected trailing expression"),
        }
    }

    #[test]
    fn repl_full_statement_is_not_trailing_expression() {
        let tokens = Scanner::new("print 1;").scan_tokens();
        let mut parser = Parser::new(tokens);
        match parser.parse_repl() {
            ReplOutcome::Statements(stmts) => assert_eq!(stmts.len(), 1),
            ReplOutcome::Expression(_) => panic!("expected statement"),
        }
    }
}
