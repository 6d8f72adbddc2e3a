use crate::language::{
    ast::*,
    errors::{SyntaxError, SyntaxErrors},
    lexer::lex,
    span::Span,
    token::{Token, TokenKind},
};
use std::rc::Rc;

pub fn parse_program(source: &str) -> Result<Program, SyntaxErrors> {
    let tokens = lex(source).map_err(|errors| {
        SyntaxErrors::new(
            errors
                .into_iter()
                .map(|err| SyntaxError::new(err.message, err.span))
                .collect(),
        )
    })?;
    let mut parser = Parser::new(&tokens);
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(SyntaxErrors::new(parser.errors))
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            errors: Vec::new(),
        }
    }

    fn parse_program(&mut self) -> Program {
        let mut functions = Vec::new();
        while !self.is_at_end() {
            if self.check(&TokenKind::Func) {
                match self.parse_function() {
                    Ok(function) => functions.push(function),
                    Err(err) => {
                        self.report_error(err);
                        self.synchronize_item();
                    }
                }
            } else {
                let err = self
                    .unexpected("Expected `func` at top level")
                    .with_help("Syntax: func <name>(<params>) { <statements> }");
                self.report_error(err);
                self.synchronize_item();
            }
        }
        Program { functions }
    }

    fn parse_function(&mut self) -> Result<FunctionDef, SyntaxError> {
        let start = self.consume(&TokenKind::Func, "Expected `func`")?;
        let (name, _) = self.expect_identifier("Expected function name after `func`")?;
        self.consume(&TokenKind::LParen, "Expected `(` after function name")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (name, span) = self.expect_identifier("Expected parameter name")?;
                params.push(Param { name, span });
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RParen, "Expected `)` after parameters")?;
        let statements = self.parse_block()?;
        Ok(FunctionDef {
            name,
            params,
            statements,
            span: start.join(self.previous_span()),
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        self.consume(&TokenKind::LBrace, "Expected `{` to start a block")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.report_error(err);
                    self.synchronize();
                }
            }
        }
        self.consume(&TokenKind::RBrace, "Expected `}` to close the block")?;
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        match self.peek_kind() {
            TokenKind::Var => self.parse_var_def(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Raise => self.parse_raise(),
            TokenKind::Identifier(_) => {
                let stmt = self.parse_simple_statement()?;
                self.expect_semi(&stmt)?;
                Ok(stmt)
            }
            _ => Err(self.unexpected("Expected a statement")),
        }
    }

    fn parse_var_def(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.consume(&TokenKind::Var, "Expected `var`")?;
        let (name, _) = self.expect_identifier("Expected variable name after `var`")?;
        let stmt = Statement::VarDef(VarDef {
            name: name.clone(),
            span: start.join(self.previous_span()),
        });
        if self.check(&TokenKind::Eq) {
            return Err(self
                .unexpected("Variable definitions take no initializer")
                .with_help(format!("Try: var {name}; {name} = <value>;")));
        }
        self.expect_semi(&stmt)?;
        Ok(stmt)
    }

    fn parse_return(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.consume(&TokenKind::Return, "Expected `return`")?;
        let expr = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(Rc::new(self.parse_expression()?))
        };
        let stmt = Statement::Return(Return {
            expr,
            span: start.join(self.previous_span()),
        });
        self.expect_semi(&stmt)?;
        Ok(stmt)
    }

    fn parse_if(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.consume(&TokenKind::If, "Expected `if`")?;
        self.consume(&TokenKind::LParen, "Expected `(` after `if`")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::RParen, "Expected `)` after if condition")?;
        let statements = self.parse_block()?;
        let else_statements = if self.matches(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Statement::If(IfStmt {
            condition,
            statements,
            else_statements,
            span: start.join(self.previous_span()),
        }))
    }

    fn parse_for(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.consume(&TokenKind::For, "Expected `for`")?;
        self.consume(&TokenKind::LParen, "Expected `(` after `for`")?;
        let init = self.parse_simple_statement()?;
        self.consume(&TokenKind::Semi, "Expected `;` after for-loop initializer")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::Semi, "Expected `;` after for-loop condition")?;
        let update = self.parse_simple_statement()?;
        self.consume(&TokenKind::RParen, "Expected `)` after for-loop update")
            .map_err(|err| err.with_help("Syntax: for (<init>; <condition>; <update>) { ... }"))?;
        let statements = self.parse_block()?;
        Ok(Statement::For(ForStmt {
            init: Box::new(init),
            condition,
            update: Box::new(update),
            statements,
            span: start.join(self.previous_span()),
        }))
    }

    fn parse_try(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.consume(&TokenKind::Try, "Expected `try`")?;
        let statements = self.parse_block()?;
        let mut catchers = Vec::new();
        while self.check(&TokenKind::Catch) {
            let catch_start = self.consume(&TokenKind::Catch, "Expected `catch`")?;
            let exception_type = match self.peek_kind().clone() {
                TokenKind::String(tag) => {
                    self.advance();
                    tag
                }
                _ => {
                    return Err(self
                        .unexpected("Expected exception name string after `catch`")
                        .with_help("Syntax: catch \"<exception>\" { ... }"))
                }
            };
            let body = self.parse_block()?;
            catchers.push(Catch {
                exception_type,
                statements: body,
                span: catch_start.join(self.previous_span()),
            });
        }
        Ok(Statement::Try(TryStmt {
            statements,
            catchers,
            span: start.join(self.previous_span()),
        }))
    }

    fn parse_raise(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.consume(&TokenKind::Raise, "Expected `raise`")?;
        let exception_type = self.parse_expression()?;
        let stmt = Statement::Raise(RaiseStmt {
            exception_type,
            span: start.join(self.previous_span()),
        });
        self.expect_semi(&stmt)?;
        Ok(stmt)
    }

    /// Assignment or call, without the trailing `;` (shared with `for` headers).
    fn parse_simple_statement(&mut self) -> Result<Statement, SyntaxError> {
        let (name, start) = self.expect_identifier("Expected assignment or call")?;
        if self.matches(&TokenKind::Eq) {
            let expr = self.parse_expression()?;
            return Ok(Statement::Assign(Assign {
                name,
                span: start.join(expr.span),
                expr: Rc::new(expr),
            }));
        }
        if self.check(&TokenKind::LParen) {
            let call = self.finish_call(name, start)?;
            return Ok(Statement::Call(call));
        }
        Err(self
            .unexpected(format!("Expected `=` or `(` after `{name}`"))
            .with_help(format!("Try: {name} = <value>; or {name}(<args>);")))
    }

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_and()?;
        while self.matches(&TokenKind::PipePipe) {
            let right = self.parse_and()?;
            expr = binary(BinaryOp::Or, expr, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_comparison()?;
        while self.matches(&TokenKind::AmpersandAmpersand) {
            let right = self.parse_comparison()?;
            expr = binary(BinaryOp::And, expr, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::BangEq => BinaryOp::NotEq,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let start = self.advance().span;
        let operand = self.parse_unary()?;
        let span = start.join(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.peek().clone();
        let kind = match token.kind {
            TokenKind::Integer(value) => ExprKind::Int(value),
            TokenKind::String(value) => ExprKind::String(value),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Nil => ExprKind::Nil,
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let call = self.finish_call(name, token.span)?;
                    let span = call.span;
                    return Ok(Expr::new(ExprKind::Call(call), span));
                }
                return Ok(Expr::new(ExprKind::Var(name), token.span));
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(&TokenKind::RParen, "Expected `)` after expression")?;
                return Ok(inner);
            }
            _ => return Err(self.unexpected("Expected an expression")),
        };
        self.advance();
        Ok(Expr::new(kind, token.span))
    }

    fn finish_call(&mut self, name: String, start: Span) -> Result<Call, SyntaxError> {
        self.consume(&TokenKind::LParen, "Expected `(` to start arguments")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(Rc::new(self.parse_expression()?));
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RParen, "Expected `)` after arguments")?;
        Ok(Call {
            name,
            args,
            span: start.join(self.previous_span()),
        })
    }

    fn expect_semi(&mut self, stmt: &Statement) -> Result<(), SyntaxError> {
        if self.matches(&TokenKind::Semi) {
            return Ok(());
        }
        let span = stmt.span().after();
        Err(SyntaxError::new(
            format!("Expected `;` after statement: found {}", self.peek_kind()),
            span,
        )
        .with_label("missing `;`"))
    }

    fn expect_identifier(&mut self, message: &str) -> Result<(String, Span), SyntaxError> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            _ => Err(self.unexpected(message)),
        }
    }

    fn consume(&mut self, expected: &TokenKind, message: &str) -> Result<Span, SyntaxError> {
        if self.check(expected) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(message))
        }
    }

    fn unexpected(&self, message: impl Into<String>) -> SyntaxError {
        let token = self.peek();
        SyntaxError::new(format!("{}: found {}", message.into(), token.kind), token.span)
    }

    fn matches(&mut self, expected: &TokenKind) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, expected: &TokenKind) -> bool {
        self.peek_kind() == expected
    }

    fn peek(&self) -> &'a Token {
        let index = self.position.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    fn peek_kind(&self) -> &'a TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    fn previous_span(&self) -> Span {
        self.position
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map(|token| token.span)
            .unwrap_or_default()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn report_error(&mut self, err: SyntaxError) {
        self.errors.push(err);
    }

    fn synchronize(&mut self) {
        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Semi => {
                    self.advance();
                    break;
                }
                TokenKind::RBrace => break,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn synchronize_item(&mut self) {
        self.advance();
        while !self.is_at_end() && !self.check(&TokenKind::Func) {
            self.advance();
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let span = left.span.join(right.span);
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}
