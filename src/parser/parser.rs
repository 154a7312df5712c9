//! Parser implementation
//!
//! This module implements the recursive-descent parser for the Uniform
//! language. Precedence, lowest first: `&`/`|`, comparisons, `+`/`-`,
//! `*`/`/`, unary sign, `^`, call, atom.

use super::ast::*;
use crate::error::{Span, UniformError, UniformResult};
use crate::lexer::{Keyword, Literal, Token, TokenType};
use std::rc::Rc;

type ParseFn = fn(&mut Parser) -> UniformResult<Node>;

/// Parser for Uniform source code
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Create a new parser from tokens. The sequence must end with EOF.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse tokens into an AST rooted at a `Statements` node
    pub fn parse(&mut self) -> UniformResult<Node> {
        let root = self.statements()?;

        if !self.is_at_end() {
            return Err(self.error_at_current(
                "Expected '+', '-', '*', '/', '^', '==', '!=', '<', '>', '<=', '>=', '&', or '|'",
            ));
        }

        Ok(root)
    }

    // ===== Statements =====

    fn statements(&mut self) -> UniformResult<Node> {
        let mut statements = Vec::new();

        self.skip_newlines();
        statements.push(self.expr()?);

        loop {
            if self.skip_newlines() == 0 {
                break;
            }

            // Another statement may follow the newlines; if it doesn't parse,
            // leave it for the enclosing construct ('fin', 'elif', ...).
            let checkpoint = self.current;
            match self.expr() {
                Ok(statement) => statements.push(statement),
                Err(_) => {
                    self.current = checkpoint;
                    break;
                }
            }
        }

        let span = Span::new(
            statements[0].span().start.clone(),
            self.previous().span.end.clone(),
        );
        Ok(Node::Statements { statements, span })
    }

    fn skip_newlines(&mut self) -> usize {
        let mut count = 0;
        while self.match_token(TokenType::Newline) {
            count += 1;
        }
        count
    }

    // ===== Expressions =====

    fn expr(&mut self) -> UniformResult<Node> {
        if self.match_keyword(Keyword::Push) {
            let start = self.previous().span.clone();
            let name = self.consume_identifier("Expected identifier")?;
            self.consume(TokenType::Arrow, "Expected '=>'")?;
            let value = self.expr()?;
            let span = start.to(value.span());

            return Ok(Node::VarAssign {
                name,
                value: Box::new(value),
                span,
            });
        }

        let start = self.current;
        let result = self.binary_op(Self::comp_expr, &[BinaryOp::And, BinaryOp::Or], Self::comp_expr);
        self.expected_unless_progress(
            start,
            result,
            "Expected 'push', int, float, identifier, '+', '-', '(' or ':'",
        )
    }

    fn comp_expr(&mut self) -> UniformResult<Node> {
        if self.match_keyword(Keyword::Not) {
            let start = self.previous().span.clone();
            let operand = self.comp_expr()?;
            let span = start.to(operand.span());

            return Ok(Node::UnaryOp {
                operator: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }

        let start = self.current;
        let result = self.binary_op(
            Self::arith_expr,
            &[
                BinaryOp::Equal,
                BinaryOp::NotEqual,
                BinaryOp::Less,
                BinaryOp::Greater,
                BinaryOp::LessEqual,
                BinaryOp::GreaterEqual,
            ],
            Self::arith_expr,
        );
        self.expected_unless_progress(
            start,
            result,
            "Expected int, float, identifier, '+', '-', '(', or ':'",
        )
    }

    fn arith_expr(&mut self) -> UniformResult<Node> {
        self.binary_op(Self::term, &[BinaryOp::Add, BinaryOp::Subtract], Self::term)
    }

    fn term(&mut self) -> UniformResult<Node> {
        self.binary_op(Self::factor, &[BinaryOp::Multiply, BinaryOp::Divide], Self::factor)
    }

    fn factor(&mut self) -> UniformResult<Node> {
        let operator = match self.peek().token_type {
            TokenType::Plus => UnaryOp::Plus,
            TokenType::Minus => UnaryOp::Minus,
            _ => return self.power(),
        };

        let start = self.advance().span.clone();
        let operand = self.factor()?;
        let span = start.to(operand.span());

        Ok(Node::UnaryOp {
            operator,
            operand: Box::new(operand),
            span,
        })
    }

    /// `^` binds tighter than sign and is right-associative through `factor`
    fn power(&mut self) -> UniformResult<Node> {
        self.binary_op(Self::call, &[BinaryOp::Power], Self::factor)
    }

    fn call(&mut self) -> UniformResult<Node> {
        let callee = self.atom()?;

        if !self.match_token(TokenType::LParen) {
            return Ok(callee);
        }

        let mut arguments = Vec::new();
        if !self.match_token(TokenType::RParen) {
            arguments.push(self.expr()?);
            while self.match_token(TokenType::Comma) {
                arguments.push(self.expr()?);
            }
            self.consume(TokenType::RParen, "Expected ',' or ')'")?;
        }

        let span = callee.span().to(&self.previous().span);
        Ok(Node::Call {
            callee: Box::new(callee),
            arguments,
            span,
        })
    }

    fn atom(&mut self) -> UniformResult<Node> {
        let token = self.peek().clone();

        match &token.token_type {
            TokenType::Literal(Literal::Integer(n)) => {
                self.advance();
                Ok(Node::Number {
                    value: *n as f64,
                    span: token.span.clone(),
                    token,
                })
            }
            TokenType::Literal(Literal::Float(n)) => {
                self.advance();
                Ok(Node::Number {
                    value: *n,
                    span: token.span.clone(),
                    token,
                })
            }
            TokenType::Literal(Literal::String(s)) => {
                self.advance();
                Ok(Node::String {
                    value: s.clone(),
                    span: token.span.clone(),
                    token,
                })
            }
            TokenType::Identifier => {
                self.advance();

                // `name => value` rebinds an existing variable
                if self.match_token(TokenType::Arrow) {
                    let value = self.expr()?;
                    let span = token.span.to(value.span());
                    return Ok(Node::VarReAssign {
                        name: token.lexeme,
                        value: Box::new(value),
                        span,
                    });
                }

                Ok(Node::VarAccess {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenType::LParen => {
                self.advance();
                let expr = self.expr()?;
                self.consume(TokenType::RParen, "Expected ')'")?;
                Ok(expr)
            }
            TokenType::LSquare => self.list_expr(),
            TokenType::Keyword(Keyword::If) => self.if_expr(),
            TokenType::Keyword(Keyword::For) => self.for_expr(),
            TokenType::Keyword(Keyword::While) => self.while_expr(),
            TokenType::Keyword(Keyword::Define) => self.func_def(),
            _ => Err(UniformError::invalid_syntax(
                "Expected int or float, identifier, '+', '-', '(', 'if', 'for', 'while' or 'define'",
                token.span,
            )),
        }
    }

    fn list_expr(&mut self) -> UniformResult<Node> {
        let start = self.advance().span.clone(); // '['
        let mut elements = Vec::new();

        if !self.match_token(TokenType::RSquare) {
            elements.push(self.expr()?);
            while self.match_token(TokenType::Comma) {
                elements.push(self.expr()?);
            }
            self.consume(TokenType::RSquare, "Expected ',' or ']'")?;
        }

        let span = start.to(&self.previous().span);
        Ok(Node::List { elements, span })
    }

    // ===== Compound expressions =====

    fn if_expr(&mut self) -> UniformResult<Node> {
        let start = self.advance().span.clone(); // 'if'
        let (cases, else_case) = self.if_cases()?;
        let span = start.to(&self.previous().span);

        Ok(Node::If {
            cases,
            else_case,
            span,
        })
    }

    /// One `if`/`elif` clause (keyword already consumed) and everything after it
    fn if_cases(&mut self) -> UniformResult<(Vec<IfCase>, Option<ElseCase>)> {
        let condition = self.expr()?;
        self.consume_keyword(Keyword::Do, "Expected 'do'")?;

        let mut cases = Vec::new();

        if self.match_token(TokenType::Newline) {
            let body = self.statements()?;
            cases.push(IfCase {
                condition,
                body,
                returns_null: true,
            });

            if self.match_keyword(Keyword::Fin) {
                return Ok((cases, None));
            }
            if !self.check_keyword(Keyword::Elif) && !self.check_keyword(Keyword::Else) {
                return Err(self.error_at_current("Expected 'fin', 'elif' or 'else'"));
            }
        } else {
            let body = self.expr()?;
            cases.push(IfCase {
                condition,
                body,
                returns_null: false,
            });
        }

        let (more_cases, else_case) = self.elif_or_else()?;
        cases.extend(more_cases);
        Ok((cases, else_case))
    }

    fn elif_or_else(&mut self) -> UniformResult<(Vec<IfCase>, Option<ElseCase>)> {
        if self.match_keyword(Keyword::Elif) {
            return self.if_cases();
        }

        if !self.match_keyword(Keyword::Else) {
            return Ok((Vec::new(), None));
        }

        let else_case = if self.match_token(TokenType::Newline) {
            let body = self.statements()?;
            self.consume_keyword(Keyword::Fin, "Expected 'fin'")?;
            ElseCase {
                body: Box::new(body),
                returns_null: true,
            }
        } else {
            ElseCase {
                body: Box::new(self.expr()?),
                returns_null: false,
            }
        };

        Ok((Vec::new(), Some(else_case)))
    }

    fn for_expr(&mut self) -> UniformResult<Node> {
        let start_span = self.advance().span.clone(); // 'for'
        let var_name = self.consume_identifier("Expected identifier")?;
        self.consume(TokenType::Arrow, "Expected '=>'")?;

        let start = self.expr()?;
        self.consume_keyword(Keyword::Until, "Expected 'until'")?;
        let end = self.expr()?;

        let step = if self.match_keyword(Keyword::Inc) {
            Some(Box::new(self.expr()?))
        } else {
            None
        };

        self.consume_keyword(Keyword::Do, "Expected 'do'")?;
        let (body, returns_null) = self.loop_body()?;
        let span = start_span.to(&self.previous().span);

        Ok(Node::For {
            var_name,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
            returns_null,
            span,
        })
    }

    fn while_expr(&mut self) -> UniformResult<Node> {
        let start = self.advance().span.clone(); // 'while'
        let condition = self.expr()?;
        self.consume_keyword(Keyword::Do, "Expected 'do'")?;
        let (body, returns_null) = self.loop_body()?;
        let span = start.to(&self.previous().span);

        Ok(Node::While {
            condition: Box::new(condition),
            body: Box::new(body),
            returns_null,
            span,
        })
    }

    /// Body after `do`: a single expression, or NEWLINE statements `fin`
    fn loop_body(&mut self) -> UniformResult<(Node, bool)> {
        if self.match_token(TokenType::Newline) {
            let body = self.statements()?;
            self.consume_keyword(Keyword::Fin, "Expected 'fin'")?;
            Ok((body, true))
        } else {
            Ok((self.expr()?, false))
        }
    }

    fn func_def(&mut self) -> UniformResult<Node> {
        let start = self.advance().span.clone(); // 'define'

        let name = if self.check(TokenType::Identifier) {
            let name = self.advance().lexeme.clone();
            self.consume(TokenType::LParen, "Expected '('")?;
            Some(name)
        } else {
            self.consume(TokenType::LParen, "Expected identifier or '('")?;
            None
        };

        let mut params = Vec::new();
        if self.check(TokenType::Identifier) {
            params.push(self.advance().lexeme.clone());
            while self.match_token(TokenType::Comma) {
                params.push(self.consume_identifier("Expected identifier")?);
            }
            self.consume(TokenType::RParen, "Expected ',' or ')'")?;
        } else {
            self.consume(TokenType::RParen, "Expected identifier or ')'")?;
        }

        let (body, returns_null) = if self.match_token(TokenType::Arrow) {
            (self.expr()?, false)
        } else {
            self.consume(TokenType::Newline, "Expected '=>' or NEWLINE")?;
            let body = self.statements()?;
            self.consume_keyword(Keyword::Fin, "Expected 'fin'")?;
            (body, true)
        };

        let span = start.to(&self.previous().span);
        Ok(Node::FuncDef {
            name,
            params,
            body: Rc::new(body),
            returns_null,
            span,
        })
    }

    /// Parse a binary-operator level: `operand (op right)*`, left-associative
    fn binary_op(
        &mut self,
        operand: ParseFn,
        operators: &[BinaryOp],
        right_operand: ParseFn,
    ) -> UniformResult<Node> {
        let mut left = operand(self)?;

        while let Some(operator) =
            BinaryOp::from_token(&self.peek().token_type).filter(|op| operators.contains(op))
        {
            self.advance();
            let right = right_operand(self)?;
            let span = left.span().to(right.span());
            left = Node::BinOp {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    /// Replace an error with a broader expectation when nothing was consumed
    fn expected_unless_progress(
        &self,
        start: usize,
        result: UniformResult<Node>,
        message: &str,
    ) -> UniformResult<Node> {
        match result {
            Err(_) if self.current == start => Err(self.error_at_current(message)),
            other => other,
        }
    }

    // ===== Helper Methods =====

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            std::mem::discriminant(&self.peek().token_type) == std::mem::discriminant(&token_type)
        }
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> UniformResult<&Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword, message: &str) -> UniformResult<&Token> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn consume_identifier(&mut self, message: &str) -> UniformResult<String> {
        if self.check(TokenType::Identifier) {
            Ok(self.advance().lexeme.clone())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn error_at_current(&self, message: &str) -> UniformError {
        UniformError::invalid_syntax(message, self.peek().span.clone())
    }
}
