//! Abstract Syntax Tree definitions
//!
//! This module defines the AST node types for the Uniform language.
//! Every node carries the span of the tokens it was built from; spans are
//! only read for diagnostics.

use std::fmt;
use std::rc::Rc;

use crate::error::Span;
use crate::lexer::{Keyword, Token, TokenType};

/// AST node
#[derive(Debug, Clone)]
pub enum Node {
    /// Integer or float literal
    Number {
        token: Token,
        value: f64,
        span: Span,
    },

    /// String literal
    String {
        token: Token,
        value: String,
        span: Span,
    },

    /// List literal: [a, b, c]
    List {
        elements: Vec<Node>,
        span: Span,
    },

    /// Newline-separated statements (program root or block body).
    /// Evaluates like a list literal.
    Statements {
        statements: Vec<Node>,
        span: Span,
    },

    /// Variable reference
    VarAccess {
        name: String,
        span: Span,
    },

    /// First binding: push x => value
    VarAssign {
        name: String,
        value: Box<Node>,
        span: Span,
    },

    /// Rebinding of an existing name: x => value
    VarReAssign {
        name: String,
        value: Box<Node>,
        span: Span,
    },

    /// Unary operation
    UnaryOp {
        operator: UnaryOp,
        operand: Box<Node>,
        span: Span,
    },

    /// Binary operation
    BinOp {
        left: Box<Node>,
        operator: BinaryOp,
        right: Box<Node>,
        span: Span,
    },

    /// if / elif / else chain
    If {
        cases: Vec<IfCase>,
        else_case: Option<ElseCase>,
        span: Span,
    },

    /// for i => start until end (inc step)? do body
    For {
        var_name: String,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        body: Box<Node>,
        returns_null: bool,
        span: Span,
    },

    /// while condition do body
    While {
        condition: Box<Node>,
        body: Box<Node>,
        returns_null: bool,
        span: Span,
    },

    /// Function definition (named or anonymous)
    FuncDef {
        name: Option<String>,
        params: Vec<String>,
        body: Rc<Node>,
        returns_null: bool,
        span: Span,
    },

    /// Function call
    Call {
        callee: Box<Node>,
        arguments: Vec<Node>,
        span: Span,
    },
}

/// One `if`/`elif` clause
#[derive(Debug, Clone)]
pub struct IfCase {
    pub condition: Node,
    pub body: Node,
    /// Block bodies evaluate to null instead of their value
    pub returns_null: bool,
}

/// The trailing `else` clause
#[derive(Debug, Clone)]
pub struct ElseCase {
    pub body: Box<Node>,
    pub returns_null: bool,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    /// The operator a token stands for, if any
    pub fn from_token(token_type: &TokenType) -> Option<Self> {
        match token_type {
            TokenType::Plus => Some(Self::Add),
            TokenType::Minus => Some(Self::Subtract),
            TokenType::Mul => Some(Self::Multiply),
            TokenType::Div => Some(Self::Divide),
            TokenType::Pow => Some(Self::Power),
            TokenType::Ee => Some(Self::Equal),
            TokenType::Ne => Some(Self::NotEqual),
            TokenType::Lt => Some(Self::Less),
            TokenType::Gt => Some(Self::Greater),
            TokenType::Lte => Some(Self::LessEqual),
            TokenType::Gte => Some(Self::GreaterEqual),
            TokenType::Keyword(Keyword::And) => Some(Self::And),
            TokenType::Keyword(Keyword::Or) => Some(Self::Or),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Power => "^",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::And => "&",
            Self::Or => "|",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not, // ':'
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => ":",
        }
    }
}

impl Node {
    pub fn span(&self) -> &Span {
        match self {
            Node::Number { span, .. }
            | Node::String { span, .. }
            | Node::List { span, .. }
            | Node::Statements { span, .. }
            | Node::VarAccess { span, .. }
            | Node::VarAssign { span, .. }
            | Node::VarReAssign { span, .. }
            | Node::UnaryOp { span, .. }
            | Node::BinOp { span, .. }
            | Node::If { span, .. }
            | Node::For { span, .. }
            | Node::While { span, .. }
            | Node::FuncDef { span, .. }
            | Node::Call { span, .. } => span,
        }
    }
}

/// Write a `do`/`=>` body: inline for expressions, newline-delimited for blocks
fn write_body(f: &mut fmt::Formatter<'_>, body: &Node, is_block: bool) -> fmt::Result {
    if is_block {
        write!(f, "\n{}\n", body)
    } else {
        write!(f, " {} ", body)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Node], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Canonical source form; lexing and parsing it again yields an equivalent tree
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number { token, .. } => write!(f, "{}", token.lexeme),
            Node::String { value, .. } => {
                write!(f, "\"")?;
                for c in value.chars() {
                    match c {
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\\' => write!(f, "\\\\")?,
                        '"' => write!(f, "\\\"")?,
                        other => write!(f, "{}", other)?,
                    }
                }
                write!(f, "\"")
            }
            Node::List { elements, .. } => {
                write!(f, "[")?;
                write_joined(f, elements, ", ")?;
                write!(f, "]")
            }
            Node::Statements { statements, .. } => write_joined(f, statements, "\n"),
            Node::VarAccess { name, .. } => write!(f, "{}", name),
            Node::VarAssign { name, value, .. } => write!(f, "(push {} => {})", name, value),
            Node::VarReAssign { name, value, .. } => write!(f, "({} => {})", name, value),
            Node::UnaryOp {
                operator, operand, ..
            } => write!(f, "({}{})", operator.symbol(), operand),
            Node::BinOp {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Node::If {
                cases, else_case, ..
            } => {
                write!(f, "(")?;
                for (i, case) in cases.iter().enumerate() {
                    let keyword = if i == 0 { "if" } else { "elif" };
                    write!(f, "{} {} do", keyword, case.condition)?;
                    write_body(f, &case.body, case.returns_null)?;
                }
                match else_case {
                    Some(ElseCase {
                        body,
                        returns_null: true,
                    }) => write!(f, "else\n{}\nfin", body)?,
                    Some(ElseCase { body, .. }) => write!(f, "else {}", body)?,
                    None if cases.last().map_or(false, |c| c.returns_null) => write!(f, "fin")?,
                    None => {}
                }
                write!(f, ")")
            }
            Node::For {
                var_name,
                start,
                end,
                step,
                body,
                returns_null,
                ..
            } => {
                write!(f, "(for {} => {} until {}", var_name, start, end)?;
                if let Some(step) = step {
                    write!(f, " inc {}", step)?;
                }
                write!(f, " do")?;
                write_body(f, body, *returns_null)?;
                if *returns_null {
                    write!(f, "fin")?;
                }
                write!(f, ")")
            }
            Node::While {
                condition,
                body,
                returns_null,
                ..
            } => {
                write!(f, "(while {} do", condition)?;
                write_body(f, body, *returns_null)?;
                if *returns_null {
                    write!(f, "fin")?;
                }
                write!(f, ")")
            }
            Node::FuncDef {
                name,
                params,
                body,
                returns_null,
                ..
            } => {
                write!(f, "(define ")?;
                if let Some(name) = name {
                    write!(f, "{}", name)?;
                }
                write!(f, "({})", params.join(", "))?;
                if *returns_null {
                    write!(f, "\n{}\nfin)", body)
                } else {
                    write!(f, " => {})", body)
                }
            }
            Node::Call {
                callee, arguments, ..
            } => {
                write!(f, "{}(", callee)?;
                write_joined(f, arguments, ", ")?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_from_token() {
        assert_eq!(BinaryOp::from_token(&TokenType::Pow), Some(BinaryOp::Power));
        assert_eq!(
            BinaryOp::from_token(&TokenType::Keyword(Keyword::Or)),
            Some(BinaryOp::Or)
        );
        assert_eq!(BinaryOp::from_token(&TokenType::Keyword(Keyword::Not)), None);
        assert_eq!(BinaryOp::from_token(&TokenType::Arrow), None);
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(BinaryOp::GreaterEqual.symbol(), ">=");
        assert_eq!(BinaryOp::And.symbol(), "&");
        assert_eq!(UnaryOp::Not.symbol(), ":");
    }
}
