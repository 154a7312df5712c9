//! Token definitions for the Uniform language
//!
//! This module defines all token types used in lexical analysis.

use crate::error::Span;
use std::fmt;

/// A token in the Uniform language
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }

    /// Whether this token is the given keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.token_type == TokenType::Keyword(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token_type {
            TokenType::Literal(lit) => write!(f, "{}:{}", lit.kind_name(), lit),
            TokenType::Identifier => write!(f, "IDENTIFIER:{}", self.lexeme),
            TokenType::Keyword(kw) => write!(f, "KEYWORD:{}", kw),
            other => write!(f, "{}", other.kind_name()),
        }
    }
}

/// Token types in the Uniform language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Literals
    Literal(Literal),

    // Identifiers and keywords
    Identifier,
    Keyword(Keyword),

    // Arithmetic
    Plus,   // +
    Minus,  // -
    Mul,    // *
    Div,    // /
    Pow,    // ^

    // Comparison
    Ee,     // ==
    Ne,     // !=
    Lt,     // <
    Gt,     // >
    Lte,    // <=
    Gte,    // >=

    // Delimiters
    LParen,     // (
    RParen,     // )
    LSquare,    // [
    RSquare,    // ]
    Comma,      // ,
    Arrow,      // =>

    // Special
    Newline,    // \n or ;
    Eof,
}

impl TokenType {
    /// Upper-case kind name used in token dumps
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal(lit) => lit.kind_name(),
            Self::Identifier => "IDENTIFIER",
            Self::Keyword(_) => "KEYWORD",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Pow => "POW",
            Self::Ee => "EE",
            Self::Ne => "NE",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::Lte => "LTE",
            Self::Gte => "GTE",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::LSquare => "LSQUARE",
            Self::RSquare => "RSQUARE",
            Self::Comma => "COMMA",
            Self::Arrow => "ARROW",
            Self::Newline => "NEWLINE",
            Self::Eof => "EOF",
        }
    }
}

/// Keywords in the Uniform language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Variables
    Push,

    // Control flow
    If,
    Do,
    Elif,
    Else,
    Fin,
    For,
    While,
    Until,
    Inc,

    // Functions
    Define,

    // Logical operators (symbolic keywords)
    Not,    // :
    And,    // &
    Or,     // |
}

impl Keyword {
    /// Get keyword from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "push" => Some(Self::Push),
            "if" => Some(Self::If),
            "do" => Some(Self::Do),
            "elif" => Some(Self::Elif),
            "else" => Some(Self::Else),
            "fin" => Some(Self::Fin),
            "for" => Some(Self::For),
            "while" => Some(Self::While),
            "until" => Some(Self::Until),
            "inc" => Some(Self::Inc),
            "define" => Some(Self::Define),
            ":" => Some(Self::Not),
            "&" => Some(Self::And),
            "|" => Some(Self::Or),
            _ => None,
        }
    }

    /// Get string representation of keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::If => "if",
            Self::Do => "do",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::Fin => "fin",
            Self::For => "for",
            Self::While => "while",
            Self::Until => "until",
            Self::Inc => "inc",
            Self::Define => "define",
            Self::Not => ":",
            Self::And => "&",
            Self::Or => "|",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Literal token values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
}

impl Literal {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "INT",
            Self::Float(_) => "FLOAT",
            Self::String(_) => "STRING",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{}", lit.kind_name()),
            Self::Identifier => write!(f, "identifier"),
            Self::Keyword(kw) => write!(f, "'{}'", kw),
            Self::Plus => write!(f, "'+'"),
            Self::Minus => write!(f, "'-'"),
            Self::Mul => write!(f, "'*'"),
            Self::Div => write!(f, "'/'"),
            Self::Pow => write!(f, "'^'"),
            Self::Ee => write!(f, "'=='"),
            Self::Ne => write!(f, "'!='"),
            Self::Lt => write!(f, "'<'"),
            Self::Gt => write!(f, "'>'"),
            Self::Lte => write!(f, "'<='"),
            Self::Gte => write!(f, "'>='"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::LSquare => write!(f, "'['"),
            Self::RSquare => write!(f, "']'"),
            Self::Comma => write!(f, "','"),
            Self::Arrow => write!(f, "'=>'"),
            Self::Newline => write!(f, "NEWLINE"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("push"), Some(Keyword::Push));
        assert_eq!(Keyword::from_str("define"), Some(Keyword::Define));
        assert_eq!(Keyword::from_str("fin"), Some(Keyword::Fin));
        assert_eq!(Keyword::from_str(":"), Some(Keyword::Not));
        assert_eq!(Keyword::from_str("|"), Some(Keyword::Or));
        assert_eq!(Keyword::from_str("let"), None);
        // keywords are case sensitive
        assert_eq!(Keyword::from_str("Push"), None);
    }

    #[test]
    fn test_keyword_as_str() {
        assert_eq!(Keyword::Until.as_str(), "until");
        assert_eq!(Keyword::And.as_str(), "&");
        assert_eq!(Keyword::Inc.to_string(), "inc");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TokenType::Literal(Literal::Float(1.5)).kind_name(), "FLOAT");
        assert_eq!(TokenType::Arrow.kind_name(), "ARROW");
        assert_eq!(TokenType::Keyword(Keyword::If).kind_name(), "KEYWORD");
        assert_eq!(TokenType::Newline.to_string(), "NEWLINE");
        assert_eq!(TokenType::Gte.to_string(), "'>='");
    }
}
