//! Lexer/Scanner implementation for the Uniform language
//!
//! This module implements lexical analysis, converting source code into tokens.

use super::token::{Keyword, Literal, Token, TokenType};
use crate::error::{Position, Span, UniformError, UniformResult};
use log::trace;

/// Lexer for Uniform source code
pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: Position,
    position: Position,
}

impl Lexer {
    /// Create a new lexer for `source`, labelled `source_name` in diagnostics
    pub fn new(source_name: &str, source: &str) -> Self {
        let position = Position::start(source_name, source);
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: position.clone(),
            position,
        }
    }

    /// Tokenize the source code
    pub fn tokenize(mut self) -> UniformResult<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.position.clone();
            self.scan_token()?;
        }

        // Add EOF token
        self.start = self.position.clone();
        self.add_token(TokenType::Eof);

        trace!(
            "lexed {} tokens from {}",
            self.tokens.len(),
            self.position.source_name
        );
        Ok(self.tokens)
    }

    /// Scan a single token
    fn scan_token(&mut self) -> UniformResult<()> {
        let c = self.advance();

        match c {
            // Whitespace (skip)
            ' ' | '\r' | '\t' => {}

            // Statement separators
            '\n' | ';' => self.add_token(TokenType::Newline),

            // Single-character tokens
            '+' => self.add_token(TokenType::Plus),
            '-' => self.add_token(TokenType::Minus),
            '*' => self.add_token(TokenType::Mul),
            '/' => self.add_token(TokenType::Div),
            '^' => self.add_token(TokenType::Pow),
            '(' => self.add_token(TokenType::LParen),
            ')' => self.add_token(TokenType::RParen),
            '[' => self.add_token(TokenType::LSquare),
            ']' => self.add_token(TokenType::RSquare),
            ',' => self.add_token(TokenType::Comma),

            // Symbolic keywords
            ':' => self.add_token(TokenType::Keyword(Keyword::Not)),
            '&' => self.add_token(TokenType::Keyword(Keyword::And)),
            '|' => self.add_token(TokenType::Keyword(Keyword::Or)),

            // Two-character tokens
            '=' => {
                if self.match_char('>') {
                    self.add_token(TokenType::Arrow)
                } else if self.match_char('=') {
                    self.add_token(TokenType::Ee)
                } else {
                    return Err(self.expected_char("'>' or '=' (after '=')"));
                }
            }

            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenType::Ne)
                } else {
                    return Err(self.expected_char("'=' (after '!')"));
                }
            }

            '<' => {
                if self.match_char('=') {
                    self.add_token(TokenType::Lte)
                } else {
                    self.add_token(TokenType::Lt)
                }
            }

            '>' => {
                if self.match_char('=') {
                    self.add_token(TokenType::Gte)
                } else {
                    self.add_token(TokenType::Gt)
                }
            }

            // String literals
            '"' => self.scan_string()?,

            // Number literals
            c if c.is_ascii_digit() => self.scan_number(),

            // Identifiers and keywords
            c if c.is_ascii_alphabetic() => self.scan_identifier(),

            // Unexpected character
            _ => {
                return Err(UniformError::illegal_char(
                    format!("'{}'", c),
                    self.current_span(),
                ))
            }
        }

        Ok(())
    }

    /// Scan a string literal
    fn scan_string(&mut self) -> UniformResult<()> {
        let mut value = String::new();

        while self.peek() != '"' && !self.is_at_end() {
            // Handle escape sequences
            if self.peek() == '\\' {
                self.advance(); // consume backslash
                if self.is_at_end() {
                    break;
                }
                match self.advance() {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    other => value.push(other),
                }
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            let end = self.position.clone();
            return Err(UniformError::expected_char(
                "'\"'",
                Span::new(end.clone(), end.advanced(None)),
            ));
        }

        // Consume closing quote
        self.advance();

        self.add_token(TokenType::Literal(Literal::String(value)));
        Ok(())
    }

    /// Scan a number literal (integer or float)
    ///
    /// A second `.` ends the literal rather than failing.
    fn scan_number(&mut self) {
        let mut dot_count = 0;

        while self.peek().is_ascii_digit() || self.peek() == '.' {
            if self.peek() == '.' {
                if dot_count == 1 {
                    break;
                }
                dot_count += 1;
            }
            self.advance();
        }

        let lexeme = self.lexeme();

        let literal = if dot_count == 0 {
            match lexeme.parse::<i64>() {
                Ok(value) => Literal::Integer(value),
                Err(_) => Literal::Float(parse_float(&lexeme)),
            }
        } else {
            Literal::Float(parse_float(&lexeme))
        };

        self.add_token(TokenType::Literal(literal));
    }

    /// Scan an identifier or keyword
    fn scan_identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() {
            self.advance();
        }

        let lexeme = self.lexeme();

        // Check if it's a keyword
        let token_type = match Keyword::from_str(&lexeme) {
            Some(keyword) => TokenType::Keyword(keyword),
            None => TokenType::Identifier,
        };

        self.add_token(token_type);
    }

    /// Add a token spanning from `start` to the current position
    fn add_token(&mut self, token_type: TokenType) {
        let lexeme = self.lexeme();
        let span = if self.position.index == self.start.index {
            Span::new(self.start.clone(), self.start.advanced(None))
        } else {
            self.current_span()
        };
        self.tokens.push(Token::new(token_type, lexeme, span));
    }

    /// Advance to the next character
    fn advance(&mut self) -> char {
        let c = self.source[self.position.index];
        self.position.advance(Some(c));
        c
    }

    /// Check if the next character matches and consume it if so
    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.position.index] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    /// Peek at the current character without consuming it
    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.position.index]
        }
    }

    /// Check if we've reached the end of the source
    fn is_at_end(&self) -> bool {
        self.position.index >= self.source.len()
    }

    fn lexeme(&self) -> String {
        self.source[self.start.index..self.position.index]
            .iter()
            .collect()
    }

    fn current_span(&self) -> Span {
        Span::new(self.start.clone(), self.position.clone())
    }

    fn expected_char(&self, details: &str) -> UniformError {
        UniformError::expected_char(details, self.current_span())
    }
}

/// Digits with at most one dot always parse; fall back to 0 for safety
fn parse_float(lexeme: &str) -> f64 {
    lexeme.parse::<f64>().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize_source(source: &str) -> UniformResult<Vec<Token>> {
        Lexer::new("<test>", source).tokenize()
    }

    fn kinds(source: &str) -> Vec<TokenType> {
        tokenize_source(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_empty_source() {
        let tokens = tokenize_source("").unwrap();
        assert_eq!(tokens.len(), 1); // Just EOF
        assert_eq!(tokens[0].token_type, TokenType::Eof);
    }

    #[test]
    fn test_single_character_tokens() {
        assert_eq!(
            kinds("+-*/^()[],"),
            vec![
                TokenType::Plus,
                TokenType::Minus,
                TokenType::Mul,
                TokenType::Div,
                TokenType::Pow,
                TokenType::LParen,
                TokenType::RParen,
                TokenType::LSquare,
                TokenType::RSquare,
                TokenType::Comma,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_two_character_tokens() {
        assert_eq!(
            kinds("=> == != <= >= < >"),
            vec![
                TokenType::Arrow,
                TokenType::Ee,
                TokenType::Ne,
                TokenType::Lte,
                TokenType::Gte,
                TokenType::Lt,
                TokenType::Gt,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("push if do elif else fin for while until inc define"),
            vec![
                TokenType::Keyword(Keyword::Push),
                TokenType::Keyword(Keyword::If),
                TokenType::Keyword(Keyword::Do),
                TokenType::Keyword(Keyword::Elif),
                TokenType::Keyword(Keyword::Else),
                TokenType::Keyword(Keyword::Fin),
                TokenType::Keyword(Keyword::For),
                TokenType::Keyword(Keyword::While),
                TokenType::Keyword(Keyword::Until),
                TokenType::Keyword(Keyword::Inc),
                TokenType::Keyword(Keyword::Define),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_symbolic_keywords() {
        assert_eq!(
            kinds(":a&b|c"),
            vec![
                TokenType::Keyword(Keyword::Not),
                TokenType::Identifier,
                TokenType::Keyword(Keyword::And),
                TokenType::Identifier,
                TokenType::Keyword(Keyword::Or),
                TokenType::Identifier,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        let tokens = tokenize_source("foo myVar123 pushy").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Identifier);
        assert_eq!(tokens[0].lexeme, "foo");
        assert_eq!(tokens[1].lexeme, "myVar123");
        assert_eq!(tokens[2].token_type, TokenType::Identifier);
        assert_eq!(tokens[2].lexeme, "pushy");
    }

    #[test]
    fn test_integer_literals() {
        let tokens = tokenize_source("0 42 123456").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Literal(Literal::Integer(0)));
        assert_eq!(tokens[1].token_type, TokenType::Literal(Literal::Integer(42)));
        assert_eq!(tokens[2].token_type, TokenType::Literal(Literal::Integer(123456)));
    }

    #[test]
    fn test_float_literals() {
        let tokens = tokenize_source("3.25 0.5 7.").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Literal(Literal::Float(3.25)));
        assert_eq!(tokens[1].token_type, TokenType::Literal(Literal::Float(0.5)));
        assert_eq!(tokens[2].token_type, TokenType::Literal(Literal::Float(7.0)));
    }

    #[test]
    fn test_second_dot_ends_number() {
        let tokens = tokenize_source("1.2 + 3").unwrap();
        assert_eq!(tokens[0].lexeme, "1.2");

        // the literal stops at the second dot, which then starts no token
        let err = tokenize_source("1.2.3").unwrap_err();
        assert_eq!(err.details(), "'.'");
        assert_eq!(err.span().start.index, 3);
    }

    #[test]
    fn test_integer_overflow_becomes_float() {
        let tokens = tokenize_source("99999999999999999999").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Literal(Literal::Float(1e20)));
    }

    #[test]
    fn test_string_literals() {
        let tokens = tokenize_source(r#""hello" "foo bar" """#).unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Literal(Literal::String("hello".to_string())));
        assert_eq!(tokens[1].token_type, TokenType::Literal(Literal::String("foo bar".to_string())));
        assert_eq!(tokens[2].token_type, TokenType::Literal(Literal::String(String::new())));
    }

    #[test]
    fn test_string_escape_sequences() {
        let tokens = tokenize_source(r#""hello\nworld" "tab\there" "quote\"test" "back\\slash" "\q""#).unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Literal(Literal::String("hello\nworld".to_string())));
        assert_eq!(tokens[1].token_type, TokenType::Literal(Literal::String("tab\there".to_string())));
        assert_eq!(tokens[2].token_type, TokenType::Literal(Literal::String("quote\"test".to_string())));
        assert_eq!(tokens[3].token_type, TokenType::Literal(Literal::String("back\\slash".to_string())));
        assert_eq!(tokens[4].token_type, TokenType::Literal(Literal::String("q".to_string())));
    }

    #[test]
    fn test_newlines_and_semicolons() {
        assert_eq!(
            kinds("a\nb;c"),
            vec![
                TokenType::Identifier,
                TokenType::Newline,
                TokenType::Identifier,
                TokenType::Newline,
                TokenType::Identifier,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_complete_statement() {
        let tokens = tokenize_source("push x => 5").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Keyword(Keyword::Push));
        assert_eq!(tokens[1].token_type, TokenType::Identifier);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[2].token_type, TokenType::Arrow);
        assert_eq!(tokens[3].token_type, TokenType::Literal(Literal::Integer(5)));
        assert_eq!(tokens[4].token_type, TokenType::Eof);
    }

    #[test]
    fn test_token_display() {
        let tokens = tokenize_source("push x => 2.5 \"s\"").unwrap();
        let shown: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            shown,
            vec!["KEYWORD:push", "IDENTIFIER:x", "ARROW", "FLOAT:2.5", "STRING:s", "EOF"]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize_source(r#""unterminated"#).unwrap_err();
        assert_eq!(err.name(), "Expected Character");
        assert_eq!(err.details(), "'\"'");
    }

    #[test]
    fn test_lone_equals() {
        let err = tokenize_source("x = 1").unwrap_err();
        assert!(matches!(err, UniformError::ExpectedCharacter { .. }));
        assert_eq!(err.details(), "'>' or '=' (after '=')");
        assert_eq!(err.span().start.column, 2);
    }

    #[test]
    fn test_lone_bang() {
        let err = tokenize_source("1 ! 2").unwrap_err();
        assert_eq!(err.details(), "'=' (after '!')");
    }

    #[test]
    fn test_invalid_character() {
        let err = tokenize_source("push x => @").unwrap_err();
        assert!(matches!(err, UniformError::IllegalCharacter { .. }));
        assert_eq!(err.details(), "'@'");
        assert_eq!(err.span().start.column, 10);
        assert_eq!(err.span().end.column, 11);
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = tokenize_source("push\n  x").unwrap();
        assert_eq!(tokens[0].span.start.line, 0);
        assert_eq!(tokens[0].span.end.column, 4);
        assert_eq!(tokens[2].span.start.line, 1);
        assert_eq!(tokens[2].span.start.column, 2);
    }
}
