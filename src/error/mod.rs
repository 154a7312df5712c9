//! Error handling and diagnostics for the Uniform language
//!
//! This module provides the source position tracker, spans and the error
//! taxonomy shared by every stage of the pipeline (lexing, parsing and
//! evaluation).

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::runtime::Context;

pub mod diagnostic;

pub use diagnostic::{string_with_arrows, Diagnostic};

/// Result type alias for Uniform operations
pub type UniformResult<T> = Result<T, UniformError>;

/// A position inside a named source text.
///
/// `line` and `column` are 0-based; they are shown 1-based in reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Character index into the source text
    pub index: usize,
    pub line: usize,
    pub column: usize,
    /// Diagnostic label of the source (file name, `<stdin>`, ...)
    pub source_name: Rc<str>,
    pub source_text: Rc<str>,
}

impl Position {
    /// Create a position at the start of a source text
    pub fn start(source_name: &str, source_text: &str) -> Self {
        Self {
            index: 0,
            line: 0,
            column: 0,
            source_name: Rc::from(source_name),
            source_text: Rc::from(source_text),
        }
    }

    /// Move past `current`, the character at this position
    pub fn advance(&mut self, current: Option<char>) -> &mut Self {
        self.index += 1;
        self.column += 1;

        if current == Some('\n') {
            self.line += 1;
            self.column = 0;
        }

        self
    }

    /// A copy of this position advanced past `current`
    pub fn advanced(&self, current: Option<char>) -> Self {
        let mut next = self.clone();
        next.advance(current);
        next
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_name, self.line + 1, self.column + 1)
    }
}

/// The source text a token, node or error covers
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span from the start of `self` to the end of `other`
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.clone(), other.end.clone())
    }
}

/// Specific causes of a runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedVariable,
    IllegalOperation,
    DivisionByZero,
    ArityMismatch,
    NotCallable,
    Io,
}

/// Main error type for the Uniform language
#[derive(Debug, Clone, Error)]
pub enum UniformError {
    /// The lexer met a character that starts no token
    #[error("Illegal Character: {details}")]
    IllegalCharacter { details: String, span: Span },

    /// The lexer needed a specific character after a partial operator
    #[error("Expected Character: {details}")]
    ExpectedCharacter { details: String, span: Span },

    /// Unmet grammar expectation at a token
    #[error("Invalid Syntax: {details}")]
    InvalidSyntax { details: String, span: Span },

    /// Evaluation failure, carrying the context it happened in
    #[error("Runtime Error: {details}")]
    Runtime {
        kind: RuntimeErrorKind,
        details: String,
        span: Span,
        context: Rc<Context>,
    },
}

impl UniformError {
    pub fn illegal_char(details: impl Into<String>, span: Span) -> Self {
        Self::IllegalCharacter {
            details: details.into(),
            span,
        }
    }

    pub fn expected_char(details: impl Into<String>, span: Span) -> Self {
        Self::ExpectedCharacter {
            details: details.into(),
            span,
        }
    }

    pub fn invalid_syntax(details: impl Into<String>, span: Span) -> Self {
        Self::InvalidSyntax {
            details: details.into(),
            span,
        }
    }

    pub fn runtime(
        kind: RuntimeErrorKind,
        details: impl Into<String>,
        span: Span,
        context: &Rc<Context>,
    ) -> Self {
        Self::Runtime {
            kind,
            details: details.into(),
            span,
            context: Rc::clone(context),
        }
    }

    /// Get the error name as shown in reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::IllegalCharacter { .. } => "Illegal Character",
            Self::ExpectedCharacter { .. } => "Expected Character",
            Self::InvalidSyntax { .. } => "Invalid Syntax",
            Self::Runtime { .. } => "Runtime Error",
        }
    }

    pub fn details(&self) -> &str {
        match self {
            Self::IllegalCharacter { details, .. }
            | Self::ExpectedCharacter { details, .. }
            | Self::InvalidSyntax { details, .. }
            | Self::Runtime { details, .. } => details,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Self::IllegalCharacter { span, .. }
            | Self::ExpectedCharacter { span, .. }
            | Self::InvalidSyntax { span, .. }
            | Self::Runtime { span, .. } => span,
        }
    }

    /// The runtime cause, if this is a runtime error
    pub fn runtime_kind(&self) -> Option<RuntimeErrorKind> {
        match self {
            Self::Runtime { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Traceback lines for a runtime error, oldest frame first.
    ///
    /// Empty for lexer and syntax errors.
    pub fn traceback(&self) -> String {
        let Self::Runtime { span, context, .. } = self else {
            return String::new();
        };

        let mut result = String::new();
        let mut position = Some(span.start.clone());
        let mut frame = Some(Rc::clone(context));

        while let Some(ctx) = frame {
            let line = match &position {
                Some(pos) => format!(
                    "  File {}, line {}, in {}\n",
                    pos.source_name,
                    pos.line + 1,
                    ctx.display_name
                ),
                None => format!("  File <unknown>, in {}\n", ctx.display_name),
            };
            result.insert_str(0, &line);
            position = ctx.parent_entry.clone();
            frame = ctx.parent.clone();
        }

        format!("Traceback (most recent call last):\n{}", result)
    }

    /// Plain-text report: header, location, caret-annotated excerpt
    pub fn report(&self) -> String {
        let span = self.span();
        let mut output = String::new();

        if matches!(self, Self::Runtime { .. }) {
            output.push_str(&self.traceback());
            output.push_str(&format!("{}\n", self));
        } else {
            output.push_str(&format!("{}\n", self));
            output.push_str(&format!(
                "File {}, line {}\n",
                span.start.source_name,
                span.start.line + 1
            ));
        }

        output.push('\n');
        output.push_str(&string_with_arrows(
            &span.start.source_text,
            &span.start,
            &span.end,
        ));
        output
    }
}
