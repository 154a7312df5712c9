//! # Uniform Programming Language
//!
//! A small dynamically typed scripting language with:
//! - keyword-heavy syntax (`push x => 1`, `if ... do ... fin`, `define f(a) => a`)
//! - Numbers, Strings, Lists and first-class functions
//! - a tree-walking interpreter with lexical scoping
//!
//! ## Architecture
//!
//! The language implementation is organized into several modules:
//! - `lexer`: Tokenization of source code
//! - `parser`: Parsing tokens into an Abstract Syntax Tree (AST)
//! - `runtime`: Values, scopes, built-ins and the interpreter
//! - `error`: Error handling and diagnostics

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;

// Re-export commonly used types
pub use error::{Diagnostic, Position, Span, UniformError, UniformResult};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{Node, Parser};
pub use runtime::{BufferHost, Host, Session, StdHost, Value};

/// Version of the Uniform language
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a Uniform program from source code on stdin/stdout.
///
/// Returns the List of top-level statement values, or `None` for blank input.
pub fn run(source_name: &str, source: &str) -> UniformResult<Option<Value>> {
    Session::new().run(source_name, source)
}

/// Run a Uniform program against a custom host, handing the host back
/// together with the result
pub fn run_with<H: Host>(host: H, source_name: &str, source: &str) -> (UniformResult<Option<Value>>, H) {
    let mut session = Session::with_host(host);
    let result = session.run(source_name, source);
    (result, session.into_host())
}

/// Lex a program without running it
pub fn tokenize(source_name: &str, source: &str) -> UniformResult<Vec<Token>> {
    Lexer::new(source_name, source).tokenize()
}

/// Lex and parse a program without running it
pub fn parse(source_name: &str, source: &str) -> UniformResult<Node> {
    let tokens = tokenize(source_name, source)?;
    Parser::new(tokens).parse()
}
