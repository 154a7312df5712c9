//! Long-lived evaluation session
//!
//! A [`Session`] keeps one interpreter and one `<program>` context alive, so
//! bindings made by one input are visible to the next (the REPL relies on
//! this).

use std::rc::Rc;

use log::debug;

use super::builtins::{Host, StdHost};
use super::context::Context;
use super::interpreter::Interpreter;
use super::value::Value;
use crate::error::UniformResult;
use crate::lexer::Lexer;
use crate::parser::Parser;

pub struct Session<H: Host = StdHost> {
    interpreter: Interpreter<H>,
    root: Rc<Context>,
}

impl Session<StdHost> {
    /// A session wired to stdin/stdout
    pub fn new() -> Self {
        Self::with_host(StdHost)
    }
}

impl Default for Session<StdHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Session<H> {
    pub fn with_host(host: H) -> Self {
        let interpreter = Interpreter::new(host);
        let root = interpreter.root_context();
        Self { interpreter, root }
    }

    /// Lex, parse and evaluate `source` against the session's global scope.
    ///
    /// Whitespace-only input does nothing and yields `Ok(None)`. Otherwise
    /// the result is the List of top-level statement values.
    pub fn run(&mut self, source_name: &str, source: &str) -> UniformResult<Option<Value>> {
        if source.trim().is_empty() {
            return Ok(None);
        }

        let tokens = Lexer::new(source_name, source).tokenize()?;
        debug!("{}: lexed {} tokens", source_name, tokens.len());

        let ast = Parser::new(tokens).parse()?;
        debug!("{}: parsed, evaluating", source_name);

        let result = self.interpreter.visit(&ast, &self.root);
        self.interpreter.collect_scopes();
        Ok(Some(result?))
    }

    /// Current global binding for `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.interpreter.scopes().get(self.root.scope, name)
    }

    pub fn host(&self) -> &H {
        self.interpreter.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.interpreter.host_mut()
    }

    pub fn into_host(self) -> H {
        self.interpreter.into_host()
    }
}
