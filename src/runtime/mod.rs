//! Runtime module
//!
//! This module handles evaluation of Uniform programs: values, scopes,
//! built-in functions and the tree-walking interpreter.

pub mod builtins;
pub mod context;
pub mod interpreter;
pub mod session;
pub mod value;

pub use builtins::{BufferHost, Builtin, Host, StdHost};
pub use context::{Context, ScopeHandle, ScopeId, Scopes};
pub use interpreter::Interpreter;
pub use session::Session;
pub use value::{FunctionValue, OpError, Value};
