//! Parser module
//!
//! This module handles parsing tokens into an Abstract Syntax Tree (AST).

pub mod ast;
pub mod parser;

pub use ast::{BinaryOp, ElseCase, IfCase, Node, UnaryOp};
pub use parser::Parser;
