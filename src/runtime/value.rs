//! Runtime value representation
//!
//! This module defines runtime values for Uniform and the operators they
//! support. Operators never fail with a host panic: unsupported combinations
//! return an [`OpError`] that the interpreter turns into a runtime error at
//! the right span.

use std::fmt;
use std::rc::Rc;

use super::builtins::Builtin;
use super::context::{ScopeHandle, ScopeId};
use crate::parser::Node;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// Also encodes booleans: 0 is false, anything else is true
    Number(f64),
    String(String),
    List(Vec<Value>),
    Function(FunctionValue),
    Builtin(Builtin),
}

/// User-defined function value
#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Node>,
    /// Scope frame the function was defined in; calls resolve free names
    /// through its chain
    pub scope: ScopeHandle,
}

impl FunctionValue {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

/// Why an operator could not produce a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpError {
    IllegalOperation,
    DivisionByZero,
}

pub type OpResult = Result<Value, OpError>;

impl Value {
    pub const NULL: Value = Value::Number(0.0);
    pub const FALSE: Value = Value::Number(0.0);
    pub const TRUE: Value = Value::Number(1.0);
    pub const PI: Value = Value::Number(std::f64::consts::PI);

    fn from_bool(b: bool) -> Value {
        if b {
            Value::TRUE
        } else {
            Value::FALSE
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Function(_) => "Function",
            Value::Builtin(_) => "BuiltinFunction",
        }
    }

    /// Truthiness used by conditions and loops
    pub fn is_true(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(elements) => !elements.is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    fn numeric(&self, other: &Value, op: impl FnOnce(f64, f64) -> Value) -> OpResult {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(op(*a, *b)),
            _ => Err(OpError::IllegalOperation),
        }
    }

    pub fn added_to(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => Err(OpError::IllegalOperation),
        }
    }

    pub fn subbed_by(&self, other: &Value) -> OpResult {
        self.numeric(other, |a, b| Value::Number(a - b))
    }

    pub fn multed_by(&self, other: &Value) -> OpResult {
        self.numeric(other, |a, b| Value::Number(a * b))
    }

    pub fn dived_by(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(_), Value::Number(b)) if *b == 0.0 => Err(OpError::DivisionByZero),
            _ => self.numeric(other, |a, b| Value::Number(a / b)),
        }
    }

    pub fn powed_by(&self, other: &Value) -> OpResult {
        self.numeric(other, |a, b| Value::Number(a.powf(b)))
    }

    /// `==`: a String compared with anything else is simply unequal, a
    /// Number compared with a non-Number is illegal
    pub fn comparison_eq(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::from_bool(a == b)),
            (Value::String(a), Value::String(b)) => Ok(Value::from_bool(a == b)),
            (Value::String(_), _) => Ok(Value::FALSE),
            _ => Err(OpError::IllegalOperation),
        }
    }

    /// `!=`: mixed String and Number comparisons yield false
    pub fn comparison_ne(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::from_bool(a != b)),
            (Value::String(a), Value::String(b)) => Ok(Value::from_bool(a != b)),
            (Value::String(_), _) | (Value::Number(_), _) => Ok(Value::FALSE),
            _ => Err(OpError::IllegalOperation),
        }
    }

    pub fn comparison_lt(&self, other: &Value) -> OpResult {
        self.numeric(other, |a, b| Value::from_bool(a < b))
    }

    pub fn comparison_gt(&self, other: &Value) -> OpResult {
        self.numeric(other, |a, b| Value::from_bool(a > b))
    }

    pub fn comparison_lte(&self, other: &Value) -> OpResult {
        self.numeric(other, |a, b| Value::from_bool(a <= b))
    }

    pub fn comparison_gte(&self, other: &Value) -> OpResult {
        self.numeric(other, |a, b| Value::from_bool(a >= b))
    }

    /// `&`: a String accepts any right operand, a Number only Numbers
    pub fn anded_by(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(_), Value::Number(_)) | (Value::String(_), _) => {
                Ok(Value::from_bool(self.is_true() && other.is_true()))
            }
            _ => Err(OpError::IllegalOperation),
        }
    }

    pub fn ored_by(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(_), Value::Number(_)) | (Value::String(_), _) => {
                Ok(Value::from_bool(self.is_true() || other.is_true()))
            }
            _ => Err(OpError::IllegalOperation),
        }
    }

    pub fn notted(&self) -> OpResult {
        match self {
            Value::Number(n) => Ok(Value::from_bool(*n == 0.0)),
            _ => Err(OpError::IllegalOperation),
        }
    }

    /// Call `f` with the defining scope of every function in this value
    pub(crate) fn for_each_scope(&self, f: &mut impl FnMut(ScopeId)) {
        match self {
            Value::Function(function) => f(function.scope.id()),
            Value::List(elements) => {
                for element in elements {
                    element.for_each_scope(f);
                }
            }
            _ => {}
        }
    }

    /// Text written by `print`: strings unquoted, everything else as displayed
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Shortest round-trip digits, switching to exponent notation below 1e-6
/// and from 1e21 up (`1e-7`, `1.5e+21`)
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(elements) => {
                write!(f, "[")?;
                for (i, v) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Function(func) => write!(f, "<function {}>", func.display_name()),
            Value::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => {
                Rc::ptr_eq(&a.body, &b.body) && a.scope.id() == b.scope.id()
            }
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}
