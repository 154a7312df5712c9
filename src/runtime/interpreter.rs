//! Interpreter implementation
//!
//! This module implements the tree-walking interpreter for Uniform. Every
//! node is evaluated against a [`Context`]; the first error aborts the whole
//! evaluation.

use std::rc::Rc;

use log::trace;

use super::builtins::{round_half_up, Builtin, Host};
use super::context::{Context, ScopeId, Scopes};
use super::value::{FunctionValue, OpError, Value};
use crate::error::{RuntimeErrorKind, Span, UniformError, UniformResult};
use crate::parser::ast::{BinaryOp, Node, UnaryOp};

/// Interpreter
pub struct Interpreter<H: Host> {
    scopes: Scopes,
    host: H,
}

impl<H: Host> Interpreter<H> {
    /// Create an interpreter whose global scope holds the predefined names
    pub fn new(host: H) -> Self {
        let mut interpreter = Self {
            scopes: Scopes::new(),
            host,
        };
        interpreter.register_globals();
        interpreter
    }

    fn register_globals(&mut self) {
        let global = ScopeId::GLOBAL;
        self.scopes.set(global, "null", Value::NULL);
        self.scopes.set(global, "false", Value::FALSE);
        self.scopes.set(global, "true", Value::TRUE);
        self.scopes.set(global, "pi", Value::PI);

        for builtin in Builtin::ALL {
            self.scopes.set(global, builtin.name(), Value::Builtin(builtin));
        }
    }

    /// A fresh `<program>` context over the global scope
    pub fn root_context(&self) -> Rc<Context> {
        Rc::new(Context::root(ScopeId::GLOBAL))
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    /// Free scope frames kept only by functions that no longer exist
    pub fn collect_scopes(&mut self) {
        self.scopes.collect();
    }

    /// Evaluate a node
    pub fn visit(&mut self, node: &Node, context: &Rc<Context>) -> UniformResult<Value> {
        match node {
            Node::Number { value, .. } => Ok(Value::Number(*value)),

            Node::String { value, .. } => Ok(Value::String(value.clone())),

            Node::List { elements, .. }
            | Node::Statements {
                statements: elements,
                ..
            } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.visit(element, context)?);
                }
                Ok(Value::List(values))
            }

            Node::VarAccess { name, span } => {
                self.scopes.get(context.scope, name).cloned().ok_or_else(|| {
                    UniformError::runtime(
                        RuntimeErrorKind::UndefinedVariable,
                        format!("'{}' is not defined", name),
                        span.clone(),
                        context,
                    )
                })
            }

            Node::VarAssign { name, value, .. } => {
                let value = self.visit(value, context)?;
                self.scopes.set(context.scope, name, value.clone());
                Ok(value)
            }

            Node::VarReAssign { name, value, .. } => {
                let value = self.visit(value, context)?;
                if !self.scopes.reassign(context.scope, name, value.clone()) {
                    trace!("reassignment of unbound '{}' ignored", name);
                }
                Ok(value)
            }

            Node::BinOp {
                left,
                operator,
                right,
                span,
            } => {
                let left_value = self.visit(left, context)?;
                let right_value = self.visit(right, context)?;

                let result = match operator {
                    BinaryOp::Add => left_value.added_to(&right_value),
                    BinaryOp::Subtract => left_value.subbed_by(&right_value),
                    BinaryOp::Multiply => left_value.multed_by(&right_value),
                    BinaryOp::Divide => left_value.dived_by(&right_value),
                    BinaryOp::Power => left_value.powed_by(&right_value),
                    BinaryOp::Equal => left_value.comparison_eq(&right_value),
                    BinaryOp::NotEqual => left_value.comparison_ne(&right_value),
                    BinaryOp::Less => left_value.comparison_lt(&right_value),
                    BinaryOp::Greater => left_value.comparison_gt(&right_value),
                    BinaryOp::LessEqual => left_value.comparison_lte(&right_value),
                    BinaryOp::GreaterEqual => left_value.comparison_gte(&right_value),
                    BinaryOp::And => left_value.anded_by(&right_value),
                    BinaryOp::Or => left_value.ored_by(&right_value),
                };

                result.map_err(|err| match err {
                    OpError::DivisionByZero => UniformError::runtime(
                        RuntimeErrorKind::DivisionByZero,
                        "Division by zero",
                        right.span().clone(),
                        context,
                    ),
                    OpError::IllegalOperation => UniformError::runtime(
                        RuntimeErrorKind::IllegalOperation,
                        format!(
                            "Illegal operation: {} {} {}",
                            left_value.type_name(),
                            operator.symbol(),
                            right_value.type_name()
                        ),
                        span.clone(),
                        context,
                    ),
                })
            }

            Node::UnaryOp {
                operator,
                operand,
                span,
            } => {
                let value = self.visit(operand, context)?;

                let result = match (operator, &value) {
                    (UnaryOp::Plus, Value::Number(_)) => Ok(value.clone()),
                    (UnaryOp::Plus, _) => Err(OpError::IllegalOperation),
                    (UnaryOp::Minus, _) => value.multed_by(&Value::Number(-1.0)),
                    (UnaryOp::Not, _) => value.notted(),
                };

                result.map_err(|_| {
                    UniformError::runtime(
                        RuntimeErrorKind::IllegalOperation,
                        format!("Illegal operation: {}{}", operator.symbol(), value.type_name()),
                        span.clone(),
                        context,
                    )
                })
            }

            Node::If {
                cases, else_case, ..
            } => {
                for case in cases {
                    let condition = self.visit(&case.condition, context)?;
                    if condition.is_true() {
                        let value = self.visit(&case.body, context)?;
                        return Ok(if case.returns_null { Value::NULL } else { value });
                    }
                }

                match else_case {
                    Some(else_case) => {
                        let value = self.visit(&else_case.body, context)?;
                        Ok(if else_case.returns_null { Value::NULL } else { value })
                    }
                    None => Ok(Value::NULL),
                }
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
                let start_value = self.visit_number(start, context)?;
                let end_value = self.visit_number(end, context)?;
                let step_value = match step {
                    Some(step) => self.visit_number(step, context)?,
                    None => 1.0,
                };

                // Direction is fixed by the sign of the start value
                let ascending = start_value >= 0.0;
                let mut i = start_value;
                let mut elements = Vec::new();

                loop {
                    let in_range = if ascending { i < end_value } else { i > end_value };
                    if !in_range {
                        break;
                    }

                    self.scopes.set(context.scope, var_name, Value::Number(i));
                    i += step_value;

                    let value = self.visit(body, context)?;
                    if !returns_null {
                        elements.push(value);
                    }
                }

                Ok(if *returns_null { Value::NULL } else { Value::List(elements) })
            }

            Node::While {
                condition,
                body,
                returns_null,
                ..
            } => {
                let mut elements = Vec::new();

                loop {
                    let condition_value = self.visit(condition, context)?;
                    if !condition_value.is_true() {
                        break;
                    }

                    let value = self.visit(body, context)?;
                    if !returns_null {
                        elements.push(value);
                    }
                }

                Ok(if *returns_null { Value::NULL } else { Value::List(elements) })
            }

            Node::FuncDef {
                name, params, body, ..
            } => {
                let function = Value::Function(FunctionValue {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                    scope: self.scopes.handle(context.scope),
                });

                if let Some(name) = name {
                    self.scopes.set(context.scope, name, function.clone());
                }

                Ok(function)
            }

            Node::Call {
                callee,
                arguments,
                span,
            } => {
                let callee_value = self.visit(callee, context)?;

                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.visit(argument, context)?);
                }

                match callee_value {
                    Value::Function(function) => self.call_function(&function, args, span, context),
                    Value::Builtin(builtin) => self.call_builtin(builtin, args, span, context),
                    other => Err(UniformError::runtime(
                        RuntimeErrorKind::NotCallable,
                        format!("{} is not callable", other.type_name()),
                        callee.span().clone(),
                        context,
                    )),
                }
            }
        }
    }

    /// Evaluate a node that must produce a Number
    fn visit_number(&mut self, node: &Node, context: &Rc<Context>) -> UniformResult<f64> {
        match self.visit(node, context)? {
            Value::Number(n) => Ok(n),
            other => Err(UniformError::runtime(
                RuntimeErrorKind::IllegalOperation,
                format!("Expected a Number, got {}", other.type_name()),
                node.span().clone(),
                context,
            )),
        }
    }

    fn call_function(
        &mut self,
        function: &FunctionValue,
        args: Vec<Value>,
        span: &Span,
        context: &Rc<Context>,
    ) -> UniformResult<Value> {
        let name = function.display_name();
        check_arity(name, function.params.len(), args.len(), span, context)?;

        let scope = self.scopes.push(Some(function.scope.id()));
        let call_context = Rc::new(Context::call(name, context, span.start.clone(), scope));

        for (param, arg) in function.params.iter().zip(args) {
            self.scopes.set(scope, param, arg);
        }

        trace!("calling {}/{} in scope frame {:?}", name, function.params.len(), scope);
        let result = self.visit(&function.body, &call_context);
        self.scopes.release(scope);
        result
    }

    fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Value>,
        span: &Span,
        context: &Rc<Context>,
    ) -> UniformResult<Value> {
        let name = builtin.name();
        check_arity(name, builtin.params().len(), args.len(), span, context)?;

        let scope = self.scopes.push(None);
        let call_context = Rc::new(Context::call(name, context, span.start.clone(), scope));

        for (param, arg) in builtin.params().iter().zip(args) {
            self.scopes.set(scope, param, arg);
        }

        trace!("calling built-in {}", name);
        let result = self.execute_builtin(builtin, span, &call_context);
        self.scopes.release(scope);
        result
    }

    fn execute_builtin(
        &mut self,
        builtin: Builtin,
        span: &Span,
        context: &Rc<Context>,
    ) -> UniformResult<Value> {
        match builtin {
            Builtin::Print => {
                let text = self.argument(context, "data").to_display_string();
                self.host.print(&text);
                Ok(Value::NULL)
            }
            Builtin::Capture => {
                let prompt = self.argument(context, "data").to_display_string();
                let line = self.host.capture(&prompt).map_err(|err| {
                    UniformError::runtime(
                        RuntimeErrorKind::Io,
                        format!("Failed to read input: {}", err),
                        span.clone(),
                        context,
                    )
                })?;
                Ok(Value::String(line))
            }
            Builtin::Random => Ok(Value::Number(self.host.random())),
            Builtin::Round => match self.argument(context, "val") {
                Value::Number(n) => Ok(Value::Number(round_half_up(n))),
                other => Err(UniformError::runtime(
                    RuntimeErrorKind::IllegalOperation,
                    format!("Cannot round a {}", other.type_name()),
                    span.clone(),
                    context,
                )),
            },
        }
    }

    fn argument(&self, context: &Context, name: &str) -> Value {
        match self.scopes.get(context.scope, name) {
            Some(value) => value.clone(),
            None => panic!("built-in argument '{}' was not bound", name),
        }
    }
}

fn check_arity(
    name: &str,
    expected: usize,
    given: usize,
    span: &Span,
    context: &Rc<Context>,
) -> UniformResult<()> {
    let details = if given > expected {
        format!("{} too many args passed into '{}'", given - expected, name)
    } else if given < expected {
        format!("{} too few args passed into '{}'", expected - given, name)
    } else {
        return Ok(());
    };

    Err(UniformError::runtime(
        RuntimeErrorKind::ArityMismatch,
        details,
        span.clone(),
        context,
    ))
}
