//! AST interpreter (tree-walking)
//!
//! Evaluation is implemented directly on `State`: a script shares the heap,
//! symbol table, method table and constants with the host. Non-local exits
//! (`break`, `next`, `return`, errors) travel as `Unwind` through the `Err`
//! side of `Flow`, so `?` propagates them through nested expressions.

mod expr;
mod stmt;

use crate::ast::Program;
use crate::method_dispatch::{MethodBody, UserMethod, Visibility};
use crate::span::Span;
use crate::stack;
use crate::state::State;
use crate::value::{RuntimeError, Value};
use std::collections::HashMap;
use tracing::trace;

/// Non-local exit in flight
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Unwind {
    Break(Value, Span),
    Next(Value, Span),
    Return(Value, Span),
    /// Error plus the span of the call or expression that raised it
    Error(RuntimeError, Span),
}

impl Unwind {
    /// Collapse into an error; jumps that escaped their construct become `InvalidJump`
    pub(crate) fn into_error(self) -> (RuntimeError, Span) {
        match self {
            Unwind::Error(error, span) => (error, span),
            Unwind::Break(_, span) => (
                RuntimeError::InvalidJump("break used outside of a loop".to_string()),
                span,
            ),
            Unwind::Next(_, span) => (
                RuntimeError::InvalidJump("next used outside of a loop".to_string()),
                span,
            ),
            Unwind::Return(_, span) => (
                RuntimeError::InvalidJump("unexpected return".to_string()),
                span,
            ),
        }
    }
}

pub(crate) type Flow<T> = Result<T, Unwind>;

/// Attach a span to a plain runtime error
pub(crate) fn at<T>(result: Result<T, RuntimeError>, span: Span) -> Flow<T> {
    result.map_err(|error| Unwind::Error(error, span))
}

/// Activation record: `self` plus local variables
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) self_value: Value,
    pub(crate) locals: HashMap<String, Value>,
}

impl Frame {
    pub(crate) fn new(self_value: Value, locals: HashMap<String, Value>) -> Self {
        Self {
            self_value,
            locals,
        }
    }
}

/// `nil`, `true`, `main:Object`, `an instance of String`
pub(crate) fn describe_receiver(value: Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Main => "main:Object".to_string(),
        other => format!("an instance of {}", other.type_tag()),
    }
}

impl State {
    /// Run a parsed program in the top-level frame
    ///
    /// Top-level locals are moved into the frame for the duration and moved
    /// back afterwards, so they survive between evaluations even on error.
    pub(crate) fn execute(&mut self, program: &Program) -> Result<Value, (RuntimeError, Span)> {
        let mut frame = Frame::new(Value::Main, std::mem::take(&mut self.top_locals));
        let result = self.eval_body(&program.body, &mut frame);
        self.top_locals = frame.locals;

        match result {
            Ok(value) | Err(Unwind::Return(value, _)) => Ok(value),
            Err(unwind) => Err(unwind.into_error()),
        }
    }

    /// Resolve and run a method
    ///
    /// `fcall` marks a call without an explicit receiver, the only form that
    /// may reach private methods. Errors raised by the method itself are
    /// tagged with `span`; errors from deeper script frames keep their own.
    pub(crate) fn dispatch(
        &mut self,
        receiver: Value,
        name: &str,
        args: &[Value],
        fcall: bool,
        span: Span,
    ) -> Flow<Value> {
        let tag = receiver.type_tag();
        trace!(method = name, receiver = tag.name(), args = args.len(), "dispatch");

        let Some(method) = self.find_method(tag, name) else {
            return Err(Unwind::Error(no_method(receiver, name, false), span));
        };
        if method.visibility == Visibility::Private && !fcall {
            return Err(Unwind::Error(no_method(receiver, name, true), span));
        }
        at(method.arity.check(args.len()), span)?;

        if self.depth >= self.config().max_call_depth {
            return Err(Unwind::Error(RuntimeError::StackTooDeep, span));
        }
        self.depth += 1;
        let result = stack::guarded(|| match &method.body {
            MethodBody::Native(f) => at(f(self, receiver, args), span),
            MethodBody::User(user) => self.run_user_method(user, receiver, args),
        });
        self.depth -= 1;
        result
    }

    fn run_user_method(&mut self, method: &UserMethod, receiver: Value, args: &[Value]) -> Flow<Value> {
        let locals = method
            .params
            .iter()
            .cloned()
            .zip(args.iter().copied())
            .collect();
        let mut frame = Frame::new(receiver, locals);

        match self.eval_body(&method.body, &mut frame) {
            Ok(value) | Err(Unwind::Return(value, _)) => Ok(value),
            Err(Unwind::Error(error, span)) => Err(Unwind::Error(error, span)),
            Err(jump) => {
                let (error, span) = jump.into_error();
                Err(Unwind::Error(error, span))
            }
        }
    }

    /// Call a method from native code, ignoring visibility
    pub(crate) fn call(
        &mut self,
        receiver: Value,
        name: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        self.dispatch(receiver, name, args, true, Span::dummy())
            .map_err(|unwind| unwind.into_error().0)
    }
}

pub(crate) fn no_method(receiver: Value, name: &str, private: bool) -> RuntimeError {
    RuntimeError::NoMethod {
        method: name.to_string(),
        receiver: describe_receiver(receiver),
        private,
    }
}
