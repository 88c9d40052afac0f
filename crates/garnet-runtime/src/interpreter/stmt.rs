//! Statement-like constructs: sequences, conditionals, loops, definitions

use crate::ast::*;
use crate::interpreter::{Flow, Frame, Unwind};
use crate::method_dispatch::{Arity, Method, MethodBody, TypeTag, UserMethod, Visibility};
use crate::state::State;
use crate::value::Value;
use std::rc::Rc;
use tracing::trace;

impl State {
    /// Evaluate a sequence, yielding the last value (nil when empty)
    pub(crate) fn eval_body(&mut self, body: &Body, frame: &mut Frame) -> Flow<Value> {
        let mut last = Value::Nil;
        for expr in &body.exprs {
            last = self.eval_expr(expr, frame)?;
        }
        Ok(last)
    }

    pub(super) fn eval_if(&mut self, if_expr: &IfExpr, frame: &mut Frame) -> Flow<Value> {
        let cond = self.eval_expr(&if_expr.cond, frame)?;
        if cond.is_truthy() {
            self.eval_body(&if_expr.then_body, frame)
        } else if let Some(else_body) = &if_expr.else_body {
            self.eval_body(else_body, frame)
        } else {
            Ok(Value::Nil)
        }
    }

    /// `while` / `until`; evaluates to nil unless left via `break value`
    pub(super) fn eval_while(&mut self, while_expr: &WhileExpr, frame: &mut Frame) -> Flow<Value> {
        loop {
            let cond = self.eval_expr(&while_expr.cond, frame)?;
            if cond.is_truthy() == while_expr.negated {
                return Ok(Value::Nil);
            }
            match self.eval_body(&while_expr.body, frame) {
                Ok(_) | Err(Unwind::Next(..)) => {}
                Err(Unwind::Break(value, _)) => return Ok(value),
                Err(other) => return Err(other),
            }
        }
    }

    /// `def` adds a public method to `Object` and evaluates to its name
    pub(super) fn eval_def(&mut self, def: &MethodDef) -> Value {
        let name = def.name.name.as_str();
        let method = Method {
            body: MethodBody::User(Rc::new(UserMethod {
                name: name.to_string(),
                params: def.params.iter().map(|p| p.name.clone()).collect(),
                body: def.body.clone(),
            })),
            arity: Arity::Exact(def.params.len()),
            visibility: Visibility::Public,
        };
        self.define_entry(TypeTag::Object, name, method);
        trace!(method = name, params = def.params.len(), "defined method");
        self.intern(name)
    }
}
