//! Expression evaluation

use crate::ast::*;
use crate::interpreter::{at, describe_receiver, Flow, Frame, Unwind};
use crate::span::Span;
use crate::stack;
use crate::state::State;
use crate::value::{RuntimeError, Value};

impl State {
    /// Evaluate an expression
    pub(crate) fn eval_expr(&mut self, expr: &Expr, frame: &mut Frame) -> Flow<Value> {
        stack::guarded(|| self.eval_node(expr, frame))
    }

    fn eval_node(&mut self, expr: &Expr, frame: &mut Frame) -> Flow<Value> {
        match expr {
            Expr::Literal(lit, span) => self.eval_literal(lit, *span),
            Expr::Interpolated(s) => self.eval_interpolated(s, frame),
            Expr::SelfRef(_) => Ok(frame.self_value),
            Expr::Local(id) => Ok(frame.locals.get(&id.name).copied().unwrap_or(Value::Nil)),
            Expr::Constant(id) => self.constant(&id.name).ok_or_else(|| {
                Unwind::Error(
                    RuntimeError::NameError(format!("uninitialized constant {}", id.name)),
                    id.span,
                )
            }),
            Expr::Assign(assign) => {
                let value = self.eval_expr(&assign.value, frame)?;
                frame.locals.insert(assign.target.name.clone(), value);
                Ok(value)
            }
            Expr::CompoundAssign(assign) => self.eval_compound_assign(assign, frame),
            Expr::Call(call) => self.eval_call(call, frame),
            Expr::Not(not) => {
                let value = self.eval_expr(&not.expr, frame)?;
                Ok(Value::Bool(!value.is_truthy()))
            }
            Expr::Logical(logical) => self.eval_logical(logical, frame),
            Expr::If(if_expr) => self.eval_if(if_expr, frame),
            Expr::While(while_expr) => self.eval_while(while_expr, frame),
            Expr::Break(jump) => {
                let value = self.eval_jump_value(jump, frame)?;
                Err(Unwind::Break(value, jump.span))
            }
            Expr::Next(jump) => {
                let value = self.eval_jump_value(jump, frame)?;
                Err(Unwind::Next(value, jump.span))
            }
            Expr::Return(jump) => {
                let value = self.eval_jump_value(jump, frame)?;
                Err(Unwind::Return(value, jump.span))
            }
            Expr::Def(def) => Ok(self.eval_def(def)),
            Expr::Group(body) => self.eval_body(body, frame),
        }
    }

    /// Evaluate a literal; string literals allocate a fresh object each time
    pub(crate) fn eval_literal(&mut self, lit: &Literal, span: Span) -> Flow<Value> {
        match lit {
            Literal::Nil => Ok(Value::Nil),
            Literal::Bool(b) => Ok(Value::Bool(*b)),
            Literal::Integer(n) => Ok(Value::Integer(*n)),
            Literal::Float(f) => Ok(Value::Float(*f)),
            Literal::String(text) => at(self.new_string(text.as_str()), span),
            Literal::Symbol(name) => Ok(self.intern(name)),
        }
    }

    fn eval_interpolated(&mut self, s: &InterpolatedStr, frame: &mut Frame) -> Flow<Value> {
        let mut text = String::new();
        for part in &s.parts {
            match part {
                StrPart::Text(piece) => text.push_str(piece),
                StrPart::Code(body) => {
                    let value = self.eval_body(body, frame)?;
                    let piece = at(self.to_s(value), body.span)?;
                    text.push_str(&piece);
                }
            }
        }
        at(self.new_string(text), s.span)
    }

    fn eval_compound_assign(&mut self, assign: &CompoundAssign, frame: &mut Frame) -> Flow<Value> {
        let current = frame
            .locals
            .get(&assign.target.name)
            .copied()
            .unwrap_or(Value::Nil);
        let rhs = self.eval_expr(&assign.value, frame)?;
        let value = self.dispatch(current, assign.op.method_name(), &[rhs], false, assign.span)?;
        frame.locals.insert(assign.target.name.clone(), value);
        Ok(value)
    }

    /// Evaluate a method call
    ///
    /// Receiver first, then arguments left to right. A bare identifier that
    /// resolves to no method reports a `NameError`, since it could equally
    /// have been meant as a local variable.
    pub(crate) fn eval_call(&mut self, call: &CallExpr, frame: &mut Frame) -> Flow<Value> {
        let (receiver, fcall) = match &call.receiver {
            Some(expr) => {
                let explicit_self = matches!(expr.as_ref(), Expr::SelfRef(_));
                (self.eval_expr(expr, frame)?, explicit_self)
            }
            None => (frame.self_value, true),
        };

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_expr(arg, frame)?);
        }

        let name = call.method.name.as_str();
        match self.dispatch(receiver, name, &args, fcall, call.span) {
            Err(Unwind::Error(RuntimeError::NoMethod { private: false, method, .. }, span))
                if call.receiver.is_none()
                    && call.args.is_empty()
                    && span == call.span
                    && method == name =>
            {
                Err(Unwind::Error(
                    RuntimeError::NameError(format!(
                        "undefined local variable or method '{}' for {}",
                        method,
                        describe_receiver(receiver)
                    )),
                    span,
                ))
            }
            other => other,
        }
    }

    fn eval_logical(&mut self, logical: &LogicalExpr, frame: &mut Frame) -> Flow<Value> {
        let left = self.eval_expr(&logical.left, frame)?;
        match logical.op {
            LogicalOp::And if !left.is_truthy() => Ok(left),
            LogicalOp::Or if left.is_truthy() => Ok(left),
            _ => self.eval_expr(&logical.right, frame),
        }
    }

    fn eval_jump_value(&mut self, jump: &JumpExpr, frame: &mut Frame) -> Flow<Value> {
        match &jump.value {
            Some(expr) => self.eval_expr(expr, frame),
            None => Ok(Value::Nil),
        }
    }
}
