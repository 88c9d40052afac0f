//! Built-in methods
//!
//! Every built-in is a plain `fn(&mut State, receiver, args)` registered in
//! the method table when a state opens. Arity is checked by dispatch before
//! the function runs, so implementations index `args` directly.

mod kernel;
mod numeric;
mod object;
mod string;

use crate::lexer::OPERATOR_SYMBOLS;
use crate::method_dispatch::{Arity, Method, TypeTag};
use crate::state::State;
use crate::value::{RuntimeError, Value};
use std::rc::Rc;

pub(crate) use numeric::format_float;

/// Signature shared by all built-ins
pub(crate) type Builtin = fn(&mut State, Value, &[Value]) -> Result<Value, RuntimeError>;

/// Register every built-in method
pub(crate) fn install(state: &mut State) {
    kernel::install(state);
    object::install(state);
    numeric::install(state);
    string::install(state);
}

pub(crate) fn define(state: &mut State, tag: TypeTag, name: &str, arity: Arity, f: Builtin) {
    state.define_entry(tag, name, Method::native(arity, Rc::new(f)));
}

pub(crate) fn define_private(state: &mut State, tag: TypeTag, name: &str, arity: Arity, f: Builtin) {
    state.define_entry(tag, name, Method::native(arity, Rc::new(f)).private());
}

/// Double-quoted, escaped form of a string
pub(crate) fn inspect_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x1b' => out.push_str("\\e"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0b' => out.push_str("\\v"),
            '\x0c' => out.push_str("\\f"),
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `:name`, or `:"odd name"` when the name is not a bare identifier
pub(crate) fn inspect_symbol(name: &str) -> String {
    if is_bare_symbol(name) {
        format!(":{}", name)
    } else {
        format!(":{}", inspect_str(name))
    }
}

fn is_bare_symbol(name: &str) -> bool {
    if OPERATOR_SYMBOLS.contains(&name) {
        return true;
    }
    let stem = name.strip_suffix(['?', '!', '=']).unwrap_or(name);
    let mut chars = stem.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Interpret a value as a boolean argument the way `&`, `|` and `^` do
pub(crate) fn truthy(args: &[Value]) -> bool {
    args.first().is_some_and(Value::is_truthy)
}
