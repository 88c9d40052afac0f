//! Methods shared by every value, plus `nil`, `true` and `false`

use super::{define, truthy};
use crate::method_dispatch::{Arity, TypeTag, Visibility};
use crate::state::State;
use crate::value::{RuntimeError, Value};

pub(super) fn install(state: &mut State) {
    define(state, TypeTag::Object, "to_s", Arity::Exact(0), to_s);
    define(state, TypeTag::Object, "inspect", Arity::Exact(0), inspect);
    define(state, TypeTag::Object, "nil?", Arity::Exact(0), |_, _, _| Ok(Value::Bool(false)));
    define(state, TypeTag::Object, "respond_to?", Arity::Exact(1), respond_to);
    define(state, TypeTag::Object, "send", Arity::Variadic(1), send);
    define(state, TypeTag::Object, "==", Arity::Exact(1), identical);
    define(state, TypeTag::Object, "equal?", Arity::Exact(1), identical);
    define(state, TypeTag::Object, "!=", Arity::Exact(1), not_equal);
    define(state, TypeTag::Object, "class_name", Arity::Exact(0), class_name);
    define(state, TypeTag::Object, "itself", Arity::Exact(0), |_, recv, _| Ok(recv));
    define(state, TypeTag::Object, "dup", Arity::Exact(0), dup);
    define(state, TypeTag::Object, "frozen?", Arity::Exact(0), |state, recv, _| {
        Ok(Value::Bool(state.is_frozen(recv)?))
    });
    define(state, TypeTag::Object, "freeze", Arity::Exact(0), freeze);

    define(state, TypeTag::NilClass, "to_s", Arity::Exact(0), |state, _, _| state.new_string(""));
    define(state, TypeTag::NilClass, "to_i", Arity::Exact(0), |_, _, _| Ok(Value::Integer(0)));
    define(state, TypeTag::NilClass, "inspect", Arity::Exact(0), |state, _, _| {
        state.new_string("nil")
    });
    define(state, TypeTag::NilClass, "nil?", Arity::Exact(0), |_, _, _| Ok(Value::Bool(true)));

    for tag in [TypeTag::TrueClass, TypeTag::FalseClass] {
        define(state, tag, "to_s", Arity::Exact(0), bool_to_s);
        define(state, tag, "inspect", Arity::Exact(0), bool_to_s);
    }
    for tag in [TypeTag::NilClass, TypeTag::FalseClass] {
        define(state, tag, "&", Arity::Exact(1), |_, _, _| Ok(Value::Bool(false)));
        define(state, tag, "|", Arity::Exact(1), |_, _, args| Ok(Value::Bool(truthy(args))));
        define(state, tag, "^", Arity::Exact(1), |_, _, args| Ok(Value::Bool(truthy(args))));
    }
    define(state, TypeTag::TrueClass, "&", Arity::Exact(1), |_, _, args| {
        Ok(Value::Bool(truthy(args)))
    });
    define(state, TypeTag::TrueClass, "|", Arity::Exact(1), |_, _, _| Ok(Value::Bool(true)));
    define(state, TypeTag::TrueClass, "^", Arity::Exact(1), |_, _, args| {
        Ok(Value::Bool(!truthy(args)))
    });
}

fn to_s(state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    let text = match recv {
        Value::Main => "main".to_string(),
        other => format!("#<{}>", other.type_tag()),
    };
    state.new_string(text)
}

fn inspect(state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    state.call(recv, "to_s", &[])
}

fn bool_to_s(state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    state.new_string(if recv.is_truthy() { "true" } else { "false" })
}

/// Public methods only; private Kernel functions do not count
fn respond_to(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let name = state.name_arg(args[0])?;
    let found = state
        .find_method(recv.type_tag(), &name)
        .is_some_and(|method| method.visibility == Visibility::Public);
    Ok(Value::Bool(found))
}

/// Call by name, bypassing visibility
fn send(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let name = state.name_arg(args[0])?;
    state.call(recv, &name, &args[1..])
}

fn identical(_state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(recv == args[0]))
}

fn not_equal(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let equal = state.call(recv, "==", args)?;
    Ok(Value::Bool(!equal.is_truthy()))
}

fn class_name(state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    state.new_string(recv.type_tag().name())
}

/// Strings get an unfrozen copy; immediates are their own duplicate
fn dup(state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    match recv {
        Value::Str(_) => {
            let text = state.as_text(recv)?.to_string();
            state.new_string(text)
        }
        other => Ok(other),
    }
}

fn freeze(state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    if let Value::Str(obj) = recv {
        state.heap.get_mut(obj)?.frozen = true;
    }
    Ok(recv)
}
