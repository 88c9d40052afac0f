//! Kernel functions: `puts`, `print`, `p`, `raise`
//!
//! These are private methods on `Object`, so they are callable from any
//! context without a receiver but never as `obj.puts`.

use super::define_private;
use crate::method_dispatch::{Arity, TypeTag};
use crate::state::State;
use crate::value::{RuntimeError, Value};

pub(super) fn install(state: &mut State) {
    define_private(state, TypeTag::Object, "puts", Arity::Variadic(0), puts);
    define_private(state, TypeTag::Object, "print", Arity::Variadic(0), print);
    define_private(state, TypeTag::Object, "p", Arity::Variadic(0), p);
    define_private(state, TypeTag::Object, "raise", Arity::Range(0, 1), raise);
}

/// Each argument's `to_s` on its own line; `puts` alone prints a blank line
fn puts(state: &mut State, _recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut out = String::new();
    if args.is_empty() {
        out.push('\n');
    }
    for &arg in args {
        let text = state.to_s(arg)?;
        out.push_str(&text);
        if !text.ends_with('\n') {
            out.push('\n');
        }
    }
    state.write_output(&out)?;
    Ok(Value::Nil)
}

fn print(state: &mut State, _recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut out = String::new();
    for &arg in args {
        out.push_str(&state.to_s(arg)?);
    }
    state.write_output(&out)?;
    Ok(Value::Nil)
}

/// Each argument's `inspect` on its own line
///
/// Returns the argument for one, nil for none, and the last for several.
fn p(state: &mut State, _recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut out = String::new();
    for &arg in args {
        out.push_str(&state.inspect(arg)?);
        out.push('\n');
    }
    state.write_output(&out)?;
    Ok(args.last().copied().unwrap_or(Value::Nil))
}

fn raise(state: &mut State, _recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let message = match args.first() {
        None => "unhandled exception".to_string(),
        Some(&Value::Str(obj)) => state.as_text(Value::Str(obj))?.to_string(),
        Some(_) => {
            return Err(RuntimeError::TypeMismatch(
                "exception class/object expected".to_string(),
            ))
        }
    };
    Err(RuntimeError::Raised {
        class: "RuntimeError".to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use crate::value::{RuntimeError, Value};
    use crate::State;
    use garnet_config::RuntimeConfig;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> (Value, String) {
        let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
        let value = state.eval_string(source).unwrap();
        (value, state.take_output())
    }

    #[test]
    fn test_puts_forms() {
        let (value, out) = run("puts 'a', 1, nil\nputs\nputs \"x\\n\"");
        assert_eq!(value, Value::Nil);
        assert_eq!(out, "a\n1\n\n\nx\n");
    }

    #[test]
    fn test_print_has_no_newline() {
        let (_, out) = run("print 'a', :b, 1.5");
        assert_eq!(out, "ab1.5");
    }

    #[test]
    fn test_p_inspects_and_returns() {
        let (value, out) = run("p 'hi', :sym, nil");
        assert_eq!(out, "\"hi\"\n:sym\nnil\n");
        assert_eq!(value, Value::Nil);

        let (value, _) = run("p 42");
        assert_eq!(value, Value::Integer(42));
    }

    #[test]
    fn test_raise_message() {
        let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
        let err = state.eval_string("raise 'boom'").unwrap_err();
        assert_eq!(
            err.runtime_error(),
            Some(&RuntimeError::Raised {
                class: "RuntimeError".to_string(),
                message: "boom".to_string(),
            })
        );
    }

    #[test]
    fn test_kernel_is_private() {
        let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
        let err = state.eval_string("1.puts").unwrap_err();
        assert_eq!(
            err.to_string(),
            "private method 'puts' called for an instance of Integer"
        );
    }
}
