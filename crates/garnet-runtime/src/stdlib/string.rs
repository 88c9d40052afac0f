//! String and Symbol methods
//!
//! Strings are mutable heap objects. Bang methods edit the receiver in place
//! and return it when something changed, `nil` when nothing did.

use super::{define, inspect_str, inspect_symbol};
use crate::method_dispatch::{Arity, Method, TypeTag};
use crate::state::State;
use crate::value::{RuntimeError, Value};
use std::cmp::Ordering;
use std::rc::Rc;

pub(super) fn install(state: &mut State) {
    define(state, TypeTag::String, "+", Arity::Exact(1), concat_new);
    define(state, TypeTag::String, "*", Arity::Exact(1), repeat);
    define(state, TypeTag::String, "==", Arity::Exact(1), str_eq);
    define(state, TypeTag::String, "<=>", Arity::Exact(1), str_cmp);
    define(state, TypeTag::String, "<", Arity::Exact(1), |state, recv, args| {
        ordered(state, recv, args[0], Ordering::is_lt)
    });
    define(state, TypeTag::String, "<=", Arity::Exact(1), |state, recv, args| {
        ordered(state, recv, args[0], Ordering::is_le)
    });
    define(state, TypeTag::String, ">", Arity::Exact(1), |state, recv, args| {
        ordered(state, recv, args[0], Ordering::is_gt)
    });
    define(state, TypeTag::String, ">=", Arity::Exact(1), |state, recv, args| {
        ordered(state, recv, args[0], Ordering::is_ge)
    });
    define(state, TypeTag::String, "<<", Arity::Exact(1), append);
    define(state, TypeTag::String, "concat", Arity::Variadic(0), append);
    define(state, TypeTag::String, "replace", Arity::Exact(1), replace);
    define(state, TypeTag::String, "length", Arity::Exact(0), length);
    define(state, TypeTag::String, "size", Arity::Exact(0), length);
    define(state, TypeTag::String, "empty?", Arity::Exact(0), |state, recv, _| {
        Ok(Value::Bool(state.as_text(recv)?.is_empty()))
    });
    define(state, TypeTag::String, "include?", Arity::Exact(1), |state, recv, args| {
        let needle = string_arg(state, args[0])?;
        Ok(Value::Bool(state.as_text(recv)?.contains(needle.as_str())))
    });
    define(state, TypeTag::String, "start_with?", Arity::Variadic(0), |state, recv, args| {
        affix(state, recv, args, |text, prefix| text.starts_with(prefix))
    });
    define(state, TypeTag::String, "end_with?", Arity::Variadic(0), |state, recv, args| {
        affix(state, recv, args, |text, suffix| text.ends_with(suffix))
    });
    define(state, TypeTag::String, "to_s", Arity::Exact(0), |_, recv, _| Ok(recv));
    define(state, TypeTag::String, "to_str", Arity::Exact(0), |_, recv, _| Ok(recv));
    define(state, TypeTag::String, "inspect", Arity::Exact(0), |state, recv, _| {
        let text = inspect_str(state.as_text(recv)?);
        state.new_string(text)
    });
    define(state, TypeTag::String, "to_sym", Arity::Exact(0), |state, recv, _| {
        let name = state.as_text(recv)?.to_string();
        Ok(state.intern(&name))
    });
    define(state, TypeTag::String, "to_i", Arity::Exact(0), |state, recv, _| {
        Ok(parse_leading_int(state.as_text(recv)?))
    });
    define(state, TypeTag::String, "to_f", Arity::Exact(0), |state, recv, _| {
        Ok(Value::Float(parse_leading_float(state.as_text(recv)?)))
    });

    define_transform(state, "upcase", |s| s.to_uppercase());
    define_transform(state, "downcase", |s| s.to_lowercase());
    define_transform(state, "capitalize", capitalize);
    define_transform(state, "swapcase", swapcase);
    define_transform(state, "reverse", |s| s.chars().rev().collect());
    define_transform(state, "strip", |s| s.trim().to_string());
    define_transform(state, "lstrip", |s| s.trim_start().to_string());
    define_transform(state, "rstrip", |s| s.trim_end().to_string());
    define_transform(state, "chomp", chomp);

    define(state, TypeTag::Symbol, "to_s", Arity::Exact(0), |state, recv, _| {
        let name = state.symbol_name(recv)?.to_string();
        state.new_string(name)
    });
    define(state, TypeTag::Symbol, "to_sym", Arity::Exact(0), |_, recv, _| Ok(recv));
    define(state, TypeTag::Symbol, "length", Arity::Exact(0), symbol_length);
    define(state, TypeTag::Symbol, "size", Arity::Exact(0), symbol_length);
    define(state, TypeTag::Symbol, "inspect", Arity::Exact(0), |state, recv, _| {
        let text = inspect_symbol(state.symbol_name(recv)?);
        state.new_string(text)
    });
    define(state, TypeTag::Symbol, "<=>", Arity::Exact(1), |state, recv, args| {
        if !matches!(args[0], Value::Symbol(_)) {
            return Ok(Value::Nil);
        }
        let ordering = state.symbol_name(recv)?.cmp(state.symbol_name(args[0])?);
        Ok(Value::Integer(ordering as i64))
    });
}

/// Register `name` returning a transformed copy and `name!` editing in place
fn define_transform(state: &mut State, name: &str, transform: fn(&str) -> String) {
    let copy = move |state: &mut State, recv: Value, _args: &[Value]| {
        let text = transform(state.as_text(recv)?);
        state.new_string(text)
    };
    let in_place = move |state: &mut State, recv: Value, _args: &[Value]| {
        let text = transform(state.as_text(recv)?);
        update(state, recv, text)
    };
    state.define_entry(TypeTag::String, name, Method::native(Arity::Exact(0), Rc::new(copy)));
    state.define_entry(
        TypeTag::String,
        &format!("{}!", name),
        Method::native(Arity::Exact(0), Rc::new(in_place)),
    );
}

/// Store `text` into the receiver; `nil` if it was already equal
fn update(state: &mut State, recv: Value, text: String) -> Result<Value, RuntimeError> {
    let Value::Str(obj) = recv else {
        return Err(RuntimeError::no_conversion(recv.type_tag(), "String"));
    };
    let object = state.heap.get_mut(obj)?;
    if object.frozen {
        return Err(RuntimeError::Frozen(inspect_str(&object.text)));
    }
    if object.text == text {
        return Ok(Value::Nil);
    }
    object.text = text;
    Ok(recv)
}

/// Text of a string argument, or `TypeError` for anything else
fn string_arg(state: &State, arg: Value) -> Result<String, RuntimeError> {
    Ok(state.as_text(arg)?.to_string())
}

fn concat_new(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut text = state.as_text(recv)?.to_string();
    text.push_str(&string_arg(state, args[0])?);
    state.new_string(text)
}

fn repeat(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let count = match args[0] {
        Value::Integer(n) if n < 0 => {
            return Err(RuntimeError::Argument("negative argument".to_string()))
        }
        Value::Integer(n) => n as usize,
        other => return Err(RuntimeError::no_conversion(other.type_tag(), "Integer")),
    };
    let limit = state.config().max_heap_objects;
    let text = state.as_text(recv)?;
    let total = text.len().checked_mul(count).ok_or_else(|| {
        RuntimeError::Argument("argument too big".to_string())
    })?;
    let mut repeated = String::new();
    repeated
        .try_reserve_exact(total)
        .map_err(|_| RuntimeError::NoMemory { limit })?;
    for _ in 0..count {
        repeated.push_str(text);
    }
    state.new_string(repeated)
}

fn str_eq(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let equal = match args[0] {
        Value::Str(_) => state.as_text(recv)? == state.as_text(args[0])?,
        _ => false,
    };
    Ok(Value::Bool(equal))
}

fn str_cmp(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    match args[0] {
        Value::Str(_) => {
            let ordering = state.as_text(recv)?.cmp(state.as_text(args[0])?);
            Ok(Value::Integer(ordering as i64))
        }
        _ => Ok(Value::Nil),
    }
}

fn ordered(
    state: &mut State,
    recv: Value,
    arg: Value,
    test: fn(Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    if !matches!(arg, Value::Str(_)) {
        return Err(RuntimeError::Argument(format!(
            "comparison of String with {} failed",
            match arg {
                Value::Nil | Value::Bool(_) => arg.type_tag().implicit_name().to_string(),
                other => other.type_tag().to_string(),
            }
        )));
    }
    let ordering = state.as_text(recv)?.cmp(state.as_text(arg)?);
    Ok(Value::Bool(test(ordering)))
}

/// `<<` and `concat`: strings append, integers append a codepoint
fn append(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut text = state.as_text(recv)?.to_string();
    for &arg in args {
        match arg {
            Value::Integer(code) => {
                let c = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| RuntimeError::Argument(format!("{} out of char range", code)))?;
                text.push(c);
            }
            other => text.push_str(&string_arg(state, other)?),
        }
    }
    update(state, recv, text)?;
    Ok(recv)
}

fn replace(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let text = string_arg(state, args[0])?;
    update(state, recv, text)?;
    Ok(recv)
}

fn length(state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Integer(state.as_text(recv)?.chars().count() as i64))
}

fn symbol_length(state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Integer(state.symbol_name(recv)?.chars().count() as i64))
}

/// True if any argument is an affix of the receiver
fn affix(
    state: &mut State,
    recv: Value,
    args: &[Value],
    test: fn(&str, &str) -> bool,
) -> Result<Value, RuntimeError> {
    let text = state.as_text(recv)?;
    for &arg in args {
        if test(text, state.as_text(arg)?) {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn swapcase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_uppercase() {
            out.extend(c.to_lowercase());
        } else if c.is_lowercase() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Remove one trailing `\r\n`, `\n` or `\r`
fn chomp(text: &str) -> String {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
        .to_string()
}

/// Sign and digit prefix after leading whitespace (`_` allowed between digits)
fn leading_number(text: &str, allow_fraction: bool) -> String {
    let mut out = String::new();
    let mut chars = text.trim_start().chars().peekable();
    if let Some(&sign) = chars.peek() {
        if sign == '+' || sign == '-' {
            out.push(sign);
            chars.next();
        }
    }

    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut last_digit = false;
    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' => {
                out.push(c);
                last_digit = true;
            }
            '_' if last_digit => {
                chars.next();
                if !matches!(chars.peek(), Some('0'..='9')) {
                    break;
                }
                continue;
            }
            '.' if allow_fraction && !seen_dot && !seen_exp && last_digit => {
                chars.next();
                if !matches!(chars.peek(), Some('0'..='9')) {
                    break;
                }
                out.push('.');
                seen_dot = true;
                last_digit = false;
                continue;
            }
            'e' | 'E' if allow_fraction && !seen_exp && last_digit => {
                let mut lookahead = chars.clone();
                lookahead.next();
                let mut exponent = String::from("e");
                if let Some(&sign @ ('+' | '-')) = lookahead.peek() {
                    exponent.push(sign);
                    lookahead.next();
                }
                if !matches!(lookahead.peek(), Some('0'..='9')) {
                    break;
                }
                out.push_str(&exponent);
                chars = lookahead;
                seen_exp = true;
                last_digit = false;
                continue;
            }
            _ => break,
        }
        chars.next();
    }
    out
}

/// `"42abc".to_i` is 42; no leading digits gives 0
fn parse_leading_int(text: &str) -> Value {
    let digits = leading_number(text, false);
    match digits.parse::<i64>() {
        Ok(n) => Value::Integer(n),
        Err(_) => match digits.parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::Integer(0),
        },
    }
}

fn parse_leading_float(text: &str) -> f64 {
    leading_number(text, true).parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::State;
    use garnet_config::RuntimeConfig;
    use rstest::rstest;

    fn eval_inspect(source: &str) -> String {
        let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
        let value = state.eval_string(source).unwrap();
        state.inspect(value).unwrap()
    }

    #[rstest]
    #[case("'mrb_p'.upcase", r#""MRB_P""#)]
    #[case("'ABC'.upcase!", "nil")]
    #[case("s = 'abc'; s.upcase!; s", r#""ABC""#)]
    #[case("'HeLLo'.downcase", r#""hello""#)]
    #[case("'hELLO wORLD'.capitalize", r#""Hello world""#)]
    #[case("'Hello'.swapcase", r#""hELLO""#)]
    #[case("'abc'.reverse", r#""cba""#)]
    #[case("'  pad  '.strip", r#""pad""#)]
    #[case("'  pad  '.lstrip", r#""pad  ""#)]
    #[case("'  pad  '.rstrip", r#""  pad""#)]
    #[case("\"line\\r\\n\".chomp", r#""line""#)]
    #[case("'line'.chomp!", "nil")]
    #[case("'ab' + 'cd'", r#""abcd""#)]
    #[case("'ab' * 3", r#""ababab""#)]
    #[case("'a' == 'a'", "true")]
    #[case("'a' == :a", "false")]
    #[case("'a' <=> 'b'", "-1")]
    #[case("'a' <=> 1", "nil")]
    #[case("'b' > 'a'", "true")]
    #[case("s = 'a'; s << 'b' << 99; s", r#""abc""#)]
    #[case("'a'.concat('b', 'c')", r#""abc""#)]
    #[case("s = 'x'; s.replace('y'); s", r#""y""#)]
    #[case("'héllo'.length", "5")]
    #[case("''.empty?", "true")]
    #[case("'garnet'.include?('net')", "true")]
    #[case("'garnet'.start_with?('x', 'gar')", "true")]
    #[case("'garnet'.end_with?('gar')", "false")]
    #[case("'name'.to_sym", ":name")]
    #[case("'two words'.to_sym", r#":"two words""#)]
    #[case("' 42abc'.to_i", "42")]
    #[case("'-1_000'.to_i", "-1000")]
    #[case("'abc'.to_i", "0")]
    #[case("'3.25xyz'.to_f", "3.25")]
    #[case("'1e3'.to_f", "1000.0")]
    #[case(":sym.to_s", r#""sym""#)]
    #[case(":sym.length", "3")]
    #[case(":a <=> :b", "-1")]
    #[case("'a\"b'.inspect", r#""\"a\\\"b\"""#)]
    fn test_string_methods(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(eval_inspect(source), expected);
    }

    #[test]
    fn test_bang_method_is_observed_by_every_holder() {
        let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
        let value = state.new_string("mrb_p").unwrap();
        let same = value;
        let result = state.invoke(value, "upcase!", &[]).unwrap();
        assert_eq!(result, value);
        assert_eq!(state.as_text(same).unwrap(), "MRB_P");
    }

    #[test]
    fn test_repeat_that_cannot_be_allocated() {
        let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
        let limit = state.config().max_heap_objects;
        let err = state
            .eval_string("'abcd' * 4_000_000_000_000_000_000")
            .unwrap_err();
        assert_eq!(err.runtime_error(), Some(&RuntimeError::NoMemory { limit }));

        // Product overflowing usize is still an argument error
        let err = state.eval_string("'abcde' * 9_000_000_000_000_000_000").unwrap_err();
        assert_eq!(err.to_string(), "argument too big");
        assert_eq!(state.eval_string("'ab' * 0").map(|_| ()), Ok(()));
    }

    #[rstest]
    #[case("'a' + 1", "no implicit conversion of Integer into String")]
    #[case("'a' * -1", "negative argument")]
    #[case("'a' < 1", "comparison of String with Integer failed")]
    #[case("GARNET_VERSION.upcase!", "can't modify frozen String")]
    #[case("'x'.freeze << 'y'", "can't modify frozen String: \"x\"")]
    fn test_string_errors(#[case] source: &str, #[case] message: &str) {
        let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
        let err = state.eval_string(source).unwrap_err();
        assert!(
            err.to_string().starts_with(message),
            "{} => {}",
            source,
            err
        );
    }

    #[rstest]
    #[case("", "")]
    #[case("a", "A")]
    #[case("ÉCOLE", "École")]
    fn test_capitalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(capitalize(input), expected);
    }
}
