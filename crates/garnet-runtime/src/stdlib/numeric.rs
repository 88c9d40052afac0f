//! Integer and Float methods
//!
//! Integer arithmetic is checked: a result that does not fit in `i64` is
//! computed in floating point instead. Division floors and `%` takes the sign
//! of the divisor.

use super::define;
use crate::method_dispatch::{Arity, TypeTag};
use crate::state::State;
use crate::value::{RuntimeError, Value};
use std::cmp::Ordering;

pub(super) fn install(state: &mut State) {
    for tag in [TypeTag::Integer, TypeTag::Float] {
        define(state, tag, "+", Arity::Exact(1), add);
        define(state, tag, "-", Arity::Exact(1), sub);
        define(state, tag, "*", Arity::Exact(1), mul);
        define(state, tag, "/", Arity::Exact(1), div);
        define(state, tag, "%", Arity::Exact(1), rem);
        define(state, tag, "**", Arity::Exact(1), pow);
        define(state, tag, "-@", Arity::Exact(0), neg);
        define(state, tag, "<=>", Arity::Exact(1), spaceship);
        define(state, tag, "==", Arity::Exact(1), num_eq);
        define(state, tag, "<", Arity::Exact(1), |_, recv, args| {
            ordered(recv, args[0], Ordering::is_lt)
        });
        define(state, tag, "<=", Arity::Exact(1), |_, recv, args| {
            ordered(recv, args[0], Ordering::is_le)
        });
        define(state, tag, ">", Arity::Exact(1), |_, recv, args| {
            ordered(recv, args[0], Ordering::is_gt)
        });
        define(state, tag, ">=", Arity::Exact(1), |_, recv, args| {
            ordered(recv, args[0], Ordering::is_ge)
        });
        define(state, tag, "abs", Arity::Exact(0), abs);
        define(state, tag, "zero?", Arity::Exact(0), |_, recv, _| {
            Ok(Value::Bool(recv.as_f64() == Some(0.0)))
        });
        define(state, tag, "to_f", Arity::Exact(0), |_, recv, _| {
            Ok(recv.as_f64().map(Value::Float).unwrap_or(Value::Nil))
        });
    }

    define(state, TypeTag::Integer, "to_s", Arity::Range(0, 1), int_to_s);
    define(state, TypeTag::Integer, "inspect", Arity::Exact(0), int_to_s);
    define(state, TypeTag::Integer, "to_i", Arity::Exact(0), |_, recv, _| Ok(recv));
    define(state, TypeTag::Integer, "even?", Arity::Exact(0), |_, recv, _| {
        Ok(Value::Bool(int(recv) % 2 == 0))
    });
    define(state, TypeTag::Integer, "odd?", Arity::Exact(0), |_, recv, _| {
        Ok(Value::Bool(int(recv) % 2 != 0))
    });
    define(state, TypeTag::Integer, "succ", Arity::Exact(0), |_, recv, _| {
        int_add(int(recv), 1)
    });
    define(state, TypeTag::Integer, "pred", Arity::Exact(0), |_, recv, _| {
        int_sub(int(recv), 1)
    });

    define(state, TypeTag::Float, "to_s", Arity::Exact(0), float_to_s);
    define(state, TypeTag::Float, "inspect", Arity::Exact(0), float_to_s);
    define(state, TypeTag::Float, "to_i", Arity::Exact(0), |_, recv, _| float_to_int(float(recv).trunc()));
    define(state, TypeTag::Float, "floor", Arity::Exact(0), |_, recv, _| float_to_int(float(recv).floor()));
    define(state, TypeTag::Float, "ceil", Arity::Exact(0), |_, recv, _| float_to_int(float(recv).ceil()));
    define(state, TypeTag::Float, "round", Arity::Exact(0), |_, recv, _| float_to_int(float(recv).round()));
    define(state, TypeTag::Float, "nan?", Arity::Exact(0), |_, recv, _| {
        Ok(Value::Bool(float(recv).is_nan()))
    });
    define(state, TypeTag::Float, "finite?", Arity::Exact(0), |_, recv, _| {
        Ok(Value::Bool(float(recv).is_finite()))
    });
    define(state, TypeTag::Float, "infinite?", Arity::Exact(0), |_, recv, _| {
        let f = float(recv);
        Ok(match f.is_infinite() {
            true if f > 0.0 => Value::Integer(1),
            true => Value::Integer(-1),
            false => Value::Nil,
        })
    });
}

fn int(value: Value) -> i64 {
    value.as_integer().unwrap_or_default()
}

fn float(value: Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

/// `String can't be coerced into Integer`
fn coerce_error(arg: Value, into: TypeTag) -> RuntimeError {
    RuntimeError::TypeMismatch(format!(
        "{} can't be coerced into {}",
        arg.type_tag().implicit_name(),
        into
    ))
}

/// Apply an integer operation when both sides are integers, a float one otherwise
fn arith(
    recv: Value,
    arg: Value,
    int_op: fn(i64, i64) -> Result<Value, RuntimeError>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (recv, arg) {
        (Value::Integer(a), Value::Integer(b)) => int_op(a, b),
        (_, Value::Integer(_) | Value::Float(_)) => Ok(Value::Float(float_op(float(recv), float(arg)))),
        _ => Err(coerce_error(arg, recv.type_tag())),
    }
}

fn int_add(a: i64, b: i64) -> Result<Value, RuntimeError> {
    Ok(a.checked_add(b)
        .map(Value::Integer)
        .unwrap_or(Value::Float(a as f64 + b as f64)))
}

fn int_sub(a: i64, b: i64) -> Result<Value, RuntimeError> {
    Ok(a.checked_sub(b)
        .map(Value::Integer)
        .unwrap_or(Value::Float(a as f64 - b as f64)))
}

fn int_mul(a: i64, b: i64) -> Result<Value, RuntimeError> {
    Ok(a.checked_mul(b)
        .map(Value::Integer)
        .unwrap_or(Value::Float(a as f64 * b as f64)))
}

fn int_div(a: i64, b: i64) -> Result<Value, RuntimeError> {
    if b == 0 {
        return Err(RuntimeError::ZeroDivision);
    }
    let Some(q) = a.checked_div(b) else {
        return Ok(Value::Float(a as f64 / b as f64));
    };
    let floored = if a % b != 0 && (a < 0) != (b < 0) { q - 1 } else { q };
    Ok(Value::Integer(floored))
}

fn int_rem(a: i64, b: i64) -> Result<Value, RuntimeError> {
    if b == 0 {
        return Err(RuntimeError::ZeroDivision);
    }
    let r = a.checked_rem(b).unwrap_or(0);
    Ok(Value::Integer(if r != 0 && (r < 0) != (b < 0) { r + b } else { r }))
}

fn int_pow(a: i64, b: i64) -> Result<Value, RuntimeError> {
    let exact = u32::try_from(b).ok().and_then(|e| a.checked_pow(e));
    Ok(exact
        .map(Value::Integer)
        .unwrap_or_else(|| Value::Float((a as f64).powf(b as f64))))
}

fn float_rem(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

fn add(_state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    arith(recv, args[0], int_add, |a, b| a + b)
}

fn sub(_state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    arith(recv, args[0], int_sub, |a, b| a - b)
}

fn mul(_state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    arith(recv, args[0], int_mul, |a, b| a * b)
}

/// Integer `/ 0` raises; float division by zero yields Infinity or NaN
fn div(_state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    arith(recv, args[0], int_div, |a, b| a / b)
}

fn rem(_state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    arith(recv, args[0], int_rem, float_rem)
}

/// Negative integer exponents give a Float
fn pow(_state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    arith(recv, args[0], int_pow, f64::powf)
}

fn neg(_state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(match recv {
        Value::Integer(n) => n
            .checked_neg()
            .map(Value::Integer)
            .unwrap_or(Value::Float(-(n as f64))),
        other => Value::Float(-float(other)),
    })
}

fn abs(_state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(match recv {
        Value::Integer(n) => n
            .checked_abs()
            .map(Value::Integer)
            .unwrap_or(Value::Float((n as f64).abs())),
        other => Value::Float(float(other).abs()),
    })
}

/// `None` when `arg` is not numeric; `Some(None)` for comparisons with NaN
fn compare(recv: Value, arg: Value) -> Option<Option<Ordering>> {
    match (recv, arg) {
        (Value::Integer(a), Value::Integer(b)) => Some(Some(a.cmp(&b))),
        (_, Value::Integer(_) | Value::Float(_)) => Some(float(recv).partial_cmp(&float(arg))),
        _ => None,
    }
}

fn spaceship(_state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(match compare(recv, args[0]).flatten() {
        Some(ordering) => Value::Integer(ordering as i64),
        None => Value::Nil,
    })
}

fn num_eq(_state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let equal = compare(recv, args[0]).flatten() == Some(Ordering::Equal);
    Ok(Value::Bool(equal))
}

fn ordered(recv: Value, arg: Value, test: fn(Ordering) -> bool) -> Result<Value, RuntimeError> {
    match compare(recv, arg) {
        Some(ordering) => Ok(Value::Bool(ordering.is_some_and(test))),
        None => Err(RuntimeError::Argument(format!(
            "comparison of {} with {} failed",
            recv.type_tag(),
            match arg {
                Value::Nil | Value::Bool(_) => arg.type_tag().implicit_name().to_string(),
                other => other.type_tag().to_string(),
            }
        ))),
    }
}

fn int_to_s(state: &mut State, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let base = match args.first() {
        None => 10,
        Some(Value::Integer(base)) if (2..=36).contains(base) => *base as u32,
        Some(Value::Integer(base)) => {
            return Err(RuntimeError::Argument(format!("invalid radix {}", base)))
        }
        Some(other) => return Err(RuntimeError::no_conversion(other.type_tag(), "Integer")),
    };
    state.new_string(to_radix(int(recv), base))
}

fn to_radix(n: i64, base: u32) -> String {
    if base == 10 {
        return n.to_string();
    }
    let mut magnitude = n.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        let digit = (magnitude % base as u64) as u32;
        digits.push(std::char::from_digit(digit, base).unwrap_or('0'));
        magnitude /= base as u64;
        if magnitude == 0 {
            break;
        }
    }
    if n < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn float_to_s(state: &mut State, recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    state.new_string(format_float(float(recv)))
}

/// Integer value of an already-rounded float
fn float_to_int(f: f64) -> Result<Value, RuntimeError> {
    // 2^63 is exactly representable; anything at or beyond it does not fit
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && (-LIMIT..LIMIT).contains(&f) {
        Ok(Value::Integer(f as i64))
    } else {
        Err(RuntimeError::Raised {
            class: "FloatDomainError".to_string(),
            message: format_float(f),
        })
    }
}

/// Shortest round-trip text, switching to exponent form outside 1e-4..1e16
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{:e}", f);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let decimal_point = exponent + 1;

    if !(-3..=16).contains(&decimal_point) {
        let mantissa = if mantissa.contains('.') {
            mantissa.to_string()
        } else {
            format!("{}.0", mantissa)
        };
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let plain = f.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    }
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

    fn eval_error(source: &str) -> RuntimeError {
        let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
        let err = state.eval_string(source).unwrap_err();
        err.runtime_error().cloned().unwrap()
    }

    #[rstest]
    #[case(0.0, "0.0")]
    #[case(42.0, "42.0")]
    #[case(-1.5, "-1.5")]
    #[case(0.1, "0.1")]
    #[case(1.0 / 3.0, "0.3333333333333333")]
    #[case(1e15, "1000000000000000.0")]
    #[case(1e16, "1.0e+16")]
    #[case(1.5e20, "1.5e+20")]
    #[case(0.0001, "0.0001")]
    #[case(0.00001, "1.0e-05")]
    #[case(f64::INFINITY, "Infinity")]
    #[case(f64::NEG_INFINITY, "-Infinity")]
    #[case(f64::NAN, "NaN")]
    fn test_format_float(#[case] f: f64, #[case] expected: &str) {
        assert_eq!(format_float(f), expected);
    }

    #[rstest]
    #[case("2 * 21", "42")]
    #[case("7 / 2", "3")]
    #[case("-7 / 2", "-4")]
    #[case("7 / -2", "-4")]
    #[case("-7 % 3", "2")]
    #[case("7 % -3", "-2")]
    #[case("7.5 % 2", "1.5")]
    #[case("-7.5 % 2", "0.5")]
    #[case("2 ** 10", "1024")]
    #[case("2 ** -1", "0.5")]
    #[case("-2 ** 2", "-4")]
    #[case("(-2) ** 2", "4")]
    #[case("2 ** 3 ** 2", "512")]
    #[case("1 + 2.5", "3.5")]
    #[case("1.0 / 0", "Infinity")]
    #[case("-1 / 0.0", "-Infinity")]
    #[case("9223372036854775807 + 1", "9.223372036854776e+18")]
    #[case("-9223372036854775807 - 1", "-9223372036854775808")]
    #[case("1 <=> 2", "-1")]
    #[case("2.0 <=> 2", "0")]
    #[case("1 <=> 'a'", "nil")]
    #[case("1 == 1.0", "true")]
    #[case("1 == 'a'", "false")]
    #[case("3 > 2.5", "true")]
    #[case("-5.abs", "5")]
    #[case("0.zero?", "true")]
    #[case("4.even?", "true")]
    #[case("4.odd?", "false")]
    #[case("41.succ", "42")]
    #[case("255.to_s(16)", r#""ff""#)]
    #[case("-255.to_s(2)", r#""-11111111""#)]
    #[case("3.to_f", "3.0")]
    #[case("3.7.to_i", "3")]
    #[case("-3.7.to_i", "-3")]
    #[case("3.2.ceil", "4")]
    #[case("-3.2.floor", "-4")]
    #[case("2.5.round", "3")]
    #[case("(0.0 / 0.0).nan?", "true")]
    #[case("(1.0 / 0).infinite?", "1")]
    #[case("1.5.infinite?", "nil")]
    #[case("1.5.finite?", "true")]
    fn test_numeric_methods(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(eval_inspect(source), expected);
    }

    #[test]
    fn test_integer_division_by_zero() {
        assert_eq!(eval_error("1 / 0"), RuntimeError::ZeroDivision);
        assert_eq!(eval_error("1 % 0"), RuntimeError::ZeroDivision);
    }

    #[rstest]
    #[case("1 + 'a'", "String can't be coerced into Integer")]
    #[case("1.5 * nil", "nil can't be coerced into Float")]
    #[case("1 < 'a'", "comparison of Integer with String failed")]
    #[case("1 < nil", "comparison of Integer with nil failed")]
    #[case("10.to_s(1)", "invalid radix 1")]
    #[case("(0.0 / 0.0).to_i", "NaN")]
    fn test_numeric_errors(#[case] source: &str, #[case] message: &str) {
        assert_eq!(eval_error(source).to_string(), message);
    }
}
