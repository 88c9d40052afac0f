//! Type conversion between Rust and runtime values
//!
//! - `ToValue` - Convert Rust types to a `Value` owned by a state
//! - `FromValue` - Read a `Value` back into a Rust type
//!
//! Strings live on the state's heap, so both directions take the state.
//!
//! # Examples
//!
//! ```
//! use garnet_runtime::api::{FromValue, ToValue};
//! use garnet_runtime::{RuntimeConfig, State};
//!
//! let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
//!
//! // Rust to runtime
//! let number = 42i64.to_value(&mut state).unwrap();
//! let text = "hello".to_value(&mut state).unwrap();
//!
//! // Runtime to Rust
//! let n: i64 = FromValue::from_value(&state, number).unwrap();
//! let s: String = FromValue::from_value(&state, text).unwrap();
//! assert_eq!((n, s.as_str()), (42, "hello"));
//! ```

use crate::state::State;
use crate::value::{RuntimeError, Value};
use thiserror::Error;

/// Error type for value conversion failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Value is not of the requested kind
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    /// The value could not be read (foreign or released)
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Trait for reading a runtime `Value` into a Rust type
pub trait FromValue: Sized {
    /// # Errors
    ///
    /// Returns `ConversionError` if the value cannot be converted to the target type.
    fn from_value(state: &State, value: Value) -> Result<Self, ConversionError>;
}

/// Trait for converting Rust types into runtime values
pub trait ToValue {
    /// Fails only when allocation fails (`NoMemory`)
    fn to_value(self, state: &mut State) -> Result<Value, RuntimeError>;
}

fn mismatch(expected: &str, value: Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected: expected.to_string(),
        found: value.type_tag().implicit_name().to_string(),
    }
}

impl FromValue for Value {
    fn from_value(state: &State, value: Value) -> Result<Self, ConversionError> {
        state.check_owner(value)?;
        Ok(value)
    }
}

impl ToValue for Value {
    fn to_value(self, state: &mut State) -> Result<Value, RuntimeError> {
        state.check_owner(self)?;
        Ok(self)
    }
}

impl FromValue for i64 {
    fn from_value(_state: &State, value: Value) -> Result<Self, ConversionError> {
        value.as_integer().ok_or_else(|| mismatch("Integer", value))
    }
}

impl ToValue for i64 {
    fn to_value(self, _state: &mut State) -> Result<Value, RuntimeError> {
        Ok(Value::Integer(self))
    }
}

/// Integers widen to `f64`
impl FromValue for f64 {
    fn from_value(_state: &State, value: Value) -> Result<Self, ConversionError> {
        value.as_f64().ok_or_else(|| mismatch("Float", value))
    }
}

impl ToValue for f64 {
    fn to_value(self, _state: &mut State) -> Result<Value, RuntimeError> {
        Ok(Value::Float(self))
    }
}

impl FromValue for bool {
    fn from_value(_state: &State, value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(mismatch("true or false", value)),
        }
    }
}

impl ToValue for bool {
    fn to_value(self, _state: &mut State) -> Result<Value, RuntimeError> {
        Ok(Value::Bool(self))
    }
}

impl FromValue for String {
    fn from_value(state: &State, value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Str(_) => Ok(state.as_text(value)?.to_string()),
            _ => Err(mismatch("String", value)),
        }
    }
}

impl ToValue for String {
    fn to_value(self, state: &mut State) -> Result<Value, RuntimeError> {
        state.new_string(self)
    }
}

impl ToValue for &str {
    fn to_value(self, state: &mut State) -> Result<Value, RuntimeError> {
        state.new_string(self)
    }
}

impl FromValue for () {
    fn from_value(_state: &State, value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Nil => Ok(()),
            _ => Err(mismatch("nil", value)),
        }
    }
}

impl ToValue for () {
    fn to_value(self, _state: &mut State) -> Result<Value, RuntimeError> {
        Ok(Value::Nil)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(state: &State, value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Nil => Ok(None),
            _ => Ok(Some(T::from_value(state, value)?)),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self, state: &mut State) -> Result<Value, RuntimeError> {
        match self {
            None => Ok(Value::Nil),
            Some(v) => v.to_value(state),
        }
    }
}
