//! Runtime value representation
//!
//! `Value` is a small `Copy` handle. Immediates (nil, booleans, numbers)
//! carry their payload directly; strings and symbols are references into the
//! owning state's heap and symbol table, tagged with that state's id so a
//! value can never be read through the wrong state.

use crate::method_dispatch::TypeTag;
use thiserror::Error;

/// Reference to a heap object owned by one state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    pub(crate) owner: u64,
    pub(crate) index: u32,
}

/// Interned symbol owned by one state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sym {
    pub(crate) owner: u64,
    pub(crate) id: u32,
}

/// Runtime value
///
/// Equality on `Value` is identity: two `Str` values are equal only if they
/// are the same heap object. Content comparison is the `==` method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Symbol(Sym),
    Str(ObjRef),
    /// The top-level `self`
    Main,
}

impl Value {
    /// Dispatch tag for this value
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Nil => TypeTag::NilClass,
            Value::Bool(true) => TypeTag::TrueClass,
            Value::Bool(false) => TypeTag::FalseClass,
            Value::Integer(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::Symbol(_) => TypeTag::Symbol,
            Value::Str(_) => TypeTag::String,
            Value::Main => TypeTag::Object,
        }
    }

    /// Only `nil` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Id of the state this value belongs to, for reference kinds
    pub fn owner(&self) -> Option<u64> {
        match self {
            Value::Symbol(sym) => Some(sym.owner),
            Value::Str(obj) => Some(obj.owner),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value widened to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// Runtime error raised while executing a method or script
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    /// Method not found, or private method called with an explicit receiver
    #[error("{}", no_method_message(.method, .receiver, .private))]
    NoMethod {
        method: String,
        /// Description of the receiver (`nil`, `an instance of String`)
        receiver: String,
        private: bool,
    },
    /// Wrong number or kind of arguments
    #[error("{0}")]
    Argument(String),
    /// Value of the wrong type for an operation
    #[error("{0}")]
    TypeMismatch(String),
    /// Undefined local variable, method, or constant
    #[error("{0}")]
    NameError(String),
    /// Integer division or modulo by zero
    #[error("divided by 0")]
    ZeroDivision,
    /// Value dereferenced through a state that does not own it
    #[error("value does not belong to this runtime (foreign or closed state)")]
    ForeignValue,
    /// Heap object limit reached
    #[error("failed to allocate memory: heap limit of {limit} objects reached")]
    NoMemory { limit: usize },
    /// Call depth limit reached
    #[error("stack level too deep")]
    StackTooDeep,
    /// Raised by script code via `raise`
    #[error("{message}")]
    Raised { class: String, message: String },
    /// `break`/`next` outside a loop, or `return` where it cannot unwind
    #[error("{0}")]
    InvalidJump(String),
    /// Mutation of a frozen string
    #[error("can't modify frozen String: {0}")]
    Frozen(String),
    /// Writing to the output sink failed
    #[error("output error: {0}")]
    Io(String),
}

fn no_method_message(method: &str, receiver: &str, private: &bool) -> String {
    if *private {
        format!("private method '{}' called for {}", method, receiver)
    } else {
        format!("undefined method '{}' for {}", method, receiver)
    }
}

impl RuntimeError {
    /// Ruby-style exception class name
    pub fn class_name(&self) -> &str {
        match self {
            RuntimeError::NoMethod { .. } => "NoMethodError",
            RuntimeError::Argument(_) => "ArgumentError",
            RuntimeError::TypeMismatch(_) => "TypeError",
            RuntimeError::NameError(_) => "NameError",
            RuntimeError::ZeroDivision => "ZeroDivisionError",
            RuntimeError::ForeignValue => "ForeignValueError",
            RuntimeError::NoMemory { .. } => "NoMemoryError",
            RuntimeError::StackTooDeep => "SystemStackError",
            RuntimeError::Raised { class, .. } => class,
            RuntimeError::InvalidJump(_) => "LocalJumpError",
            RuntimeError::Frozen(_) => "FrozenError",
            RuntimeError::Io(_) => "IOError",
        }
    }

    /// `wrong number of arguments (given 2, expected 1)`
    pub fn arity(given: usize, expected: impl std::fmt::Display) -> Self {
        RuntimeError::Argument(format!(
            "wrong number of arguments (given {}, expected {})",
            given, expected
        ))
    }

    /// `no implicit conversion of Integer into String`
    pub fn no_conversion(from: TypeTag, into: &str) -> Self {
        RuntimeError::TypeMismatch(format!(
            "no implicit conversion of {} into {}",
            from.implicit_name(),
            into
        ))
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::Io(e.to_string())
    }
}
