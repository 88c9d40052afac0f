//! Host-defined methods
//!
//! Rust closures can be registered into a state's method table, either
//! directly with `State::define_method` or through `NativeMethodBuilder`.
//! Arity is checked by dispatch before the closure runs. A later definition
//! with the same type tag and name replaces an earlier one.
//!
//! # Examples
//!
//! ```
//! use garnet_runtime::api::NativeMethodBuilder;
//! use garnet_runtime::{RuntimeConfig, RuntimeError, State, TypeTag, Value};
//!
//! let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
//!
//! // Fixed arity: Integer#clamp_to(max)
//! NativeMethodBuilder::new("clamp_to")
//!     .on(TypeTag::Integer)
//!     .with_arity(1)
//!     .with_implementation(|_state, recv, args| match (recv, args[0]) {
//!         (Value::Integer(n), Value::Integer(max)) => Ok(Value::Integer(n.min(max))),
//!         _ => Err(RuntimeError::Argument("expected an integer".to_string())),
//!     })
//!     .register(&mut state)
//!     .unwrap();
//!
//! assert_eq!(state.eval_string("99.clamp_to(10)").unwrap(), Value::Integer(10));
//! ```

use crate::method_dispatch::{Arity, Method, MethodBody, NativeFn, TypeTag, Visibility};
use crate::state::State;
use crate::value::{RuntimeError, Value};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

/// Builder for host methods
///
/// Defaults: defined on `Object`, public, any number of arguments.
pub struct NativeMethodBuilder {
    name: String,
    tag: TypeTag,
    arity: Arity,
    visibility: Visibility,
    implementation: Option<NativeFn>,
}

impl NativeMethodBuilder {
    /// Start a method called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: TypeTag::Object,
            arity: Arity::Variadic(0),
            visibility: Visibility::Public,
            implementation: None,
        }
    }

    /// Receiver type the method is defined for
    pub fn on(mut self, tag: TypeTag) -> Self {
        self.tag = tag;
        self
    }

    /// Require exactly `arity` arguments
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Arity::Exact(arity);
        self
    }

    /// Accept between `min` and `max` arguments inclusive
    pub fn with_arity_range(mut self, min: usize, max: usize) -> Self {
        self.arity = Arity::Range(min, max);
        self
    }

    /// Accept `min` or more arguments
    pub fn variadic(mut self, min: usize) -> Self {
        self.arity = Arity::Variadic(min);
        self
    }

    /// Only callable without an explicit receiver, like `puts`
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Set the method body: `(state, receiver, args) -> result`
    pub fn with_implementation<F>(mut self, implementation: F) -> Self
    where
        F: Fn(&mut State, Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
    {
        self.implementation = Some(Rc::new(implementation));
        self
    }

    /// Validate and produce the method table entry
    pub fn build(self) -> Result<NativeMethod, BuildError> {
        if self.name.is_empty() {
            return Err(BuildError::EmptyName);
        }
        if let Arity::Range(min, max) = self.arity {
            if min > max {
                return Err(BuildError::InvalidArity {
                    name: self.name,
                    min,
                    max,
                });
            }
        }
        let implementation = self
            .implementation
            .ok_or_else(|| BuildError::MissingImplementation(self.name.clone()))?;

        Ok(NativeMethod {
            name: self.name,
            tag: self.tag,
            method: Method {
                body: MethodBody::Native(implementation),
                arity: self.arity,
                visibility: self.visibility,
            },
        })
    }

    /// Build and define on `state`
    pub fn register(self, state: &mut State) -> Result<(), BuildError> {
        let native = self.build()?;
        state.define_native(native);
        Ok(())
    }
}

/// A built host method, ready to be defined on a state
#[derive(Debug, Clone)]
pub struct NativeMethod {
    pub name: String,
    pub tag: TypeTag,
    pub method: Method,
}

/// Errors that can occur when building a host method
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("native method name must not be empty")]
    EmptyName,
    #[error("native method '{0}' missing implementation")]
    MissingImplementation(String),
    #[error("native method '{name}' has invalid arity {min}..{max}")]
    InvalidArity { name: String, min: usize, max: usize },
}

impl State {
    /// Define a public method for `tag`, replacing any existing one
    ///
    /// ```
    /// use garnet_runtime::{Arity, RuntimeConfig, State, TypeTag, Value};
    ///
    /// let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
    /// state.define_method(TypeTag::Object, "answer", Arity::Exact(0), |_, _, _| {
    ///     Ok(Value::Integer(42))
    /// });
    /// assert_eq!(state.eval_string("answer").unwrap(), Value::Integer(42));
    /// ```
    pub fn define_method<F>(&mut self, tag: TypeTag, name: &str, arity: Arity, f: F)
    where
        F: Fn(&mut State, Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
    {
        debug!(state = self.id(), tag = tag.name(), method = name, "define method");
        self.define_entry(tag, name, Method::native(arity, Rc::new(f)));
    }

    /// Define a method produced by `NativeMethodBuilder::build`
    pub fn define_native(&mut self, native: NativeMethod) {
        debug!(
            state = self.id(),
            tag = native.tag.name(),
            method = %native.name,
            "define native method"
        );
        self.define_entry(native.tag, &native.name, native.method);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_config::RuntimeConfig;

    fn state() -> State {
        State::open_with(RuntimeConfig::buffered()).unwrap()
    }

    #[test]
    fn test_missing_implementation() {
        let result = NativeMethodBuilder::new("nothing").build();
        assert!(matches!(result, Err(BuildError::MissingImplementation(_))));
    }

    #[test]
    fn test_empty_name() {
        let result = NativeMethodBuilder::new("")
            .with_implementation(|_, _, _| Ok(Value::Nil))
            .build();
        assert_eq!(result.err(), Some(BuildError::EmptyName));
    }

    #[test]
    fn test_inverted_range() {
        let result = NativeMethodBuilder::new("m")
            .with_arity_range(2, 1)
            .with_implementation(|_, _, _| Ok(Value::Nil))
            .build();
        assert!(matches!(result, Err(BuildError::InvalidArity { .. })));
    }

    #[test]
    fn test_arity_checked_before_call() {
        let mut state = state();
        NativeMethodBuilder::new("pair")
            .with_arity(2)
            .with_implementation(|_, _, args| Ok(args[1]))
            .register(&mut state)
            .unwrap();
        let err = state.eval_string("pair(1)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong number of arguments (given 1, expected 2)"
        );
        assert_eq!(state.eval_string("pair(1, 2)").unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_private_host_method() {
        let mut state = state();
        NativeMethodBuilder::new("secret")
            .private()
            .with_implementation(|_, _, _| Ok(Value::Integer(7)))
            .register(&mut state)
            .unwrap();
        assert_eq!(state.eval_string("secret").unwrap(), Value::Integer(7));
        assert!(state.eval_string("1.secret").is_err());
    }

    #[test]
    fn test_redefinition_replaces() {
        let mut state = state();
        state.define_method(TypeTag::String, "shout", Arity::Exact(0), |_, _, _| {
            Ok(Value::Integer(1))
        });
        state.define_method(TypeTag::String, "shout", Arity::Exact(0), |state, recv, _| {
            let text = state.as_text(recv)?.to_uppercase();
            state.new_string(text)
        });
        let value = state.eval_string("'hey'.shout").unwrap();
        assert_eq!(state.as_text(value).unwrap(), "HEY");
    }

    #[test]
    fn test_closure_captures_host_state() {
        let mut state = state();
        let counter = Rc::new(std::cell::Cell::new(0));
        let seen = counter.clone();
        state.define_method(TypeTag::Object, "tick", Arity::Exact(0), move |_, _, _| {
            seen.set(seen.get() + 1);
            Ok(Value::Integer(seen.get()))
        });
        state.eval_string("tick; tick; tick").unwrap();
        assert_eq!(counter.get(), 3);
    }
}
