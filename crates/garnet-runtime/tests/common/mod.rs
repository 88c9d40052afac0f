//! Shared helpers for garnet-runtime integration tests

#![allow(dead_code)]

use garnet_runtime::{EvalError, RuntimeConfig, RuntimeError, State, Value};

pub use pretty_assertions::{assert_eq, assert_ne};

/// A state whose output is captured in memory
pub fn state() -> State {
    State::open_with(RuntimeConfig::buffered()).expect("open buffered state")
}

/// Evaluate on a fresh state and return the inspected result
///
/// # Example
/// ```ignore
/// assert_eq!(eval_inspect("1 + 2"), "3");
/// ```
pub fn eval_inspect(source: &str) -> String {
    let mut state = state();
    let value = state
        .eval_string(source)
        .unwrap_or_else(|e| panic!("eval of {:?} failed: {}", source, e));
    state.inspect(value).expect("inspect result")
}

/// Evaluate on a fresh state and return everything written to output
pub fn eval_output(source: &str) -> String {
    let mut state = state();
    state
        .eval_string(source)
        .unwrap_or_else(|e| panic!("eval of {:?} failed: {}", source, e));
    state.take_output()
}

/// Evaluate on a fresh state, expecting a runtime error
pub fn eval_runtime_error(source: &str) -> RuntimeError {
    let mut state = state();
    match state.eval_string(source) {
        Err(EvalError::Runtime { error, .. }) => error,
        other => panic!("expected runtime error from {:?}, got {:?}", source, other),
    }
}

/// Text of a string value
pub fn text(state: &State, value: Value) -> String {
    state.as_text(value).expect("string value").to_string()
}
