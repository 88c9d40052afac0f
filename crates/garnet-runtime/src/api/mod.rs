//! Public embedding API
//!
//! This module provides the host-facing surface of the runtime:
//! - Evaluation of source strings and files (`State::eval_string`, `State::load_file`)
//! - Method invocation from Rust (`State::invoke`)
//! - Value conversion between Rust and runtime types
//! - Registration of Rust closures as methods
//!
//! # Examples
//!
//! ```
//! use garnet_runtime::{RuntimeConfig, State, Value};
//!
//! let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
//!
//! // Evaluate code
//! state.eval_string("def add(a, b)\n  a + b\nend").unwrap();
//!
//! // Call script methods from Rust
//! let main = state.main();
//! let sum = state.invoke(main, "add", &[Value::Integer(1), Value::Integer(2)]).unwrap();
//! assert_eq!(sum, Value::Integer(3));
//! ```

pub mod conversion;
pub mod native;
pub mod runtime;

pub use conversion::{ConversionError, FromValue, ToValue};
pub use native::{BuildError, NativeMethod, NativeMethodBuilder};
pub use runtime::EvalError;
