//! Garnet Runtime - embeddable Ruby-flavoured scripting runtime
//!
//! This library provides:
//! - Lexical analysis and parsing of the supported language subset
//! - A tree-walking interpreter over isolated runtime states
//! - A small core library (Kernel, Object, Integer, Float, String, Symbol)
//! - A host API for evaluating code, invoking methods and defining natives
//!
//! # Examples
//!
//! ```
//! use garnet_runtime::{RuntimeConfig, State};
//!
//! let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
//! let name = state.new_string("mrb_p").unwrap();
//! state.invoke(name, "upcase!", &[]).unwrap();
//! assert_eq!(state.inspect(name).unwrap(), "\"MRB_P\"");
//!
//! state.eval_string("puts 'hola, mundo!'").unwrap();
//! assert_eq!(state.take_output(), "hola, mundo!\n");
//! state.close();
//! ```

/// Garnet runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Release date reported in the version banner
pub const GARNET_RELEASE_DATE: &str = "2026-10-19";

/// Copyright line printed by `State::show_copyright`
pub const GARNET_COPYRIGHT: &str = "garnet - Copyright (c) 2024-2026 garnet developers";

/// Engine name
pub const GARNET_ENGINE: &str = "garnet";

/// Version banner: `garnet <version> (<release date>)`
pub fn description() -> String {
    format!("{} {} ({})", GARNET_ENGINE, VERSION, GARNET_RELEASE_DATE)
}

pub mod api;
pub mod ast;
pub mod diagnostic;
pub mod heap;
pub mod lexer;
pub mod method_dispatch;
pub mod output;
pub mod parser;
pub mod span;
pub mod state;
pub mod symbol;
pub mod token;
pub mod value;

pub(crate) mod interpreter;
pub(crate) mod stack;
pub(crate) mod stdlib;

pub use api::{EvalError, FromValue, NativeMethodBuilder, ToValue};
pub use diagnostic::{error_codes, Diagnostic, DiagnosticLevel, DIAG_VERSION};
pub use garnet_config::{ConfigError, OutputMode, RuntimeConfig};
pub use method_dispatch::{Arity, TypeTag, Visibility};
pub use output::{Output, OutputBuffer};
pub use span::Span;
pub use state::{CloseReport, OpenError, State};
pub use value::{RuntimeError, Value};
