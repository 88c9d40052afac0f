//! Runtime handle
//!
//! A `State` is one independent engine instance. It owns the heap, symbol
//! table, method table, constants, top-level locals and output sink, and
//! every `Value` it hands out is tagged with its id.
//!
//! # Lifecycle
//!
//! ```
//! use garnet_runtime::State;
//!
//! let state = State::open().unwrap();
//! let report = state.close();
//! assert!(report.symbols > 0);
//! ```
//!
//! `close` consumes the handle, so a closed state cannot be used again:
//!
//! ```compile_fail
//! use garnet_runtime::State;
//!
//! let mut state = State::open().unwrap();
//! state.close();
//! state.eval_string("1"); // use after close
//! ```

use crate::heap::Heap;
use crate::method_dispatch::{Method, MethodTable, TypeTag};
use crate::output::{Output, OutputBuffer};
use crate::symbol::SymbolTable;
use crate::value::{RuntimeError, Value};
use crate::{stdlib, GARNET_COPYRIGHT, GARNET_ENGINE, GARNET_RELEASE_DATE, VERSION};
use garnet_config::{ConfigError, OutputMode, RuntimeConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

static NEXT_STATE_ID: AtomicU64 = AtomicU64::new(1);

/// Failure to open a state
#[derive(Debug, Error)]
pub enum OpenError {
    /// Initial allocation could not be satisfied
    #[error("failed to allocate runtime state: {reason}")]
    Allocation { reason: String },
    /// Limits that the runtime cannot work with
    #[error("invalid runtime configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// What `close` released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseReport {
    /// Heap objects (strings)
    pub objects: usize,
    /// Interned symbols
    pub symbols: usize,
    /// Method table entries
    pub methods: usize,
}

/// An open runtime instance
pub struct State {
    id: u64,
    config: RuntimeConfig,
    pub(crate) heap: Heap,
    pub(crate) symbols: SymbolTable,
    pub(crate) methods: MethodTable,
    pub(crate) constants: HashMap<String, Value>,
    /// Locals of the top-level frame, kept between evaluations
    pub(crate) top_locals: HashMap<String, Value>,
    pub(crate) output: Output,
    /// Current method call nesting
    pub(crate) depth: usize,
    released: bool,
}

impl State {
    /// Open a state with default configuration
    pub fn open() -> Result<Self, OpenError> {
        Self::open_with(RuntimeConfig::default())
    }

    /// Open a state with explicit configuration
    pub fn open_with(config: RuntimeConfig) -> Result<Self, OpenError> {
        config.validate()?;

        let id = NEXT_STATE_ID.fetch_add(1, Ordering::Relaxed);
        let heap = Heap::with_capacity(id, config.initial_heap_capacity, config.max_heap_objects)
            .map_err(|e| OpenError::Allocation {
                reason: format!(
                    "cannot reserve {} heap slots: {}",
                    config.initial_heap_capacity, e
                ),
            })?;
        let output = match config.output {
            OutputMode::Stdout => Output::Stdout,
            OutputMode::Buffer => Output::buffer(),
        };

        let mut state = Self {
            id,
            config,
            heap,
            symbols: SymbolTable::new(id),
            methods: MethodTable::new(),
            constants: HashMap::new(),
            top_locals: HashMap::new(),
            output,
            depth: 0,
            released: false,
        };

        stdlib::install(&mut state);
        state
            .install_constants()
            .map_err(|e| OpenError::Allocation {
                reason: e.to_string(),
            })?;

        debug!(
            state = id,
            methods = state.methods.len(),
            heap_capacity = state.heap.capacity(),
            "opened runtime state"
        );
        Ok(state)
    }

    fn install_constants(&mut self) -> Result<(), RuntimeError> {
        let description = crate::description();
        let constants = [
            ("GARNET_VERSION", VERSION),
            ("GARNET_RELEASE_DATE", GARNET_RELEASE_DATE),
            ("GARNET_COPYRIGHT", GARNET_COPYRIGHT),
            ("GARNET_ENGINE", GARNET_ENGINE),
            ("GARNET_DESCRIPTION", description.as_str()),
        ];
        for (name, text) in constants {
            let value = self.new_frozen_string(text)?;
            self.constants.insert(name.to_string(), value);
        }
        Ok(())
    }

    /// Close the state, releasing everything it owns
    pub fn close(mut self) -> CloseReport {
        let report = self.release();
        debug!(
            state = self.id,
            objects = report.objects,
            symbols = report.symbols,
            methods = report.methods,
            "closed runtime state"
        );
        report
    }

    fn release(&mut self) -> CloseReport {
        if self.released {
            return CloseReport::default();
        }
        self.released = true;
        self.constants.clear();
        self.top_locals.clear();
        CloseReport {
            objects: self.heap.release_all(),
            symbols: self.symbols.release_all(),
            methods: self.methods.release_all(),
        }
    }

    /// Open a state, run `f`, and close the state on every exit path
    ///
    /// ```
    /// use garnet_runtime::{EvalError, OpenError, RuntimeConfig, State};
    ///
    /// #[derive(Debug)]
    /// enum HostError {
    ///     Open(OpenError),
    ///     Eval(EvalError),
    /// }
    ///
    /// impl From<OpenError> for HostError {
    ///     fn from(e: OpenError) -> Self {
    ///         HostError::Open(e)
    ///     }
    /// }
    ///
    /// let answer = State::scoped(RuntimeConfig::buffered(), |state| {
    ///     let value = state.eval_string("6 * 7").map_err(HostError::Eval)?;
    ///     Ok::<_, HostError>(value.as_integer())
    /// })
    /// .unwrap();
    /// assert_eq!(answer, Some(42));
    /// ```
    pub fn scoped<T, E, F>(config: RuntimeConfig, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut State) -> Result<T, E>,
        E: From<OpenError>,
    {
        let mut state = Self::open_with(config)?;
        let result = f(&mut state);
        state.close();
        result
    }

    // === Introspection ===

    /// Unique id of this state within the process
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Number of live heap objects
    pub fn heap_objects(&self) -> usize {
        self.heap.len()
    }

    /// Number of interned symbols
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Captured output, when the state writes to a buffer
    pub fn output_buffer(&self) -> Option<OutputBuffer> {
        match &self.output {
            Output::Buffer(buffer) => Some(buffer.clone()),
            Output::Stdout => None,
        }
    }

    /// Drain captured output (empty when writing to stdout)
    pub fn take_output(&self) -> String {
        self.output_buffer()
            .map(|buffer| buffer.take())
            .unwrap_or_default()
    }

    /// Replace the output sink
    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    pub(crate) fn write_output(&self, text: &str) -> Result<(), RuntimeError> {
        self.output.write_str(text).map_err(RuntimeError::from)
    }

    // === Banner ===

    /// Write `garnet <version> (<release date>)`
    pub fn show_version(&mut self) {
        let line = format!("{}\n", crate::description());
        let _ = self.output.write_str(&line);
    }

    /// Write the copyright line
    pub fn show_copyright(&mut self) {
        let line = format!("{}\n", GARNET_COPYRIGHT);
        let _ = self.output.write_str(&line);
    }

    /// Write the copyright line followed by the version line
    pub fn print_banner(&mut self) {
        self.show_copyright();
        self.show_version();
    }

    // === Values ===

    /// Fail with `ForeignValue` if `value` belongs to another state
    pub fn check_owner(&self, value: Value) -> Result<(), RuntimeError> {
        match value.owner() {
            Some(owner) if owner != self.id => Err(RuntimeError::ForeignValue),
            _ => Ok(()),
        }
    }

    /// Allocate a new string
    pub fn new_string(&mut self, text: impl Into<String>) -> Result<Value, RuntimeError> {
        Ok(Value::Str(self.heap.alloc(text.into())?))
    }

    pub(crate) fn new_frozen_string(&mut self, text: &str) -> Result<Value, RuntimeError> {
        let obj = self.heap.alloc(text.to_string())?;
        self.heap.get_mut(obj)?.frozen = true;
        Ok(Value::Str(obj))
    }

    /// Read-only view of a string's text
    pub fn as_text(&self, value: Value) -> Result<&str, RuntimeError> {
        match value {
            Value::Str(obj) => Ok(self.heap.get(obj)?.text.as_str()),
            other => {
                self.check_owner(other)?;
                Err(RuntimeError::no_conversion(other.type_tag(), "String"))
            }
        }
    }

    /// Whether a string value is frozen (immediates always are)
    pub fn is_frozen(&self, value: Value) -> Result<bool, RuntimeError> {
        match value {
            Value::Str(obj) => Ok(self.heap.get(obj)?.frozen),
            other => {
                self.check_owner(other)?;
                Ok(true)
            }
        }
    }

    /// Intern a symbol
    pub fn intern(&mut self, name: &str) -> Value {
        Value::Symbol(self.symbols.intern(name))
    }

    /// Name of a symbol value
    pub fn symbol_name(&self, value: Value) -> Result<&str, RuntimeError> {
        match value {
            Value::Symbol(sym) => self.symbols.name(sym),
            other => {
                self.check_owner(other)?;
                Err(RuntimeError::TypeMismatch(format!(
                    "{} is not a symbol",
                    other.type_tag().implicit_name()
                )))
            }
        }
    }

    /// Name from a symbol or string argument
    pub(crate) fn name_arg(&self, value: Value) -> Result<String, RuntimeError> {
        match value {
            Value::Symbol(_) => Ok(self.symbol_name(value)?.to_string()),
            Value::Str(_) => Ok(self.as_text(value)?.to_string()),
            other => Err(RuntimeError::TypeMismatch(format!(
                "{} is not a symbol nor a string",
                other.type_tag().implicit_name()
            ))),
        }
    }

    /// The top-level `self`
    pub fn main(&self) -> Value {
        Value::Main
    }

    // === Constants ===

    /// Define or replace a constant visible to scripts
    pub fn define_constant(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        self.check_owner(value)?;
        if !name.starts_with(|c: char| c.is_uppercase()) {
            return Err(RuntimeError::NameError(format!(
                "wrong constant name {}",
                name
            )));
        }
        self.constants.insert(name.to_string(), value);
        Ok(())
    }

    pub fn constant(&self, name: &str) -> Option<Value> {
        self.constants.get(name).copied()
    }

    // === Methods ===

    /// Register a method entry for `tag`
    pub(crate) fn define_entry(&mut self, tag: TypeTag, name: &str, method: Method) {
        let sym = self.symbols.intern(name);
        self.methods.define(tag, sym, method);
    }

    /// Resolve a method without calling it
    pub(crate) fn find_method(&self, tag: TypeTag, name: &str) -> Option<Method> {
        let sym = self.symbols.lookup(name)?;
        self.methods.resolve(tag, sym).cloned()
    }
}

impl Drop for State {
    fn drop(&mut self) {
        if !self.released {
            let report = self.release();
            debug!(
                state = self.id,
                objects = report.objects,
                "released runtime state on drop"
            );
        }
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("heap_objects", &self.heap.len())
            .field("symbols", &self.symbols.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffered() -> State {
        State::open_with(RuntimeConfig::buffered()).unwrap()
    }

    #[test]
    fn test_states_get_distinct_ids() {
        let a = buffered();
        let b = buffered();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_banner_order() {
        let mut state = buffered();
        state.print_banner();
        let output = state.take_output();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], GARNET_COPYRIGHT);
        assert_eq!(
            lines[1],
            format!("garnet {} ({})", VERSION, GARNET_RELEASE_DATE)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RuntimeConfig {
            max_call_depth: 0,
            ..RuntimeConfig::buffered()
        };
        assert!(matches!(
            State::open_with(config),
            Err(OpenError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unsatisfiable_heap_reservation() {
        let config = RuntimeConfig {
            initial_heap_capacity: usize::MAX,
            ..RuntimeConfig::buffered()
        };
        assert!(matches!(
            State::open_with(config),
            Err(OpenError::Allocation { .. })
        ));
    }

    #[test]
    fn test_heap_too_small_for_core_objects() {
        let config = RuntimeConfig {
            max_heap_objects: 1,
            ..RuntimeConfig::buffered()
        };
        assert!(matches!(
            State::open_with(config),
            Err(OpenError::Allocation { .. })
        ));
    }

    #[test]
    fn test_close_reports_everything_created() {
        let mut state = buffered();
        let baseline = state.heap_objects();
        state.new_string("a").unwrap();
        state.new_string("b").unwrap();
        let report = state.close();
        assert_eq!(report.objects, baseline + 2);
        assert!(report.methods > 0);
    }

    #[test]
    fn test_as_text_type_mismatch() {
        let state = buffered();
        let err = state.as_text(Value::Integer(1)).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::TypeMismatch("no implicit conversion of Integer into String".into())
        );
    }

    #[test]
    fn test_constants_are_frozen_strings() {
        let state = buffered();
        let version = state.constant("GARNET_VERSION").unwrap();
        assert_eq!(state.as_text(version).unwrap(), VERSION);
        assert!(state.is_frozen(version).unwrap());
    }

    #[test]
    fn test_define_constant_validates_name() {
        let mut state = buffered();
        assert!(state.define_constant("Answer", Value::Integer(42)).is_ok());
        assert!(matches!(
            state.define_constant("answer", Value::Integer(42)),
            Err(RuntimeError::NameError(_))
        ));
    }
}
