//! Evaluation entry points and host-side method calls
//!
//! # Examples
//!
//! ```
//! use garnet_runtime::{RuntimeConfig, State};
//!
//! let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
//!
//! // Evaluate code
//! let answer = state.eval_string("(2*21).to_s").unwrap();
//! assert_eq!(state.as_text(answer).unwrap(), "42");
//!
//! // Call a method from Rust
//! let name = state.new_string("mrb_p").unwrap();
//! state.invoke(name, "upcase!", &[]).unwrap();
//! assert_eq!(state.inspect(name).unwrap(), "\"MRB_P\"");
//! ```

use crate::ast::Program;
use crate::diagnostic::{error_codes, Diagnostic};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::span::Span;
use crate::state::State;
use crate::value::{RuntimeError, Value};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Failure of `eval_string` or `load_file`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Lexical or syntax errors; nothing was executed
    #[error("{}", syntax_summary(.0))]
    Syntax(Vec<Diagnostic>),
    /// Error raised while executing
    #[error("{error}")]
    Runtime {
        error: RuntimeError,
        /// Call or expression that raised
        span: Span,
        /// Line of `span` (0 when raised outside script code)
        line: u32,
    },
    /// Source file could not be read
    #[error("cannot load {path}: {message}")]
    Load { path: String, message: String },
}

fn syntax_summary(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "syntax error".to_string(),
        [only] => format!("syntax error: {}", only.message),
        [first, rest @ ..] => format!(
            "syntax error: {} (and {} more)",
            first.message,
            rest.len()
        ),
    }
}

impl EvalError {
    fn runtime(error: RuntimeError, span: Span) -> Self {
        EvalError::Runtime {
            error,
            line: span.line,
            span,
        }
    }

    /// The runtime error, if this is one
    pub fn runtime_error(&self) -> Option<&RuntimeError> {
        match self {
            EvalError::Runtime { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Render as diagnostics against the evaluated source
    pub fn to_diagnostics(&self, source: &str, file: &str) -> Vec<Diagnostic> {
        match self {
            EvalError::Syntax(diagnostics) => diagnostics
                .iter()
                .cloned()
                .map(|d| d.with_file(file).with_source(source))
                .collect(),
            EvalError::Runtime { error, span, .. } => vec![Diagnostic::error_with_code(
                error_codes::RUNTIME_ERROR,
                format!("{} ({})", error, error.class_name()),
                *span,
            )
            .with_file(file)
            .with_label(error.class_name())
            .with_source(source)],
            EvalError::Load { path, message } => vec![Diagnostic::error_with_code(
                error_codes::LOAD_ERROR,
                format!("cannot load {}: {}", path, message),
                Span::dummy(),
            )
            .with_file(path.as_str())],
        }
    }
}

impl State {
    /// Lex, parse and run `source` against this state
    ///
    /// Returns the value of the last expression, nil for an empty snippet.
    /// Top-level locals and `def` methods persist into later evaluations.
    ///
    /// ```
    /// use garnet_runtime::{RuntimeConfig, State, Value};
    ///
    /// let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
    /// state.eval_string("x = 40").unwrap();
    /// assert_eq!(state.eval_string("x + 2").unwrap(), Value::Integer(42));
    /// ```
    pub fn eval_string(&mut self, source: &str) -> Result<Value, EvalError> {
        debug!(state = self.id(), bytes = source.len(), "eval");
        let program = self.parse_source(source)?;
        self.execute(&program)
            .map_err(|(error, span)| EvalError::runtime(error, span))
    }

    /// Read and evaluate a file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Value, EvalError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| EvalError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(state = self.id(), path = %path.display(), "load file");
        self.eval_string(&source).map_err(|e| match e {
            EvalError::Syntax(diagnostics) => EvalError::Syntax(
                diagnostics
                    .into_iter()
                    .map(|d| d.with_file(path.display().to_string()))
                    .collect(),
            ),
            other => other,
        })
    }

    fn parse_source(&self, source: &str) -> Result<Program, EvalError> {
        let (tokens, mut diagnostics) = Lexer::new(source).tokenize();
        let (program, parse_diagnostics) = Parser::new(tokens)
            .with_locals(self.top_locals.keys().cloned())
            .parse();
        diagnostics.extend(parse_diagnostics);

        if diagnostics.is_empty() {
            Ok(program)
        } else {
            Err(EvalError::Syntax(
                diagnostics
                    .into_iter()
                    .map(|d| d.with_source(source))
                    .collect(),
            ))
        }
    }

    /// Call a method by name, as a public call with an explicit receiver
    ///
    /// Operators are methods too, so `invoke(2, "*", [21])` is valid.
    pub fn invoke(&mut self, receiver: Value, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        self.check_owner(receiver)?;
        for &arg in args {
            self.check_owner(arg)?;
        }
        self.dispatch(receiver, method, args, false, Span::dummy())
            .map_err(|unwind| unwind.into_error().0)
    }

    /// `value.to_s` as Rust text
    pub fn to_s(&mut self, value: Value) -> Result<String, RuntimeError> {
        self.check_owner(value)?;
        let result = self.call(value, "to_s", &[])?;
        self.text_or_default(result)
    }

    /// `value.inspect` as Rust text
    pub fn inspect(&mut self, value: Value) -> Result<String, RuntimeError> {
        self.check_owner(value)?;
        let result = self.call(value, "inspect", &[])?;
        self.text_or_default(result)
    }

    /// Write `value.inspect` and a newline to the output sink, like `p value`
    pub fn p(&mut self, value: Value) -> Result<Value, RuntimeError> {
        let mut line = self.inspect(value)?;
        line.push('\n');
        self.write_output(&line)?;
        Ok(value)
    }

    fn text_or_default(&self, value: Value) -> Result<String, RuntimeError> {
        match value {
            Value::Str(_) => Ok(self.as_text(value)?.to_string()),
            other => Ok(format!("#<{}>", other.type_tag())),
        }
    }
}
