//! Diagnostic system for errors
//!
//! Syntax errors from the lexer and parser, and runtime errors surfaced by
//! the host API, all render through the same serialisable `Diagnostic`.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic schema version
pub const DIAG_VERSION: u32 = 1;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Prevents the snippet from running
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic schema version
    pub diag_version: u32,
    /// Severity level
    pub level: DiagnosticLevel,
    /// Error code (e.g., "GR1100")
    pub code: String,
    /// Main diagnostic message
    pub message: String,
    /// File path, or `(eval)` for snippets
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Length of error span
    pub length: usize,
    /// Source line string
    pub snippet: String,
    /// Short label for caret range
    pub label: String,
    /// Suggested fix (optional)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        let (line, column) = if span.is_dummy() {
            (1, 1)
        } else {
            (span.line as usize, span.column as usize)
        };
        Self {
            diag_version: DIAG_VERSION,
            level: DiagnosticLevel::Error,
            code: code.into(),
            message: message.into(),
            file: "(eval)".to_string(),
            line,
            column,
            length: span.len(),
            snippet: String::new(),
            label: String::new(),
            help: None,
        }
    }

    /// Set the file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    /// Set the line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Set the snippet (source line)
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Set the label (caret description)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Add a help message
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Fill in the snippet from the full source if it is still empty
    pub fn with_source(mut self, source: &str) -> Self {
        if self.snippet.is_empty() && self.line > 0 {
            self.snippet = source
                .lines()
                .nth(self.line - 1)
                .unwrap_or("")
                .to_string();
        }
        self
    }

    /// Format as human-readable string
    pub fn to_human_string(&self) -> String {
        let mut output = String::new();

        // Header: error[GR1100]: Expected 'end'
        output.push_str(&format!(
            "{}[{}]: {}\n",
            self.level, self.code, self.message
        ));

        // Location: --> script.rb:3:9
        output.push_str(&format!(
            "  --> {}:{}:{}\n",
            self.file, self.line, self.column
        ));

        if !self.snippet.is_empty() {
            output.push_str("   |\n");
            output.push_str(&format!("{:>2} | {}\n", self.line, self.snippet));

            if self.length > 0 {
                let padding = " ".repeat(self.column.saturating_sub(1));
                let carets = "^".repeat(self.length);
                output.push_str(&format!("   | {}{}", padding, carets));

                if !self.label.is_empty() {
                    output.push_str(&format!(" {}", self.label));
                }
                output.push('\n');
            }
        }

        if let Some(help) = &self.help {
            output.push_str(&format!("   = help: {}\n", help));
        }

        output
    }

    /// Format as JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}[{}]: {}",
            self.file, self.line, self.column, self.level, self.code, self.message
        )
    }
}

/// Error code registry
pub mod error_codes {
    // GR1xxx - Syntax Errors
    pub const UNEXPECTED_CHARACTER: &str = "GR1001";
    pub const UNTERMINATED_STRING: &str = "GR1002";
    pub const INVALID_ESCAPE: &str = "GR1003";
    pub const UNEXPECTED_TOKEN: &str = "GR1100";
    pub const MISSING_END: &str = "GR1101";
    pub const NESTING_TOO_DEEP: &str = "GR1102";

    // GR2xxx - Runtime Errors
    pub const RUNTIME_ERROR: &str = "GR2001";
    pub const LOAD_ERROR: &str = "GR2002";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_takes_position_from_span() {
        let diag = Diagnostic::error_with_code("GR1100", "Unexpected token", Span::at(8, 11, 2, 3));
        assert_eq!(diag.line, 2);
        assert_eq!(diag.column, 3);
        assert_eq!(diag.length, 3);
        assert_eq!(diag.file, "(eval)");
    }

    #[test]
    fn test_builder_pattern() {
        let diag = Diagnostic::error_with_code(error_codes::MISSING_END, "Expected 'end'", Span::new(0, 2))
            .with_file("demo.rb")
            .with_snippet("if x")
            .with_label("block opened here")
            .with_help("close the block with 'end'");

        assert_eq!(diag.file, "demo.rb");
        assert_eq!(diag.snippet, "if x");
        assert_eq!(diag.label, "block opened here");
        assert!(diag.help.is_some());
    }

    #[test]
    fn test_with_source_picks_line() {
        let diag = Diagnostic::error_with_code("GR2001", "boom", Span::at(6, 9, 2, 1))
            .with_source("a = 1\nfoo()\n");
        assert_eq!(diag.snippet, "foo()");
    }

    #[test]
    fn test_human_format() {
        let diag = Diagnostic::error_with_code("GR1001", "Unexpected character '@'", Span::at(4, 5, 1, 5))
            .with_file("demo.rb")
            .with_snippet("x = @")
            .with_label("lexer error");

        insta::assert_snapshot!(diag.to_human_string(), @r"
        error[GR1001]: Unexpected character '@'
          --> demo.rb:1:5
           |
         1 | x = @
           |     ^ lexer error
        ");
    }

    #[test]
    fn test_json_format() {
        let diag = Diagnostic::error_with_code("GR1002", "Unterminated string literal", Span::new(0, 5));
        let json = diag.to_json_compact().unwrap();
        assert!(json.contains("\"level\":\"error\""));
        assert!(json.contains("\"code\":\"GR1002\""));
        assert!(!json.contains("help"));
    }

    #[test]
    fn test_error_is_the_only_level() {
        let level: DiagnosticLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(level, DiagnosticLevel::Error);
        assert!(serde_json::from_str::<DiagnosticLevel>("\"warning\"").is_err());
    }
}
