//! Run command - execute a script file

use anyhow::{anyhow, Context, Result};
use garnet_runtime::{EvalError, RuntimeConfig, State};
use std::fs;
use tracing::debug;

/// Run a script file
///
/// Output is whatever the script writes; the final value is not printed.
/// An unreadable file is reported as a GR2002 diagnostic like any other failure.
pub fn run(file_path: &str, config: RuntimeConfig, json: bool) -> Result<()> {
    let mut state = State::open_with(config).context("Failed to open garnet runtime")?;
    let result = state.load_file(file_path);
    let report = state.close();
    debug!(objects = report.objects, "run finished");

    match result {
        Ok(_) => Ok(()),
        Err(err) => {
            // Runtime diagnostics quote the failing line
            let source = match &err {
                EvalError::Runtime { .. } => fs::read_to_string(file_path).unwrap_or_default(),
                _ => String::new(),
            };
            super::report(&err, &source, file_path, json)?;
            Err(anyhow!("Failed to run {}", file_path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_run_simple_script() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "x = 1 + 2").unwrap();

        let result = run(
            temp_file.path().to_str().unwrap(),
            RuntimeConfig::buffered(),
            false,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_missing_file() {
        let err = run("nonexistent.rb", RuntimeConfig::buffered(), false).unwrap_err();
        assert_eq!(err.to_string(), "Failed to run nonexistent.rb");
    }

    #[test]
    fn test_run_runtime_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "raise 'stop'").unwrap();

        let err = run(
            temp_file.path().to_str().unwrap(),
            RuntimeConfig::buffered(),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Failed to run"));
    }
}
