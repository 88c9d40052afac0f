//! CLI command implementations

pub mod eval;
pub mod run;
pub mod version;

use anyhow::{Context, Result};
use garnet_runtime::{Diagnostic, EvalError};

/// Print the diagnostics for a failed evaluation
///
/// JSON goes to stdout so it can be piped; human output goes to stderr.
pub(crate) fn report(err: &EvalError, source: &str, file: &str, json: bool) -> Result<()> {
    let diagnostics = err.to_diagnostics(source, file);
    if json {
        println!("{}", render_json(&diagnostics)?);
    } else {
        for diagnostic in &diagnostics {
            eprint!("{}", diagnostic.to_human_string());
        }
    }
    Ok(())
}

fn render_json(diagnostics: &[Diagnostic]) -> Result<String> {
    serde_json::to_string_pretty(diagnostics).context("failed to serialize diagnostics")
}

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_runtime::{RuntimeConfig, State};

    #[test]
    fn test_json_rendering_is_an_array() {
        let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
        let source = "nil.upcase";
        let err = state.eval_string(source).unwrap_err();
        let json = render_json(&err.to_diagnostics(source, "t.rb")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["code"], "GR2001");
        assert_eq!(parsed[0]["file"], "t.rb");
    }
}
