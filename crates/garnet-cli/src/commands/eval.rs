//! Eval command - evaluate a snippet and print the inspected result

use anyhow::{anyhow, Context, Result};
use garnet_runtime::{RuntimeConfig, State};

/// Evaluate `code`, then print `result.inspect` on its own line
pub fn run(code: &str, config: RuntimeConfig, json: bool) -> Result<()> {
    let mut state = State::open_with(config).context("Failed to open garnet runtime")?;
    let outcome = match state.eval_string(code) {
        Ok(value) => {
            let shown = state
                .inspect(value)
                .map_err(|e| anyhow!("Failed to inspect result: {}", e))?;
            println!("=> {}", shown);
            Ok(())
        }
        Err(err) => {
            super::report(&err, code, "-e", json)?;
            Err(anyhow!("Evaluation failed"))
        }
    };
    state.close();
    outcome
}
