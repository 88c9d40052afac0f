//! Error handling example
//!
//! Shows syntax and runtime failures and how to render them as diagnostics.
//!
//! Run with: cargo run --example 03_error_handling -p garnet-runtime

use garnet_runtime::{EvalError, RuntimeConfig, State};

fn report(state: &mut State, source: &str) {
    match state.eval_string(source) {
        Ok(value) => println!("ok: {}", state.inspect(value).unwrap_or_default()),
        Err(err) => {
            println!("{}", err);
            for diagnostic in err.to_diagnostics(source, "<eval>") {
                println!("{}", diagnostic.to_human_string());
            }
            if let EvalError::Runtime { error, .. } = &err {
                println!("class: {}", error.class_name());
            }
        }
    }
}

fn main() {
    let mut state = State::open_with(RuntimeConfig::buffered()).expect("Failed to open runtime");

    // Syntax error: nothing runs
    report(&mut state, "puts (1 +");

    // Runtime error with a location
    report(&mut state, "x = nil\nx.upcase");

    // Script-level raise
    report(&mut state, "raise 'boom'");

    // Still usable afterwards
    report(&mut state, "'still alive'.upcase");
}
