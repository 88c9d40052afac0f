//! Embedding demo
//!
//! Opens a runtime, prints the banner, upcases a string in place through a
//! method call, evaluates two snippets and closes the runtime.

use anyhow::{Context, Result};
use clap::Parser;
use garnet_cli::{config, logging};
use garnet_runtime::{State, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

const TAG: &str = "[garnet_example]";

/// Embed the garnet runtime and exercise its host API
#[derive(Parser)]
#[command(name = "garnet-example")]
#[command(version)]
struct Cli {
    /// Configuration file to use instead of searching for garnet.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} error: {:#}", TAG, e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let runtime = config::load_runtime_config(cli.config.as_deref())?;

    println!("{} BEGIN GARNET", TAG);

    let mut state = State::open_with(runtime).context("failed to open garnet runtime")?;

    state.show_copyright();
    state.show_version();

    let name = state.new_string("mrb_p")?;
    state.invoke(name, "upcase!", &[])?;
    state.p(name)?;

    let result = state.eval_string("(2*21).to_s")?;
    println!("{} result: {}", TAG, text(&state, result)?);

    state.eval_string("puts 'hola, mundo!'")?;

    let report = state.close();
    debug!(objects = report.objects, methods = report.methods, "runtime closed");

    println!("{} END GARNET", TAG);
    Ok(())
}

fn text(state: &State, value: Value) -> Result<String> {
    Ok(state.as_text(value)?.to_string())
}
