use anyhow::Result;
use clap::{Parser, Subcommand};
use garnet_cli::{config, logging};
use garnet_config::RuntimeConfig;
use std::path::PathBuf;

mod commands;

/// Garnet, an embeddable Ruby-flavoured scripting runtime.
///
/// EXAMPLES:
///     garnet run script.rb            Run a script
///     garnet eval "(2*21).to_s"       Evaluate and print the result
///     garnet version                  Show version information
///
/// ENVIRONMENT VARIABLES:
///     GARNET_LOG            Log filter, e.g. 'garnet_runtime=debug'
///     GARNET_DIAGNOSTICS    Set to 'json' for JSON diagnostics by default
///     GARNET_MAX_CALL_DEPTH, GARNET_MAX_HEAP_OBJECTS,
///     GARNET_INITIAL_HEAP_CAPACITY   Runtime limit overrides
#[derive(Parser)]
#[command(name = "garnet")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file to use instead of searching for garnet.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the maximum method call depth
    #[arg(long, global = true, value_name = "N")]
    max_call_depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script file
    ///
    /// EXAMPLES:
    ///     garnet run script.rb            Run a script
    ///     garnet run script.rb --json     Output diagnostics as JSON
    #[command(visible_alias = "r")]
    Run {
        /// Path to the script
        file: String,
        /// Output diagnostics in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a snippet and print the inspected result
    #[command(visible_alias = "e")]
    Eval {
        /// Source code to evaluate
        code: String,
        /// Output diagnostics in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show version and copyright
    Version,
}

fn main() -> Result<()> {
    logging::init();
    let Cli {
        config: config_path,
        max_call_depth,
        command,
    } = Cli::parse();
    let cli_config = config::Config::from_env();

    let runtime = || -> Result<RuntimeConfig> {
        let mut runtime = config::load_runtime_config(config_path.as_deref())?;
        // Command-line flag overrides file and environment
        if let Some(depth) = max_call_depth {
            runtime.max_call_depth = depth;
        }
        Ok(runtime)
    };

    match command {
        Commands::Run { file, json } => {
            commands::run::run(&file, runtime()?, json || cli_config.default_json)?;
        }
        Commands::Eval { code, json } => {
            commands::eval::run(&code, runtime()?, json || cli_config.default_json)?;
        }
        Commands::Version => commands::version::run(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_smoke() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_json_flag() {
        let cli = Cli::parse_from(["garnet", "run", "file.rb", "--json"]);
        match cli.command {
            Commands::Run { json, .. } => assert!(json),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["garnet", "eval", "1", "--max-call-depth", "8"]);
        assert_eq!(cli.max_call_depth, Some(8));
        assert!(matches!(cli.command, Commands::Eval { .. }));
    }

    #[test]
    fn test_alias_r_for_run() {
        let cli = Cli::parse_from(["garnet", "r", "file.rb"]);
        assert!(matches!(cli.command, Commands::Run { .. }));
    }
}
