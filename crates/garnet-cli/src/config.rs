//! CLI configuration
//!
//! Runtime limits come from `garnet-config` (project and global files plus
//! `GARNET_*` overrides). A few CLI-only switches are read from the
//! environment here.

use anyhow::{Context, Result};
use garnet_config::{ConfigLoader, OutputMode, RuntimeConfig};
use std::env;
use std::path::Path;
use tracing::debug;

/// CLI switches loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Default to JSON diagnostic output (GARNET_DIAGNOSTICS=json)
    pub default_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            default_json: env::var("GARNET_DIAGNOSTICS")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

/// Resolve the runtime configuration for a command
///
/// An explicit `--config` file replaces the search for `garnet.toml`.
/// Output always goes to stdout for the binaries.
pub fn load_runtime_config(explicit: Option<&Path>) -> Result<RuntimeConfig> {
    let mut loader = ConfigLoader::new();
    let config = match explicit {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => {
            let cwd = env::current_dir().context("failed to read current directory")?;
            loader
                .load_from_directory(&cwd)
                .context("failed to load configuration")?
        }
    };
    debug!(sources = ?config.sources, "loaded configuration");

    Ok(RuntimeConfig {
        output: OutputMode::Stdout,
        ..config.runtime
    })
}
