//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::file::ConfigFile;
use crate::runtime::{OutputMode, RuntimeConfig};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const PROJECT_CONFIG_FILE: &str = "garnet.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.garnet/config.toml) - lowest priority
/// 2. Project config (./garnet.toml) - overrides global
/// 3. Environment variables (GARNET_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Effective runtime configuration
    pub runtime: RuntimeConfig,

    /// Project root directory (where garnet.toml was found)
    pub project_root: Option<PathBuf>,

    /// Files that contributed, lowest precedence first
    pub sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config file instead of ~/.garnet/config.toml
    pub fn with_global_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find garnet.toml, layering it over the
    /// global config, then applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let mut config = self.base_config()?;

        if let Some((root, path)) = find_project_config(start_dir) {
            ConfigFile::load_from_file(&path)?.apply_to(&mut config.runtime);
            config.sources.push(path);
            config.project_root = Some(root);
        }

        apply_env_overrides(&mut config.runtime)?;
        config.runtime.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let mut config = self.base_config()?;

        ConfigFile::load_from_file(config_path)?.apply_to(&mut config.runtime);
        config.sources.push(config_path.to_path_buf());
        config.project_root = config_path.parent().map(|p| p.to_path_buf());

        apply_env_overrides(&mut config.runtime)?;
        config.runtime.validate()?;
        Ok(config)
    }

    /// Defaults with the global config layered on top
    fn base_config(&mut self) -> ConfigResult<Config> {
        let mut config = Config {
            runtime: RuntimeConfig::default(),
            project_root: None,
            sources: Vec::new(),
        };

        if let Some(path) = self.global_path() {
            // Global config is optional - if it doesn't exist, keep defaults
            if path.exists() {
                ConfigFile::load_from_file(&path)?.apply_to(&mut config.runtime);
                config.sources.push(path);
            }
        }

        Ok(config)
    }

    fn global_path(&mut self) -> Option<PathBuf> {
        if self.global_config_path.is_none() {
            self.global_config_path = ConfigFile::global_config_path().ok();
        }
        self.global_config_path.clone()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has garnet.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

/// Find garnet.toml by walking up the directory tree
///
/// Returns (project_root, config_path) of the nearest match.
fn find_project_config(start_dir: &Path) -> Option<(PathBuf, PathBuf)> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(PROJECT_CONFIG_FILE);

        if config_path.exists() {
            return Some((current, config_path));
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Apply environment variable overrides
///
/// Recognised: GARNET_MAX_CALL_DEPTH, GARNET_MAX_HEAP_OBJECTS,
/// GARNET_INITIAL_HEAP_CAPACITY, GARNET_OUTPUT.
fn apply_env_overrides(config: &mut RuntimeConfig) -> ConfigResult<()> {
    if let Some(depth) = env_usize("GARNET_MAX_CALL_DEPTH")? {
        config.max_call_depth = depth;
    }
    if let Some(max) = env_usize("GARNET_MAX_HEAP_OBJECTS")? {
        config.max_heap_objects = max;
    }
    if let Some(initial) = env_usize("GARNET_INITIAL_HEAP_CAPACITY")? {
        config.initial_heap_capacity = initial;
    }
    if let Ok(output) = env::var("GARNET_OUTPUT") {
        config.output = output.parse::<OutputMode>()?;
    }
    Ok(())
}

fn env_usize(name: &str) -> ConfigResult<Option<usize>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: name.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
