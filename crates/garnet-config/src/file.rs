//! Configuration files (garnet.toml and ~/.garnet/config.toml)
//!
//! Both files share one schema; every field is optional so that layers
//! can be merged field by field.

use crate::runtime::{OutputMode, RuntimeConfig};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Runtime limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeSection>,
}

/// `[runtime]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heap_objects: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_heap_capacity: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputMode>,
}

impl ConfigFile {
    /// Load a configuration file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration text; `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate values that TOML typing cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(runtime) = &self.runtime {
            if runtime.max_call_depth == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "runtime.max_call_depth".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            if runtime.max_heap_objects == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "runtime.max_heap_objects".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get the global config file path (~/.garnet/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".garnet").join("config.toml"))
    }

    /// Write the values present in this file over `config`
    pub fn apply_to(&self, config: &mut RuntimeConfig) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        if let Some(depth) = runtime.max_call_depth {
            config.max_call_depth = depth;
        }
        if let Some(max) = runtime.max_heap_objects {
            config.max_heap_objects = max;
        }
        if let Some(initial) = runtime.initial_heap_capacity {
            config.initial_heap_capacity = initial;
        }
        if let Some(output) = runtime.output {
            config.output = output;
        }
    }
}
