//! Resolved runtime limits
//!
//! `RuntimeConfig` is the fully-merged view handed to the runtime when a
//! state is opened. Every field has a default, so a missing file is never an error.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default recursion limit for script method calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Default upper bound on live heap objects per state
pub const DEFAULT_MAX_HEAP_OBJECTS: usize = 1 << 20;

/// Default number of heap slots reserved when a state opens
pub const DEFAULT_INITIAL_HEAP_CAPACITY: usize = 256;

/// Where script output (`puts`, `print`, `p`, banners) goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Write straight to the process stdout
    #[default]
    Stdout,
    /// Capture into an in-memory buffer owned by the state
    Buffer,
}

impl FromStr for OutputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdout" => Ok(OutputMode::Stdout),
            "buffer" => Ok(OutputMode::Buffer),
            other => Err(ConfigError::InvalidValue {
                field: "runtime.output".to_string(),
                reason: format!("must be 'stdout' or 'buffer', got '{}'", other),
            }),
        }
    }
}

/// Runtime configuration after all layers have been merged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Maximum nesting of script method calls
    pub max_call_depth: usize,
    /// Maximum number of heap objects (strings) a state may hold
    pub max_heap_objects: usize,
    /// Heap slots reserved up front when the state opens
    pub initial_heap_capacity: usize,
    /// Output sink for script side effects
    pub output: OutputMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_heap_objects: DEFAULT_MAX_HEAP_OBJECTS,
            initial_heap_capacity: DEFAULT_INITIAL_HEAP_CAPACITY,
            output: OutputMode::default(),
        }
    }
}

impl RuntimeConfig {
    /// Configuration that captures output in memory (handy for hosts and tests)
    pub fn buffered() -> Self {
        Self {
            output: OutputMode::Buffer,
            ..Self::default()
        }
    }

    /// Check limits for values the runtime cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "runtime.max_call_depth".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_heap_objects == 0 {
            return Err(ConfigError::InvalidValue {
                field: "runtime.max_heap_objects".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output, OutputMode::Stdout);
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn test_zero_call_depth_rejected() {
        let config = RuntimeConfig {
            max_call_depth: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("runtime.max_call_depth"));
    }

    #[test]
    fn test_zero_heap_rejected() {
        let config = RuntimeConfig {
            max_heap_objects: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_mode_from_str() {
        assert_eq!("stdout".parse::<OutputMode>().unwrap(), OutputMode::Stdout);
        assert_eq!("BUFFER".parse::<OutputMode>().unwrap(), OutputMode::Buffer);
        assert!("file".parse::<OutputMode>().is_err());
    }

    #[test]
    fn test_buffered_constructor() {
        let config = RuntimeConfig::buffered();
        assert_eq!(config.output, OutputMode::Buffer);
        assert_eq!(config.max_heap_objects, DEFAULT_MAX_HEAP_OBJECTS);
    }
}
