//! Harness configuration: which files are modules and how they are invoked
use crate::error::HarnessError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Invocation contract applied to every module in a batch.
///
/// The defaults are the fixed ABI: files ending in `.wasm`, export
/// `process`, called with the single `i32` argument `1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// File extension of candidate modules, without the leading dot
    pub extension: String,

    /// Exported function invoked on every module
    pub entry_point: String,

    /// The single integer argument passed to the entry point
    pub input: i32,
}

impl HarnessConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, HarnessError> {
        serde_yaml::from_str(yaml).map_err(HarnessError::ConfigParse)
    }

    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let raw = std::fs::read_to_string(path).map_err(|source| HarnessError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            extension: "wasm".to_string(),
            entry_point: "process".to_string(),
            input: 1,
        }
    }
}
