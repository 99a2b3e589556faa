//! Model configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Model configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Extension of weight/threshold files, without the dot
    pub file_extension: String,
    /// Maintain running statistics
    pub track_stats: bool,
    /// Log a progress record every N events (0 = never)
    pub progress_interval: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            file_extension: "npy".into(),
            track_stats: true,
            progress_interval: 0,
        }
    }
}

impl ModelConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.file_extension.is_empty() {
            return Err(ModelError::InvalidConfiguration(
                "file_extension must not be empty".into(),
            ));
        }
        if self.file_extension.contains('.') {
            return Err(ModelError::InvalidConfiguration(format!(
                "file_extension must not contain '.', got {:?}",
                self.file_extension
            )));
        }
        Ok(())
    }
}
