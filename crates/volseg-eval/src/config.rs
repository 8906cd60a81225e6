use std::path::Path;

use json_patch::merge;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Serialization(serde_json::Error),
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, ConfigError::Serialization(e) if e.is_syntax())
    }

    pub fn is_data(&self) -> bool {
        matches!(self, ConfigError::Serialization(e) if e.is_data())
    }
}

/// Tunables of an evaluation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Slices per inference call. Larger batches trade device memory for fewer calls.
    pub batch_size: usize,
    /// Probability at which a voxel becomes foreground.
    pub threshold: f64,
    /// Prediction channel holding the foreground class.
    pub foreground_channel: usize,
    /// Channels per slice the predictor expects before neighbour context is added.
    pub slot_channels: usize,
    /// Keep going with the next volume when one fails instead of aborting the dataset.
    pub skip_failed_volumes: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            threshold: 0.5,
            foreground_channel: 0,
            slot_channels: 3,
            skip_failed_volumes: true,
        }
    }
}

impl EvaluationConfig {
    /// Deep-merges a JSON object onto the defaults.
    pub fn from_json_override(config: &str) -> Result<Self, ConfigError> {
        let override_val: serde_json::Value =
            serde_json::from_str(config).map_err(ConfigError::Serialization)?;

        let mut merged = serde_json::to_value(Self::default()).map_err(ConfigError::Serialization)?;

        merge(&mut merged, &override_val);

        serde_json::from_value(merged).map_err(ConfigError::Serialization)
    }

    /// Reads a JSON override file and merges it onto the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_override(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "threshold must lie strictly between 0 and 1, got {}",
                self.threshold
            )));
        }
        if self.slot_channels == 0 {
            return Err(ConfigError::Invalid(
                "slot_channels must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
