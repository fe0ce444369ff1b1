//! Pipeline configuration
//!
//! One record holds every option the stages consume. All sections default,
//! so a YAML file only needs the keys it changes:
//!
//! ```yaml
//! extraction:
//!   confidence_threshold: 0.6
//! thresholds:
//!   top_n:
//!     quick_wins: 1
//! ```

use crate::comment::NormalizeOptions;
use crate::extract::{Dictionaries, ExtractOptions};
use crate::recommend::RecommendThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Every option the pipeline consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub processing: NormalizeOptions,
    pub extraction: ExtractOptions,
    pub thresholds: RecommendThresholds,
    pub dictionaries: Dictionaries,
}

impl PipelineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Human-readable problems, empty when the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.processing.validate();
        errors.extend(self.extraction.validate());
        errors.extend(self.thresholds.validate());
        errors.extend(self.dictionaries.validate());
        errors
    }

    /// Per-user config file location (`<config dir>/kanoscope/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kanoscope").join("config.yaml"))
    }
}
