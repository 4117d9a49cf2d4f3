//! Weaver configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WeaverError;

/// Top-level weaver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeaverConfig {
    /// Seed of the weaver's random stream.
    pub seed: u64,
    pub selection: SelectionConfig,
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            selection: SelectionConfig::default(),
        }
    }
}

/// Candidate selection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Upper bound on rejected normal draws before falling back to the
    /// lowest-scored candidate.
    pub max_selection_draws: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { max_selection_draws: 256 }
    }
}

impl WeaverConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, WeaverError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WeaverError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), WeaverError> {
        if self.selection.max_selection_draws == 0 {
            return Err(WeaverError::InvalidConfig(
                "selection.max_selection_draws must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
