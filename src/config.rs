//! Engine configuration
//!
//! Loads engine settings from a YAML file. `from_env` reads the file named by
//! `MODEL_CHANGESET_CONFIG` and falls back to defaults when the variable is
//! unset.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::ModelsMetaInfo;

pub const CONFIG_ENV_VAR: &str = "MODEL_CHANGESET_CONFIG";

pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest cascade level a change may produce before the request fails.
    pub max_cascade_depth: usize,
    /// YAML file with attribute meta info (default values).
    pub meta_info_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cascade_depth: DEFAULT_MAX_CASCADE_DEPTH,
            meta_info_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse engine config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        info!(
            path = %path.display(),
            max_cascade_depth = config.max_cascade_depth,
            "Loaded engine config"
        );
        Ok(config)
    }

    /// Load from the file named by `MODEL_CHANGESET_CONFIG`, or defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Attribute meta info from `meta_info_path`, empty when unset.
    pub fn load_meta_info(&self) -> Result<ModelsMetaInfo> {
        match &self.meta_info_path {
            Some(path) => ModelsMetaInfo::load(path),
            None => Ok(ModelsMetaInfo::new()),
        }
    }
}
