use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, PatchResult};

/// Configuration for patch compilation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Keys whose directive is always `increment`, whatever their diff
    /// classification. These are store-maintained counters that an edit can
    /// bump but never set.
    pub increment_fields: Vec<String>,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            increment_fields: vec!["version".to_string()],
        }
    }
}

impl PatchConfig {
    /// A configuration with no forced increments: every changed key is
    /// compiled from its classification alone.
    pub fn plain() -> Self {
        Self {
            increment_fields: Vec::new(),
        }
    }

    /// Returns `true` if `key` always compiles to `increment`.
    pub fn is_increment_field(&self, key: &str) -> bool {
        self.increment_fields.iter().any(|f| f == key)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> PatchResult<Self> {
        toml::from_str(text).map_err(|e| PatchError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> PatchResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> PatchResult<String> {
        toml::to_string(self).map_err(|e| PatchError::Config(e.to_string()))
    }
}
