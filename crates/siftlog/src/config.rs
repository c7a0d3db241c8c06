//! Configuration loading.
//!
//! A YAML file names the store and the full-text settings:
//!
//! ```yaml
//! store: data/records.log
//! text_fields: [name, bio]
//! text_scope: fields
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Error, Result};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "siftlog.yaml";

/// How `$text` chooses the fields it searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextScopeSetting {
    /// Every string field.
    #[default]
    All,
    /// Only `text_fields`.
    Fields,
}

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the record log.
    pub store: PathBuf,

    /// Fields intended for full-text search.
    #[serde(default)]
    pub text_fields: Vec<String>,

    /// Whether `$text` honors `text_fields`.
    #[serde(default)]
    pub text_scope: TextScopeSetting,
}

impl Config {
    /// Creates a configuration for the given store with default text settings.
    pub fn new(store: impl Into<PathBuf>) -> Self {
        Self {
            store: store.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a file.
    ///
    /// A relative `store` path is resolved against the directory holding the
    /// configuration file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read and
    /// [`Error::Config`] if it is not valid YAML for this structure.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let mut config: Self = Self::from_yaml(&content)?;

        if config.store.is_relative()
            && let Some(dir) = path.parent()
        {
            config.store = dir.join(&config.store);
        }
        tracing::debug!(path = %path.display(), store = %config.store.display(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on invalid YAML or unknown values.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Returns true if `$text` should search only `text_fields`.
    #[must_use]
    pub fn restricts_text_search(&self) -> bool {
        self.text_scope == TextScopeSetting::Fields
    }
}
