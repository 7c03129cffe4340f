//! Application configuration file.
//!
//! ```toml
//! # ~/.config/cardloop/config.toml
//! data_dir = "/srv/cardloop"   # optional
//!
//! [logging]
//! filter = "info,cardloop_core=debug"
//! json = false
//! ```
//!
//! Every field is optional. Economic constants (reroll limit, costs) are not
//! configurable here.

use crate::paths::CardloopPaths;
use crate::storage::AtomicFile;
use cardloop_core::CardloopError;
use cardloop_core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
}

/// `[logging]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives. `RUST_LOG` takes precedence.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads the config from the platform config file.
    pub fn load() -> Result<Self> {
        Self::load_from(&CardloopPaths::config_file()?)
    }

    /// Loads the config from `path`.
    ///
    /// A missing or empty file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let Some(content) = AtomicFile::new(path.to_path_buf()).load()? else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(&content).map_err(|e| {
            CardloopError::config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Writes the config to `path` atomically.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CardloopError::serialization("TOML", e.to_string()))?;
        AtomicFile::new(path.to_path_buf()).save(&content)
    }

    /// Directory holding the persisted engine state.
    pub fn store_dir(&self) -> Result<PathBuf> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => CardloopPaths::data_dir()?,
        };
        Ok(CardloopPaths::store_dir_in(data_dir))
    }
}
