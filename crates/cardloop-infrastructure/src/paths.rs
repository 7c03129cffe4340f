//! Unified path management for cardloop files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/cardloop/          # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/cardloop/     # Data directory
//! └── store/                   # DirStore root (one JSON file per key)
//! ```

use cardloop_core::CardloopError;
use cardloop_core::error::Result;
use std::path::PathBuf;

const APP_DIR: &str = "cardloop";

/// Platform paths for cardloop.
pub struct CardloopPaths;

impl CardloopPaths {
    /// Returns the cardloop configuration directory (e.g. `~/.config/cardloop/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| CardloopError::config("Cannot determine config directory"))
    }

    /// Returns the cardloop data directory (e.g. `~/.local/share/cardloop/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| CardloopError::config("Cannot determine data directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the store directory under `data_dir`.
    pub fn store_dir_in(data_dir: PathBuf) -> PathBuf {
        data_dir.join("store")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_name() {
        if let Ok(path) = CardloopPaths::config_file() {
            assert!(path.ends_with("cardloop/config.toml"));
        }
    }

    #[test]
    fn test_store_dir_in() {
        let dir = CardloopPaths::store_dir_in(PathBuf::from("/tmp/cl"));
        assert_eq!(dir, PathBuf::from("/tmp/cl/store"));
    }
}
