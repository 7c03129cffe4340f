pub mod config;
pub mod paths;
pub mod storage;

pub use crate::config::{AppConfig, LoggingConfig};
pub use crate::paths::CardloopPaths;
pub use crate::storage::DirStore;
