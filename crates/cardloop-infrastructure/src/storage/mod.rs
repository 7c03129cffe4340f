//! File-backed storage.
//!
//! - `atomic_file`: single-file reads and locked, atomic replacement
//! - `dir_store`: [`DirStore`], a [`KeyValueStore`](cardloop_core::KeyValueStore)
//!   keeping one file per key

pub mod atomic_file;
mod dir_store;

pub use atomic_file::AtomicFile;
pub use dir_store::DirStore;
