//! Storage capability.
//!
//! # Module Structure
//!
//! - `backend`: the fallible [`KeyValueStore`] trait implemented by storage backends
//! - `memory`: [`MemoryStore`], an in-process backend
//! - `safe`: [`Storage`], the namespaced facade that never fails and degrades to fallbacks
//!
//! Engines and ledgers only ever talk to [`Storage`]; a backend error is logged
//! and replaced by the caller's fallback value, so a broken disk costs
//! cross-session continuity but never an operation.

mod backend;
mod memory;
mod safe;

pub use backend::KeyValueStore;
pub use memory::MemoryStore;
pub use safe::Storage;
