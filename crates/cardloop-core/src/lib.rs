pub mod clock;
pub mod error;
pub mod pool;
pub mod session;
pub mod storage;
pub mod tracking;
pub mod wallet;

// Re-export the types most callers need
pub use error::CardloopError;
pub use pool::{AliasMap, Card, KeyResolver, PoolResolver, stable_key};
pub use session::{SessionEngine, SessionError, SessionPolicy, SessionResult, SessionState};
pub use storage::{KeyValueStore, MemoryStore, Storage};
pub use wallet::{TokenLedger, TokenWallet};
