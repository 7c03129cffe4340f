//! Session lifecycle.
//!
//! # Module Structure
//!
//! - `policy`: economic defaults (`SessionPolicy`)
//! - `model`: the session record (`Session`, `SessionState`)
//! - `error`: refused transitions (`SessionError`)
//! - `engine`: the state machine (`SessionEngine`)

mod engine;
mod error;
mod model;
mod policy;

pub use engine::{SessionEngine, SessionEngineBuilder};
pub use error::{SessionError, SessionResult};
pub use model::{Session, SessionState};
pub use policy::{
    EXIT_COST_TOKEN_DEFAULT, REROLL_COST_TOKEN_DEFAULT, REROLL_LIMIT_DEFAULT, SessionPolicy,
};
