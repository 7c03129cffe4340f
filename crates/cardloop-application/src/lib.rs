//! Cardloop application layer.
//!
//! Wires the generic session engine to the two concrete activities:
//!
//! - `mood`: mood baits, drawn by mood
//! - `task`: task cards, drawn by task type
//!
//! plus the exit guard used on navigation, logging setup and the
//! [`CardloopApp`] facade.

pub mod app;
pub mod exit_guard;
pub mod logging;
pub mod mood;
pub mod task;

pub use app::{ActivityPools, CardloopApp};
pub use exit_guard::{ExitBilling, ExitGuard};
pub use mood::{BaitKind, MoodBait, MoodBaitPool};
pub use task::{TaskCard, TaskCardPool};
