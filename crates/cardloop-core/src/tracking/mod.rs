//! Per-activity bookkeeping owned by a session engine.
//!
//! # Module Structure
//!
//! - `run`: the cross-session reroll budget ([`RerollRunTracker`])
//! - `debt`: deferred exit charges ([`ExitDebtLedger`])
//! - `stats`: per-day counters ([`DailyStatsCounter`])
//!
//! Each tracker persists through the engine's namespaced
//! [`Storage`](crate::storage::Storage) and tolerates missing or corrupt
//! records by starting from zero.

mod debt;
mod run;
mod stats;

pub use debt::{DebtSettlement, ExitDebtLedger};
pub use run::{RerollRun, RerollRunTracker};
pub use stats::{DailyStatsCounter, DayStats, StatField, StatsBook};
