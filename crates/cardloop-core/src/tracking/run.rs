//! Reroll run tracker.
//!
//! A run is the reroll budget of one draw-to-finish cycle. It outlives the
//! session that opened it: leaving the activity, coming back, abandoning or
//! soft-resetting all keep `used` as it was. Only a successful finish closes
//! the run, so navigation can never refill the budget.

use crate::session::REROLL_LIMIT_DEFAULT;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};

const RUN_KEY: &str = "reroll_run_v1";

/// Persisted reroll budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RerollRun {
    /// Whether a run is currently open.
    pub active: bool,
    /// Rerolls consumed in this run. Always `<= limit`.
    pub used: u32,
    /// Rerolls allowed in this run.
    pub limit: u32,
    /// When the run was opened (epoch ms).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
}

impl Default for RerollRun {
    fn default() -> Self {
        Self::closed(REROLL_LIMIT_DEFAULT)
    }
}

impl RerollRun {
    /// A closed run with the given limit.
    pub fn closed(limit: u32) -> Self {
        Self {
            active: false,
            used: 0,
            limit,
            started_at: None,
        }
    }

    /// Rerolls still available.
    pub fn left(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    pub fn has_budget(&self) -> bool {
        self.used < self.limit
    }

    fn clamped(mut self) -> Self {
        self.used = self.used.min(self.limit);
        self
    }
}

/// Owns and persists one activity's [`RerollRun`].
#[derive(Debug)]
pub struct RerollRunTracker {
    run: RerollRun,
    default_limit: u32,
    storage: Storage,
}

impl RerollRunTracker {
    /// Loads the persisted run, or a closed one if there is none.
    pub fn new(storage: Storage, default_limit: u32) -> Self {
        let run = storage
            .get(RUN_KEY, RerollRun::closed(default_limit))
            .clamped();
        Self {
            run,
            default_limit,
            storage,
        }
    }

    pub fn run(&self) -> &RerollRun {
        &self.run
    }

    pub fn left(&self) -> u32 {
        self.run.left()
    }

    pub fn has_budget(&self) -> bool {
        self.run.has_budget()
    }

    /// Opens a run with the default limit unless one is already open.
    ///
    /// Returns `true` if a new run was opened.
    pub fn start_if_needed(&mut self, now_ms: i64) -> bool {
        if self.run.active {
            return false;
        }
        self.run = RerollRun {
            active: true,
            used: 0,
            limit: self.default_limit,
            started_at: Some(now_ms),
        };
        self.persist();
        true
    }

    /// Records one reroll, clamped to the limit. Returns the new `used`.
    ///
    /// A closed run is opened in place so the spent reroll is not refunded
    /// by the next [`start_if_needed`](Self::start_if_needed).
    pub fn consume(&mut self, now_ms: i64) -> u32 {
        if !self.run.active {
            self.run.active = true;
            self.run.started_at.get_or_insert(now_ms);
        }
        self.run.used = self.run.used.saturating_add(1).min(self.run.limit);
        self.persist();
        self.run.used
    }

    /// Closes the run.
    pub fn reset(&mut self) {
        self.run = RerollRun::closed(self.default_limit);
        self.persist();
    }

    fn persist(&self) {
        self.storage.set(RUN_KEY, &self.run);
    }
}
