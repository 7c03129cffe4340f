//! Daily statistics.
//!
//! Observability-only counters bucketed by local calendar date. Counters are
//! only ever incremented; a corrupt book is treated as empty.

use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STATS_KEY: &str = "stats_v1";

/// Counters for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayStats {
    pub date: String,
    pub draws: u32,
    pub rerolls: u32,
    pub exits_charged: u32,
    pub finishes: u32,
}

impl DayStats {
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            ..Self::default()
        }
    }

    fn field_mut(&mut self, field: StatField) -> &mut u32 {
        match field {
            StatField::Draws => &mut self.draws,
            StatField::Rerolls => &mut self.rerolls,
            StatField::ExitsCharged => &mut self.exits_charged,
            StatField::Finishes => &mut self.finishes,
        }
    }
}

/// Which counter to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Draws,
    Rerolls,
    ExitsCharged,
    Finishes,
}

/// All recorded days, keyed by `YYYY-MM-DD`.
pub type StatsBook = BTreeMap<String, DayStats>;

/// Reads and bumps one activity's stats book.
#[derive(Debug, Clone)]
pub struct DailyStatsCounter {
    storage: Storage,
}

impl DailyStatsCounter {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The whole book.
    pub fn book(&self) -> StatsBook {
        self.storage.get(STATS_KEY, StatsBook::new())
    }

    /// Counters for `date` (zeroes if nothing was recorded).
    pub fn day(&self, date: &str) -> DayStats {
        self.book()
            .remove(date)
            .unwrap_or_else(|| DayStats::empty(date))
    }

    /// Adds `step` to `field` on `date` and returns that day's counters.
    pub fn bump(&self, field: StatField, date: &str, step: u32) -> DayStats {
        let mut book = self.book();
        let day = book
            .entry(date.to_string())
            .or_insert_with(|| DayStats::empty(date));
        let counter = day.field_mut(field);
        *counter = counter.saturating_add(step);
        let snapshot = day.clone();
        self.storage.set(STATS_KEY, &book);
        snapshot
    }
}
