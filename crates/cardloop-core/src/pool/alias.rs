//! Category key resolution.
//!
//! Renaming a user-defined category leaves old keys behind in stored items
//! and statistics. An [`AliasMap`] records `old -> new` and resolves any key
//! to its current name.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Maps a category key to its canonical form.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, key: &str) -> String;
}

impl<F> KeyResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn resolve(&self, key: &str) -> String {
        self(key)
    }
}

/// Resolves every key to itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityResolver;

impl KeyResolver for IdentityResolver {
    fn resolve(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Old-key to new-key renames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap {
    entries: BTreeMap<String, String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from raw entries, compressing chains.
    pub fn from_entries(entries: BTreeMap<String, String>) -> Self {
        let mut map = Self { entries };
        map.compress();
        map
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Follows `key` through the map to its final name.
    ///
    /// Stops at the first repeated key, so a cycle resolves to wherever the
    /// walk notices it instead of looping.
    pub fn resolve_key(&self, key: &str) -> String {
        let mut current = key.to_string();
        let mut seen = HashSet::new();
        while let Some(next) = self.entries.get(&current) {
            if !seen.insert(current.clone()) {
                break;
            }
            current = next.clone();
        }
        current
    }

    /// Records that `old` is now called `new`, keeping the map flat.
    pub fn rename(&mut self, old: &str, new: &str) {
        let old = old.trim();
        let new = new.trim();
        if old.is_empty() || new.is_empty() || old == new {
            return;
        }
        self.entries.insert(old.to_string(), new.to_string());
        // A key revived under its old name must not point away from itself
        self.entries.remove(new);
        self.compress();
    }

    /// Points every entry straight at its final target and drops
    /// self-references.
    pub fn compress(&mut self) {
        let compressed: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|(key, value)| (key.clone(), self.resolve_key(value)))
            .filter(|(key, target)| key != target)
            .collect();
        self.entries = compressed;
    }
}

impl KeyResolver for AliasMap {
    fn resolve(&self, key: &str) -> String {
        self.resolve_key(key)
    }
}
