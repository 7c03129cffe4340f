//! Mood baits.
//!
//! A bait is a tiny action suggested for the user's current mood. The pool
//! merges the built-in catalogue with the user's own baits; a user bait
//! shadows a built-in one with the same title and moods.

use cardloop_core::pool::IdentityResolver;
use cardloop_core::{Card, KeyResolver, PoolResolver, stable_key};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaitKind {
    Sensory,
    #[default]
    Action,
    Environment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodBait {
    pub id: String,
    pub title: String,
    pub minutes: u32,
    #[serde(default)]
    pub kind: BaitKind,
    /// Moods this bait suits.
    pub moods: Vec<String>,
}

impl MoodBait {
    pub fn new(id: &str, title: &str, minutes: u32, kind: BaitKind, moods: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            minutes,
            kind,
            moods: moods.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// The built-in catalogue.
    pub fn builtin() -> Vec<MoodBait> {
        use BaitKind::*;
        vec![
            Self::new("le-1", "Drink a glass of water and stretch your neck", 5, Action, &["low-energy"]),
            Self::new("le-2", "Open a window and wash your face", 5, Environment, &["low-energy"]),
            Self::new("le-3", "Stand in the sunlight and breathe slowly", 5, Sensory, &["low-energy"]),
            Self::new("an-1", "Three rounds of 4-7-8 breathing", 5, Sensory, &["anxious"]),
            Self::new("an-2", "Write down three worries and one next step each", 10, Action, &["anxious"]),
            Self::new("an-3", "5-4-3-2-1 senses grounding", 5, Sensory, &["anxious"]),
            Self::new("ov-1", "Split the current task into three steps and circle the first", 5, Action, &["overwhelmed"]),
            Self::new("ov-2", "Keep one tab open and minimise the rest", 5, Environment, &["overwhelmed"]),
            Self::new("di-1", "Ten minutes of do-not-disturb with the phone away", 10, Environment, &["distracted"]),
            Self::new("di-2", "Write three next steps and do the first", 5, Action, &["distracted"]),
            Self::new("lm-1", "Listen to one song you love", 5, Sensory, &["low-mood"]),
            Self::new("lm-2", "Text a friend something you are grateful for", 5, Action, &["low-mood"]),
            Self::new("gd-1", "Start the task you have been putting off for ten minutes", 10, Action, &["good"]),
            Self::new("gd-2", "Tidy one shelf while the energy lasts", 10, Environment, &["good"]),
        ]
    }

    fn normalized(mut self, keys: &dyn KeyResolver) -> Option<Self> {
        self.title = self.title.trim().to_string();
        let mut seen = HashSet::new();
        self.moods = self
            .moods
            .iter()
            .map(|mood| mood.trim())
            .filter(|mood| !mood.is_empty())
            .map(|mood| keys.resolve(mood))
            .filter(|mood| !mood.is_empty() && seen.insert(mood.clone()))
            .collect();
        (!self.title.is_empty() && !self.moods.is_empty()).then_some(self)
    }
}

impl Card for MoodBait {
    fn title(&self) -> &str {
        &self.title
    }

    fn labels(&self) -> Vec<&str> {
        self.moods.iter().map(String::as_str).collect()
    }
}

/// Built-in plus user baits, filtered by mood.
pub struct MoodBaitPool {
    keys: Arc<dyn KeyResolver>,
    system: Vec<MoodBait>,
    merged: RwLock<Vec<MoodBait>>,
}

impl MoodBaitPool {
    pub fn new(system: Vec<MoodBait>) -> Self {
        Self::with_resolver(system, Arc::new(IdentityResolver))
    }

    /// Mood labels are resolved through `keys` when the pool is built.
    pub fn with_resolver(system: Vec<MoodBait>, keys: Arc<dyn KeyResolver>) -> Self {
        let pool = Self {
            keys,
            system,
            merged: RwLock::new(Vec::new()),
        };
        pool.set_user_baits(Vec::new());
        pool
    }

    pub fn builtin() -> Self {
        Self::new(MoodBait::builtin())
    }

    /// Replaces the user's baits and rebuilds the pool.
    ///
    /// Baits without a title or without any mood are dropped.
    pub fn set_user_baits(&self, user: Vec<MoodBait>) {
        let keys = self.keys.as_ref();
        let mut seen = HashSet::new();
        let merged: Vec<MoodBait> = user
            .into_iter()
            .chain(self.system.iter().cloned())
            .filter_map(|bait| bait.normalized(keys))
            .filter(|bait| seen.insert(stable_key(bait, keys)))
            .collect();

        tracing::debug!(size = merged.len(), "Bait pool rebuilt");
        *self.merged.write().unwrap_or_else(PoisonError::into_inner) = merged;
    }

    /// Every bait currently in the pool.
    pub fn baits(&self) -> Vec<MoodBait> {
        self.merged
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.merged.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PoolResolver<MoodBait> for MoodBaitPool {
    /// Baits for `mood`, or every bait when none matches.
    fn resolve(&self, mood: &str) -> Vec<MoodBait> {
        let all = self.baits();
        if mood.is_empty() {
            return all;
        }
        let matching: Vec<MoodBait> = all
            .iter()
            .filter(|bait| bait.moods.iter().any(|m| m == mood))
            .cloned()
            .collect();
        if matching.is_empty() { all } else { matching }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardloop_core::AliasMap;

    #[test]
    fn test_filters_by_mood() {
        let pool = MoodBaitPool::builtin();
        let anxious = pool.resolve("anxious");
        assert_eq!(anxious.len(), 3);
        assert!(anxious.iter().all(|b| b.moods == vec!["anxious"]));
    }

    #[test]
    fn test_unknown_mood_falls_back_to_all() {
        let pool = MoodBaitPool::builtin();
        assert_eq!(pool.resolve("sleepy").len(), pool.len());
        assert_eq!(pool.resolve("").len(), pool.len());
    }

    #[test]
    fn test_user_bait_shadows_builtin() {
        let system = vec![MoodBait::new("s1", "Walk", 5, BaitKind::Action, &["good"])];
        let pool = MoodBaitPool::new(system);
        pool.set_user_baits(vec![MoodBait::new("u1", " Walk ", 10, BaitKind::Action, &["good", "good"])]);

        let baits = pool.baits();
        assert_eq!(baits.len(), 1);
        assert_eq!(baits[0].id, "u1");
        assert_eq!(baits[0].moods, vec!["good"]);
    }

    #[test]
    fn test_invalid_user_baits_dropped() {
        let pool = MoodBaitPool::new(Vec::new());
        pool.set_user_baits(vec![
            MoodBait::new("u1", "", 5, BaitKind::Action, &["good"]),
            MoodBait::new("u2", "Nap", 10, BaitKind::Sensory, &[" "]),
            MoodBait::new("u3", "Stretch", 5, BaitKind::Action, &["good"]),
        ]);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_moods_resolved_through_aliases() {
        let mut aliases = AliasMap::new();
        aliases.rename("tired", "low-energy");
        let pool = MoodBaitPool::with_resolver(Vec::new(), Arc::new(aliases));
        pool.set_user_baits(vec![MoodBait::new("u1", "Nap", 10, BaitKind::Sensory, &["tired"])]);

        assert_eq!(pool.resolve("low-energy")[0].moods, vec!["low-energy"]);
    }

    #[test]
    fn test_bait_kind_serialization() {
        let bait = MoodBait::new("x", "Tea", 5, BaitKind::Sensory, &["good"]);
        let json = serde_json::to_value(&bait).unwrap();
        assert_eq!(json["kind"], "sensory");
    }
}
