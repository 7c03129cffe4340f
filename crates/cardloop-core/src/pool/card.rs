//! Card contract and stable keys.

use super::alias::KeyResolver;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;

/// An item that can be drawn.
///
/// Items are snapshotted into durable storage, so they must round-trip
/// through serde.
pub trait Card: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human-readable title.
    fn title(&self) -> &str;

    /// Category labels this item belongs to, before alias resolution.
    fn labels(&self) -> Vec<&str>;
}

/// Supplies the candidates for a category.
///
/// Called on every draw and reroll; an empty result is a valid answer.
pub trait PoolResolver<I: Card>: Send + Sync {
    fn resolve(&self, category: &str) -> Vec<I>;
}

/// A fixed list offered regardless of category.
#[derive(Debug, Clone, Default)]
pub struct StaticPool<I> {
    items: Vec<I>,
}

impl<I> StaticPool<I> {
    pub fn new(items: Vec<I>) -> Self {
        Self { items }
    }
}

impl<I: Card> PoolResolver<I> for StaticPool<I> {
    fn resolve(&self, _category: &str) -> Vec<I> {
        self.items.clone()
    }
}

/// Derives the key that identifies `item` across draws and restarts.
///
/// The key is the title followed by the item's labels, each resolved through
/// `resolver`, with empties dropped, deduplicated and sorted:
/// `"<title>__<label>,<label>"`. Renaming a category therefore does not
/// change the key of the items filed under it.
pub fn stable_key<I: Card>(item: &I, resolver: &dyn KeyResolver) -> String {
    let labels: BTreeSet<String> = item
        .labels()
        .into_iter()
        .map(|label| resolver.resolve(label))
        .filter(|label| !label.is_empty())
        .collect();
    let labels: Vec<String> = labels.into_iter().collect();
    format!("{}__{}", item.title(), labels.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{AliasMap, IdentityResolver};
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Bait {
        title: String,
        moods: Vec<String>,
    }

    impl Card for Bait {
        fn title(&self) -> &str {
            &self.title
        }
        fn labels(&self) -> Vec<&str> {
            self.moods.iter().map(String::as_str).collect()
        }
    }

    fn bait(title: &str, moods: &[&str]) -> Bait {
        Bait {
            title: title.to_string(),
            moods: moods.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_key_sorts_and_dedups_labels() {
        let key = stable_key(&bait("Breathe", &["calm", "anxious", "calm", ""]), &IdentityResolver);
        assert_eq!(key, "Breathe__anxious,calm");
    }

    #[test]
    fn test_key_without_labels() {
        assert_eq!(stable_key(&bait("Walk", &[]), &IdentityResolver), "Walk__");
    }

    #[test]
    fn test_key_collapses_aliases() {
        let mut aliases = AliasMap::new();
        aliases.rename("sleepy", "low-energy");

        let old = stable_key(&bait("Stretch", &["sleepy"]), &aliases);
        let new = stable_key(&bait("Stretch", &["low-energy"]), &aliases);
        assert_eq!(old, new);
    }

    #[test]
    fn test_closure_resolver() {
        let upper = |k: &str| k.to_uppercase();
        assert_eq!(stable_key(&bait("Tea", &["calm"]), &upper), "Tea__CALM");
    }

    #[test]
    fn test_static_pool_ignores_category() {
        let pool = StaticPool::new(vec![bait("A", &[]), bait("B", &[])]);
        assert_eq!(pool.resolve("anything").len(), 2);
        assert_eq!(pool.resolve("").len(), 2);
    }
}
