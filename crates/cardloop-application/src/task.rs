//! Task cards.
//!
//! Built-in cards carry a domain (`study`, `clean`, ...). A task type maps to
//! a set of domains; its pool is the built-in cards of those domains, minus
//! the ones hidden for that type, plus the user's cards tagged with it.

use cardloop_core::{Card, PoolResolver};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    pub id: u32,
    pub title: String,
    pub domain: String,
    pub minutes: u32,
    /// Task type of a user card. Built-in cards have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
}

impl TaskCard {
    pub fn new(id: u32, title: &str, domain: &str, minutes: u32) -> Self {
        Self {
            id,
            title: title.to_string(),
            domain: domain.to_string(),
            minutes,
            type_tag: None,
        }
    }

    pub fn tagged(mut self, type_tag: &str) -> Self {
        self.type_tag = Some(type_tag.to_string());
        self
    }

    /// The built-in catalogue.
    pub fn builtin() -> Vec<TaskCard> {
        vec![
            Self::new(101, "Memorize 20 words or review one flashcard set", "study", 10),
            Self::new(102, "Read three foreign-language paragraphs aloud", "study", 10),
            Self::new(103, "Watch a short grammar video", "study", 5),
            Self::new(201, "Clear one corner of the desk", "clean", 5),
            Self::new(202, "Empty the bin and wipe the table", "clean", 5),
            Self::new(203, "Fold one basket of laundry", "clean", 10),
            Self::new(301, "Write three lines about today", "write", 5),
            Self::new(302, "List three things that went well", "write", 5),
            Self::new(401, "Ten squats and a shoulder stretch", "move", 5),
            Self::new(402, "A ten minute walk around the block", "move", 10),
        ]
    }

    /// Default task type to domain table.
    pub fn default_type_domains() -> BTreeMap<String, Vec<String>> {
        [
            ("Foreign Language Study", "study"),
            ("Environment Tidy-Up", "clean"),
            ("Journal Writing", "write"),
            ("Light Exercise", "move"),
        ]
        .into_iter()
        .map(|(task_type, domain)| (task_type.to_string(), vec![domain.to_string()]))
        .collect()
    }
}

impl Card for TaskCard {
    fn title(&self) -> &str {
        &self.title
    }

    fn labels(&self) -> Vec<&str> {
        let mut labels = vec![self.domain.as_str()];
        if let Some(tag) = self.type_tag.as_deref() {
            labels.push(tag);
        }
        labels
    }
}

#[derive(Debug, Default)]
struct Catalog {
    builtin: Vec<TaskCard>,
    type_domains: BTreeMap<String, Vec<String>>,
    hidden: BTreeMap<String, BTreeSet<u32>>,
    user: Vec<TaskCard>,
}

/// Built-in and user task cards, grouped by task type.
#[derive(Debug, Default)]
pub struct TaskCardPool {
    catalog: RwLock<Catalog>,
}

impl TaskCardPool {
    pub fn new(builtin: Vec<TaskCard>, type_domains: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            catalog: RwLock::new(Catalog {
                builtin,
                type_domains,
                ..Catalog::default()
            }),
        }
    }

    pub fn builtin() -> Self {
        Self::new(TaskCard::builtin(), TaskCard::default_type_domains())
    }

    /// Task types that have a domain mapping.
    pub fn task_types(&self) -> Vec<String> {
        self.read().type_domains.keys().cloned().collect()
    }

    /// Sets the domains whose built-in cards belong to `task_type`.
    pub fn map_type(&self, task_type: &str, domains: Vec<String>) {
        self.write()
            .type_domains
            .insert(task_type.trim().to_string(), domains);
    }

    /// Hides a built-in card from one task type.
    pub fn hide(&self, task_type: &str, card_id: u32) {
        self.write()
            .hidden
            .entry(task_type.trim().to_string())
            .or_default()
            .insert(card_id);
    }

    pub fn unhide(&self, task_type: &str, card_id: u32) {
        let mut catalog = self.write();
        if let Some(hidden) = catalog.hidden.get_mut(task_type.trim()) {
            hidden.remove(&card_id);
        }
    }

    /// Adds a user card.
    ///
    /// Cards without a type tag or title are rejected, and so is a card that
    /// reuses an existing id or would share its stable key (same title,
    /// domain and tag) with another user card. Sessions tell cards apart by
    /// that key, so a duplicate could never be rerolled to.
    pub fn add_user_task(&self, card: TaskCard) -> bool {
        let has_tag = card
            .type_tag
            .as_deref()
            .is_some_and(|tag| !tag.trim().is_empty());
        if !has_tag || card.title.trim().is_empty() {
            return false;
        }
        let mut catalog = self.write();
        let clash = catalog.user.iter().any(|other| {
            other.id == card.id
                || (other.title == card.title
                    && other.domain == card.domain
                    && other.type_tag == card.type_tag)
        });
        if clash {
            return false;
        }
        catalog.user.push(card);
        true
    }

    pub fn remove_user_task(&self, card_id: u32) -> bool {
        let mut catalog = self.write();
        let before = catalog.user.len();
        catalog.user.retain(|card| card.id != card_id);
        catalog.user.len() != before
    }

    pub fn user_tasks(&self) -> Vec<TaskCard> {
        self.read().user.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PoolResolver<TaskCard> for TaskCardPool {
    fn resolve(&self, task_type: &str) -> Vec<TaskCard> {
        let catalog = self.read();
        if task_type.is_empty() {
            return catalog
                .builtin
                .iter()
                .chain(catalog.user.iter())
                .cloned()
                .collect();
        }

        let domains = catalog
            .type_domains
            .get(task_type)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let hidden = catalog.hidden.get(task_type);
        let base = catalog.builtin.iter().filter(|card| {
            domains.contains(&card.domain) && !hidden.is_some_and(|ids| ids.contains(&card.id))
        });
        let user = catalog
            .user
            .iter()
            .filter(|card| card.type_tag.as_deref() == Some(task_type));

        base.chain(user).cloned().collect()
    }
}
