//! Session domain model.

use super::policy::SessionPolicy;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    #[default]
    Idle,
    Drawn,
    Accepted,
    Completed,
    Abandoned,
}

impl SessionState {
    /// `DRAWN` or `ACCEPTED`: a card is in play.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Drawn | SessionState::Accepted)
    }

    /// States a new draw may start from.
    pub fn is_drawable(self) -> bool {
        matches!(
            self,
            SessionState::Idle | SessionState::Completed | SessionState::Abandoned
        )
    }
}

/// One draw cycle.
///
/// `current` is present exactly while the state is active. The engine keeps
/// that true; a snapshot read back from storage that breaks it is discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session<I> {
    /// Fresh on every draw, `None` while idle.
    pub id: Option<String>,
    pub state: SessionState,
    /// Category the pool was filtered by at draw time. Empty means unfiltered.
    #[serde(default)]
    pub selected_category_at_draw: String,
    pub current: Option<I>,
    /// Stable keys shown in this session, in order, without duplicates.
    #[serde(default)]
    pub drawn_keys: Vec<String>,
    pub reroll_cost_token: u32,
    pub exit_cost_token: u32,
    #[serde(default)]
    pub spent_tokens: u32,
    /// Rerolls made in this session, as opposed to the cross-session run.
    #[serde(default)]
    pub reroll_used: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl<I> Session<I> {
    /// An empty session with costs taken from `policy`.
    pub fn idle(policy: &SessionPolicy) -> Self {
        Self {
            id: None,
            state: SessionState::Idle,
            selected_category_at_draw: String::new(),
            current: None,
            drawn_keys: Vec::new(),
            reroll_cost_token: policy.reroll_cost_token,
            exit_cost_token: policy.exit_cost_token,
            spent_tokens: 0,
            reroll_used: 0,
            accepted_at: None,
            completed_at: None,
        }
    }

    /// A card is in play.
    pub fn has_active_card(&self) -> bool {
        self.current.is_some() && self.state.is_active()
    }

    /// Whether `current` and `state` agree with each other.
    pub fn is_consistent(&self) -> bool {
        self.current.is_some() == self.state.is_active()
    }

    pub(crate) fn remember_key(&mut self, key: String) {
        if !self.drawn_keys.contains(&key) {
            self.drawn_keys.push(key);
        }
    }
}
