//! Transition failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a session transition was refused.
///
/// Every variant is recoverable. A refused transition leaves the engine as it
/// was, except [`SessionError::EmptyPool`] which returns the engine to idle.
/// Serializes as its [`reason`](SessionError::reason) string.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionError {
    #[error("a session is already active")]
    ActiveSession,

    #[error("session is not in the drawn state")]
    NotInDrawn,

    #[error("no drawn card to accept")]
    NoTaskToAccept,

    #[error("card has not been accepted")]
    NotAccepted,

    #[error("session is already completed")]
    AlreadyCompleted,

    #[error("no active session to abandon")]
    NothingToAbandon,

    #[error("no active card to charge for")]
    NoNeedToCharge,

    #[error("no active card to record debt for")]
    NoNeedToDebt,

    #[error("reroll budget of this run is used up")]
    RerollExhausted,

    #[error("no other card left to offer")]
    PoolDepleted,

    #[error("category has no cards")]
    EmptyPool,

    #[error("not enough tokens")]
    InsufficientTokens,

    #[error("token ledger rejected the spend")]
    TokenSpendFailed,
}

impl SessionError {
    /// Stable machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            SessionError::ActiveSession => "active_session",
            SessionError::NotInDrawn => "not_in_drawn",
            SessionError::NoTaskToAccept => "no_task_to_accept",
            SessionError::NotAccepted => "not_accepted",
            SessionError::AlreadyCompleted => "already_completed",
            SessionError::NothingToAbandon => "nothing_to_abandon",
            SessionError::NoNeedToCharge => "no_need_to_charge",
            SessionError::NoNeedToDebt => "no_need_to_debt",
            SessionError::RerollExhausted => "reroll_exhausted",
            SessionError::PoolDepleted => "pool_depleted",
            SessionError::EmptyPool => "empty_pool",
            SessionError::InsufficientTokens => "insufficient_tokens",
            SessionError::TokenSpendFailed => "token_spend_failed",
        }
    }
}

/// Result of a session transition.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_form_matches_reason() {
        let all = [
            SessionError::ActiveSession,
            SessionError::NotInDrawn,
            SessionError::NoTaskToAccept,
            SessionError::NotAccepted,
            SessionError::AlreadyCompleted,
            SessionError::NothingToAbandon,
            SessionError::NoNeedToCharge,
            SessionError::NoNeedToDebt,
            SessionError::RerollExhausted,
            SessionError::PoolDepleted,
            SessionError::EmptyPool,
            SessionError::InsufficientTokens,
            SessionError::TokenSpendFailed,
        ];
        for err in all {
            let json = serde_json::to_string(&err).unwrap();
            assert_eq!(json, format!("\"{}\"", err.reason()));
        }
    }

    #[test]
    fn test_display_is_human_readable() {
        assert_eq!(SessionError::EmptyPool.to_string(), "category has no cards");
    }
}
