//! Navigation guard billing.
//!
//! Leaving an activity with a card in play costs the session's exit cost.
//! A voluntary exit that cannot be paid is refused; a forced one (app killed,
//! system back) is let through and recorded as exit debt instead.

use cardloop_core::{Card, SessionEngine, SessionError};
use serde::Serialize;

/// What leaving cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExitBilling {
    /// No card in play.
    NotNeeded,
    /// The exit cost was paid.
    Charged { cost: u32 },
    /// Could not pay; the charge was recorded as debt.
    Deferred { exit_debt: u32 },
    /// Could not pay and the exit was voluntary.
    Refused { reason: SessionError },
}

impl ExitBilling {
    /// Whether the caller may navigate away.
    pub fn allows_leaving(&self) -> bool {
        !matches!(self, ExitBilling::Refused { .. })
    }
}

pub struct ExitGuard;

impl ExitGuard {
    /// Bills leaving `engine`'s activity. The session itself is not changed.
    pub fn leave<I: Card>(engine: &mut SessionEngine<I>, forced: bool) -> ExitBilling {
        if !engine.should_charge_on_exit() {
            return ExitBilling::NotNeeded;
        }

        let cost = engine.exit_cost();
        let billing = match engine.charge_exit() {
            Ok(()) => ExitBilling::Charged { cost },
            Err(SessionError::InsufficientTokens | SessionError::TokenSpendFailed) if forced => {
                match engine.record_exit_debt() {
                    Ok(exit_debt) => ExitBilling::Deferred { exit_debt },
                    Err(reason) => ExitBilling::Refused { reason },
                }
            }
            Err(reason) => ExitBilling::Refused { reason },
        };

        tracing::debug!(activity = engine.activity(), forced, ?billing, "Exit billed");
        billing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskCard, TaskCardPool};
    use cardloop_core::wallet::TokenWallet;
    use cardloop_core::{MemoryStore, Storage, TokenLedger};
    use std::sync::Arc;

    fn engine_with_balance(balance: u32) -> (SessionEngine<TaskCard>, Arc<TokenLedger>) {
        let storage = Storage::new(Arc::new(MemoryStore::new()));
        let ledger = Arc::new(TokenLedger::new(storage.scoped("wallet")));
        ledger.set(balance);
        let engine = SessionEngine::<TaskCard>::builder(
            "task",
            storage,
            ledger.clone(),
            Arc::new(TaskCardPool::builtin()),
        )
        .seed(11)
        .build();
        (engine, ledger)
    }

    #[test]
    fn test_nothing_to_bill_when_idle() {
        let (mut engine, _) = engine_with_balance(0);
        assert_eq!(ExitGuard::leave(&mut engine, false), ExitBilling::NotNeeded);
    }

    #[test]
    fn test_charges_when_affordable() {
        let (mut engine, ledger) = engine_with_balance(2);
        engine.draw("").unwrap();

        let billing = ExitGuard::leave(&mut engine, false);
        assert_eq!(billing, ExitBilling::Charged { cost: 1 });
        assert!(billing.allows_leaving());
        assert_eq!(ledger.balance(), 1);
        assert_eq!(engine.exit_debt(), 0);
    }

    #[test]
    fn test_voluntary_exit_refused_without_tokens() {
        let (mut engine, _) = engine_with_balance(0);
        engine.draw("").unwrap();

        let billing = ExitGuard::leave(&mut engine, false);
        assert_eq!(
            billing,
            ExitBilling::Refused {
                reason: SessionError::InsufficientTokens
            }
        );
        assert!(!billing.allows_leaving());
        assert_eq!(engine.exit_debt(), 0);
    }

    #[test]
    fn test_forced_exit_defers_to_debt() {
        let (mut engine, _) = engine_with_balance(0);
        engine.draw("").unwrap();
        engine.accept().unwrap();

        assert_eq!(
            ExitGuard::leave(&mut engine, true),
            ExitBilling::Deferred { exit_debt: 1 }
        );
        assert_eq!(engine.exit_debt(), 1);
    }

    #[test]
    fn test_billing_serializes_with_reason() {
        let billing = ExitBilling::Refused {
            reason: SessionError::InsufficientTokens,
        };
        let json = serde_json::to_value(billing).unwrap();
        assert_eq!(json["outcome"], "refused");
        assert_eq!(json["reason"], "insufficient_tokens");
    }
}
