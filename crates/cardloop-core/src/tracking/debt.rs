//! Exit debt ledger.
//!
//! Counts exits that should have been charged but were not (forced quit,
//! empty wallet). The debt is paid back later, one unit per exit cost,
//! whenever the wallet allows.

use crate::storage::Storage;
use crate::wallet::TokenWallet;
use serde::Serialize;

const DEBT_KEY: &str = "exit_debt_v1";

/// Result of a settlement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSettlement {
    /// Units paid during this attempt.
    pub paid: u32,
    /// Units still owed.
    pub left_debt: u32,
}

impl DebtSettlement {
    pub fn is_settled(&self) -> bool {
        self.left_debt == 0
    }
}

/// Owns and persists one activity's exit debt.
#[derive(Debug)]
pub struct ExitDebtLedger {
    debt: u32,
    storage: Storage,
}

impl ExitDebtLedger {
    pub fn new(storage: Storage) -> Self {
        let debt = storage.get(DEBT_KEY, 0u32);
        Self { debt, storage }
    }

    pub fn debt(&self) -> u32 {
        self.debt
    }

    /// Adds one unit of debt. Returns the new total.
    pub fn increment(&mut self) -> u32 {
        self.debt = self.debt.saturating_add(1);
        self.persist();
        self.debt
    }

    /// Pays debt down one unit at a time while the wallet can cover `unit_cost`.
    pub fn settle(&mut self, wallet: &dyn TokenWallet, unit_cost: u32) -> DebtSettlement {
        let mut paid = 0;
        while self.debt > 0 {
            if wallet.balance() < unit_cost {
                break;
            }
            if wallet.spend(unit_cost).is_err() {
                break;
            }
            self.debt -= 1;
            paid += 1;
        }
        if paid > 0 {
            self.persist();
        }
        DebtSettlement {
            paid,
            left_debt: self.debt,
        }
    }

    fn persist(&self) {
        self.storage.set(DEBT_KEY, &self.debt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::wallet::TokenLedger;
    use std::sync::Arc;

    fn fixtures() -> (Arc<MemoryStore>, ExitDebtLedger, TokenLedger) {
        let backend = Arc::new(MemoryStore::new());
        let root = Storage::new(backend.clone());
        (
            backend,
            ExitDebtLedger::new(root.scoped("bait")),
            TokenLedger::new(root.scoped("wallet")),
        )
    }

    #[test]
    fn test_increment_persists() {
        let (backend, mut debt, _) = fixtures();
        debt.increment();
        debt.increment();
        assert_eq!(backend.read("bait:exit_debt_v1").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_partial_settlement() {
        let (_, mut debt, wallet) = fixtures();
        for _ in 0..3 {
            debt.increment();
        }
        wallet.set(2);

        let result = debt.settle(&wallet, 1);
        assert_eq!(result, DebtSettlement { paid: 2, left_debt: 1 });
        assert!(!result.is_settled());
        assert_eq!(wallet.balance(), 0);
        assert_eq!(debt.debt(), 1);
    }

    #[test]
    fn test_full_settlement_keeps_change() {
        let (_, mut debt, wallet) = fixtures();
        debt.increment();
        wallet.set(5);

        let result = debt.settle(&wallet, 1);
        assert!(result.is_settled());
        assert_eq!(wallet.balance(), 4);
    }

    #[test]
    fn test_no_debt_settles_trivially() {
        let (_, mut debt, wallet) = fixtures();
        let result = debt.settle(&wallet, 1);
        assert_eq!(result, DebtSettlement { paid: 0, left_debt: 0 });
    }

    #[test]
    fn test_corrupt_debt_reads_zero() {
        let (backend, _, _) = fixtures();
        backend.write("bait:exit_debt_v1", "\"lots\"").unwrap();
        let debt = ExitDebtLedger::new(Storage::new(backend).scoped("bait"));
        assert_eq!(debt.debt(), 0);
    }
}
