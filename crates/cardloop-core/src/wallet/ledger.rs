//! Token ledger.
//!
//! A non-negative balance that pays for rerolls and exits. Several engines
//! hold the same ledger, so every debit is a single check-and-write under
//! one lock: callers must not trust a balance they read earlier.

use crate::storage::Storage;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

const BALANCE_KEY: &str = "reward_tokens_v1";

/// Ledger failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient tokens: needed {needed}, available {available}")]
    Insufficient { needed: u32, available: u32 },
}

/// The token capability engines depend on.
pub trait TokenWallet: Send + Sync {
    /// Current balance.
    fn balance(&self) -> u32;

    /// Debits `amount`, or fails leaving the balance untouched.
    fn spend(&self, amount: u32) -> Result<(), LedgerError>;

    /// Credits `amount`. Zero is ignored.
    fn earn(&self, amount: u32);
}

/// Persisted token balance.
///
/// Every mutation is written through to storage before returning.
#[derive(Debug)]
pub struct TokenLedger {
    balance: Mutex<u32>,
    storage: Storage,
}

impl TokenLedger {
    /// Creates a ledger over `storage`, loading the persisted balance.
    ///
    /// A missing or corrupt balance reads as zero.
    pub fn new(storage: Storage) -> Self {
        let balance = storage.get(BALANCE_KEY, 0u32);
        Self {
            balance: Mutex::new(balance),
            storage,
        }
    }

    /// Whether at least `amount` tokens are available.
    pub fn has(&self, amount: u32) -> bool {
        self.balance() >= amount
    }

    /// Overwrites the balance.
    pub fn set(&self, amount: u32) {
        let mut balance = self.lock();
        *balance = amount;
        self.storage.set(BALANCE_KEY, &*balance);
    }

    /// Zeroes the balance.
    pub fn reset(&self) {
        self.set(0);
    }

    /// Re-reads the persisted balance, keeping the in-memory one if storage
    /// has nothing usable.
    pub fn reload(&self) {
        let mut balance = self.lock();
        if let Some(stored) = self.storage.get_opt::<u32>(BALANCE_KEY) {
            *balance = stored;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, u32> {
        self.balance.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenWallet for TokenLedger {
    fn balance(&self) -> u32 {
        *self.lock()
    }

    fn spend(&self, amount: u32) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        let mut balance = self.lock();
        if *balance < amount {
            return Err(LedgerError::Insufficient {
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        self.storage.set(BALANCE_KEY, &*balance);
        tracing::debug!(amount, balance_after = *balance, "tokens spent");
        Ok(())
    }

    fn earn(&self, amount: u32) {
        if amount == 0 {
            return;
        }
        let mut balance = self.lock();
        *balance = balance.saturating_add(amount);
        self.storage.set(BALANCE_KEY, &*balance);
        tracing::debug!(amount, balance_after = *balance, "tokens earned");
    }
}
