//! Token wallet domain module.
//!
//! - `ledger`: the [`TokenWallet`] capability and its persisted implementation
//!   [`TokenLedger`], shared by every activity engine.

mod ledger;

pub use ledger::{LedgerError, TokenLedger, TokenWallet};
