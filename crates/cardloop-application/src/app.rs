//! Application facade.
//!
//! One token ledger shared by two engines, each in its own storage
//! namespace:
//!
//! ```text
//! wallet:reward_tokens_v1
//! bait:{active_session_v1, reroll_run_v1, exit_debt_v1, stats_v1, selected_category_v1}
//! task:{active_session_v1, reroll_run_v1, exit_debt_v1, stats_v1, selected_category_v1}
//! ```

use crate::exit_guard::{ExitBilling, ExitGuard};
use crate::mood::{MoodBait, MoodBaitPool};
use crate::task::{TaskCard, TaskCardPool};
use anyhow::{Context, Result};
use cardloop_core::clock::{Clock, SystemClock};
use cardloop_core::pool::IdentityResolver;
use cardloop_core::tracking::DebtSettlement;
use cardloop_core::wallet::TokenWallet;
use cardloop_core::{KeyResolver, KeyValueStore, MemoryStore, SessionEngine, Storage, TokenLedger};
use cardloop_infrastructure::{AppConfig, DirStore};
use std::sync::Arc;

const BAIT_ACTIVITY: &str = "bait";
const TASK_ACTIVITY: &str = "task";
const WALLET_NAMESPACE: &str = "wallet";

/// The pools and category resolver the engines are built with.
#[derive(Clone)]
pub struct ActivityPools {
    pub baits: Arc<MoodBaitPool>,
    pub tasks: Arc<TaskCardPool>,
    pub keys: Arc<dyn KeyResolver>,
}

impl ActivityPools {
    pub fn new(baits: Arc<MoodBaitPool>, tasks: Arc<TaskCardPool>) -> Self {
        Self {
            baits,
            tasks,
            keys: Arc::new(IdentityResolver),
        }
    }

    /// The built-in catalogues.
    pub fn builtin() -> Self {
        Self::new(
            Arc::new(MoodBaitPool::builtin()),
            Arc::new(TaskCardPool::builtin()),
        )
    }

    pub fn with_key_resolver(mut self, keys: Arc<dyn KeyResolver>) -> Self {
        self.keys = keys;
        self
    }
}

impl Default for ActivityPools {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Mood-bait and task-card engines over one wallet.
pub struct CardloopApp {
    ledger: Arc<TokenLedger>,
    baits: SessionEngine<MoodBait>,
    tasks: SessionEngine<TaskCard>,
    pools: ActivityPools,
}

impl CardloopApp {
    /// Opens the app on the directory store configured by `config`.
    ///
    /// Outstanding exit debt is settled as far as the wallet allows.
    pub fn open(config: &AppConfig, pools: ActivityPools) -> Result<Self> {
        let dir = config
            .store_dir()
            .context("Failed to resolve the data directory")?;
        let store = DirStore::open(&dir)
            .with_context(|| format!("Failed to open store at {}", dir.display()))?;

        let mut app = Self::with_backend(Arc::new(store), pools, Arc::new(SystemClock));
        let settlement = app.settle_all_debts();
        tracing::info!(
            store = %dir.display(),
            balance = app.balance(),
            debt_paid = settlement.paid,
            debt_left = settlement.left_debt,
            "Cardloop opened"
        );
        Ok(app)
    }

    /// Everything in memory; nothing survives the process.
    pub fn in_memory(pools: ActivityPools) -> Self {
        Self::with_backend(Arc::new(MemoryStore::new()), pools, Arc::new(SystemClock))
    }

    /// Builds the app on an arbitrary backend and clock.
    pub fn with_backend(
        backend: Arc<dyn KeyValueStore>,
        pools: ActivityPools,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let storage = Storage::new(backend);
        let ledger = Arc::new(TokenLedger::new(storage.scoped(WALLET_NAMESPACE)));

        let baits = SessionEngine::<MoodBait>::builder(
            BAIT_ACTIVITY,
            storage.clone(),
            ledger.clone(),
            pools.baits.clone(),
        )
        .key_resolver(pools.keys.clone())
        .clock(clock.clone())
        .build();

        let tasks = SessionEngine::<TaskCard>::builder(
            TASK_ACTIVITY,
            storage,
            ledger.clone(),
            pools.tasks.clone(),
        )
        .key_resolver(pools.keys.clone())
        .clock(clock)
        .build();

        Self {
            ledger,
            baits,
            tasks,
            pools,
        }
    }

    pub fn ledger(&self) -> &Arc<TokenLedger> {
        &self.ledger
    }

    pub fn balance(&self) -> u32 {
        self.ledger.balance()
    }

    pub fn earn(&self, amount: u32) {
        self.ledger.earn(amount);
    }

    pub fn pools(&self) -> &ActivityPools {
        &self.pools
    }

    pub fn baits(&self) -> &SessionEngine<MoodBait> {
        &self.baits
    }

    pub fn baits_mut(&mut self) -> &mut SessionEngine<MoodBait> {
        &mut self.baits
    }

    pub fn tasks(&self) -> &SessionEngine<TaskCard> {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut SessionEngine<TaskCard> {
        &mut self.tasks
    }

    /// Pays exit debt of both activities, baits first.
    ///
    /// Returns the combined result.
    pub fn settle_all_debts(&mut self) -> DebtSettlement {
        let baits = self.baits.settle_exit_debt();
        let tasks = self.tasks.settle_exit_debt();
        DebtSettlement {
            paid: baits.paid + tasks.paid,
            left_debt: baits.left_debt + tasks.left_debt,
        }
    }

    /// Re-syncs both engines with their selected categories.
    pub fn rehydrate_all(&mut self) {
        self.baits.rehydrate_active();
        self.tasks.rehydrate_active();
    }

    pub fn leave_baits(&mut self, forced: bool) -> ExitBilling {
        ExitGuard::leave(&mut self.baits, forced)
    }

    pub fn leave_tasks(&mut self, forced: bool) -> ExitBilling {
        ExitGuard::leave(&mut self.tasks, forced)
    }
}
