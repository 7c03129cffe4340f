//! Session lifecycle engine.
//!
//! One engine drives one activity. It owns the in-flight [`Session`], the
//! activity's reroll run, exit debt and daily stats, all persisted under the
//! activity's storage namespace. The token wallet is the only state shared
//! with other engines.

use super::error::{SessionError, SessionResult};
use super::model::{Session, SessionState};
use super::policy::SessionPolicy;
use crate::clock::{Clock, SystemClock};
use crate::pool::{Card, IdentityResolver, KeyResolver, PoolResolver, stable_key};
use crate::storage::Storage;
use crate::tracking::{
    DailyStatsCounter, DayStats, DebtSettlement, ExitDebtLedger, RerollRun, RerollRunTracker,
    StatField,
};
use crate::wallet::TokenWallet;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use uuid::Uuid;

const SESSION_KEY: &str = "active_session_v1";
const SELECTED_KEY: &str = "selected_category_v1";

/// Assembles a [`SessionEngine`].
///
/// Only the activity name, storage, wallet and pool are required. Everything
/// else defaults to production behaviour: no aliases, the system clock, the
/// default policy and an entropy-seeded RNG.
pub struct SessionEngineBuilder<I: Card> {
    activity: String,
    storage: Storage,
    wallet: Arc<dyn TokenWallet>,
    pool: Arc<dyn PoolResolver<I>>,
    keys: Arc<dyn KeyResolver>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
    rng: Option<StdRng>,
}

impl<I: Card> SessionEngineBuilder<I> {
    pub fn key_resolver(mut self, keys: Arc<dyn KeyResolver>) -> Self {
        self.keys = keys;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Seeds the RNG, making draws reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    /// Loads the activity's persisted state and returns an idle engine.
    ///
    /// An in-flight snapshot is not restored here; call
    /// [`SessionEngine::rehydrate_active`] on entry.
    pub fn build(self) -> SessionEngine<I> {
        let storage = self.storage.scoped(&self.activity);
        let run = RerollRunTracker::new(storage.clone(), self.policy.reroll_limit);
        let debt = ExitDebtLedger::new(storage.clone());
        let stats = DailyStatsCounter::new(storage.clone());
        let selected_category = storage
            .get_opt::<String>(SELECTED_KEY)
            .map(|category| category.trim().to_string())
            .unwrap_or_default();

        tracing::debug!(
            activity = %self.activity,
            selected_category = %selected_category,
            run_used = run.run().used,
            exit_debt = debt.debt(),
            "Session engine loaded"
        );

        SessionEngine {
            session: Session::idle(&self.policy),
            activity: self.activity,
            selected_category,
            run,
            debt,
            stats,
            storage,
            wallet: self.wallet,
            pool: self.pool,
            keys: self.keys,
            clock: self.clock,
            policy: self.policy,
            rng: self.rng.unwrap_or_else(StdRng::from_entropy),
        }
    }
}

/// Draw, reroll, accept and finish cycle of one activity.
///
/// Transitions return [`SessionResult`]; a refused transition changes
/// nothing. Storage failures never surface here: they are logged and the
/// in-memory state stays authoritative until the next successful write.
pub struct SessionEngine<I: Card> {
    activity: String,
    policy: SessionPolicy,
    session: Session<I>,
    selected_category: String,
    run: RerollRunTracker,
    debt: ExitDebtLedger,
    stats: DailyStatsCounter,
    storage: Storage,
    wallet: Arc<dyn TokenWallet>,
    pool: Arc<dyn PoolResolver<I>>,
    keys: Arc<dyn KeyResolver>,
    clock: Arc<dyn Clock>,
    rng: StdRng,
}

impl<I: Card> SessionEngine<I> {
    /// Starts building an engine for `activity`.
    ///
    /// `storage` is the root store; the engine scopes it to `activity`.
    pub fn builder(
        activity: impl Into<String>,
        storage: Storage,
        wallet: Arc<dyn TokenWallet>,
        pool: Arc<dyn PoolResolver<I>>,
    ) -> SessionEngineBuilder<I> {
        SessionEngineBuilder {
            activity: activity.into(),
            storage,
            wallet,
            pool,
            keys: Arc::new(IdentityResolver),
            clock: Arc::new(SystemClock),
            policy: SessionPolicy::default(),
            rng: None,
        }
    }

    // ---- getters ----

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn session(&self) -> &Session<I> {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn current(&self) -> Option<&I> {
        self.session.current.as_ref()
    }

    /// Stable key of the card in play.
    pub fn current_key(&self) -> Option<String> {
        self.session
            .current
            .as_ref()
            .map(|item| stable_key(item, self.keys.as_ref()))
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn run(&self) -> &RerollRun {
        self.run.run()
    }

    pub fn exit_debt(&self) -> u32 {
        self.debt.debt()
    }

    pub fn exit_cost(&self) -> u32 {
        self.session.exit_cost_token
    }

    /// Today's counters for this activity.
    pub fn stats_today(&self) -> DayStats {
        self.stats.day(&self.clock.local_date())
    }

    pub fn can_draw(&self) -> bool {
        self.session.state.is_drawable()
    }

    pub fn can_accept(&self) -> bool {
        self.session.state == SessionState::Drawn && self.session.current.is_some()
    }

    /// Rerolls are governed by the run, not by the session.
    pub fn can_reroll(&self) -> bool {
        self.session.state == SessionState::Drawn && self.run.has_budget()
    }

    pub fn can_finish(&self) -> bool {
        self.session.state == SessionState::Accepted
    }

    pub fn reroll_left(&self) -> u32 {
        self.run.left()
    }

    pub fn has_active_card(&self) -> bool {
        self.session.has_active_card()
    }

    /// Leaving now would cost [`exit_cost`](Self::exit_cost) tokens.
    pub fn should_charge_on_exit(&self) -> bool {
        self.session.has_active_card()
    }

    // ---- category ----

    /// Trims and alias-resolves a category key. Empty stays empty.
    pub fn normalize_category(&self, category: &str) -> String {
        let trimmed = category.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        self.keys.resolve(trimmed)
    }

    /// Changes the selected category and persists it.
    ///
    /// Does not touch the session; call
    /// [`rehydrate_active`](Self::rehydrate_active) afterwards to switch views.
    pub fn select_category(&mut self, category: &str) -> &str {
        let category = self.normalize_category(category);
        self.remember_selection(category);
        &self.selected_category
    }

    fn remember_selection(&mut self, category: String) {
        if self.selected_category != category {
            self.storage.set(SELECTED_KEY, &category);
            self.selected_category = category;
        }
    }

    // ---- transitions ----

    /// Draws from the selected category.
    pub fn draw_selected(&mut self) -> SessionResult<I> {
        let category = self.selected_category.clone();
        self.draw(&category)
    }

    /// Starts a new session with a random card from `category`.
    ///
    /// `category` also becomes the selected category. An empty pool returns
    /// the engine to idle.
    pub fn draw(&mut self, category: &str) -> SessionResult<I> {
        if !self.can_draw() {
            return Err(SessionError::ActiveSession);
        }

        let category = self.normalize_category(category);
        self.remember_selection(category.clone());

        let pool = self.pool.resolve(&category);
        let Some(item) = pool.choose(&mut self.rng).cloned() else {
            self.reset();
            tracing::debug!(activity = %self.activity, category = %category, "Draw refused: empty pool");
            return Err(SessionError::EmptyPool);
        };

        let now = self.clock.now_ms();
        if self.run.start_if_needed(now) {
            tracing::debug!(
                activity = %self.activity,
                limit = self.run.run().limit,
                "Reroll run opened"
            );
        }

        let key = stable_key(&item, self.keys.as_ref());
        let mut session = Session::idle(&self.policy);
        session.id = Some(Uuid::new_v4().to_string());
        session.state = SessionState::Drawn;
        session.selected_category_at_draw = category;
        session.current = Some(item.clone());
        session.drawn_keys = vec![key];
        self.session = session;

        self.bump(StatField::Draws, 1);
        self.persist_session();

        tracing::debug!(
            activity = %self.activity,
            session_id = ?self.session.id,
            category = %self.session.selected_category_at_draw,
            pool_size = pool.len(),
            "Card drawn"
        );
        Ok(item)
    }

    /// Locks in the drawn card.
    pub fn accept(&mut self) -> SessionResult<()> {
        if !self.can_accept() {
            return Err(SessionError::NoTaskToAccept);
        }
        self.session.state = SessionState::Accepted;
        let now = self.clock.now_ms();
        self.session.accepted_at.get_or_insert(now);
        self.persist_session();

        tracing::debug!(activity = %self.activity, session_id = ?self.session.id, "Card accepted");
        Ok(())
    }

    /// Replaces the drawn card with another one from the same category.
    ///
    /// Cards not yet shown in this session are preferred. Once all have been
    /// shown, any card other than the current one may come back.
    pub fn reroll(&mut self) -> SessionResult<I> {
        if self.session.state != SessionState::Drawn {
            return Err(SessionError::NotInDrawn);
        }
        let Some(current) = self.session.current.as_ref() else {
            return Err(SessionError::NotInDrawn);
        };
        if !self.run.has_budget() {
            return Err(SessionError::RerollExhausted);
        }

        let current_key = stable_key(current, self.keys.as_ref());
        let candidates: Vec<(String, I)> = self
            .pool
            .resolve(&self.session.selected_category_at_draw)
            .into_iter()
            .map(|item| (stable_key(&item, self.keys.as_ref()), item))
            .filter(|(key, _)| *key != current_key)
            .collect();
        if candidates.is_empty() {
            return Err(SessionError::PoolDepleted);
        }

        let cost = self.session.reroll_cost_token;
        if self.wallet.balance() < cost {
            return Err(SessionError::InsufficientTokens);
        }

        let unseen: Vec<&(String, I)> = candidates
            .iter()
            .filter(|(key, _)| !self.session.drawn_keys.contains(key))
            .collect();
        let picked = if unseen.is_empty() {
            candidates.choose(&mut self.rng)
        } else {
            unseen.choose(&mut self.rng).copied()
        };
        let Some((key, item)) = picked.cloned() else {
            return Err(SessionError::PoolDepleted);
        };

        if let Err(err) = self.wallet.spend(cost) {
            tracing::warn!(activity = %self.activity, error = %err, "Reroll spend rejected");
            return Err(SessionError::TokenSpendFailed);
        }

        self.session.spent_tokens = self.session.spent_tokens.saturating_add(cost);
        self.session.reroll_used = self.session.reroll_used.saturating_add(1);
        let used = self.run.consume(self.clock.now_ms());
        self.bump(StatField::Rerolls, 1);

        self.session.current = Some(item.clone());
        self.session.remember_key(key);
        self.persist_session();

        tracing::info!(
            event = "cards.reroll_used",
            activity = %self.activity,
            session_id = ?self.session.id,
            used,
            limit = self.run.run().limit,
            cost_per_use = cost,
            balance_after = self.wallet.balance(),
            drawn_count = self.session.drawn_keys.len(),
            at = self.clock.now_ms(),
            "Reroll used"
        );
        Ok(item)
    }

    /// Books the exit cost of leaving an active card.
    ///
    /// The state is left alone; whether to actually leave is the caller's call.
    pub fn charge_exit(&mut self) -> SessionResult<()> {
        if !self.session.has_active_card() {
            return Err(SessionError::NoNeedToCharge);
        }
        let cost = self.session.exit_cost_token;
        if self.wallet.balance() < cost {
            return Err(SessionError::InsufficientTokens);
        }
        if let Err(err) = self.wallet.spend(cost) {
            tracing::warn!(activity = %self.activity, error = %err, "Exit spend rejected");
            return Err(SessionError::TokenSpendFailed);
        }

        self.session.spent_tokens = self.session.spent_tokens.saturating_add(cost);
        self.bump(StatField::ExitsCharged, 1);
        self.persist_session();

        tracing::debug!(
            activity = %self.activity,
            session_id = ?self.session.id,
            cost,
            "Exit charged"
        );
        Ok(())
    }

    /// Records one unit of exit debt for an exit that could not be charged.
    ///
    /// Returns the total debt.
    pub fn record_exit_debt(&mut self) -> SessionResult<u32> {
        if !self.session.has_active_card() {
            return Err(SessionError::NoNeedToDebt);
        }
        let total = self.debt.increment();
        tracing::info!(activity = %self.activity, exit_debt = total, "Exit debt recorded");
        Ok(total)
    }

    /// Pays outstanding exit debt for as long as the wallet allows.
    pub fn settle_exit_debt(&mut self) -> DebtSettlement {
        let settlement = self
            .debt
            .settle(self.wallet.as_ref(), self.session.exit_cost_token);
        if settlement.paid > 0 {
            self.bump(StatField::ExitsCharged, settlement.paid);
            tracing::info!(
                activity = %self.activity,
                paid = settlement.paid,
                left_debt = settlement.left_debt,
                "Exit debt settled"
            );
        }
        settlement
    }

    /// Completes the accepted card and returns it.
    ///
    /// This is the only transition that closes the reroll run.
    pub fn finish(&mut self) -> SessionResult<I> {
        match self.session.state {
            SessionState::Completed => return Err(SessionError::AlreadyCompleted),
            SessionState::Accepted => {}
            _ => return Err(SessionError::NotAccepted),
        }
        let Some(item) = self.session.current.take() else {
            return Err(SessionError::NotAccepted);
        };

        self.session.state = SessionState::Completed;
        let now = self.clock.now_ms();
        self.session.completed_at.get_or_insert(now);
        self.bump(StatField::Finishes, 1);
        self.run.reset();
        self.session.drawn_keys.clear();
        self.session.selected_category_at_draw.clear();
        if !self.storage.remove(SESSION_KEY) {
            // A completed record is never restored, so it retires the snapshot.
            self.storage.set(SESSION_KEY, &self.session);
        }

        tracing::info!(
            event = "task.completed",
            activity = %self.activity,
            session_id = ?self.session.id,
            title = item.title(),
            spent_tokens = self.session.spent_tokens,
            "Card completed"
        );
        Ok(item)
    }

    /// Gives up the card in play. Spent tokens are not refunded.
    ///
    /// The run and the durable snapshot stay, so the card can be rehydrated
    /// later unless [`clear_snapshot`](Self::clear_snapshot) is called.
    pub fn abandon(&mut self) -> SessionResult<()> {
        if !self.session.state.is_active() {
            return Err(SessionError::NothingToAbandon);
        }
        self.session.state = SessionState::Abandoned;
        self.session.current = None;
        tracing::debug!(activity = %self.activity, session_id = ?self.session.id, "Session abandoned");
        Ok(())
    }

    /// Back to idle in memory only. Run and snapshot are kept.
    pub fn reset(&mut self) {
        self.session = Session::idle(&self.policy);
    }

    /// Drops the durable snapshot.
    pub fn clear_snapshot(&mut self) -> bool {
        self.storage.remove(SESSION_KEY)
    }

    /// Brings the session in line with the selected category on entry.
    ///
    /// An in-memory card from another category is soft-reset (its snapshot
    /// survives). Otherwise a snapshot drawn in the selected category is
    /// restored; both sides empty counts as a match. Returns `true` when a
    /// snapshot was restored.
    pub fn rehydrate_active(&mut self) -> bool {
        if self.session.state.is_active()
            && self.session.selected_category_at_draw != self.selected_category
        {
            tracing::debug!(
                activity = %self.activity,
                drawn_in = %self.session.selected_category_at_draw,
                selected = %self.selected_category,
                "Category changed, session reset"
            );
            self.reset();
        }

        if self.session.has_active_card() {
            // Memory is at least as fresh as any snapshot; resync storage.
            self.persist_session();
            return false;
        }

        let Some(mut snapshot) = self.storage.get_opt::<Session<I>>(SESSION_KEY) else {
            return false;
        };
        if self.session.state == SessionState::Completed && snapshot.id == self.session.id {
            tracing::debug!(
                activity = %self.activity,
                session_id = ?snapshot.id,
                "Ignoring snapshot of a finished session"
            );
            return false;
        }
        if !snapshot.state.is_active() {
            return false;
        }
        if !snapshot.is_consistent() {
            tracing::warn!(
                activity = %self.activity,
                state = ?snapshot.state,
                "Ignoring inconsistent session snapshot"
            );
            return false;
        }

        let captured = self.normalize_category(&snapshot.selected_category_at_draw);
        if captured != self.selected_category {
            return false;
        }

        snapshot.selected_category_at_draw = captured;
        if let Some(current) = snapshot.current.as_ref() {
            let key = stable_key(current, self.keys.as_ref());
            snapshot.remember_key(key);
        }
        self.session = snapshot;

        tracing::debug!(
            activity = %self.activity,
            session_id = ?self.session.id,
            state = ?self.session.state,
            "Session restored"
        );
        true
    }

    // ---- internals ----

    fn persist_session(&self) {
        if self.session.state.is_active() {
            self.storage.set(SESSION_KEY, &self.session);
        }
    }

    fn bump(&self, field: StatField, step: u32) {
        self.stats.bump(field, &self.clock.local_date(), step);
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
