//! Economic defaults of a session.

/// Rerolls allowed per run.
pub const REROLL_LIMIT_DEFAULT: u32 = 3;
/// Tokens spent per reroll.
pub const REROLL_COST_TOKEN_DEFAULT: u32 = 1;
/// Tokens charged when leaving an active card.
pub const EXIT_COST_TOKEN_DEFAULT: u32 = 1;

/// Costs and limits an engine captures into each new session.
///
/// Production wiring always uses [`SessionPolicy::default`]. Other values
/// exist for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub reroll_limit: u32,
    pub reroll_cost_token: u32,
    pub exit_cost_token: u32,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            reroll_limit: REROLL_LIMIT_DEFAULT,
            reroll_cost_token: REROLL_COST_TOKEN_DEFAULT,
            exit_cost_token: EXIT_COST_TOKEN_DEFAULT,
        }
    }
}
