//! Card pools.
//!
//! The engine never decides which items exist; it asks a [`PoolResolver`] for
//! the candidates of a category every time it needs them and identifies items
//! by their [`stable_key`], never by object identity.
//!
//! # Module Structure
//!
//! - `card`: the [`Card`] item contract, [`PoolResolver`] and [`stable_key`]
//! - `alias`: category key resolution ([`KeyResolver`], [`AliasMap`])

mod alias;
mod card;

pub use alias::{AliasMap, IdentityResolver, KeyResolver};
pub use card::{Card, PoolResolver, StaticPool, stable_key};
