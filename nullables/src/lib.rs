//! Nullable collaborators for deterministic testing.
//!
//! The governance engine reaches its asset ledger and external targets only
//! through the traits in `agora_governance::ports`. This crate provides
//! in-memory implementations that:
//! - hold balances and supply set directly by the test
//! - record every lock and call so tests can assert on them
//! - fail on demand
//!
//! Usage: hand them to `GovernanceEngine::new` in place of real collaborators.

pub mod caller;
pub mod clock;
pub mod ledger;

pub use caller::NullCaller;
pub use clock::NullClock;
pub use ledger::{LockRecord, NullLedger};
