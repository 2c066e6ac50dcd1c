//! Narrow interfaces to the collaborators the engine does not own.
//!
//! The asset ledger provides weights and transfer locks; everything a
//! `Resolution::ExternalCall` targets is reached through [`ExternalCaller`].
//! Implementations live with the host; `agora-nullables` has in-memory ones.

use agora_types::{Address, Timestamp};

/// Voting weight, read live at proposal, vote, and tally time.
pub trait WeightSource {
    fn weight_of(&self, holder: &Address) -> u128;

    fn total_supply(&self) -> u128;
}

/// Transfer lock on the governed asset.
pub trait AssetLock {
    /// Block transfers of `scope` during `[start_at, end_at)` for everyone
    /// except `exceptions`. The lock lapses on its own at `end_at`.
    fn lock(
        &mut self,
        scope: &Address,
        start_at: Timestamp,
        end_at: Timestamp,
        exceptions: &[Address],
    ) -> Result<(), String>;
}

/// Generic invocation of an operation outside the engine.
pub trait ExternalCaller {
    fn invoke(&mut self, target: &Address, payload: &[u8]) -> Result<(), String>;
}
