//! Nullable asset ledger: balances, supply and transfer locks in memory.

use agora_governance::{AssetLock, WeightSource};
use agora_types::{Address, Timestamp};
use std::collections::HashMap;

/// One accepted `AssetLock::lock` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockRecord {
    pub scope: Address,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub exceptions: Vec<Address>,
}

/// An asset ledger whose balances and supply are set by the test.
///
/// The supply is independent of the balances, so tests can model weight
/// held by accounts that never vote.
#[derive(Debug, Default)]
pub struct NullLedger {
    balances: HashMap<Address, u128>,
    total_supply: u128,
    locks: Vec<LockRecord>,
    reject_locks: Option<String>,
}

impl NullLedger {
    pub fn new(total_supply: u128) -> Self {
        Self {
            total_supply,
            ..Self::default()
        }
    }

    /// Builder form of [`NullLedger::set_balance`].
    pub fn with_balance(mut self, holder: Address, amount: u128) -> Self {
        self.set_balance(holder, amount);
        self
    }

    pub fn set_balance(&mut self, holder: Address, amount: u128) {
        self.balances.insert(holder, amount);
    }

    pub fn set_total_supply(&mut self, total_supply: u128) {
        self.total_supply = total_supply;
    }

    /// Move weight between holders, ignoring locks. Fails on insufficient balance.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), String> {
        let have = self.weight_of(from);
        if have < amount {
            return Err(format!("{from} holds {have}, cannot send {amount}"));
        }
        self.balances.insert(*from, have - amount);
        let entry = self.balances.entry(*to).or_default();
        *entry = entry.saturating_add(amount);
        Ok(())
    }

    /// Make every following lock request fail with `reason`; `None` accepts again.
    pub fn reject_locks(&mut self, reason: Option<&str>) {
        self.reject_locks = reason.map(str::to_owned);
    }

    pub fn locks(&self) -> &[LockRecord] {
        &self.locks
    }

    /// Is a transfer of `scope` by `sender` blocked at `at`?
    pub fn is_locked(&self, scope: &Address, sender: &Address, at: Timestamp) -> bool {
        self.locks.iter().any(|l| {
            l.scope == *scope
                && l.start_at <= at
                && at < l.end_at
                && !l.exceptions.contains(sender)
        })
    }
}

impl WeightSource for NullLedger {
    fn weight_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }
}

impl AssetLock for NullLedger {
    fn lock(
        &mut self,
        scope: &Address,
        start_at: Timestamp,
        end_at: Timestamp,
        exceptions: &[Address],
    ) -> Result<(), String> {
        if let Some(reason) = &self.reject_locks {
            return Err(reason.clone());
        }
        self.locks.push(LockRecord {
            scope: *scope,
            start_at,
            end_at,
            exceptions: exceptions.to_vec(),
        });
        Ok(())
    }
}
