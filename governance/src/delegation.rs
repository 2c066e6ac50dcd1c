//! Vote delegation: a holder entrusts casting its weight to a delegate.
//!
//! Delegation is single hop: a delegate casts each listed holder's own
//! weight, and a delegate's delegate gains nothing from the first holder.
//! Self-managed holders opt out entirely: only they can cast their weight.

use crate::error::GovernanceError;
use agora_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Holder → delegate map with a reverse index and the self-managed flags.
#[derive(Clone, Debug, Default)]
pub struct DelegationRegistry {
    /// Holder → delegate.
    delegations: HashMap<Address, Address>,
    /// Reverse index: delegate → holders that named it.
    reverse_delegations: HashMap<Address, HashSet<Address>>,
    /// Holders whose weight only they can cast.
    self_managed: HashSet<Address>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `holder`'s delegate. The null address clears it.
    ///
    /// Returns the previous delegate, if any.
    pub fn define_delegate(
        &mut self,
        holder: &Address,
        delegate: &Address,
    ) -> Result<Option<Address>, GovernanceError> {
        if holder == delegate {
            return Err(GovernanceError::SelfDelegation);
        }
        let previous = self.undelegate(holder);
        if !delegate.is_zero() {
            self.delegations.insert(*holder, *delegate);
            self.reverse_delegations
                .entry(*delegate)
                .or_default()
                .insert(*holder);
        }
        Ok(previous)
    }

    /// Remove `holder`'s delegation, returning the delegate it had.
    pub fn undelegate(&mut self, holder: &Address) -> Option<Address> {
        let old = self.delegations.remove(holder)?;
        if let Some(set) = self.reverse_delegations.get_mut(&old) {
            set.remove(holder);
            if set.is_empty() {
                self.reverse_delegations.remove(&old);
            }
        }
        Some(old)
    }

    /// Get the direct delegate for a holder (None if not delegated).
    pub fn delegate_of(&self, holder: &Address) -> Option<&Address> {
        self.delegations.get(holder)
    }

    /// Holders that named `delegate`, in address order.
    pub fn delegators_of(&self, delegate: &Address) -> Vec<Address> {
        let mut holders: Vec<Address> = self
            .reverse_delegations
            .get(delegate)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        holders.sort();
        holders
    }

    pub fn set_self_managed(&mut self, holder: &Address, self_managed: bool) {
        if self_managed {
            self.self_managed.insert(*holder);
        } else {
            self.self_managed.remove(holder);
        }
    }

    pub fn is_self_managed(&self, holder: &Address) -> bool {
        self.self_managed.contains(holder)
    }

    /// May `caller` cast `holder`'s weight?
    ///
    /// A holder always may. A self-managed holder's weight is cast by no one
    /// else. Otherwise the holder's delegate or any operator may.
    pub fn authorize(
        &self,
        caller: &Address,
        holder: &Address,
        caller_is_operator: bool,
    ) -> Result<(), GovernanceError> {
        if caller == holder {
            return Ok(());
        }
        if self.is_self_managed(holder) {
            return Err(GovernanceError::SelfManagedHolder(*holder));
        }
        if self.delegate_of(holder) == Some(caller) || caller_is_operator {
            return Ok(());
        }
        Err(GovernanceError::NotAuthorizedForHolder {
            caller: *caller,
            holder: *holder,
        })
    }
}

/// Serializable form of the registry. The reverse index is rebuilt on load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationSnapshot {
    pub delegations: Vec<(Address, Address)>,
    pub self_managed: BTreeSet<Address>,
}

impl DelegationRegistry {
    pub fn snapshot(&self) -> DelegationSnapshot {
        let mut delegations: Vec<(Address, Address)> =
            self.delegations.iter().map(|(k, v)| (*k, *v)).collect();
        delegations.sort();
        DelegationSnapshot {
            delegations,
            self_managed: self.self_managed.iter().copied().collect(),
        }
    }

    pub fn from_snapshot(snapshot: DelegationSnapshot) -> Self {
        let mut registry = Self::new();
        for (holder, delegate) in snapshot.delegations {
            registry.delegations.insert(holder, delegate);
            registry
                .reverse_delegations
                .entry(delegate)
                .or_default()
                .insert(holder);
        }
        registry.self_managed = snapshot.self_managed.into_iter().collect();
        registry
    }
}
