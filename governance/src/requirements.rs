//! Resolution requirement registry: majority and quorum per action.
//!
//! Lookup precedence for `(target, selector)`:
//! 1. the exact `(target, selector)` entry
//! 2. `(WILDCARD, selector)`: the selector on any target
//! 3. `(WILDCARD, WILDCARD)`: the global default
//!
//! The global default is always present, so lookups never fail.

use crate::error::GovernanceError;
use agora_types::{Address, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Majority and quorum, both integer percentages in `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Share of the session participation a proposal's approvals must reach.
    pub majority: u8,
    /// Share of the total weight supply the session participation must reach.
    pub quorum: u8,
}

impl Requirement {
    pub const DEFAULT_MAJORITY: u8 = 50;
    pub const DEFAULT_QUORUM: u8 = 60;

    pub fn new(majority: u8, quorum: u8) -> Self {
        Self { majority, quorum }
    }

    pub fn validate(&self) -> Result<(), GovernanceError> {
        for pct in [self.majority, self.quorum] {
            if pct > 100 {
                return Err(GovernanceError::PercentageOutOfRange(pct));
            }
        }
        Ok(())
    }

    /// `approvals * 100 >= majority * participation`
    pub fn majority_met(&self, approvals: u128, participation: u128) -> bool {
        scaled(approvals, 100) >= scaled(participation, self.majority)
    }

    /// `participation * 100 >= quorum * total_supply`
    pub fn quorum_met(&self, participation: u128, total_supply: u128) -> bool {
        scaled(participation, 100) >= scaled(total_supply, self.quorum)
    }

    /// Both conditions together decide whether a proposal passes.
    pub fn is_met(&self, approvals: u128, participation: u128, total_supply: u128) -> bool {
        self.majority_met(approvals, participation) && self.quorum_met(participation, total_supply)
    }
}

/// Exact `value * factor` as a 256-bit `(high, low)` pair. Pairs compare in
/// the same order as the products.
fn scaled(value: u128, factor: u8) -> (u128, u128) {
    let factor = factor as u128;
    // Each half times a u8 stays below 2^72.
    let low_half = (value & u64::MAX as u128) * factor;
    let high_half = (value >> 64) * factor;
    let (low, carry) = (high_half << 64).overflowing_add(low_half);
    ((high_half >> 64) + carry as u128, low)
}

impl Default for Requirement {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAJORITY, Self::DEFAULT_QUORUM)
    }
}

/// One requirement write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementUpdate {
    pub target: Address,
    pub selector: Selector,
    pub majority: u8,
    pub quorum: u8,
}

impl RequirementUpdate {
    /// Zip the four parallel arrays of an update call.
    pub fn from_parallel(
        targets: &[Address],
        selectors: &[Selector],
        majorities: &[u8],
        quorums: &[u8],
    ) -> Result<Vec<Self>, GovernanceError> {
        let n = targets.len();
        if selectors.len() != n || majorities.len() != n || quorums.len() != n {
            return Err(GovernanceError::LengthMismatch);
        }
        Ok((0..n)
            .map(|i| Self {
                target: targets[i],
                selector: selectors[i],
                majority: majorities[i],
                quorum: quorums[i],
            })
            .collect())
    }

    pub fn requirement(&self) -> Requirement {
        Requirement::new(self.majority, self.quorum)
    }

    /// The all-zero selector stands for "no selector" and is never a key.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.selector.is_zero() {
            return Err(GovernanceError::ReservedSelector {
                target: self.target,
                selector: self.selector,
            });
        }
        self.requirement().validate()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementRegistry {
    #[serde(with = "crate::serde_pairs")]
    entries: BTreeMap<(Address, Selector), Requirement>,
}

impl RequirementRegistry {
    pub fn new(global_default: Requirement) -> Result<Self, GovernanceError> {
        global_default.validate()?;
        let mut entries = BTreeMap::new();
        entries.insert((Address::WILDCARD, Selector::WILDCARD), global_default);
        Ok(Self { entries })
    }

    /// Precedence lookup; absent entries resolve to the global default.
    pub fn requirement(&self, target: &Address, selector: &Selector) -> Requirement {
        self.entries
            .get(&(*target, *selector))
            .or_else(|| self.entries.get(&(Address::WILDCARD, *selector)))
            .copied()
            .unwrap_or_else(|| self.global_default())
    }

    pub fn global_default(&self) -> Requirement {
        self.entries
            .get(&(Address::WILDCARD, Selector::WILDCARD))
            .copied()
            .unwrap_or_default()
    }

    /// Validate every update, then write them all. Nothing is written if any
    /// update is invalid.
    pub fn apply(&mut self, updates: &[RequirementUpdate]) -> Result<(), GovernanceError> {
        for update in updates {
            update.validate()?;
        }
        for update in updates {
            self.entries
                .insert((update.target, update.selector), update.requirement());
        }
        Ok(())
    }

    /// All explicit entries, the global default included.
    pub fn entries(&self) -> impl Iterator<Item = (&(Address, Selector), &Requirement)> {
        self.entries.iter()
    }
}

impl Default for RequirementRegistry {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            (Address::WILDCARD, Selector::WILDCARD),
            Requirement::default(),
        );
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(seed: u8) -> Address {
        Address::new([seed; 20])
    }

    fn sel(seed: u8) -> Selector {
        Selector::new([seed; 4])
    }

    fn update(t: Address, s: Selector, majority: u8, quorum: u8) -> RequirementUpdate {
        RequirementUpdate {
            target: t,
            selector: s,
            majority,
            quorum,
        }
    }

    #[test]
    fn unset_pair_returns_global_default() {
        let registry = RequirementRegistry::default();
        assert_eq!(
            registry.requirement(&target(1), &sel(1)),
            Requirement::new(50, 60)
        );
    }

    #[test]
    fn exact_entry_round_trips() {
        let mut registry = RequirementRegistry::default();
        registry.apply(&[update(target(1), sel(2), 75, 40)]).unwrap();
        assert_eq!(
            registry.requirement(&target(1), &sel(2)),
            Requirement::new(75, 40)
        );
        // Other selectors on the same target still fall back.
        assert_eq!(
            registry.requirement(&target(1), &sel(3)),
            Requirement::default()
        );
    }

    #[test]
    fn wildcard_target_applies_to_every_target() {
        let mut registry = RequirementRegistry::default();
        registry
            .apply(&[update(Address::WILDCARD, sel(9), 90, 10)])
            .unwrap();
        assert_eq!(
            registry.requirement(&target(4), &sel(9)),
            Requirement::new(90, 10)
        );
    }

    #[test]
    fn exact_entry_beats_wildcard_target() {
        let mut registry = RequirementRegistry::default();
        registry
            .apply(&[
                update(Address::WILDCARD, sel(9), 90, 10),
                update(target(4), sel(9), 51, 20),
            ])
            .unwrap();
        assert_eq!(
            registry.requirement(&target(4), &sel(9)),
            Requirement::new(51, 20)
        );
        assert_eq!(
            registry.requirement(&target(5), &sel(9)),
            Requirement::new(90, 10)
        );
    }

    #[test]
    fn global_default_is_writable_through_wildcards() {
        let mut registry = RequirementRegistry::default();
        registry
            .apply(&[update(Address::WILDCARD, Selector::WILDCARD, 66, 33)])
            .unwrap();
        assert_eq!(registry.global_default(), Requirement::new(66, 33));
        assert_eq!(
            registry.requirement(&target(1), &sel(1)),
            Requirement::new(66, 33)
        );
    }

    #[test]
    fn zero_selector_is_rejected() {
        let mut registry = RequirementRegistry::default();
        let err = registry
            .apply(&[update(Address::ZERO, Selector::ZERO, 50, 50)])
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ReservedSelector { .. }));
    }

    #[test]
    fn batch_is_atomic() {
        let mut registry = RequirementRegistry::default();
        let err = registry
            .apply(&[
                update(target(1), sel(1), 70, 70),
                update(target(2), sel(2), 101, 50),
            ])
            .unwrap_err();
        assert!(matches!(err, GovernanceError::PercentageOutOfRange(101)));
        assert_eq!(
            registry.requirement(&target(1), &sel(1)),
            Requirement::default()
        );
    }

    #[test]
    fn parallel_arrays_must_match() {
        let err = RequirementUpdate::from_parallel(&[target(1)], &[sel(1), sel(2)], &[50], &[50])
            .unwrap_err();
        assert!(matches!(err, GovernanceError::LengthMismatch));
    }

    #[test]
    fn majority_and_quorum_are_independent() {
        let req = Requirement::new(50, 60);
        // Full internal majority, 28.6% turnout.
        assert!(req.majority_met(2_000_100, 2_000_100));
        assert!(!req.quorum_met(2_000_100, 7_000_101));
        assert!(!req.is_met(2_000_100, 2_000_100, 7_000_101));
        // Near-total turnout.
        assert!(req.is_met(7_000_100, 7_000_100, 7_000_101));
        assert!(!req.is_met(0, 7_000_100, 7_000_101));
    }

    #[test]
    fn huge_weights_are_compared_exactly() {
        let req = Requirement::new(60, 60);
        let participation = 10u128.pow(37);
        // 40% of a 1e37 turnout against a 60% majority.
        assert!(!req.majority_met(4 * 10u128.pow(36), participation));
        assert!(req.majority_met(6 * 10u128.pow(36), participation));
        assert!(!req.majority_met(6 * 10u128.pow(36) - 1, participation));

        // 30% turnout against a 60% quorum, near the top of the range.
        let supply = u128::MAX / 2;
        assert!(!req.quorum_met(supply / 10 * 3, supply));
        assert!(req.quorum_met(supply, supply));
        assert!(req.quorum_met(u128::MAX, u128::MAX));
        assert!(!req.quorum_met(u128::MAX / 100 * 59, u128::MAX));

        let strict = Requirement::new(100, 100);
        assert!(strict.is_met(u128::MAX, u128::MAX, u128::MAX));
        assert!(!strict.is_met(u128::MAX - 1, u128::MAX, u128::MAX));
    }

    #[test]
    fn scaled_products_carry_into_the_high_word() {
        assert_eq!(scaled(0, 100), (0, 0));
        assert_eq!(scaled(u128::MAX, 0), (0, 0));
        assert_eq!(scaled(u128::MAX, 1), (0, u128::MAX));
        // (2^128 - 1) * 2 = 2^129 - 2
        assert_eq!(scaled(u128::MAX, 2), (1, u128::MAX - 1));
        // (2^128 - 1) * 100 = 99 * 2^128 + (2^128 - 100)
        assert_eq!(scaled(u128::MAX, 100), (99, u128::MAX - 99));
        assert_eq!(scaled(1u128 << 64, 3), (0, 3u128 << 64));
    }

    #[test]
    fn boundaries_are_inclusive() {
        let req = Requirement::new(50, 60);
        assert!(req.majority_met(50, 100));
        assert!(!req.majority_met(49, 100));
        assert!(req.quorum_met(60, 100));
        assert!(!req.quorum_met(59, 100));
    }
}
