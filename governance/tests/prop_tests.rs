//! Property-based tests for the session clock, the tally and the requirement registry.

use agora_governance::{
    clock, GovernanceConfig, GovernanceEngine, ProposalDraft, Requirement, RequirementRegistry,
    RequirementUpdate, SessionRule,
};
use agora_nullables::{NullCaller, NullLedger};
use agora_types::{Address, Selector, Timestamp};
use proptest::prelude::*;

fn arb_rule() -> impl Strategy<Value = SessionRule> {
    (1u64..5_000, 1u64..5_000, 1u64..5_000)
        .prop_flat_map(|(campaign, voting, grace)| {
            let period = campaign + voting + grace;
            (Just((campaign, voting, grace)), 0..period)
        })
        .prop_map(|((campaign_period, voting_period, grace_period), period_offset)| SessionRule {
            campaign_period,
            voting_period,
            grace_period,
            period_offset,
            ..SessionRule::default()
        })
}

fn arb_address() -> impl Strategy<Value = Address> {
    prop::array::uniform20(any::<u8>()).prop_map(Address::new)
}

fn arb_selector() -> impl Strategy<Value = Selector> {
    prop::array::uniform4(any::<u8>())
        .prop_filter("all-zero selector is reserved", |b| *b != [0; 4])
        .prop_map(Selector::new)
}

proptest! {
    #[test]
    fn next_session_is_on_grid_and_minimal(rule in arb_rule(), reference in 0u64..10_000_000) {
        let period = rule.session_period();
        let g = clock::next_session_at(&rule, Timestamp::new(reference)).as_secs();

        prop_assert!(g >= rule.period_offset);
        prop_assert_eq!((g - rule.period_offset) % period, 0);
        // Campaign opens strictly after the reference...
        prop_assert!(g > reference + rule.campaign_period);
        // ...and the grid point before it would not.
        if g >= rule.period_offset + period {
            prop_assert!(g - period <= reference + rule.campaign_period);
        }
    }

    #[test]
    fn back_to_back_sessions_never_overlap(
        rule in arb_rule(),
        start in 0u64..1_000_000,
        gaps in prop::collection::vec(0u64..50_000, 1..20),
    ) {
        let mut now = start;
        let mut prev = clock::next_window(&rule, Timestamp::new(now));
        for gap in gaps {
            now += gap;
            let reference = Timestamp::new(now).max(prev.closed_at.minus(1));
            let next = clock::next_window(&rule, reference);
            prop_assert!(next.campaign_at >= prev.closed_at);
            prop_assert!(next.campaign_at < next.vote_at);
            prop_assert!(next.vote_at < next.grace_at);
            prop_assert!(next.grace_at < next.closed_at);
            prev = next;
        }
    }

    #[test]
    fn approval_is_monotonic(
        majority in 0u8..=100,
        quorum in 0u8..=100,
        approvals in 0u64..1_000_000_000,
        extra_participation in 0u64..1_000_000_000,
        rest_of_supply in 0u64..1_000_000_000,
        more in 0u64..1_000_000_000,
    ) {
        let r = Requirement::new(majority, quorum);
        let a = approvals as u128;
        let p = a + extra_participation as u128;
        let s = p + rest_of_supply as u128;
        let d = more as u128;
        // Weight that approves raises approvals and participation together.
        if r.is_met(a, p, s) {
            prop_assert!(r.is_met(a + d, p + d, s));
        }
        // Fewer approvals at the same participation never turn a rejection into a pass.
        if !r.is_met(a, p, s) {
            prop_assert!(!r.is_met(a.saturating_sub(d), p, s));
        }
    }

    #[test]
    fn tally_matches_small_products_and_stays_monotonic_when_huge(
        majority in 0u8..=100,
        approvals in any::<u128>(),
        participation in any::<u128>(),
        more in any::<u128>(),
    ) {
        let r = Requirement::new(majority, 0);
        if let (Some(lhs), Some(rhs)) = (
            approvals.checked_mul(100),
            participation.checked_mul(majority as u128),
        ) {
            prop_assert_eq!(r.majority_met(approvals, participation), lhs >= rhs);
        }
        if r.majority_met(approvals, participation) {
            prop_assert!(r.majority_met(approvals.saturating_add(more), participation));
        } else {
            prop_assert!(!r.majority_met(approvals.saturating_sub(more), participation));
            if majority > 0 {
                prop_assert!(!r.majority_met(approvals, participation.saturating_add(more)));
            }
        }
    }

    #[test]
    fn requirement_update_reads_back(
        target in arb_address(),
        selector in arb_selector(),
        majority in 0u8..=100,
        quorum in 0u8..=100,
        other in arb_address(),
    ) {
        let mut registry = RequirementRegistry::default();
        registry
            .apply(&[RequirementUpdate { target, selector, majority, quorum }])
            .unwrap();
        prop_assert_eq!(registry.requirement(&target, &selector), Requirement::new(majority, quorum));

        let untouched = Selector::new([0x5a, 0x5a, 0x5a, 0x5b]);
        prop_assume!(selector != untouched && selector != Selector::WILDCARD);
        prop_assume!(other != target && target != Address::WILDCARD);
        prop_assert_eq!(registry.requirement(&other, &untouched), registry.global_default());
    }

    #[test]
    fn approvals_never_exceed_participation(
        weights in prop::collection::vec(1u64..1_000_000_000, 1..12),
        selections in prop::collection::vec(any::<u8>(), 12),
        proposals in 1u32..8,
    ) {
        let engine_addr = Address::new([0xe0; 20]);
        let asset = Address::new([0xa0; 20]);
        let supply: u128 = weights.iter().map(|w| *w as u128).sum();
        let mut ledger = NullLedger::new(supply);
        let holders: Vec<Address> = (0..weights.len())
            .map(|i| Address::new([i as u8 + 1; 20]))
            .collect();
        for (holder, weight) in holders.iter().zip(&weights) {
            ledger.set_balance(*holder, *weight as u128);
        }
        let mut config = GovernanceConfig::new(engine_addr, asset);
        config.session_rule = SessionRule {
            campaign_period: 10,
            voting_period: 10,
            grace_period: 10,
            ..SessionRule::default()
        };
        let mut engine = GovernanceEngine::new(&config, ledger, NullCaller::new()).unwrap();
        for i in 0..proposals {
            engine
                .define_proposal(&holders[0], ProposalDraft::new(format!("p{i}")), Timestamp::new(0))
                .unwrap();
        }

        let mask = (1u128 << proposals) - 1;
        for (holder, selection) in holders.iter().zip(&selections) {
            engine
                .submit_vote(holder, *selection as u128 & mask, Timestamp::new(30))
                .unwrap();
        }

        let session = engine.session(1).unwrap();
        prop_assert_eq!(session.participation, supply);
        for proposal in engine.proposals(1) {
            prop_assert!(proposal.approvals <= session.participation);
        }
    }
}
