use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use agora_governance::{clock, GovernanceConfig, GovernanceEngine, ProposalDraft, SessionRule};
use agora_nullables::{NullCaller, NullLedger};
use agora_types::{Address, Timestamp};

const VOTE_AT: u64 = 30;
const OPERATOR: Address = Address::new([0x0b; 20]);

fn holder(i: usize) -> Address {
    let mut bytes = [0u8; 20];
    bytes[..8].copy_from_slice(&(i as u64 + 1).to_be_bytes());
    Address::new(bytes)
}

/// Engine with one session of `proposals` proposals and `holders` funded holders.
fn make_engine(holders: usize, proposals: u32) -> GovernanceEngine<NullLedger, NullCaller> {
    let mut ledger = NullLedger::new(holders as u128 * 1_000);
    for i in 0..holders {
        ledger.set_balance(holder(i), 1_000);
    }
    let mut config = GovernanceConfig::new(Address::new([0xe0; 20]), Address::new([0xa0; 20]));
    config.session_rule = SessionRule {
        campaign_period: 10,
        voting_period: 10,
        grace_period: 10,
        max_proposals: 128,
        max_proposals_operator: 128,
        ..SessionRule::default()
    };
    config.operators = vec![OPERATOR];
    let mut engine = GovernanceEngine::new(&config, ledger, NullCaller::new()).unwrap();
    for i in 0..proposals {
        engine
            .define_proposal(&holder(0), ProposalDraft::new(format!("p{i}")), Timestamp::new(0))
            .unwrap();
    }
    engine
}

fn bench_submit_vote(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_vote");

    for proposals in [1u32, 16, 128] {
        let selection = u128::MAX >> (128 - proposals);

        group.bench_with_input(
            BenchmarkId::new("proposals", proposals),
            &proposals,
            |b, _| {
                b.iter_batched(
                    || make_engine(1, proposals),
                    |mut e| {
                        e.submit_vote(&holder(0), black_box(selection), Timestamp::new(VOTE_AT))
                            .unwrap();
                        e
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_vote_on_behalf(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_vote_on_behalf");

    for holders in [10usize, 100, 1000] {
        let list: Vec<Address> = (0..holders).map(holder).collect();

        group.bench_with_input(BenchmarkId::new("holders", holders), &holders, |b, &n| {
            b.iter_batched(
                || make_engine(n, 8),
                |mut e| {
                    e.submit_vote_on_behalf(
                        &OPERATOR,
                        black_box(&list),
                        black_box(0b1010_1010),
                        Timestamp::new(VOTE_AT),
                    )
                    .unwrap();
                    e
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_is_approved(c: &mut Criterion) {
    let mut engine = make_engine(100, 128);
    for i in 0..100 {
        engine
            .submit_vote(&holder(i), u128::MAX, Timestamp::new(VOTE_AT))
            .unwrap();
    }

    c.bench_function("is_approved", |b| {
        b.iter(|| black_box(engine.is_approved(black_box(1), black_box(64))))
    });
}

fn bench_next_session_at(c: &mut Criterion) {
    let rule = SessionRule::default();
    c.bench_function("next_session_at", |b| {
        b.iter(|| black_box(clock::next_session_at(&rule, black_box(Timestamp::new(1_700_000_000)))))
    });
}

criterion_group!(
    benches,
    bench_submit_vote,
    bench_vote_on_behalf,
    bench_is_approved,
    bench_next_session_at
);
criterion_main!(benches);
