use std::collections::BTreeMap;

use engine::{
    Balances, Currency, Engine, EngineError, LedgerEntry, Member, MemberId, Money, Share,
    compute_balances, compute_equal_split, plan_settlements,
};
use uuid::Uuid;

fn member(n: u128, name: &str) -> Member {
    Member::new(
        MemberId::new(Uuid::from_u128(n)),
        name,
        format!("{}@example.com", name.to_lowercase()),
    )
}

fn abc() -> (Member, Member, Member) {
    (member(1, "A"), member(2, "B"), member(3, "C"))
}

fn entry(amount: i64, payer: &Member, shares: &[(&Member, i64)]) -> LedgerEntry {
    LedgerEntry::new(
        Uuid::new_v4(),
        Money::new(amount),
        Currency::Usd,
        payer.id,
        shares
            .iter()
            .map(|(m, a)| Share::new(m.id, Money::new(*a)))
            .collect(),
    )
    .unwrap()
}

/// Applies every transfer to the net balances: the debtor's balance goes up,
/// the creditor's goes down.
fn apply(balances: &Balances, settlements: &[engine::Settlement]) -> BTreeMap<MemberId, Money> {
    let mut nets: BTreeMap<MemberId, Money> =
        balances.iter().map(|b| (b.member.id, b.net)).collect();
    for settlement in settlements {
        *nets.get_mut(&settlement.from.id).unwrap() += settlement.amount;
        *nets.get_mut(&settlement.to.id).unwrap() -= settlement.amount;
    }
    nets
}

/// Small deterministic generator so the property-style tests are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) % bound
    }
}

fn random_scope(seed: u64) -> (Vec<Member>, Vec<LedgerEntry>) {
    let mut rng = Lcg(seed);
    let size = 2 + rng.next(9) as usize;
    let roster: Vec<Member> = (0..size)
        .map(|i| member(i as u128 + 1, &format!("M{i}")))
        .collect();

    let entries = (0..1 + rng.next(40))
        .map(|_| {
            let payer = &roster[rng.next(size as u64) as usize];
            let amount = Money::new(1 + rng.next(250_000) as i64);
            let participants: Vec<Member> = roster
                .iter()
                .filter(|_| rng.next(3) > 0)
                .cloned()
                .collect();
            let participants = if participants.is_empty() {
                vec![payer.clone()]
            } else {
                participants
            };
            LedgerEntry::split_equally(Uuid::new_v4(), amount, Currency::Usd, payer.id, &participants)
                .unwrap()
        })
        .collect();

    (roster, entries)
}

#[test]
fn three_way_dinner_paid_by_a() {
    let (a, b, c) = abc();
    let roster = vec![a.clone(), b.clone(), c.clone()];
    let entries = vec![entry(9000, &a, &[(&a, 3000), (&b, 3000), (&c, 3000)])];

    let balances = compute_balances(&roster, &entries).unwrap();
    assert_eq!(balances.get(&a.id).unwrap().net, Money::new(6000));
    assert_eq!(balances.get(&b.id).unwrap().net, Money::new(-3000));
    assert_eq!(balances.get(&c.id).unwrap().net, Money::new(-3000));

    let settlements = plan_settlements(&balances).unwrap();
    assert_eq!(settlements.len(), 2);
    assert_eq!(settlements[0].from, b);
    assert_eq!(settlements[0].to, a);
    assert_eq!(settlements[0].amount, Money::new(3000));
    assert_eq!(settlements[1].from, c);
    assert_eq!(settlements[1].to, a);
    assert_eq!(settlements[1].amount, Money::new(3000));
}

#[test]
fn two_members_two_expenses_net_to_one_transfer() {
    let a = member(1, "A");
    let b = member(2, "B");
    let roster = vec![a.clone(), b.clone()];
    let entries = vec![
        entry(10_000, &a, &[(&a, 5000), (&b, 5000)]),
        entry(4000, &b, &[(&a, 2000), (&b, 2000)]),
    ];

    let balances = compute_balances(&roster, &entries).unwrap();
    let a_balance = balances.get(&a.id).unwrap();
    assert_eq!(a_balance.net, Money::new(3000));
    assert_eq!(a_balance.total_paid, Money::new(10_000));
    assert_eq!(a_balance.total_owed, Money::new(7000));
    let b_balance = balances.get(&b.id).unwrap();
    assert_eq!(b_balance.net, Money::new(-3000));
    assert_eq!(b_balance.total_paid, Money::new(4000));
    assert_eq!(b_balance.total_owed, Money::new(7000));

    let settlements = plan_settlements(&balances).unwrap();
    assert_eq!(settlements.len(), 1);
    assert_eq!(settlements[0].from, b);
    assert_eq!(settlements[0].to, a);
    assert_eq!(settlements[0].amount, Money::new(3000));
}

#[test]
fn no_entries_means_everyone_at_zero_and_nothing_to_settle() {
    let (a, b, c) = abc();
    let roster = vec![a, b, c];

    let balances = compute_balances(&roster, &[]).unwrap();
    assert_eq!(balances.len(), 3);
    assert!(balances.iter().all(|b| b.net.is_zero()));
    assert!(plan_settlements(&balances).unwrap().is_empty());
}

#[test]
fn balances_are_conserved() {
    for seed in 0..200 {
        let (roster, entries) = random_scope(seed);
        let balances = compute_balances(&roster, &entries).unwrap();
        assert_eq!(balances.total_net().unwrap(), Money::ZERO, "seed {seed}");
    }
}

fn exact_engine() -> Engine {
    Engine::builder().tolerance(Money::ZERO).build().unwrap()
}

#[test]
fn applying_the_plan_settles_everyone() {
    let engine = exact_engine();
    for seed in 0..200 {
        let (roster, entries) = random_scope(seed);
        let balances = compute_balances(&roster, &entries).unwrap();
        let settlements = engine.plan_settlements(&balances).unwrap();

        let creditors = balances.iter().filter(|b| b.net.is_positive()).count();
        let debtors = balances.iter().filter(|b| b.net.is_negative()).count();
        if creditors + debtors > 0 {
            assert!(settlements.len() < creditors + debtors, "seed {seed}");
        }
        assert!(settlements.iter().all(|s| s.amount.is_positive()));
        assert!(apply(&balances, &settlements).values().all(|net| net.is_zero()), "seed {seed}");
    }
}

#[test]
fn default_plan_leaves_only_cent_sized_residue() {
    for seed in 0..200 {
        let (roster, entries) = random_scope(seed);
        let balances = compute_balances(&roster, &entries).unwrap();
        let settlements = plan_settlements(&balances).unwrap();

        // Each skipped member keeps at most one cent, and whatever they keep
        // is left on the other side of the plan.
        let bound = Money::new(roster.len() as i64);
        let residue = apply(&balances, &settlements);
        assert!(residue.values().all(|net| net.abs() <= bound), "seed {seed}");
        assert_eq!(residue.values().copied().sum::<Money>(), Money::ZERO);
    }
}

#[test]
fn computing_twice_gives_identical_results() {
    let (roster, entries) = random_scope(42);
    let first = compute_balances(&roster, &entries).unwrap();
    let second = compute_balances(&roster, &entries).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        plan_settlements(&first).unwrap(),
        plan_settlements(&second).unwrap()
    );
}

#[test]
fn equal_split_of_hundred_over_three_settles_exactly() {
    let (a, b, c) = abc();
    let roster = vec![a.clone(), b.clone(), c.clone()];
    let shares = compute_equal_split(Money::new(10_000), &roster).unwrap();
    let total: Money = shares.iter().map(|s| s.amount).sum();
    assert_eq!(total, Money::new(10_000));

    let dinner =
        LedgerEntry::new(Uuid::new_v4(), Money::new(10_000), Currency::Usd, b.id, shares).unwrap();
    let report = Engine::default().settle(&roster, &[dinner]).unwrap();

    // A carries the extra cent of the split.
    assert_eq!(report.currency, Some(Currency::Usd));
    let amounts: Vec<(MemberId, i64)> = report
        .settlements
        .iter()
        .map(|s| (s.from.id, s.amount.minor()))
        .collect();
    assert_eq!(amounts, vec![(a.id, 3334), (c.id, 3333)]);
}

#[test]
fn explicit_shares_off_by_a_cent_are_rejected() {
    let a = member(1, "A");
    let b = member(2, "B");
    let err = LedgerEntry::new(
        Uuid::new_v4(),
        Money::new(1000),
        Currency::Usd,
        a.id,
        vec![Share::new(a.id, Money::new(500)), Share::new(b.id, Money::new(501))],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::ShareMismatch(_)));
}

#[test]
fn hand_built_invalid_entry_is_rejected_by_aggregation() {
    let a = member(1, "A");
    let b = member(2, "B");
    let skewed = LedgerEntry {
        id: Uuid::new_v4(),
        amount: Money::new(1000),
        currency: Currency::Usd,
        payer: a.id,
        shares: vec![Share::new(b.id, Money::new(900))],
    };
    assert!(matches!(
        compute_balances(&[a, b], &[skewed]),
        Err(EngineError::ShareMismatch(_))
    ));
}

#[test]
fn engine_tolerance_applies_to_planning() {
    let a = member(1, "A");
    let b = member(2, "B");
    let c = member(3, "C");
    let roster = vec![a.clone(), b.clone(), c.clone()];
    let entries = vec![entry(501, &a, &[(&a, 0), (&b, 500), (&c, 1)])];

    let exact = exact_engine().settle(&roster, &entries).unwrap();
    assert_eq!(exact.settlements.len(), 2);

    let default = Engine::default().settle(&roster, &entries).unwrap();
    assert_eq!(default.settlements.len(), 1);
    assert_eq!(default.settlements[0].from, b);
    assert_eq!(Engine::default().tolerance(), engine::DEFAULT_TOLERANCE);

    assert!(Engine::builder().tolerance(Money::new(-1)).build().is_err());
}

#[test]
fn one_cent_balances_count_as_settled_by_default() {
    let a = member(1, "A");
    let b = member(2, "B");
    let roster = vec![a.clone(), b.clone()];
    let entries = vec![entry(1, &a, &[(&b, 1)])];

    let balances = compute_balances(&roster, &entries).unwrap();
    assert!(plan_settlements(&balances).unwrap().is_empty());

    let two_cents = vec![entry(2, &a, &[(&b, 2)])];
    let balances = compute_balances(&roster, &two_cents).unwrap();
    let plan = plan_settlements(&balances).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].amount, Money::new(2));
}

#[test]
fn ledger_entry_serializes_amounts_as_minor_units() {
    let a = member(1, "A");
    let dinner = entry(1250, &a, &[(&a, 1250)]);
    let json = serde_json::to_value(&dinner).unwrap();
    assert_eq!(json["amount"], 1250);
    assert_eq!(json["currency"], "USD");
    assert_eq!(json["shares"][0]["amount"], 1250);
    assert!(json["shares"][0].get("percentage").is_none());
}
