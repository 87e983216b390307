//! Equal split of an amount over a roster.
//!
//! Remainder rule: `amount` is divided in minor units; the remainder
//! `amount % N` is handed out one minor unit each to the first members in
//! roster order. The shares therefore always add up to `amount` exactly.
//!
//! `100.00` over three members gives `33.34`, `33.33`, `33.33`.

use crate::{EngineError, Member, Money, ResultEngine, Share, member::ensure_unique_roster};

/// Splits `amount` equally over `roster`, preserving roster order.
pub fn compute_equal_split(amount: Money, roster: &[Member]) -> ResultEngine<Vec<Share>> {
    if roster.is_empty() {
        return Err(EngineError::InvalidRoster(
            "cannot split over an empty roster".to_string(),
        ));
    }
    ensure_unique_roster(roster)?;
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "split amount must be > 0".to_string(),
        ));
    }

    let count = i64::try_from(roster.len())
        .map_err(|_| EngineError::InvalidRoster("roster too large".to_string()))?;
    let base = amount.minor() / count;
    let remainder = amount.minor() % count;
    let percentage = (10_000.0 / roster.len() as f64).round() / 100.0;

    let shares = roster
        .iter()
        .zip(0i64..)
        .map(|(member, position)| {
            let extra = i64::from(position < remainder);
            Share::new(member.id, Money::new(base + extra)).with_percentage(percentage)
        })
        .collect();

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::MemberId;

    fn roster(n: usize) -> Vec<Member> {
        (0..n)
            .map(|i| {
                Member::new(
                    MemberId::new(Uuid::from_u128(i as u128 + 1)),
                    format!("m{i}"),
                    format!("m{i}@example.com"),
                )
            })
            .collect()
    }

    #[test]
    fn hundred_over_three_gives_extra_cent_to_first() {
        let shares = compute_equal_split(Money::new(10_000), &roster(3)).unwrap();
        let amounts: Vec<i64> = shares.iter().map(|s| s.amount.minor()).collect();
        assert_eq!(amounts, vec![3334, 3333, 3333]);
        assert_eq!(shares[0].percentage, Some(33.33));
    }

    #[test]
    fn keeps_roster_order() {
        let members = roster(4);
        let shares = compute_equal_split(Money::new(1000), &members).unwrap();
        let ids: Vec<MemberId> = shares.iter().map(|s| s.member).collect();
        let expected: Vec<MemberId> = members.iter().map(|m| m.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn sum_is_exact_for_roster_sizes_up_to_1000() {
        let members = roster(1000);
        for size in [1usize, 2, 3, 7, 13, 97, 999, 1000] {
            for amount in [1i64, 99, 10_000, 123_457, 9_999_999] {
                let shares = compute_equal_split(Money::new(amount), &members[..size]).unwrap();
                assert_eq!(shares.len(), size);
                let total: Money = shares.iter().map(|s| s.amount).sum();
                assert_eq!(total, Money::new(amount), "size {size} amount {amount}");
            }
        }
    }

    #[test]
    fn amount_smaller_than_roster_leaves_zero_shares() {
        let shares = compute_equal_split(Money::new(2), &roster(5)).unwrap();
        let amounts: Vec<i64> = shares.iter().map(|s| s.amount.minor()).collect();
        assert_eq!(amounts, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn empty_roster_is_rejected() {
        assert!(matches!(
            compute_equal_split(Money::new(100), &[]),
            Err(EngineError::InvalidRoster(_))
        ));
    }

    #[test]
    fn duplicate_roster_member_is_rejected() {
        let mut members = roster(2);
        members.push(members[0].clone());
        assert!(matches!(
            compute_equal_split(Money::new(100), &members),
            Err(EngineError::InvalidRoster(_))
        ));
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        assert!(matches!(
            compute_equal_split(Money::ZERO, &roster(2)),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
