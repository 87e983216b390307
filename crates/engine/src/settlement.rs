//! Greedy settlement planning.
//!
//! Creditors and debtors are kept in two max-heaps keyed by outstanding
//! amount (ties: lower member id first). Each round pairs the largest
//! creditor with the largest debtor and moves `min(credit, debt)`; whichever
//! side is exhausted leaves its heap, the other goes back with what is left.
//! Every round discharges at least one member, so the plan has at most
//! `creditors + debtors - 1` transfers.
//!
//! The result is the usual greedy heuristic, not the theoretical minimum
//! number of transfers for every input.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use serde::{Deserialize, Serialize};

use crate::{Balances, EngineError, Member, Money, ResultEngine};

/// One suggested payment from a debtor to a creditor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: Member,
    pub to: Member,
    pub amount: Money,
}

/// Member with an outstanding (absolute) amount, ordered for the heaps.
#[derive(Debug, PartialEq, Eq)]
struct Outstanding {
    remaining: Money,
    member: Member,
}

impl Ord for Outstanding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.remaining
            .cmp(&other.remaining)
            .then_with(|| Reverse(self.member.id).cmp(&Reverse(other.member.id)))
    }
}

impl PartialOrd for Outstanding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Plans the transfers that bring every balance within `tolerance` of zero.
///
/// `tolerance` is in minor units: a balance `b` counts as settled when
/// `|b| <= tolerance`.
pub(crate) fn plan_with_tolerance(
    balances: &Balances,
    tolerance: Money,
) -> ResultEngine<Vec<Settlement>> {
    validate_balances(balances, tolerance)?;

    let mut creditors = BinaryHeap::new();
    let mut debtors = BinaryHeap::new();
    for balance in balances.iter() {
        if balance.net > tolerance {
            creditors.push(Outstanding {
                remaining: balance.net,
                member: balance.member.clone(),
            });
        } else if balance.net < -tolerance {
            debtors.push(Outstanding {
                remaining: balance.net.abs(),
                member: balance.member.clone(),
            });
        }
    }

    let mut settlements = Vec::new();
    while let (Some(mut creditor), Some(mut debtor)) = (creditors.pop(), debtors.pop()) {
        let amount = creditor.remaining.min(debtor.remaining);
        creditor.remaining -= amount;
        debtor.remaining -= amount;

        tracing::trace!(
            from = %debtor.member.id,
            to = %creditor.member.id,
            amount = amount.minor(),
            "settlement planned"
        );
        settlements.push(Settlement {
            from: debtor.member.clone(),
            to: creditor.member.clone(),
            amount,
        });

        if creditor.remaining > tolerance {
            creditors.push(creditor);
        }
        if debtor.remaining > tolerance {
            debtors.push(debtor);
        }
    }

    tracing::debug!(
        members = balances.len(),
        settlements = settlements.len(),
        "settlement plan ready"
    );

    Ok(settlements)
}

/// Planner input must be internally consistent and conserve money.
fn validate_balances(balances: &Balances, tolerance: Money) -> ResultEngine<()> {
    if tolerance.is_negative() {
        return Err(EngineError::InvalidBalance(
            "tolerance must be >= 0".to_string(),
        ));
    }
    for balance in balances.iter() {
        if balance.total_paid.is_negative() || balance.total_owed.is_negative() {
            return Err(EngineError::InvalidBalance(format!(
                "member {} has negative totals",
                balance.member.id
            )));
        }
        if balance.total_paid.checked_sub(balance.total_owed) != Some(balance.net) {
            return Err(EngineError::InvalidBalance(format!(
                "member {} net does not match paid minus owed",
                balance.member.id
            )));
        }
    }
    let total = balances
        .total_net()
        .map_err(|_| EngineError::InvalidBalance("balances overflow".to_string()))?;
    if total.abs() > tolerance {
        return Err(EngineError::InvalidBalance(format!(
            "balances sum to {total}, expected 0"
        )));
    }
    Ok(())
}
