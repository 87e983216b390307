//! Per-member balance aggregation over the ledger entries of one scope.

use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

use crate::{
    Currency, EngineError, LedgerEntry, Member, MemberId, Money, ResultEngine,
    member::ensure_unique_roster,
};

/// Net position of a member within a scope.
///
/// `net = total_paid - total_owed`. Positive: the member is owed money;
/// negative: the member owes money.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub member: Member,
    pub net: Money,
    pub total_paid: Money,
    pub total_owed: Money,
}

impl Balance {
    /// A member with no activity.
    #[must_use]
    pub fn zero(member: Member) -> Self {
        Self {
            member,
            net: Money::ZERO,
            total_paid: Money::ZERO,
            total_owed: Money::ZERO,
        }
    }

    /// Builds a balance from a bare net figure; totals are derived from its
    /// sign.
    #[cfg(test)]
    pub(crate) fn from_net(member: Member, net: Money) -> Self {
        let (total_paid, total_owed) = if net.is_negative() {
            (Money::ZERO, -net)
        } else {
            (net, Money::ZERO)
        };
        Self {
            member,
            net,
            total_paid,
            total_owed,
        }
    }

    fn record_paid(&mut self, amount: Money) -> ResultEngine<()> {
        self.total_paid = self.total_paid.try_add(amount)?;
        self.net = self.net.try_add(amount)?;
        Ok(())
    }

    fn record_owed(&mut self, amount: Money) -> ResultEngine<()> {
        self.total_owed = self.total_owed.try_add(amount)?;
        self.net = self.net.try_sub(amount)?;
        Ok(())
    }
}

/// Balances keyed by member id, iterated in member id order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balances(BTreeMap<MemberId, Balance>);

impl Balances {
    #[must_use]
    pub fn get(&self, member: &MemberId) -> Option<&Balance> {
        self.0.get(member)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Balance> {
        self.0.values()
    }

    /// Sum of every net balance. Zero for balances produced from valid
    /// entries.
    pub fn total_net(&self) -> ResultEngine<Money> {
        Money::try_sum(self.0.values().map(|balance| balance.net))
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Balance> {
        self.0.into_values().collect()
    }
}

impl FromIterator<Balance> for Balances {
    fn from_iter<I: IntoIterator<Item = Balance>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|balance| (balance.member.id, balance))
                .collect(),
        )
    }
}

impl IntoIterator for Balances {
    type Item = Balance;
    type IntoIter = btree_map::IntoValues<MemberId, Balance>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_values()
    }
}

/// Reduces `entries` to one net balance per roster member.
///
/// Every roster member appears in the result, including members with no
/// activity. A payer who is also a participant gets both adjustments, so
/// their net is "paid minus own share".
///
/// Fails with:
/// - `InvalidRoster` if the roster lists a member twice
/// - `UnknownMember` if an entry references a member outside the roster
/// - `ShareMismatch` / `InvalidAmount` if an entry breaks its invariants
/// - `CurrencyMismatch` if entries carry different currency labels
pub fn compute_balances(roster: &[Member], entries: &[LedgerEntry]) -> ResultEngine<Balances> {
    ensure_unique_roster(roster)?;
    ensure_single_currency(entries)?;

    let mut balances: BTreeMap<MemberId, Balance> = roster
        .iter()
        .map(|member| (member.id, Balance::zero(member.clone())))
        .collect();

    for entry in entries {
        entry.validate()?;

        let payer = balances
            .get_mut(&entry.payer)
            .ok_or_else(|| unknown_member(entry, entry.payer))?;
        payer.record_paid(entry.amount)?;

        for share in &entry.shares {
            let participant = balances
                .get_mut(&share.member)
                .ok_or_else(|| unknown_member(entry, share.member))?;
            participant.record_owed(share.amount)?;
        }
    }

    tracing::trace!(
        members = balances.len(),
        entries = entries.len(),
        "balances aggregated"
    );

    Ok(Balances(balances))
}

/// Currency label shared by `entries`, if any.
pub(crate) fn ensure_single_currency(entries: &[LedgerEntry]) -> ResultEngine<Option<Currency>> {
    let mut currencies = entries.iter().map(|entry| entry.currency);
    let Some(first) = currencies.next() else {
        return Ok(None);
    };
    if let Some(other) = currencies.find(|currency| *currency != first) {
        return Err(EngineError::CurrencyMismatch(format!(
            "entries mix {} and {}",
            first.code(),
            other.code()
        )));
    }
    Ok(Some(first))
}

fn unknown_member(entry: &LedgerEntry, member: MemberId) -> EngineError {
    EngineError::UnknownMember(format!("entry {} references member {member}", entry.id))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::Share;

    fn member(n: u128, name: &str) -> Member {
        Member::new(
            MemberId::new(Uuid::from_u128(n)),
            name,
            format!("{}@example.com", name.to_lowercase()),
        )
    }

    fn entry(n: u128, amount: i64, payer: &Member, shares: &[(&Member, i64)]) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::from_u128(1000 + n),
            amount: Money::new(amount),
            currency: Currency::Usd,
            payer: payer.id,
            shares: shares
                .iter()
                .map(|(m, a)| Share::new(m.id, Money::new(*a)))
                .collect(),
        }
    }

    #[test]
    fn payer_who_also_splits_nets_own_share() {
        let a = member(1, "A");
        let b = member(2, "B");
        let c = member(3, "C");
        let roster = vec![a.clone(), b.clone(), c.clone()];
        let entries = vec![entry(1, 9000, &a, &[(&a, 3000), (&b, 3000), (&c, 3000)])];

        let balances = compute_balances(&roster, &entries).unwrap();
        let a_balance = balances.get(&a.id).unwrap();
        assert_eq!(a_balance.net, Money::new(6000));
        assert_eq!(a_balance.total_paid, Money::new(9000));
        assert_eq!(a_balance.total_owed, Money::new(3000));
        assert_eq!(balances.get(&b.id).unwrap().net, Money::new(-3000));
        assert_eq!(balances.get(&c.id).unwrap().net, Money::new(-3000));
        assert_eq!(balances.total_net().unwrap(), Money::ZERO);
    }

    #[test]
    fn roster_members_without_activity_appear_at_zero() {
        let a = member(1, "A");
        let b = member(2, "B");
        let idle = member(3, "Idle");
        let roster = vec![a.clone(), b.clone(), idle.clone()];
        let entries = vec![entry(1, 1000, &a, &[(&b, 1000)])];

        let balances = compute_balances(&roster, &entries).unwrap();
        assert_eq!(balances.len(), 3);
        assert_eq!(balances.get(&idle.id).unwrap(), &Balance::zero(idle.clone()));
    }

    #[test]
    fn unknown_payer_or_participant_is_rejected() {
        let a = member(1, "A");
        let stranger = member(9, "Stranger");
        let roster = vec![a.clone()];

        let unknown_payer = vec![entry(1, 100, &stranger, &[(&a, 100)])];
        assert!(matches!(
            compute_balances(&roster, &unknown_payer),
            Err(EngineError::UnknownMember(_))
        ));

        let unknown_share = vec![entry(2, 100, &a, &[(&stranger, 100)])];
        assert!(matches!(
            compute_balances(&roster, &unknown_share),
            Err(EngineError::UnknownMember(_))
        ));
    }

    #[test]
    fn mismatched_shares_are_rejected() {
        let a = member(1, "A");
        let b = member(2, "B");
        let roster = vec![a.clone(), b.clone()];
        let entries = vec![entry(1, 1000, &a, &[(&a, 500), (&b, 499)])];
        assert!(matches!(
            compute_balances(&roster, &entries),
            Err(EngineError::ShareMismatch(_))
        ));
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let a = member(1, "A");
        let roster = vec![a.clone()];
        let mut eur = entry(2, 100, &a, &[(&a, 100)]);
        eur.currency = Currency::Eur;
        let entries = vec![entry(1, 100, &a, &[(&a, 100)]), eur];
        assert!(matches!(
            compute_balances(&roster, &entries),
            Err(EngineError::CurrencyMismatch(_))
        ));
    }

    #[test]
    fn duplicate_roster_is_rejected() {
        let a = member(1, "A");
        assert!(matches!(
            compute_balances(&[a.clone(), a], &[]),
            Err(EngineError::InvalidRoster(_))
        ));
    }

    #[test]
    fn from_net_derives_totals() {
        let a = member(1, "A");
        let owed = Balance::from_net(a.clone(), Money::new(-250));
        assert_eq!(owed.total_owed, Money::new(250));
        assert_eq!(owed.total_paid, Money::ZERO);
        let paid = Balance::from_net(a, Money::new(250));
        assert_eq!(paid.total_paid, Money::new(250));
    }
}
