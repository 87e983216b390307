//! Ledger entries: one shared expense, its payer and the breakdown of who
//! owes what.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Member, MemberId, Money, ResultEngine, split};

/// The amount a single member owes for a [`LedgerEntry`].
///
/// `percentage` is informational (it is shown by clients); the engine never
/// reads it and never checks it against `amount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub member: MemberId,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl Share {
    #[must_use]
    pub const fn new(member: MemberId, amount: Money) -> Self {
        Self {
            member,
            amount,
            percentage: None,
        }
    }

    #[must_use]
    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }
}

/// One shared expense.
///
/// Invariants (checked by [`LedgerEntry::new`] and again by
/// `compute_balances`):
/// - `amount > 0`
/// - every share amount is `>= 0`
/// - the shares add up to `amount` exactly
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub amount: Money,
    #[serde(default)]
    pub currency: Currency,
    pub payer: MemberId,
    pub shares: Vec<Share>,
}

impl LedgerEntry {
    /// Builds a validated entry with explicit shares.
    pub fn new(
        id: Uuid,
        amount: Money,
        currency: Currency,
        payer: MemberId,
        shares: Vec<Share>,
    ) -> ResultEngine<Self> {
        let entry = Self {
            id,
            amount,
            currency,
            payer,
            shares,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Builds an entry whose shares are the equal split of `amount` over
    /// `roster`.
    pub fn split_equally(
        id: Uuid,
        amount: Money,
        currency: Currency,
        payer: MemberId,
        roster: &[Member],
    ) -> ResultEngine<Self> {
        let shares = split::compute_equal_split(amount, roster)?;
        Self::new(id, amount, currency, payer, shares)
    }

    /// Sum of all share amounts.
    pub fn shares_total(&self) -> ResultEngine<Money> {
        Money::try_sum(self.shares.iter().map(|share| share.amount))
    }

    /// Checks the amount/share invariants.
    ///
    /// Shares must add up to the amount exactly: with integer minor units a
    /// difference below `0.01` can only be zero.
    pub fn validate(&self) -> ResultEngine<()> {
        if !self.amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "entry {} amount must be > 0",
                self.id
            )));
        }
        if let Some(share) = self.shares.iter().find(|share| share.amount.is_negative()) {
            return Err(EngineError::InvalidAmount(format!(
                "entry {} has a negative share for member {}",
                self.id, share.member
            )));
        }
        let total = self.shares_total()?;
        if total != self.amount {
            return Err(EngineError::ShareMismatch(format!(
                "entry {} shares sum to {}, amount is {}",
                self.id, total, self.amount
            )));
        }
        Ok(())
    }

    /// Whether `member` paid for this entry or owes a share of it.
    pub fn involves(&self, member: MemberId) -> bool {
        self.payer == member || self.shares.iter().any(|share| share.member == member)
    }

    /// Checks that the payer and every participant belong to `roster`.
    pub fn ensure_members(&self, roster: &[Member]) -> ResultEngine<()> {
        let known = |id: MemberId| roster.iter().any(|member| member.id == id);
        let participants = self.shares.iter().map(|share| share.member);
        match std::iter::once(self.payer).chain(participants).find(|id| !known(*id)) {
            Some(id) => Err(EngineError::UnknownMember(format!(
                "entry {} references member {id}",
                self.id
            ))),
            None => Ok(()),
        }
    }
}
