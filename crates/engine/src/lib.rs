//! Settlement engine for shared expenses.
//!
//! Given the roster of a scope (a trip or a group) and its ledger entries,
//! the engine computes one net balance per member and a list of transfers
//! that settles them. All operations are pure and synchronous; callers fetch
//! the roster and entries, hand them over and get fresh values back.
//!
//! ```rust
//! use engine::{Currency, Engine, LedgerEntry, Member, MemberId, Money};
//! use uuid::Uuid;
//!
//! let alice = Member::new(MemberId::random(), "Alice", "alice@example.com");
//! let bob = Member::new(MemberId::random(), "Bob", "bob@example.com");
//! let roster = vec![alice.clone(), bob.clone()];
//!
//! let dinner = LedgerEntry::split_equally(
//!     Uuid::new_v4(),
//!     Money::new(50_00),
//!     Currency::Usd,
//!     alice.id,
//!     &roster,
//! )
//! .unwrap();
//!
//! let report = Engine::default().settle(&roster, &[dinner]).unwrap();
//! assert_eq!(report.settlements.len(), 1);
//! assert_eq!(report.settlements[0].from, bob);
//! assert_eq!(report.settlements[0].amount, Money::new(25_00));
//! ```

pub use balances::{Balance, Balances, compute_balances};
pub use currency::Currency;
pub use error::EngineError;
pub use ledger::{LedgerEntry, Share};
pub use member::{Member, MemberId};
pub use money::Money;
pub use settlement::Settlement;
pub use split::compute_equal_split;

mod balances;
mod currency;
mod error;
mod ledger;
mod member;
mod money;
mod settlement;
mod split;

type ResultEngine<T> = Result<T, EngineError>;

/// Largest absolute balance treated as settled unless configured otherwise:
/// one minor unit, so `0.01` counts as settled and `0.02` does not.
pub const DEFAULT_TOLERANCE: Money = Money::new(1);

/// Plans the settlement of `balances` with [`DEFAULT_TOLERANCE`].
pub fn plan_settlements(balances: &Balances) -> ResultEngine<Vec<Settlement>> {
    settlement::plan_with_tolerance(balances, DEFAULT_TOLERANCE)
}

/// Balances plus the transfers that settle them, for one scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementReport {
    /// Currency label shared by the entries (`None` when there were none).
    pub currency: Option<Currency>,
    pub balances: Vec<Balance>,
    pub settlements: Vec<Settlement>,
}

#[derive(Clone, Copy, Debug)]
pub struct Engine {
    tolerance: Money,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Largest absolute balance (minor units) treated as settled.
    #[must_use]
    pub fn tolerance(&self) -> Money {
        self.tolerance
    }

    pub fn compute_balances(
        &self,
        roster: &[Member],
        entries: &[LedgerEntry],
    ) -> ResultEngine<Balances> {
        compute_balances(roster, entries)
    }

    pub fn plan_settlements(&self, balances: &Balances) -> ResultEngine<Vec<Settlement>> {
        settlement::plan_with_tolerance(balances, self.tolerance)
    }

    pub fn compute_equal_split(&self, amount: Money, roster: &[Member]) -> ResultEngine<Vec<Share>> {
        compute_equal_split(amount, roster)
    }

    /// Aggregates balances for `roster`/`entries` and plans their settlement.
    pub fn settle(
        &self,
        roster: &[Member],
        entries: &[LedgerEntry],
    ) -> ResultEngine<SettlementReport> {
        let currency = balances::ensure_single_currency(entries)?;
        let balances = self.compute_balances(roster, entries)?;
        let settlements = self.plan_settlements(&balances)?;
        Ok(SettlementReport {
            currency,
            balances: balances.into_vec(),
            settlements,
        })
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    tolerance: Money,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl EngineBuilder {
    /// Largest absolute balance, in minor units, treated as settled.
    ///
    /// Defaults to [`DEFAULT_TOLERANCE`]; `0` settles exact zeros only.
    pub fn tolerance(mut self, tolerance: Money) -> EngineBuilder {
        self.tolerance = tolerance;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        if self.tolerance.is_negative() {
            return Err(EngineError::InvalidAmount(
                "tolerance must be >= 0".to_string(),
            ));
        }
        Ok(Engine {
            tolerance: self.tolerance,
        })
    }
}
