use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Signed money amount represented as an integer number of **minor units**
/// (cents for USD/EUR/GBP, whole yen for JPY).
///
/// Every amount flowing through the settlement engine (entry amounts, shares,
/// balances, transfers) uses this type, so balance aggregation and settlement
/// planning never accumulate floating-point drift.
///
/// The value is signed:
/// - positive = creditor side (is owed money)
/// - negative = debtor side (owes money)
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more than 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value (saturating at `i64::MAX`).
    #[must_use]
    pub const fn abs(self) -> Money {
        Money(self.0.saturating_abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Adds `rhs`, mapping overflow to [`EngineError::InvalidAmount`].
    pub(crate) fn try_add(self, rhs: Money) -> ResultEngine<Money> {
        self.checked_add(rhs)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }

    /// Subtracts `rhs`, mapping overflow to [`EngineError::InvalidAmount`].
    pub(crate) fn try_sub(self, rhs: Money) -> ResultEngine<Money> {
        self.checked_sub(rhs)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }

    /// Sums amounts with overflow detection.
    pub(crate) fn try_sum<I>(amounts: I) -> ResultEngine<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.try_add(amount))
    }

    /// Parses a decimal string using the fraction digits of `currency`.
    ///
    /// `"10.5"` in EUR is `1050`; `"1200"` in JPY is `1200`; `"10.5"` in JPY is
    /// rejected.
    pub fn parse_in(s: &str, currency: Currency) -> ResultEngine<Money> {
        parse_minor(s, currency.minor_units())
    }

    /// Formats the amount with the fraction digits of `currency` and its
    /// code, e.g. `12.34 USD`.
    #[must_use]
    pub fn display_in(self, currency: Currency) -> String {
        format!("{} {}", format_minor(self.0, currency.minor_units()), currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_minor(self.0, 2))
    }
}

fn format_minor(value: i64, minor_units: u8) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    if minor_units == 0 {
        return format!("{sign}{abs}");
    }
    let scale = 10u64.pow(u32::from(minor_units));
    let major = abs / scale;
    let minor = abs % scale;
    let width = usize::from(minor_units);
    format!("{sign}{major}.{minor:0width$}")
}

fn parse_minor(s: &str, minor_units: u8) -> ResultEngine<Money> {
    let empty = || EngineError::InvalidAmount("empty amount".to_string());
    let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
    let overflow = || EngineError::InvalidAmount("amount too large".to_string());

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Err(empty());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let major_str = parts.next().ok_or_else(invalid)?;
    let frac_str = parts.next();

    if parts.next().is_some() {
        return Err(invalid());
    }

    if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let major: i64 = major_str.parse().map_err(|_| overflow())?;

    let frac = frac_str.unwrap_or("");
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > usize::from(minor_units) {
        return Err(EngineError::InvalidAmount("too many decimals".to_string()));
    }
    let minor: i64 = if frac.is_empty() {
        0
    } else {
        let padding = u32::from(minor_units) - frac.len() as u32;
        frac.parse::<i64>().map_err(|_| invalid())? * 10i64.pow(padding)
    };

    let scale = 10i64.pow(u32::from(minor_units));
    let total = major
        .checked_mul(scale)
        .and_then(|v| v.checked_add(minor))
        .ok_or_else(overflow)?;

    let signed = if negative {
        total.checked_neg().ok_or_else(overflow)?
    } else {
        total
    };

    Ok(Money(signed))
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string with two fraction digits into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_minor(s, 2)
    }
}
