//! JSON ledger files.
//!
//! ```json
//! {
//!   "currency": "EUR",
//!   "members": [{ "name": "Alice", "email": "alice@example.com" }, { "name": "Bob" }],
//!   "entries": [
//!     { "amount": "90.00", "payer": "Alice" },
//!     { "amount": "40", "payer": "Bob", "shares": [{ "member": "Alice", "amount": "40" }] }
//!   ]
//! }
//! ```
//!
//! Entries reference members by name. An entry without `shares` is split
//! equally over every member. Members without an `id` get `1, 2, 3, ...` in
//! file order so that output is stable between runs.

use std::collections::{HashMap, HashSet};

use engine::{Currency, LedgerEntry, Member, MemberId, Money, Share};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{CliError, Result};

#[derive(Debug, Deserialize)]
struct LedgerFile {
    currency: Option<String>,
    members: Vec<MemberRecord>,
    #[serde(default)]
    entries: Vec<EntryRecord>,
}

#[derive(Debug, Deserialize)]
struct MemberRecord {
    id: Option<Uuid>,
    name: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct EntryRecord {
    id: Option<Uuid>,
    amount: String,
    payer: String,
    shares: Option<Vec<ShareRecord>>,
}

#[derive(Debug, Deserialize)]
struct ShareRecord {
    member: String,
    amount: String,
}

/// Roster and entries resolved from a ledger file.
#[derive(Debug)]
pub struct Ledger {
    pub currency: Currency,
    pub roster: Vec<Member>,
    pub entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn from_json(raw: &str) -> Result<Ledger> {
        let file: LedgerFile = serde_json::from_str(raw)?;
        let currency = match file.currency.as_deref() {
            Some(code) => Currency::try_from(code)?,
            None => Currency::default(),
        };

        let roster: Vec<Member> = file
            .members
            .into_iter()
            .zip(1u128..)
            .map(|(record, position)| {
                let id = record.id.unwrap_or_else(|| Uuid::from_u128(position));
                Member::new(MemberId::new(id), record.name.trim(), record.email.trim())
            })
            .collect();

        let mut ids = HashSet::new();
        let mut by_name: HashMap<&str, MemberId> = HashMap::new();
        for member in &roster {
            if !ids.insert(member.id) {
                return Err(CliError::Ledger(format!(
                    "member id {} is used more than once (members without an id are numbered 1, 2, 3, ... by position)",
                    member.id
                )));
            }
            if by_name.insert(member.name.as_str(), member.id).is_some() {
                return Err(CliError::Ledger(format!(
                    "member name {:?} is used more than once",
                    member.name
                )));
            }
        }
        let resolve = |name: &str| {
            by_name
                .get(name.trim())
                .copied()
                .ok_or_else(|| CliError::Ledger(format!("unknown member {name:?}")))
        };

        let mut entries = Vec::with_capacity(file.entries.len());
        for (record, position) in file.entries.into_iter().zip(1u128..) {
            let id = record.id.unwrap_or_else(|| Uuid::from_u128(position));
            let amount = Money::parse_in(&record.amount, currency)?;
            let payer = resolve(&record.payer)?;
            let entry = match record.shares {
                None => LedgerEntry::split_equally(id, amount, currency, payer, &roster)?,
                Some(shares) => {
                    let shares = shares
                        .iter()
                        .map(|share| {
                            Ok(Share::new(
                                resolve(&share.member)?,
                                Money::parse_in(&share.amount, currency)?,
                            ))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    LedgerEntry::new(id, amount, currency, payer, shares)?
                }
            };
            entries.push(entry);
        }

        Ok(Ledger {
            currency,
            roster,
            entries,
        })
    }
}
