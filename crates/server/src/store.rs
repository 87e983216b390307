//! In-memory storage for trips and groups.
//!
//! Each scope owns its roster and its expense records. Handlers read or
//! mutate a scope through [`ScopeStore::read`] / [`ScopeStore::write`], which
//! run a closure while holding the lock, so a settlement is always computed
//! from one consistent snapshot of roster and entries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use api_types::{membership::MembershipRole, scope::ScopeKind};
use engine::{Currency, EngineError, LedgerEntry, Member, MemberId};

type ResultStore<T> = Result<T, EngineError>;

#[derive(Clone, Debug)]
pub struct Membership {
    pub member: Member,
    pub role: MembershipRole,
    pub joined_at: DateTime<Utc>,
}

/// A persisted shared expense: the ledger entry plus its descriptive fields.
#[derive(Clone, Debug)]
pub struct ExpenseRecord {
    pub entry: LedgerEntry,
    pub description: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub id: Uuid,
    pub kind: ScopeKind,
    pub name: String,
    pub description: Option<String>,
    pub currency: Currency,
    pub created_by: MemberId,
    pub created_at: DateTime<Utc>,
    pub members: Vec<Membership>,
    pub expenses: Vec<ExpenseRecord>,
}

impl Scope {
    /// Members in join order.
    pub fn roster(&self) -> Vec<Member> {
        self.members.iter().map(|m| m.member.clone()).collect()
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members
            .iter()
            .map(|m| &m.member)
            .find(|member| member.id == id)
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.expenses.iter().map(|e| e.entry.clone()).collect()
    }

    fn label(&self) -> String {
        format!("{}/{}", self.kind.as_str(), self.id)
    }

    /// Moves the scope and its entries to `currency`. Amounts are kept as
    /// they are, so the new currency must use the same minor units unless
    /// there are no expenses yet.
    fn relabel(&mut self, currency: Currency) -> ResultStore<()> {
        if currency == self.currency {
            return Ok(());
        }
        if !self.expenses.is_empty() && currency.minor_units() != self.currency.minor_units() {
            return Err(EngineError::CurrencyMismatch(format!(
                "{} has expenses in {}, which cannot be relabelled as {}",
                self.label(),
                self.currency,
                currency
            )));
        }
        self.currency = currency;
        for record in &mut self.expenses {
            record.entry.currency = currency;
        }
        Ok(())
    }
}

/// Changes applied by [`ScopeStore::update`]. `None` leaves a field as is.
#[derive(Debug, Default)]
pub struct ScopeChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Default)]
pub struct ScopeStore {
    scopes: RwLock<HashMap<(ScopeKind, Uuid), Scope>>,
}

impl ScopeStore {
    /// Creates a scope whose only member is `creator`, as `admin`.
    pub async fn create(
        &self,
        kind: ScopeKind,
        name: String,
        description: Option<String>,
        currency: Currency,
        creator: Member,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let scope = Scope {
            id,
            kind,
            name,
            description,
            currency,
            created_by: creator.id,
            created_at: Utc::now(),
            members: vec![Membership {
                member: creator,
                role: MembershipRole::Admin,
                joined_at: Utc::now(),
            }],
            expenses: Vec::new(),
        };
        tracing::info!(scope = %scope.label(), "scope created");
        self.scopes.write().await.insert((kind, id), scope);
        id
    }

    /// Maps every scope of `kind`, newest first.
    pub async fn list<T>(&self, kind: ScopeKind, f: impl FnMut(&Scope) -> T) -> Vec<T> {
        let scopes = self.scopes.read().await;
        let mut matching: Vec<&Scope> = scopes.values().filter(|s| s.kind == kind).collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        matching.into_iter().map(f).collect()
    }

    /// Runs `f` against the scope under a shared lock.
    pub async fn read<T>(
        &self,
        kind: ScopeKind,
        id: Uuid,
        f: impl FnOnce(&Scope) -> ResultStore<T>,
    ) -> ResultStore<T> {
        let scopes = self.scopes.read().await;
        let scope = scopes.get(&(kind, id)).ok_or_else(|| not_found(kind, id))?;
        f(scope)
    }

    /// Runs `f` against the scope under an exclusive lock. Changes made by
    /// `f` stay even if it returns an error, so `f` must validate before
    /// mutating.
    pub async fn write<T>(
        &self,
        kind: ScopeKind,
        id: Uuid,
        f: impl FnOnce(&mut Scope) -> ResultStore<T>,
    ) -> ResultStore<T> {
        let mut scopes = self.scopes.write().await;
        let scope = scopes
            .get_mut(&(kind, id))
            .ok_or_else(|| not_found(kind, id))?;
        f(scope)
    }

    pub async fn add_member(
        &self,
        kind: ScopeKind,
        id: Uuid,
        member: Member,
        role: MembershipRole,
    ) -> ResultStore<()> {
        self.write(kind, id, |scope| {
            if scope.member(member.id).is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "member {} in {}",
                    member.id,
                    scope.label()
                )));
            }
            tracing::debug!(
                scope = %scope.label(),
                member = %member.id,
                role = role.as_str(),
                "member added"
            );
            scope.members.push(Membership {
                member,
                role,
                joined_at: Utc::now(),
            });
            Ok(())
        })
        .await
    }

    /// Applies `changes` and returns the updated scope.
    pub async fn update(
        &self,
        kind: ScopeKind,
        id: Uuid,
        changes: ScopeChanges,
    ) -> ResultStore<Scope> {
        self.write(kind, id, |scope| {
            if let Some(currency) = changes.currency {
                scope.relabel(currency)?;
            }
            if let Some(name) = changes.name {
                scope.name = name;
            }
            if let Some(description) = changes.description {
                scope.description = description;
            }
            tracing::info!(scope = %scope.label(), "scope updated");
            Ok(scope.clone())
        })
        .await
    }

    /// Drops the scope together with its members and expenses.
    pub async fn remove(&self, kind: ScopeKind, id: Uuid) -> ResultStore<()> {
        match self.scopes.write().await.remove(&(kind, id)) {
            Some(scope) => {
                tracing::info!(scope = %scope.label(), "scope removed");
                Ok(())
            }
            None => Err(not_found(kind, id)),
        }
    }

    /// Removes a member that no expense refers to and returns the remaining
    /// members.
    pub async fn remove_member(
        &self,
        kind: ScopeKind,
        id: Uuid,
        member: MemberId,
    ) -> ResultStore<Vec<Membership>> {
        self.write(kind, id, |scope| {
            let position = scope
                .members
                .iter()
                .position(|m| m.member.id == member)
                .ok_or_else(|| {
                    EngineError::KeyNotFound(format!("member {member} in {}", scope.label()))
                })?;
            if let Some(record) = scope.expenses.iter().find(|r| r.entry.involves(member)) {
                return Err(EngineError::MemberInUse(format!(
                    "member {member} takes part in expense {}",
                    record.entry.id
                )));
            }
            scope.members.remove(position);
            tracing::debug!(scope = %scope.label(), member = %member, "member removed");
            Ok(scope.members.clone())
        })
        .await
    }

    /// Replaces an expense with the record built by `f` from the scope and
    /// the current record. Nothing changes when `f` fails.
    pub async fn replace_expense<T>(
        &self,
        kind: ScopeKind,
        id: Uuid,
        expense_id: Uuid,
        f: impl FnOnce(&Scope, &ExpenseRecord) -> ResultStore<(ExpenseRecord, T)>,
    ) -> ResultStore<T> {
        self.write(kind, id, |scope| {
            let position = scope
                .expenses
                .iter()
                .position(|e| e.entry.id == expense_id)
                .ok_or_else(|| EngineError::KeyNotFound(format!("expense {expense_id}")))?;
            let (record, out) = f(&*scope, &scope.expenses[position])?;
            scope.expenses[position] = record;
            tracing::debug!(scope = %scope.label(), expense = %expense_id, "expense replaced");
            Ok(out)
        })
        .await
    }

    pub async fn remove_expense(
        &self,
        kind: ScopeKind,
        id: Uuid,
        expense_id: Uuid,
    ) -> ResultStore<()> {
        self.write(kind, id, |scope| {
            let position = scope
                .expenses
                .iter()
                .position(|e| e.entry.id == expense_id)
                .ok_or_else(|| EngineError::KeyNotFound(format!("expense {expense_id}")))?;
            scope.expenses.remove(position);
            tracing::debug!(scope = %scope.label(), expense = %expense_id, "expense removed");
            Ok(())
        })
        .await
    }
}

fn not_found(kind: ScopeKind, id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("{}/{id}", kind.as_str()))
}
