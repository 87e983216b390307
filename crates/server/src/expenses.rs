//! Shared expense endpoints.

use api_types::{
    expense::{AutoSplitExpenseNew, ExpenseListResponse, ExpenseNew, ExpenseView, ShareNew},
    scope::ScopeKind,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use engine::{LedgerEntry, MemberId, Money, Share};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::expense_view,
    optional_text, required_text,
    server::ServerState,
    store::ExpenseRecord,
};

const DEFAULT_CATEGORY: &str = "Other";

/// Descriptive fields common to both creation paths.
struct Details {
    description: String,
    category: String,
    date: DateTime<Utc>,
}

impl Details {
    fn new(
        description: &str,
        category: Option<&str>,
        date: Option<DateTime<Utc>>,
    ) -> Result<Self, ServerError> {
        Ok(Self {
            description: required_text(description, "description")?,
            category: optional_text(category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            date: date.unwrap_or_else(Utc::now),
        })
    }

    fn into_record(self, entry: LedgerEntry) -> ExpenseRecord {
        ExpenseRecord {
            entry,
            description: self.description,
            category: self.category,
            date: self.date,
            created_at: Utc::now(),
        }
    }
}

fn explicit_shares(split_between: &[ShareNew]) -> Vec<Share> {
    split_between
        .iter()
        .map(|share| {
            let base = Share::new(MemberId::new(share.member_id), Money::new(share.amount_minor));
            match share.percentage {
                Some(percentage) => base.with_percentage(percentage),
                None => base,
            }
        })
        .collect()
}

pub async fn expense_new(
    State(state): State<ServerState>,
    Path((kind, scope_id)): Path<(ScopeKind, Uuid)>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let details = Details::new(
        &payload.description,
        payload.category.as_deref(),
        payload.date,
    )?;
    let shares = explicit_shares(&payload.split_between);

    let view = state
        .store
        .write(kind, scope_id, |scope| {
            let entry = LedgerEntry::new(
                Uuid::new_v4(),
                Money::new(payload.amount_minor),
                scope.currency,
                MemberId::new(payload.paid_by),
                shares,
            )?;
            entry.ensure_members(&scope.roster())?;

            let record = details.into_record(entry);
            let view = expense_view(scope, &record)?;
            tracing::debug!(expense = %record.entry.id, "expense recorded");
            scope.expenses.push(record);
            Ok(view)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Splits the amount equally over every current member of the scope.
pub async fn auto_split_expense_new(
    State(state): State<ServerState>,
    Path((kind, scope_id)): Path<(ScopeKind, Uuid)>,
    Json(payload): Json<AutoSplitExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let details = Details::new(
        &payload.description,
        payload.category.as_deref(),
        payload.date,
    )?;

    let engine = state.engine.clone();
    let view = state
        .store
        .write(kind, scope_id, |scope| {
            let roster = scope.roster();
            let amount = Money::new(payload.amount_minor);
            let shares = engine.compute_equal_split(amount, &roster)?;
            let entry = LedgerEntry::new(
                Uuid::new_v4(),
                amount,
                scope.currency,
                MemberId::new(payload.paid_by),
                shares,
            )?;
            entry.ensure_members(&roster)?;

            let record = details.into_record(entry);
            let view = expense_view(scope, &record)?;
            tracing::debug!(expense = %record.entry.id, "auto-split expense recorded");
            scope.expenses.push(record);
            Ok(view)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Replaces every field of an expense. The new shares are validated exactly
/// as on creation; the id and creation time are kept.
pub async fn update(
    State(state): State<ServerState>,
    Path((kind, scope_id, expense_id)): Path<(ScopeKind, Uuid, Uuid)>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let details = Details::new(
        &payload.description,
        payload.category.as_deref(),
        payload.date,
    )?;
    let shares = explicit_shares(&payload.split_between);

    let view = state
        .store
        .replace_expense(kind, scope_id, expense_id, |scope, current| {
            let entry = LedgerEntry::new(
                current.entry.id,
                Money::new(payload.amount_minor),
                scope.currency,
                MemberId::new(payload.paid_by),
                shares,
            )?;
            entry.ensure_members(&scope.roster())?;

            let mut record = details.into_record(entry);
            record.created_at = current.created_at;
            let view = expense_view(scope, &record)?;
            Ok((record, view))
        })
        .await?;

    Ok(Json(view))
}

/// Newest first: by date, then by creation time.
pub async fn list(
    State(state): State<ServerState>,
    Path((kind, scope_id)): Path<(ScopeKind, Uuid)>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state
        .store
        .read(kind, scope_id, |scope| {
            let mut records: Vec<&ExpenseRecord> = scope.expenses.iter().collect();
            records.sort_by(|a, b| {
                b.date
                    .cmp(&a.date)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            });
            records
                .into_iter()
                .map(|record| expense_view(scope, record))
                .collect()
        })
        .await?;

    Ok(Json(ExpenseListResponse { expenses }))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((kind, scope_id, expense_id)): Path<(ScopeKind, Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .store
        .remove_expense(kind, scope_id, expense_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
