//! Settlement endpoint: balances and suggested transfers for a scope.

use api_types::{scope::ScopeKind, settlement::SettlementsResponse};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{balance_view, map_currency, settlement_view},
    server::ServerState,
};

pub async fn get(
    State(state): State<ServerState>,
    Path((kind, scope_id)): Path<(ScopeKind, Uuid)>,
) -> Result<Json<SettlementsResponse>, ServerError> {
    let (currency, roster, entries) = state
        .store
        .read(kind, scope_id, |scope| {
            Ok((scope.currency, scope.roster(), scope.entries()))
        })
        .await?;

    let report = state.engine.settle(&roster, &entries)?;
    tracing::debug!(
        scope = %scope_id,
        settlements = report.settlements.len(),
        "settlements computed"
    );

    Ok(Json(SettlementsResponse {
        currency: map_currency(report.currency.unwrap_or(currency)),
        settlements: report.settlements.iter().map(settlement_view).collect(),
        balance_summary: report.balances.iter().map(balance_view).collect(),
    }))
}
