//! Trip and group endpoints.

use api_types::{
    MemberRef,
    scope::{ScopeCreated, ScopeKind, ScopeListResponse, ScopeNew, ScopeUpdate, ScopeView},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Member, MemberId};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{parse_currency, scope_view},
    optional_text, required_text,
    server::ServerState,
    store::ScopeChanges,
};

/// Builds an engine member from its wire form, validating display fields.
pub(crate) fn member_from_ref(member: MemberRef) -> Result<Member, ServerError> {
    Ok(Member::new(
        MemberId::new(member.id),
        required_text(&member.name, "member name")?,
        member.email.trim(),
    ))
}

pub async fn scope_new(
    State(state): State<ServerState>,
    Path(kind): Path<ScopeKind>,
    Json(payload): Json<ScopeNew>,
) -> Result<(StatusCode, Json<ScopeCreated>), ServerError> {
    let name = required_text(&payload.name, "name")?;
    let creator = member_from_ref(payload.created_by)?;
    let currency = parse_currency(payload.currency.unwrap_or_default());

    let id = state
        .store
        .create(
            kind,
            name,
            optional_text(payload.description.as_deref()),
            currency,
            creator,
        )
        .await;

    Ok((StatusCode::CREATED, Json(ScopeCreated { id })))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(kind): Path<ScopeKind>,
) -> Json<ScopeListResponse> {
    let scopes = state.store.list(kind, scope_view).await;
    Json(ScopeListResponse { scopes })
}

pub async fn get(
    State(state): State<ServerState>,
    Path((kind, scope_id)): Path<(ScopeKind, Uuid)>,
) -> Result<Json<ScopeView>, ServerError> {
    let view = state
        .store
        .read(kind, scope_id, |scope| Ok(scope_view(scope)))
        .await?;

    Ok(Json(view))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((kind, scope_id)): Path<(ScopeKind, Uuid)>,
    Json(payload): Json<ScopeUpdate>,
) -> Result<Json<ScopeView>, ServerError> {
    let changes = ScopeChanges {
        name: payload
            .name
            .as_deref()
            .map(|name| required_text(name, "name"))
            .transpose()?,
        description: payload
            .description
            .as_deref()
            .map(|description| optional_text(Some(description))),
        currency: payload.currency.map(parse_currency),
    };

    let scope = state.store.update(kind, scope_id, changes).await?;
    Ok(Json(scope_view(&scope)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((kind, scope_id)): Path<(ScopeKind, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.store.remove(kind, scope_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
