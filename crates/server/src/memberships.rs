//! Membership endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::{
    MemberRef,
    membership::{MemberNew, MembersResponse},
    scope::ScopeKind,
};
use engine::MemberId;

use crate::{
    ServerError,
    convert::{member_ref, member_view},
    scopes::member_from_ref,
    server::ServerState,
};

pub async fn list_members(
    State(state): State<ServerState>,
    Path((kind, scope_id)): Path<(ScopeKind, Uuid)>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .store
        .read(kind, scope_id, |scope| {
            Ok(scope.members.iter().map(member_view).collect())
        })
        .await?;

    Ok(Json(MembersResponse { members }))
}

pub async fn add_member(
    State(state): State<ServerState>,
    Path((kind, scope_id)): Path<(ScopeKind, Uuid)>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<MemberRef>), ServerError> {
    let member = member_from_ref(MemberRef {
        id: payload.id.unwrap_or_else(Uuid::new_v4),
        name: payload.name,
        email: payload.email,
    })?;

    let created = member_ref(&member);

    state
        .store
        .add_member(kind, scope_id, member, payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Removes a member that takes part in no expense.
pub async fn remove_member(
    State(state): State<ServerState>,
    Path((kind, scope_id, member_id)): Path<(ScopeKind, Uuid, Uuid)>,
) -> Result<Json<MembersResponse>, ServerError> {
    let remaining = state
        .store
        .remove_member(kind, scope_id, MemberId::new(member_id))
        .await?;

    Ok(Json(MembersResponse {
        members: remaining.iter().map(member_view).collect(),
    }))
}
