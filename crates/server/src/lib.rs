use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};
pub use store::{ScopeChanges, ScopeStore};

mod convert;
mod expenses;
mod memberships;
mod scopes;
mod server;
mod settlements;
mod store;

pub mod types {
    pub mod scope {
        pub use api_types::scope::{
            ScopeCreated, ScopeKind, ScopeListResponse, ScopeNew, ScopeUpdate, ScopeView,
        };
    }

    pub mod membership {
        pub use api_types::membership::{MemberNew, MemberView, MembersResponse, MembershipRole};
    }

    pub mod expense {
        pub use api_types::expense::{
            AutoSplitExpenseNew, ExpenseListResponse, ExpenseNew, ExpenseView, ShareNew,
            ShareView,
        };
    }

    pub mod settlement {
        pub use api_types::settlement::{BalanceView, SettlementView, SettlementsResponse};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::MemberInUse(_) => StatusCode::CONFLICT,
        EngineError::InvalidBalance(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidRoster(_)
        | EngineError::UnknownMember(_)
        | EngineError::ShareMismatch(_)
        | EngineError::InvalidAmount(_)
        | EngineError::CurrencyMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::InvalidBalance(msg) => {
            tracing::error!("settlement invariant broken: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Trims a required text field, rejecting blank values.
fn required_text(value: &str, label: &str) -> Result<String, ServerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServerError::Generic(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
