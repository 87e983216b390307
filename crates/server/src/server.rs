use axum::{
    Router,
    routing::{delete, get, post, put},
};

use std::sync::Arc;

use crate::{expenses, memberships, scopes, settlements, store::ScopeStore};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub store: Arc<ScopeStore>,
}

impl ServerState {
    /// State with an empty store.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
            store: Arc::new(ScopeStore::default()),
        }
    }
}

/// Every route is shared by trips and groups: `{scope}` is `trips` or
/// `groups`.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/{scope}", get(scopes::list).post(scopes::scope_new))
        .route(
            "/{scope}/{scope_id}",
            get(scopes::get).put(scopes::update).delete(scopes::remove),
        )
        .route(
            "/{scope}/{scope_id}/members",
            get(memberships::list_members).post(memberships::add_member),
        )
        .route(
            "/{scope}/{scope_id}/members/{member_id}",
            delete(memberships::remove_member),
        )
        .route(
            "/{scope}/{scope_id}/expenses",
            get(expenses::list).post(expenses::expense_new),
        )
        .route(
            "/{scope}/{scope_id}/expenses/auto-split",
            post(expenses::auto_split_expense_new),
        )
        .route(
            "/{scope}/{scope_id}/expenses/{expense_id}",
            put(expenses::update).delete(expenses::remove),
        )
        .route("/{scope}/{scope_id}/settlements", get(settlements::get))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine))).await
}
