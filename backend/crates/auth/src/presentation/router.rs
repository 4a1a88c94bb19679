//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::repository::{IdentityDirectory, SessionRepository};
use crate::presentation::handlers;
use crate::presentation::middleware::{AuthGateState, require_session};

/// Create the Auth router for any store implementation
pub fn auth_router<S, D>(state: AuthGateState<S, D>) -> Router
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    Router::new()
        .route("/session", get(handlers::session_status))
        .route("/csrf", get(handlers::csrf_token))
        .route("/signout", post(handlers::sign_out::<S, D>))
        .route("/signout/all", post(handlers::sign_out_all::<S, D>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session::<S, D>,
        ))
        .with_state(state)
}
