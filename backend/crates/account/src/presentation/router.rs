//! Account Router

use auth::{IdentityDirectory, SessionRepository, middleware::require_session};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, patch, post},
};

use crate::application::AccountPorts;
use crate::presentation::handlers;
use crate::presentation::state::AccountState;

/// Multipart framing allowance on top of the picture limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the Account router
pub fn account_router<P, S, D>(state: AccountState<P, S, D>) -> Router
where
    P: AccountPorts,
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    let picture_limit = state.deps.config.max_picture_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", delete(handlers::delete_account::<P, S, D>))
        .route("/profile", patch(handlers::update_profile::<P, S, D>))
        .route(
            "/picture",
            post(handlers::update_picture::<P, S, D>).layer(DefaultBodyLimit::max(picture_limit)),
        )
        .route(
            "/payment-card",
            post(handlers::attach_payment_card::<P, S, D>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_session::<S, D>,
        ))
        .with_state(state)
}
