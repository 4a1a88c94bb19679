//! Realtime Router

use axum::{Router, routing::get};
use auth::{IdentityDirectory, SessionRepository};

use crate::domain::bus::FanoutBus;
use crate::presentation::state::RealtimeState;
use crate::presentation::ws;

/// Create the Realtime router
pub fn realtime_router<S, D, F>(state: RealtimeState<S, D, F>) -> Router
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
    F: FanoutBus + Send + Sync + 'static,
{
    Router::new()
        .route("/ws", get(ws::ws_handler::<S, D, F>))
        .with_state(state)
}
