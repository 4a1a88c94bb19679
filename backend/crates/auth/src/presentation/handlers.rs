//! HTTP Handlers
//!
//! All routes here sit behind [`require_session`](super::middleware::require_session).

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::SignOutUseCase;
use crate::application::context::AuthContext;
use crate::domain::repository::{IdentityDirectory, SessionRepository};
use crate::error::AuthResult;
use crate::presentation::cookies;
use crate::presentation::dto::{CsrfTokenResponse, SessionStatusResponse, SignOutAllResponse};
use crate::presentation::middleware::AuthGateState;

/// GET /api/auth/session
pub async fn session_status(context: AuthContext) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse {
        identity_id: context.identity_id().to_string(),
        session_id: context.session_id().to_string(),
        expires_at_ms: context.expires_at().timestamp_millis(),
    })
}

/// GET /api/auth/csrf
pub async fn csrf_token(context: AuthContext) -> Json<CsrfTokenResponse> {
    Json(CsrfTokenResponse {
        csrf_token: context.csrf_token().to_string(),
    })
}

/// POST /api/auth/signout
pub async fn sign_out<S, D>(
    State(state): State<AuthGateState<S, D>>,
    context: AuthContext,
) -> AuthResult<impl IntoResponse>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    SignOutUseCase::new(state.sessions.clone())
        .execute(&context.session_id())
        .await?;

    Ok((StatusCode::NO_CONTENT, cookies::clear_headers(&state.config)))
}

/// POST /api/auth/signout/all
pub async fn sign_out_all<S, D>(
    State(state): State<AuthGateState<S, D>>,
    context: AuthContext,
) -> AuthResult<impl IntoResponse>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    let revoked = SignOutUseCase::new(state.sessions.clone())
        .execute_all(&context.identity_id())
        .await?;

    Ok((
        StatusCode::OK,
        cookies::clear_headers(&state.config),
        Json(SignOutAllResponse {
            sessions_revoked: revoked,
        }),
    ))
}
