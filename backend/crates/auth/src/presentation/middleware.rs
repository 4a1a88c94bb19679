//! Auth Middleware
//!
//! Runs the [`RequestGate`] stages ahead of every protected route, hands
//! the resulting [`AuthContext`] to the handler, and refreshes the CSRF
//! channel on the way out. A rejected request never reaches the handler.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::context::AuthContext;
use crate::application::gate::{GateInput, RequestGate};
use crate::application::CheckSessionUseCase;
use crate::domain::repository::{IdentityDirectory, SessionRepository};
use crate::presentation::cookies;

/// Middleware state
pub struct AuthGateState<S, D>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    pub sessions: Arc<S>,
    pub directory: Arc<D>,
    pub config: Arc<AuthConfig>,
}

impl<S, D> Clone for AuthGateState<S, D>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            directory: self.directory.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, D> AuthGateState<S, D>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    pub fn new(sessions: Arc<S>, directory: Arc<D>, config: Arc<AuthConfig>) -> Self {
        Self {
            sessions,
            directory,
            config,
        }
    }

    pub fn check_session(&self) -> CheckSessionUseCase<S, D> {
        CheckSessionUseCase::new(
            self.sessions.clone(),
            self.directory.clone(),
            self.config.clone(),
        )
    }
}

/// Middleware that requires a valid session and, for mutating methods,
/// a matching CSRF token
pub async fn require_session<S, D>(
    State(state): State<AuthGateState<S, D>>,
    mut req: Request,
    next: Next,
) -> Response
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    let gate = RequestGate::new(state.check_session());

    // Owned copies: the request body is not Sync, so no borrow of `req`
    // may live across the await below.
    let method = req.method().clone();
    let session_cookie =
        platform::cookie::extract_cookie(req.headers(), &state.config.session_cookie_name);
    let csrf_header = header_str(req.headers(), &state.config.csrf_header_name).map(str::to_owned);

    let admitted = gate
        .admit(GateInput {
            method: &method,
            session_cookie: session_cookie.as_deref(),
            csrf_header: csrf_header.as_deref(),
        })
        .await;

    let context = match admitted {
        Ok(context) => context,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(context.clone());
    let mut response = next.run(req).await;

    // The handler may have ended the session (sign out, account deletion)
    // and cleared the cookies itself.
    if !cookies::clears_session(&response, &state.config) {
        cookies::attach_csrf(response.headers_mut(), &state.config, context.csrf_token());
    }
    response
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Handlers take the context by value via this extractor
impl<St> axum::extract::FromRequestParts<St> for AuthContext
where
    St: Send + Sync,
{
    type Rejection = crate::error::AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &St,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(crate::error::AuthError::MissingSession)
    }
}
