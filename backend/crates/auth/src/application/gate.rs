//! Request Gate
//!
//! The ordered stages every protected request passes before any handler
//! logic runs. Each stage either yields the next typed value or
//! short-circuits with an [`AuthError`]:
//!
//! 1. `authenticate` - cookie → [`AuthContext`]
//! 2. `verify_csrf`  - mutating methods only, header must match the context
//!
//! Session activity is recorded only once both stages pass.

use axum::http::Method;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::context::AuthContext;
use crate::application::csrf::{CsrfGuard, matches_token};
use crate::domain::repository::{IdentityDirectory, SessionRepository};
use crate::error::{AuthError, AuthResult};

/// What the gate reads from a request
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub method: &'a Method,
    pub session_cookie: Option<&'a str>,
    pub csrf_header: Option<&'a str>,
}

/// Ordered authentication + CSRF pipeline
pub struct RequestGate<S, D>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    check: CheckSessionUseCase<S, D>,
}

impl<S, D> RequestGate<S, D>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    pub fn new(check: CheckSessionUseCase<S, D>) -> Self {
        Self { check }
    }

    /// Run every stage in order
    pub async fn admit(&self, input: GateInput<'_>) -> AuthResult<AuthContext> {
        let context = self.check.authenticate(input.session_cookie).await?;
        verify_csrf(&context, input.method, input.csrf_header)?;
        self.check.record_activity(&context);
        Ok(context)
    }
}

/// CSRF stage
pub fn verify_csrf(
    context: &AuthContext,
    method: &Method,
    supplied: Option<&str>,
) -> AuthResult<()> {
    if !CsrfGuard::requires_check(method) {
        return Ok(());
    }

    match supplied {
        Some(token) if matches_token(context.csrf_token(), token) => Ok(()),
        _ => Err(AuthError::CsrfMismatch),
    }
}
