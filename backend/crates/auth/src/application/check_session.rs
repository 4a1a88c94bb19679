//! Check Session Use Case
//!
//! The lookup shared by the HTTP Auth Gate and the realtime handshake:
//! unseal the cookie, load the record from the shared store, re-check the
//! absolute expiry and confirm the identity still exists.

use std::sync::Arc;

use chrono::Utc;

use crate::application::codec::SessionCodec;
use crate::application::config::AuthConfig;
use crate::application::context::AuthContext;
use crate::application::csrf::CsrfGuard;
use crate::domain::repository::{IdentityDirectory, SessionRepository};
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<S, D>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    session_repo: Arc<S>,
    directory: Arc<D>,
    config: Arc<AuthConfig>,
}

impl<S, D> CheckSessionUseCase<S, D>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>, directory: Arc<D>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            directory,
            config,
        }
    }

    /// Resolve the presented cookie value into an authenticated context
    pub async fn authenticate(&self, sealed_cookie: Option<&str>) -> AuthResult<AuthContext> {
        let sealed = sealed_cookie.ok_or(AuthError::MissingSession)?;
        let session_id = SessionCodec::new(self.config.session_secret).unseal(sealed)?;

        let session = self
            .session_repo
            .load(&session_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        // The store evicts on TTL too, but eviction may lag.
        let now = Utc::now();
        if session.is_expired_at(now) {
            if let Err(e) = self.session_repo.destroy(&session_id).await {
                tracing::warn!(error = %e, session_id = %session_id, "Failed to evict expired session");
            }
            return Err(AuthError::SessionExpired);
        }

        if !self.directory.identity_exists(&session.identity_id).await? {
            tracing::info!(
                identity_id = %session.identity_id,
                session_id = %session_id,
                "Session refers to a deleted identity"
            );
            return Err(AuthError::IdentityMissing);
        }

        let csrf_token = CsrfGuard
            .issue_token(&session)
            .ok_or_else(|| AuthError::Internal("session CSRF secret undecodable".into()))?;

        Ok(AuthContext::from_session(&session, csrf_token))
    }

    /// Update last activity in background
    ///
    /// Only for requests that passed every stage; a rejected request
    /// leaves the record untouched.
    pub fn record_activity(&self, context: &AuthContext) {
        let repo = self.session_repo.clone();
        let session_id = context.session_id();
        let now = Utc::now();
        tokio::spawn(async move {
            if let Err(e) = repo.touch(&session_id, now).await {
                tracing::warn!(error = %e, "Failed to update session activity");
            }
        });
    }
}
