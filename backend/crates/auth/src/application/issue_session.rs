//! Issue Session Use Case
//!
//! Creates a session for an identity whose credentials were verified
//! elsewhere, and produces the two client-side values: the sealed session
//! cookie and the CSRF token.

use std::collections::BTreeMap;
use std::sync::Arc;

use kernel::id::IdentityId;

use crate::application::codec::SessionCodec;
use crate::application::config::AuthConfig;
use crate::application::csrf::CsrfGuard;
use crate::domain::repository::SessionRepository;
use crate::domain::session::SessionRecord;
use crate::error::{AuthError, AuthResult};

/// Issue session output
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub record: SessionRecord,
    /// Value for the HttpOnly session cookie
    pub sealed_cookie: String,
    /// Value for the readable CSRF channel
    pub csrf_token: String,
}

/// Issue session use case
pub struct IssueSessionUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> IssueSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        identity_id: IdentityId,
        attributes: BTreeMap<String, String>,
    ) -> AuthResult<IssuedSession> {
        let record = SessionRecord::new(
            identity_id,
            self.config.session_ttl_chrono()?,
            CsrfGuard::new_secret(),
            attributes,
        );

        self.session_repo.create(&record).await?;

        let csrf_token = CsrfGuard
            .issue_token(&record)
            .ok_or_else(|| AuthError::Internal("fresh CSRF secret undecodable".into()))?;
        let sealed_cookie = SessionCodec::new(self.config.session_secret).seal(&record.session_id);

        tracing::info!(
            identity_id = %identity_id,
            session_id = %record.session_id,
            expires_at = %record.expires_at,
            "Session issued"
        );

        Ok(IssuedSession {
            record,
            sealed_cookie,
            csrf_token,
        })
    }
}
