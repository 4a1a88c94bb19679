//! Sign Out Use Case
//!
//! Destroys sessions. Realtime connections are not touched here; the
//! caller publishes a force-close if open connections must go too.

use std::sync::Arc;

use kernel::id::{IdentityId, SessionId};

use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Sign out from one session
    pub async fn execute(&self, session_id: &SessionId) -> AuthResult<()> {
        let existed = self.session_repo.destroy(session_id).await?;

        tracing::info!(session_id = %session_id, existed, "Session destroyed");
        Ok(())
    }

    /// Sign out from every session of an identity
    pub async fn execute_all(&self, identity_id: &IdentityId) -> AuthResult<u64> {
        let deleted = self
            .session_repo
            .destroy_all_for_identity(identity_id)
            .await?;

        tracing::info!(
            identity_id = %identity_id,
            deleted = deleted,
            "All sessions of identity destroyed"
        );

        Ok(deleted)
    }
}
