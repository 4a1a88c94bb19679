//! Session and connection teardown through the auth and realtime crates

use auth::{SessionRepository, SignOutUseCase};
use kernel::id::IdentityId;
use realtime::{FanoutBus, FanoutRelay};

use crate::domain::repository::AccessRevoker;
use crate::error::AccountResult;

/// Close reason sent to connections of a deleted account
pub const ACCOUNT_DELETED: &str = "account deleted";

/// Revokes access through the shared session store and the fanout relay
pub struct FabricRevoker<S, F>
where
    S: SessionRepository + Send + Sync + 'static,
    F: FanoutBus + Send + Sync + 'static,
{
    sign_out: SignOutUseCase<S>,
    relay: FanoutRelay<F>,
}

impl<S, F> FabricRevoker<S, F>
where
    S: SessionRepository + Send + Sync + 'static,
    F: FanoutBus + Send + Sync + 'static,
{
    pub fn new(sign_out: SignOutUseCase<S>, relay: FanoutRelay<F>) -> Self {
        Self { sign_out, relay }
    }
}

impl<S, F> AccessRevoker for FabricRevoker<S, F>
where
    S: SessionRepository + Send + Sync + 'static,
    F: FanoutBus + Send + Sync + 'static,
{
    async fn revoke_sessions(&self, identity_id: &IdentityId) -> AccountResult<u64> {
        Ok(self.sign_out.execute_all(identity_id).await?)
    }

    async fn force_close_connections(&self, identity_id: &IdentityId) -> AccountResult<()> {
        self.relay.force_close(*identity_id, ACCOUNT_DELETED).await?;
        Ok(())
    }
}
