//! Router state

use auth::{AuthGateState, IdentityDirectory, SessionRepository};

use crate::application::ports::{AccountDeps, AccountPorts};

/// Account router state
pub struct AccountState<P, S, D>
where
    P: AccountPorts,
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    pub auth: AuthGateState<S, D>,
    pub deps: AccountDeps<P>,
}

impl<P, S, D> Clone for AccountState<P, S, D>
where
    P: AccountPorts,
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            deps: self.deps.clone(),
        }
    }
}
