//! Router state

use auth::{AuthGateState, IdentityDirectory, SessionRepository};

use crate::application::relay::FanoutRelay;
use crate::domain::bus::FanoutBus;

/// Realtime router state
pub struct RealtimeState<S, D, F>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
    F: FanoutBus + Send + Sync + 'static,
{
    pub auth: AuthGateState<S, D>,
    pub relay: FanoutRelay<F>,
}

impl<S, D, F> Clone for RealtimeState<S, D, F>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
    F: FanoutBus + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            relay: self.relay.clone(),
        }
    }
}
