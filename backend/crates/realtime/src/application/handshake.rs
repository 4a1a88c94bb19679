//! Realtime Handshake
//!
//! Runs the same session lookup as the HTTP gate, on whichever member
//! terminates the connection. A failure refuses the upgrade; nothing is
//! exchanged over the socket.
//!
//! Once upgraded, the connection is bound and the lookup runs a second
//! time. A deletion whose force-close was published between the two never
//! reached this binding, so the second lookup is what catches it.

use auth::{AuthContext, AuthError, CheckSessionUseCase, IdentityDirectory, SessionRepository};

use crate::application::config::RealtimeConfig;
use crate::application::relay::{BoundConnection, FanoutRelay};
use crate::domain::bus::FanoutBus;
use crate::error::{RealtimeError, RealtimeResult};

/// What the handshake reads from the upgrade request
#[derive(Debug, Clone, Copy, Default)]
pub struct HandshakeInput<'a> {
    pub origin: Option<&'a str>,
    pub session_cookie: Option<&'a str>,
}

/// Handshake authentication use case
pub struct RealtimeHandshake<'a, S, D>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    check: CheckSessionUseCase<S, D>,
    config: &'a RealtimeConfig,
}

impl<'a, S, D> RealtimeHandshake<'a, S, D>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    pub fn new(check: CheckSessionUseCase<S, D>, config: &'a RealtimeConfig) -> Self {
        Self { check, config }
    }

    pub async fn authenticate(&self, input: HandshakeInput<'_>) -> RealtimeResult<AuthContext> {
        if !self.config.origin_allowed(input.origin) {
            return Err(RealtimeError::OriginRejected(
                input.origin.unwrap_or_default().to_string(),
            ));
        }

        Ok(self.check.authenticate(input.session_cookie).await?)
    }
}

/// Bind the upgraded connection, then confirm the session still resolves
///
/// On failure the binding is removed again before returning.
pub async fn bind_confirmed<S, D, F>(
    relay: &FanoutRelay<F>,
    check: &CheckSessionUseCase<S, D>,
    session_cookie: Option<&str>,
    context: &AuthContext,
) -> RealtimeResult<BoundConnection>
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
    F: FanoutBus + Send + Sync + 'static,
{
    let bound = relay.bind(context.identity_id()).await;

    let error = match check.authenticate(session_cookie).await {
        Ok(current) if current.session_id() == context.session_id() => {
            check.record_activity(&current);
            return Ok(bound);
        }
        Ok(_) => RealtimeError::Auth(AuthError::SessionNotFound),
        Err(e) => RealtimeError::Auth(e),
    };

    tracing::info!(
        connection_id = %bound.binding.connection_id,
        identity_id = %context.identity_id(),
        error = %error,
        "Session revoked before the connection was bound"
    );
    relay.unbind(&bound.binding.connection_id).await;
    Err(error)
}
