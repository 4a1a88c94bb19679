//! Request Context
//!
//! The immutable identity value the gate attaches to a request. Handlers
//! receive it by value; nothing downstream can change who the caller is.

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, SessionId};

use crate::domain::session::SessionRecord;

/// Authenticated caller of one request (or one realtime handshake)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    identity_id: IdentityId,
    session_id: SessionId,
    csrf_token: String,
    expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub(crate) fn from_session(session: &SessionRecord, csrf_token: String) -> Self {
        Self {
            identity_id: session.identity_id,
            session_id: session.session_id,
            csrf_token,
            expires_at: session.expires_at,
        }
    }

    pub fn identity_id(&self) -> IdentityId {
        self.identity_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// The token the client must echo on mutating requests
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
