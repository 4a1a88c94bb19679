//! Connection Binding
//!
//! Exists only while a realtime connection is open, and only after the
//! handshake authenticated. It is never re-validated while open.

use kernel::id::{ConnectionId, FleetMemberId, IdentityId};
use serde::Serialize;

/// Ephemeral binding of one open connection to an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionBinding {
    pub connection_id: ConnectionId,
    pub identity_id: IdentityId,
    /// Member holding the socket
    pub fleet_member_id: FleetMemberId,
}

impl ConnectionBinding {
    pub fn new(identity_id: IdentityId, fleet_member_id: FleetMemberId) -> Self {
        Self {
            connection_id: ConnectionId::new(),
            identity_id,
            fleet_member_id,
        }
    }
}
