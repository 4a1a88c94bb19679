//! Connection Frames
//!
//! JSON text frames exchanged over an open connection.

use kernel::id::{ConnectionId, IdentityId};
use serde::{Deserialize, Serialize};

/// Frames a client may send
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    Join { room: String },
    Leave { room: String },
    Ping,
}

/// Frames the server sends
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    /// First frame after the handshake
    Ready {
        connection_id: ConnectionId,
        identity_id: IdentityId,
    },
    /// Relayed application event
    Event {
        #[serde(skip_serializing_if = "Option::is_none")]
        room: Option<String>,
        payload: serde_json::Value,
    },
    Joined { room: String },
    Left { room: String },
    Pong,
    Error { code: String, message: String },
}

impl ServerFrame {
    pub fn to_text(&self) -> String {
        // A tagged enum of strings and JSON values always serializes
        serde_json::to_string(self).unwrap_or_else(|_| "{\"type\":\"error\"}".to_string())
    }
}
