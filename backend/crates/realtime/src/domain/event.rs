//! Relay Events
//!
//! The envelope every fleet member publishes to and reads from the shared
//! bus. Members only ever act on events for connections they hold.

use kernel::id::{FleetMemberId, IdentityId};
use serde::{Deserialize, Serialize};

/// Longest accepted room name
pub const MAX_ROOM_LEN: usize = 64;

/// Who an event is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum EventTarget {
    /// Every connection of one identity
    Identity(IdentityId),
    /// Every connection that joined a named room
    Room(String),
}

/// What the event carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventBody {
    /// Opaque application payload forwarded to the client
    Message { payload: serde_json::Value },
    /// Close the matching connections
    ForceClose { reason: String },
}

/// Bus envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayEvent {
    /// Publishing member, for tracing only
    pub origin: FleetMemberId,
    pub target: EventTarget,
    pub body: EventBody,
}

impl RelayEvent {
    pub fn is_force_close(&self) -> bool {
        matches!(self.body, EventBody::ForceClose { .. })
    }
}

/// Room names: 1..=64 chars of `[A-Za-z0-9_.:-]`
pub fn is_valid_room(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_ROOM_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}
