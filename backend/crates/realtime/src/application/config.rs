//! Realtime Configuration

use kernel::id::FleetMemberId;

/// Realtime configuration
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Bus channel every member publishes to and subscribes on
    pub channel: String,
    /// This member's id, stamped on bindings and published events
    pub fleet_member_id: FleetMemberId,
    /// Frames buffered per connection before events are dropped
    pub outbound_buffer: usize,
    /// Named rooms one connection may sit in
    pub max_rooms_per_connection: usize,
    /// Browser origins allowed to open a connection; empty allows any
    pub allowed_origins: Vec<String>,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel: "fanout:events".to_string(),
            fleet_member_id: FleetMemberId::new(),
            outbound_buffer: 64,
            max_rooms_per_connection: 32,
            allowed_origins: Vec::new(),
        }
    }
}

impl RealtimeConfig {
    /// Create config for development (any origin)
    pub fn development() -> Self {
        Self::default()
    }

    pub fn with_fleet_member_id(self, fleet_member_id: FleetMemberId) -> Self {
        Self {
            fleet_member_id,
            ..self
        }
    }

    /// Whether a handshake `Origin` header is acceptable
    ///
    /// Non-browser clients send no origin and are let through; the session
    /// cookie still has to authenticate.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(_) if self.allowed_origins.is_empty() => true,
            Some(origin) => self.allowed_origins.iter().any(|o| o == origin),
        }
    }
}
