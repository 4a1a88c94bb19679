//! Session Record Entity
//!
//! Server-side authentication state referenced by the sealed cookie.
//! Stored in the shared key-value backend so any fleet member can load it.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{IdentityId, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute keys captured at issuance
pub mod attribute {
    pub const USER_AGENT: &str = "user_agent";
    pub const CLIENT_IP: &str = "client_ip";
}

/// Session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub identity_id: IdentityId,
    pub created_at: DateTime<Utc>,
    /// Absolute expiry; never moved forward by activity
    pub expires_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    /// Per-session secret the CSRF token is derived from (base64url)
    pub csrf_secret: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl SessionRecord {
    /// Create a new session for `identity_id`
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new(
        identity_id: IdentityId,
        ttl: Duration,
        csrf_secret: String,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: SessionId::new(),
            identity_id,
            created_at: now,
            expires_at: now + ttl,
            last_seen_at: now,
            csrf_secret,
            attributes,
        }
    }

    /// Check expiry against an explicit clock
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Remaining lifetime in milliseconds, zero once expired
    pub fn remaining_ms(&self) -> i64 {
        (self.expires_at - Utc::now()).num_milliseconds().max(0)
    }

    /// Update last activity timestamp
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen_at = now;
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
