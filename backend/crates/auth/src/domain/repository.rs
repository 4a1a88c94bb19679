//! Repository Traits
//!
//! Interfaces for the shared session store and the identity lookup the
//! Auth Gate depends on. Implementations are in the infrastructure layer
//! (or, for identities, in the crate that owns the relational store).

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, SessionId};

use crate::domain::session::SessionRecord;
use crate::error::AuthResult;

/// Session store trait
///
/// Implementations must be reachable by every fleet member. A store that
/// cannot be reached returns `AuthError::StoreUnavailable`, never a miss.
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Persist a new record with its absolute TTL
    async fn create(&self, record: &SessionRecord) -> AuthResult<()>;

    /// Load a record; `None` when absent
    async fn load(&self, session_id: &SessionId) -> AuthResult<Option<SessionRecord>>;

    /// Record activity without extending the TTL
    async fn touch(&self, session_id: &SessionId, seen_at: DateTime<Utc>) -> AuthResult<()>;

    /// Delete a record; `true` if it existed
    async fn destroy(&self, session_id: &SessionId) -> AuthResult<bool>;

    /// Delete every record of an identity, returns how many were removed
    async fn destroy_all_for_identity(&self, identity_id: &IdentityId) -> AuthResult<u64>;
}

/// Identity existence lookup
///
/// A session whose identity is gone must never pass the gate.
#[trait_variant::make(IdentityDirectory: Send)]
pub trait LocalIdentityDirectory {
    async fn identity_exists(&self, identity_id: &IdentityId) -> AuthResult<bool>;
}
