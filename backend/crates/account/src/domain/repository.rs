//! Repository and Gateway Traits
//!
//! Everything the account use cases reach outside the process for.
//! Implementations are in the infrastructure layer.

use std::time::Duration;

use kernel::id::IdentityId;

use crate::domain::identity::{Identity, MediaSnapshot, ProfileUpdate};
use crate::error::AccountResult;

/// Relational identity store
#[trait_variant::make(IdentityRepository: Send)]
pub trait LocalIdentityRepository {
    async fn find(&self, identity_id: &IdentityId) -> AccountResult<Option<Identity>>;

    /// Every media reference the identity owns (empty when absent)
    async fn snapshot_media(&self, identity_id: &IdentityId) -> AccountResult<MediaSnapshot>;

    /// Delete the identity and its authored content; `false` if absent
    async fn delete(&self, identity_id: &IdentityId) -> AccountResult<bool>;

    async fn update_profile(
        &self,
        identity_id: &IdentityId,
        update: &ProfileUpdate,
    ) -> AccountResult<Option<Identity>>;

    /// Replace the profile picture
    ///
    /// `Ok(None)` when the identity is absent, `Ok(Some(previous))` otherwise.
    async fn set_picture(
        &self,
        identity_id: &IdentityId,
        url: &str,
    ) -> AccountResult<Option<Option<String>>>;

    async fn set_payment_customer(
        &self,
        identity_id: &IdentityId,
        customer_id: &str,
    ) -> AccountResult<()>;
}

/// Secondary document store holding per-identity derived documents
#[trait_variant::make(DocumentStore: Send)]
pub trait LocalDocumentStore {
    /// Bulk delete; returns how many documents were removed
    async fn delete_all_for_identity(&self, identity_id: &IdentityId) -> AccountResult<u64>;
}

/// Blob storage
#[trait_variant::make(BlobStore: Send)]
pub trait LocalBlobStore {
    /// Store bytes under `key`, returns the public URL
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> AccountResult<String>;

    /// Delete by public URL; an already missing blob is not an error
    async fn delete(&self, url: &str) -> AccountResult<()>;
}

/// Payment provider
#[trait_variant::make(PaymentProvider: Send)]
pub trait LocalPaymentProvider {
    async fn create_customer(&self, email: &str) -> AccountResult<String>;

    async fn create_card(&self, card_token: &str, customer_id: &str) -> AccountResult<String>;
}

/// Tears down live access of an identity (sessions and connections)
#[trait_variant::make(AccessRevoker: Send)]
pub trait LocalAccessRevoker {
    /// Destroy every session; returns how many existed
    async fn revoke_sessions(&self, identity_id: &IdentityId) -> AccountResult<u64>;

    /// Publish a force-close for every open connection, fleet-wide
    async fn force_close_connections(&self, identity_id: &IdentityId) -> AccountResult<()>;
}

/// Per-identity lease serializing deletions
#[trait_variant::make(IdentityLease: Send)]
pub trait LocalIdentityLease {
    /// Take the lease; `None` when someone else holds it
    async fn acquire(&self, identity_id: &IdentityId, ttl: Duration)
    -> AccountResult<Option<String>>;

    /// Release only if `token` still owns the lease
    async fn release(&self, identity_id: &IdentityId, token: &str) -> AccountResult<()>;
}
