//! Domain Layer
//!
//! Identity entity, deletion types, value objects and the traits for
//! every external collaborator.

pub mod deletion;
pub mod identity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use deletion::{CleanupStep, DeletionPhase, DeletionReport, PartialCleanupFailure};
pub use identity::{Identity, MediaSnapshot, ProfileUpdate};
pub use repository::{
    AccessRevoker, BlobStore, DocumentStore, IdentityLease, IdentityRepository, PaymentProvider,
};
