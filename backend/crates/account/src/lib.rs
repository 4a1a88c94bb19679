//! Account Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Identity entity, value objects, deletion report, collaborator traits
//! - `application/` - Deletion orchestrator and profile/picture/payment use cases
//! - `infra/` - Postgres, blob/payment HTTP gateways, Redis lease, access revoker
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Account Deletion
//! Deleting the relational identity record is the single point of no
//! return. Everything after it (blobs, derived documents, sessions, open
//! connections) is best-effort: failures are logged per item and reported
//! in a [`DeletionReport`], but never undo the deletion or fail the request.
//! There is no durable progress ledger; reconciliation after a crash works
//! from the phase logs.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{AccountConfig, AccountDeps, AccountPorts, DeleteAccountUseCase};
pub use domain::deletion::{CleanupStep, DeletionPhase, DeletionReport, PartialCleanupFailure};
pub use error::{AccountError, AccountResult};
pub use infra::live::LivePorts;
pub use presentation::{AccountState, account_router};
