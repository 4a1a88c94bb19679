//! Presentation Layer
//!
//! HTTP handlers, DTOs, router.

pub mod dto;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::account_router;
pub use state::AccountState;
