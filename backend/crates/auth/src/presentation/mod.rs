//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod attributes;
pub mod cookies;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use middleware::{AuthGateState, require_session};
pub use router::auth_router;
