//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Session record, repository traits
//! - `application/` - Codec, CSRF guard, request gate, use cases
//! - `infra/` - Shared key-value backend (and in-process doubles)
//! - `presentation/` - Middleware, handlers, DTOs, router
//!
//! ## Features
//! - Server-side sessions in a store shared by every fleet member
//! - HMAC-sealed session cookie (a forged or altered id never reaches the store)
//! - Per-session CSRF token on every mutating request
//! - Single gate shared by HTTP routes and the realtime handshake
//!
//! ## Security Model
//! - Absolute session expiry, re-checked on every load
//! - Fail closed: an unreachable store rejects the request (503)
//! - Sessions of a deleted identity are rejected even before cleanup

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::context::AuthContext;
pub use application::{CheckSessionUseCase, IssueSessionUseCase, IssuedSession, SignOutUseCase};
pub use domain::repository::{IdentityDirectory, SessionRepository};
pub use error::{AuthError, AuthResult};
pub use infra::redis::RedisSessionRepository;
pub use presentation::middleware::AuthGateState;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::session::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::redis::RedisSessionRepository as SessionStore;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
