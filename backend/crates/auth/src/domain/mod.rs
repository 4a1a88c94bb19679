//! Domain Layer
//!
//! Contains the session entity and repository traits.

pub mod repository;
pub mod session;

// Re-exports
pub use repository::{IdentityDirectory, SessionRepository};
pub use session::SessionRecord;
