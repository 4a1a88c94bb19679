//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod codec;
pub mod config;
pub mod context;
pub mod csrf;
pub mod gate;
pub mod issue_session;
pub mod sign_out;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use codec::SessionCodec;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use csrf::CsrfGuard;
pub use gate::{GateInput, RequestGate};
pub use issue_session::{IssueSessionUseCase, IssuedSession};
pub use sign_out::SignOutUseCase;
