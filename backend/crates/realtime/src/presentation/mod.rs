//! Presentation Layer
//!
//! WebSocket handler and router.

pub mod router;
pub mod state;
pub mod ws;

pub use router::realtime_router;
pub use state::RealtimeState;
