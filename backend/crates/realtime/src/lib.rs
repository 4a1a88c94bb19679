//! Realtime Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Connection binding, relay events, bus trait
//! - `application/` - Fanout relay, local registry, handshake, frames
//! - `infra/` - Redis pub/sub bus (and an in-process double)
//! - `presentation/` - WebSocket handler, router
//!
//! ## Delivery Model
//! - Any member publishes; every member subscribes to the same channel and
//!   forwards matching events to the connections it holds
//! - Order is kept per publisher only, delivery is at-most-once
//! - Connections are authenticated once at handshake and only leave on
//!   disconnect or a published force-close

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::RealtimeConfig;
pub use application::relay::FanoutRelay;
pub use domain::bus::FanoutBus;
pub use domain::event::{EventBody, EventTarget, RelayEvent};
pub use error::{RealtimeError, RealtimeResult};
pub use infra::redis::RedisFanoutBus;
pub use presentation::{RealtimeState, realtime_router};
