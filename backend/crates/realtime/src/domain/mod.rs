//! Domain Layer
//!
//! Connection binding, relay event envelope and the bus trait.

pub mod binding;
pub mod bus;
pub mod event;

// Re-exports
pub use binding::ConnectionBinding;
pub use bus::FanoutBus;
pub use event::{EventBody, EventTarget, RelayEvent};
