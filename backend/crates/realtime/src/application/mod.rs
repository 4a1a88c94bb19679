//! Application Layer
//!
//! Relay, local registry, handshake and frame types.

pub mod config;
pub mod frames;
pub mod handshake;
pub mod registry;
pub mod relay;

// Re-exports
pub use config::RealtimeConfig;
pub use frames::{ClientFrame, ServerFrame};
pub use handshake::{HandshakeInput, RealtimeHandshake, bind_confirmed};
pub use registry::LocalConnections;
pub use relay::{BoundConnection, FanoutRelay};
