//! Fanout Bus Trait
//!
//! The shared pub/sub backend every fleet member subscribes to.
//! Implementations are in the infrastructure layer.

use tokio::sync::mpsc;

use crate::error::RealtimeResult;

/// Pub/sub bus trait
///
/// Ordering is only guaranteed per publisher; delivery is at-most-once.
#[trait_variant::make(FanoutBus: Send)]
pub trait LocalFanoutBus {
    /// Publish a payload on a channel
    async fn publish(&self, channel: &str, payload: String) -> RealtimeResult<()>;

    /// Subscribe to a channel
    ///
    /// The subscription is live once this returns; payloads published
    /// afterwards arrive on the receiver in publish order.
    async fn subscribe(&self, channel: &str) -> RealtimeResult<mpsc::Receiver<String>>;
}
