//! Fanout Relay
//!
//! Every member publishes events to one shared bus channel and runs one
//! subscriber that forwards matching events to its own connections.
//! Publishers see their own events through the bus like everyone else, so
//! a single path delivers locally and remotely.
//!
//! Delivery to a connection is at-most-once: a full or closed connection
//! buffer drops the frame, nothing is retried.

use std::collections::HashSet;
use std::sync::Arc;

use kernel::id::{ConnectionId, IdentityId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::application::config::RealtimeConfig;
use crate::application::frames::ServerFrame;
use crate::application::registry::{LocalConnection, LocalConnections};
use crate::domain::binding::ConnectionBinding;
use crate::domain::bus::FanoutBus;
use crate::domain::event::{EventBody, EventTarget, RelayEvent, is_valid_room};
use crate::error::{RealtimeError, RealtimeResult};

/// A connection just bound on this member
pub struct BoundConnection {
    pub binding: ConnectionBinding,
    /// Frames to write to the socket
    pub frames: mpsc::Receiver<String>,
    /// Resolves with a reason when the connection is force-closed
    pub closed: oneshot::Receiver<String>,
}

/// Fanout relay
pub struct FanoutRelay<F>
where
    F: FanoutBus + Send + Sync + 'static,
{
    bus: Arc<F>,
    config: Arc<RealtimeConfig>,
    connections: Arc<LocalConnections>,
}

impl<F> Clone for FanoutRelay<F>
where
    F: FanoutBus + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            bus: self.bus.clone(),
            config: self.config.clone(),
            connections: self.connections.clone(),
        }
    }
}

impl<F> FanoutRelay<F>
where
    F: FanoutBus + Send + Sync + 'static,
{
    pub fn new(bus: Arc<F>, config: Arc<RealtimeConfig>) -> Self {
        Self {
            bus,
            config,
            connections: Arc::new(LocalConnections::new()),
        }
    }

    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    pub fn connections(&self) -> &LocalConnections {
        &self.connections
    }

    /// Register an authenticated connection on this member
    pub async fn bind(&self, identity_id: IdentityId) -> BoundConnection {
        let binding = ConnectionBinding::new(identity_id, self.config.fleet_member_id);
        let (frames_tx, frames_rx) = mpsc::channel(self.config.outbound_buffer);
        let (close_tx, close_rx) = oneshot::channel();

        self.connections
            .insert(LocalConnection {
                binding,
                frames: frames_tx,
                close: close_tx,
                rooms: HashSet::new(),
            })
            .await;

        tracing::info!(
            connection_id = %binding.connection_id,
            identity_id = %identity_id,
            fleet_member_id = %binding.fleet_member_id,
            "Connection bound"
        );

        BoundConnection {
            binding,
            frames: frames_rx,
            closed: close_rx,
        }
    }

    /// Forget a connection after its socket ended
    pub async fn unbind(&self, connection_id: &ConnectionId) {
        if self.connections.remove(connection_id).await.is_some() {
            tracing::info!(connection_id = %connection_id, "Connection unbound");
        }
    }

    pub async fn join_room(&self, connection_id: &ConnectionId, room: &str) -> RealtimeResult<()> {
        if !is_valid_room(room) {
            return Err(RealtimeError::InvalidRoom);
        }
        self.connections
            .join(connection_id, room, self.config.max_rooms_per_connection)
            .await
    }

    pub async fn leave_room(&self, connection_id: &ConnectionId, room: &str) -> bool {
        self.connections.leave(connection_id, room).await
    }

    /// Publish an event to the whole fleet
    pub async fn publish(&self, target: EventTarget, body: EventBody) -> RealtimeResult<()> {
        let event = RelayEvent {
            origin: self.config.fleet_member_id,
            target,
            body,
        };
        let payload = serde_json::to_string(&event)?;
        self.bus.publish(&self.config.channel, payload).await?;

        tracing::debug!(event_target = ?event.target, force_close = event.is_force_close(), "Event published");
        Ok(())
    }

    /// Send an application payload to every connection of an identity
    pub async fn send_to_identity(
        &self,
        identity_id: IdentityId,
        payload: serde_json::Value,
    ) -> RealtimeResult<()> {
        self.publish(EventTarget::Identity(identity_id), EventBody::Message { payload })
            .await
    }

    /// Close every connection of an identity, wherever it is held
    pub async fn force_close(
        &self,
        identity_id: IdentityId,
        reason: impl Into<String>,
    ) -> RealtimeResult<()> {
        self.publish(
            EventTarget::Identity(identity_id),
            EventBody::ForceClose {
                reason: reason.into(),
            },
        )
        .await
    }

    /// Apply one bus event to the connections held here
    ///
    /// Returns how many connections it reached.
    pub async fn deliver_local(&self, event: &RelayEvent) -> usize {
        match &event.body {
            EventBody::ForceClose { reason } => {
                let closed = self.connections.remove_matching(&event.target).await;
                let count = closed.len();
                for connection in closed {
                    // Receiver gone means the socket already ended
                    let _ = connection.close.send(reason.clone());
                    tracing::info!(
                        connection_id = %connection.binding.connection_id,
                        identity_id = %connection.binding.identity_id,
                        origin = %event.origin,
                        reason = %reason,
                        "Connection force-closed"
                    );
                }
                count
            }
            EventBody::Message { payload } => {
                let room = match &event.target {
                    EventTarget::Room(room) => Some(room.clone()),
                    EventTarget::Identity(_) => None,
                };
                let text = ServerFrame::Event {
                    room,
                    payload: payload.clone(),
                }
                .to_text();

                let mut delivered = 0;
                for (connection_id, sender) in self.connections.senders_for(&event.target).await {
                    match sender.try_send(text.clone()) {
                        Ok(()) => delivered += 1,
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            tracing::warn!(connection_id = %connection_id, "Outbound buffer full, event dropped");
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {
                            tracing::debug!(connection_id = %connection_id, "Connection gone, event dropped");
                        }
                    }
                }
                delivered
            }
        }
    }

    /// Subscribe to the bus and forward events until the subscription ends
    ///
    /// The subscription is live when this returns.
    pub async fn spawn_subscriber(&self) -> RealtimeResult<JoinHandle<()>> {
        let mut rx = self.bus.subscribe(&self.config.channel).await?;
        let relay = self.clone();

        tracing::info!(
            channel = %self.config.channel,
            fleet_member_id = %self.config.fleet_member_id,
            "Fanout subscriber started"
        );

        Ok(tokio::spawn(async move {
            while let Some(payload) = rx.recv().await {
                match serde_json::from_str::<RelayEvent>(&payload) {
                    Ok(event) => {
                        relay.deliver_local(&event).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Ignoring malformed relay event");
                    }
                }
            }
            tracing::warn!("Fanout subscription ended");
        }))
    }
}
