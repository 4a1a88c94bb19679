//! Local Connection Registry
//!
//! The connections this fleet member holds. Nothing here is shared with
//! other members; they reach these connections through the bus.

use std::collections::{HashMap, HashSet};

use kernel::id::{ConnectionId, IdentityId};
use tokio::sync::{RwLock, mpsc, oneshot};

use crate::domain::binding::ConnectionBinding;
use crate::domain::event::EventTarget;
use crate::error::{RealtimeError, RealtimeResult};

/// Sending half of one local connection
pub(crate) struct LocalConnection {
    pub binding: ConnectionBinding,
    pub frames: mpsc::Sender<String>,
    pub close: oneshot::Sender<String>,
    pub rooms: HashSet<String>,
}

/// Registry of locally bound connections
#[derive(Default)]
pub struct LocalConnections {
    inner: RwLock<HashMap<ConnectionId, LocalConnection>>,
}

impl LocalConnections {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn insert(&self, connection: LocalConnection) {
        self.inner
            .write()
            .await
            .insert(connection.binding.connection_id, connection);
    }

    pub(crate) async fn remove(&self, connection_id: &ConnectionId) -> Option<LocalConnection> {
        self.inner.write().await.remove(connection_id)
    }

    /// Remove every connection matching a target
    pub(crate) async fn remove_matching(&self, target: &EventTarget) -> Vec<LocalConnection> {
        let mut inner = self.inner.write().await;
        let ids: Vec<ConnectionId> = inner
            .values()
            .filter(|c| matches_target(c, target))
            .map(|c| c.binding.connection_id)
            .collect();
        ids.iter().filter_map(|id| inner.remove(id)).collect()
    }

    /// Frame senders of every connection matching a target
    pub(crate) async fn senders_for(
        &self,
        target: &EventTarget,
    ) -> Vec<(ConnectionId, mpsc::Sender<String>)> {
        self.inner
            .read()
            .await
            .values()
            .filter(|c| matches_target(c, target))
            .map(|c| (c.binding.connection_id, c.frames.clone()))
            .collect()
    }

    pub(crate) async fn join(
        &self,
        connection_id: &ConnectionId,
        room: &str,
        max_rooms: usize,
    ) -> RealtimeResult<()> {
        let mut inner = self.inner.write().await;
        let connection = inner
            .get_mut(connection_id)
            .ok_or_else(|| RealtimeError::Internal("join on unbound connection".into()))?;
        if !connection.rooms.contains(room) && connection.rooms.len() >= max_rooms {
            return Err(RealtimeError::RoomLimit);
        }
        connection.rooms.insert(room.to_string());
        Ok(())
    }

    pub(crate) async fn leave(&self, connection_id: &ConnectionId, room: &str) -> bool {
        self.inner
            .write()
            .await
            .get_mut(connection_id)
            .is_some_and(|c| c.rooms.remove(room))
    }

    /// Number of local connections
    pub async fn count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Local connections of one identity
    pub async fn count_for(&self, identity_id: &IdentityId) -> usize {
        self.inner
            .read()
            .await
            .values()
            .filter(|c| c.binding.identity_id == *identity_id)
            .count()
    }
}

fn matches_target(connection: &LocalConnection, target: &EventTarget) -> bool {
    match target {
        EventTarget::Identity(id) => connection.binding.identity_id == *id,
        EventTarget::Room(room) => connection.rooms.contains(room),
    }
}
