//! In-process fanout bus
//!
//! Clones share the channels, so two relays built on clones of one bus
//! behave like two fleet members on one pub/sub backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, broadcast, mpsc};

use crate::domain::bus::FanoutBus;
use crate::error::{RealtimeError, RealtimeResult};

const CHANNEL_CAPACITY: usize = 256;

/// Shared in-memory bus
#[derive(Clone, Default)]
pub struct MemoryFanoutBus {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<String>>>>,
    unreachable: Arc<AtomicBool>,
}

impl MemoryFanoutBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make publishing fail as if the backend were down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    async fn sender(&self, channel: &str) -> broadcast::Sender<String> {
        self.channels
            .lock()
            .await
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl FanoutBus for MemoryFanoutBus {
    async fn publish(&self, channel: &str, payload: String) -> RealtimeResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RealtimeError::BusUnavailable("memory bus offline".into()));
        }
        // No subscribers is not an error on a pub/sub bus
        let _ = self.sender(channel).await.send(payload);
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> RealtimeResult<mpsc::Receiver<String>> {
        let mut source = self.sender(channel).await.subscribe();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            loop {
                match source.recv().await {
                    Ok(payload) => {
                        if tx.send(payload).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Memory bus subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(rx)
    }
}
