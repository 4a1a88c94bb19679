//! Redis Fanout Bus
//!
//! PUBLISH goes over the shared multiplexed connection; each subscription
//! holds a dedicated pub/sub connection and re-subscribes after a drop.
//! Events published while the subscription is down are lost.

use std::time::Duration;

use futures_util::StreamExt;
use redis::Client;
use redis::aio::{MultiplexedConnection, PubSub};
use tokio::sync::mpsc;

use crate::domain::bus::FanoutBus;
use crate::error::RealtimeResult;

/// Delay between re-subscription attempts
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

/// Buffered payloads between the pub/sub reader and the relay
const SUBSCRIPTION_BUFFER: usize = 1024;

/// Redis-backed fanout bus
#[derive(Clone)]
pub struct RedisFanoutBus {
    client: Client,
    conn: MultiplexedConnection,
}

impl RedisFanoutBus {
    pub fn new(client: Client, conn: MultiplexedConnection) -> Self {
        Self { client, conn }
    }

    async fn open(client: &Client, channel: &str) -> redis::RedisResult<PubSub> {
        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;
        Ok(pubsub)
    }
}

impl FanoutBus for RedisFanoutBus {
    async fn publish(&self, channel: &str, payload: String) -> RealtimeResult<()> {
        let mut conn = self.conn.clone();
        let receivers = redis::cmd("PUBLISH")
            .arg(channel)
            .arg(payload)
            .query_async::<i64>(&mut conn)
            .await?;

        tracing::trace!(channel = %channel, receivers, "Published");
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> RealtimeResult<mpsc::Receiver<String>> {
        let first = Self::open(&self.client, channel).await?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let client = self.client.clone();
        let channel = channel.to_string();

        tokio::spawn(async move {
            let mut next = Some(first);
            loop {
                let pubsub = match next.take() {
                    Some(pubsub) => pubsub,
                    None => match Self::open(&client, &channel).await {
                        Ok(pubsub) => {
                            tracing::info!(channel = %channel, "Fanout subscription restored");
                            pubsub
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, channel = %channel, "Fanout re-subscribe failed");
                            tokio::time::sleep(RESUBSCRIBE_DELAY).await;
                            if tx.is_closed() {
                                return;
                            }
                            continue;
                        }
                    },
                };

                let mut messages = pubsub.into_on_message();
                while let Some(msg) = messages.next().await {
                    match msg.get_payload::<String>() {
                        Ok(payload) => {
                            if tx.send(payload).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Undecodable fanout payload");
                        }
                    }
                }

                if tx.is_closed() {
                    return;
                }
                tracing::warn!(channel = %channel, "Fanout subscription dropped, re-subscribing");
                tokio::time::sleep(RESUBSCRIBE_DELAY).await;
            }
        });

        Ok(rx)
    }
}
