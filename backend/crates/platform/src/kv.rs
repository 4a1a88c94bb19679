//! Shared Key-Value / Pub-Sub Backend
//!
//! Every fleet member talks to the same Redis deployment: sessions live
//! there and realtime events travel over its pub/sub channels. This module
//! only owns connecting and classifying failures; data layout belongs to
//! the crates that store things.

use redis::aio::MultiplexedConnection;
use redis::{Client, ErrorKind, RedisError};

/// Handles to the shared backend
///
/// `connection` is multiplexed and cheap to clone; `client` is kept to
/// open dedicated pub/sub connections.
#[derive(Clone)]
pub struct SharedBackend {
    pub client: Client,
    pub connection: MultiplexedConnection,
}

impl SharedBackend {
    /// Open the client and verify reachability with a PING
    pub async fn connect(url: &str) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let mut connection = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut connection)
            .await?;

        tracing::info!("Connected to shared key-value backend");
        Ok(Self { client, connection })
    }
}

/// Whether the error means the backend could not be reached
///
/// These are retryable from the caller's point of view. Anything else
/// (type errors, script errors) is a defect on our side.
pub fn is_unavailable(err: &RedisError) -> bool {
    err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
        || matches!(
            err.kind(),
            ErrorKind::BusyLoadingError
                | ErrorKind::TryAgain
                | ErrorKind::ClusterDown
                | ErrorKind::MasterDown
        )
}
