//! Redis Deletion Lease
//!
//! `deletion_lease:{identity_id}` holds a random owner token with a TTL;
//! release deletes the key only while the token still matches.

use std::time::Duration;

use kernel::id::IdentityId;
use redis::aio::MultiplexedConnection;

use crate::domain::repository::IdentityLease;
use crate::error::AccountResult;

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

/// Redis-backed per-identity lease
#[derive(Clone)]
pub struct RedisIdentityLease {
    conn: MultiplexedConnection,
}

impl RedisIdentityLease {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    fn lease_key(identity_id: &IdentityId) -> String {
        format!("deletion_lease:{}", identity_id)
    }
}

impl IdentityLease for RedisIdentityLease {
    async fn acquire(&self, identity_id: &IdentityId, ttl: Duration) -> AccountResult<Option<String>> {
        let token = platform::crypto::to_base64url(&platform::crypto::random_bytes(16));
        let mut conn = self.conn.clone();

        let set: Option<String> = redis::cmd("SET")
            .arg(Self::lease_key(identity_id))
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;

        Ok(set.map(|_| token))
    }

    async fn release(&self, identity_id: &IdentityId, token: &str) -> AccountResult<()> {
        let mut conn = self.conn.clone();

        let released: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(Self::lease_key(identity_id))
            .arg(token)
            .invoke_async(&mut conn)
            .await?;

        if released == 0 {
            tracing::warn!(identity_id = %identity_id, "Deletion lease expired before release");
        }
        Ok(())
    }
}
