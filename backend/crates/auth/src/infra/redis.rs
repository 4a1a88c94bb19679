//! Redis Session Store
//!
//! Layout:
//! - `session:{session_id}` → JSON [`SessionRecord`], PX = remaining TTL
//! - `identity_sessions:{identity_id}` → SET of session ids
//!
//! Every session of an identity gets the same absolute TTL, so the index
//! simply takes the TTL of the newest session.

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, SessionId};
use redis::aio::MultiplexedConnection;

use crate::domain::repository::SessionRepository;
use crate::domain::session::SessionRecord;
use crate::error::{AuthError, AuthResult};

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisSessionRepository {
    conn: MultiplexedConnection,
}

impl RedisSessionRepository {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    fn session_key(session_id: &SessionId) -> String {
        format!("session:{}", session_id)
    }

    fn index_key(identity_id: &IdentityId) -> String {
        format!("identity_sessions:{}", identity_id)
    }
}

impl SessionRepository for RedisSessionRepository {
    async fn create(&self, record: &SessionRecord) -> AuthResult<()> {
        let ttl_ms = record.remaining_ms();
        if ttl_ms <= 0 {
            return Err(AuthError::Internal("refusing to store an expired session".into()));
        }

        let payload = serde_json::to_string(record)?;
        let index_key = Self::index_key(&record.identity_id);
        let mut conn = self.conn.clone();

        redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(Self::session_key(&record.session_id))
            .arg(payload)
            .arg("PX")
            .arg(ttl_ms)
            .arg("NX")
            .ignore()
            .cmd("SADD")
            .arg(&index_key)
            .arg(record.session_id.to_string())
            .ignore()
            .cmd("PEXPIRE")
            .arg(&index_key)
            .arg(ttl_ms)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn load(&self, session_id: &SessionId) -> AuthResult<Option<SessionRecord>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(Self::session_key(session_id))
            .query_async::<Option<String>>(&mut conn)
            .await?;

        value
            .map(|json| serde_json::from_str::<SessionRecord>(&json))
            .transpose()
            .map_err(AuthError::from)
    }

    async fn touch(&self, session_id: &SessionId, seen_at: DateTime<Utc>) -> AuthResult<()> {
        let Some(mut record) = self.load(session_id).await? else {
            return Ok(());
        };
        record.touch(seen_at);

        // XX: never resurrect a session destroyed since the load.
        // KEEPTTL: activity does not extend the absolute lifetime.
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(Self::session_key(session_id))
            .arg(serde_json::to_string(&record)?)
            .arg("XX")
            .arg("KEEPTTL")
            .query_async::<Option<String>>(&mut conn)
            .await?;

        Ok(())
    }

    async fn destroy(&self, session_id: &SessionId) -> AuthResult<bool> {
        let record = self.load(session_id).await?;
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic().cmd("DEL").arg(Self::session_key(session_id));
        if let Some(record) = &record {
            pipe.cmd("SREM")
                .arg(Self::index_key(&record.identity_id))
                .arg(session_id.to_string())
                .ignore();
        }
        let (deleted,): (u64,) = pipe.query_async(&mut conn).await?;

        Ok(deleted > 0)
    }

    async fn destroy_all_for_identity(&self, identity_id: &IdentityId) -> AuthResult<u64> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(Self::index_key(identity_id))
            .query_async::<Vec<String>>(&mut conn)
            .await?;

        self.revoke_listed(identity_id, &members).await
    }
}

impl RedisSessionRepository {
    /// Delete the listed sessions and drop exactly those ids from the index
    ///
    /// A session created after the SMEMBERS read stays indexed, so the next
    /// revocation still finds it.
    async fn revoke_listed(
        &self,
        identity_id: &IdentityId,
        members: &[String],
    ) -> AuthResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }

        let keys: Vec<String> = members.iter().map(|id| format!("session:{}", id)).collect();
        let mut conn = self.conn.clone();

        let (deleted,): (u64,) = redis::pipe()
            .atomic()
            .cmd("DEL")
            .arg(&keys)
            .cmd("SREM")
            .arg(Self::index_key(identity_id))
            .arg(members)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(deleted)
    }
}
