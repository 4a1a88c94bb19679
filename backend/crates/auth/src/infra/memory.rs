//! In-process doubles of the shared backend
//!
//! Clones share state, so two handles stand for two fleet members talking
//! to the same store. Expired records are kept until
//! [`MemorySessionRepository::evict_expired`] runs, which models a store
//! whose eviction lags behind the clock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, SessionId};
use tokio::sync::Mutex;

use crate::domain::repository::{IdentityDirectory, SessionRepository};
use crate::domain::session::SessionRecord;
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct SessionState {
    records: HashMap<SessionId, SessionRecord>,
    index: HashMap<IdentityId, HashSet<SessionId>>,
}

/// Shared in-memory session store
#[derive(Clone, Default)]
pub struct MemorySessionRepository {
    state: Arc<Mutex<SessionState>>,
    unreachable: Arc<AtomicBool>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the backend were down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Drop records past their expiry
    pub async fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut state = self.state.lock().await;
        let expired: Vec<SessionId> = state
            .records
            .values()
            .filter(|r| r.is_expired_at(now))
            .map(|r| r.session_id)
            .collect();
        for id in &expired {
            remove(&mut state, id);
        }
        expired.len()
    }

    /// Insert a record as-is (tests use this to plant expired sessions)
    pub async fn insert_raw(&self, record: SessionRecord) {
        let mut state = self.state.lock().await;
        state
            .index
            .entry(record.identity_id)
            .or_default()
            .insert(record.session_id);
        state.records.insert(record.session_id, record);
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    fn check_reachable(&self) -> AuthResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AuthError::StoreUnavailable("memory backend offline".into()));
        }
        Ok(())
    }
}

fn remove(state: &mut SessionState, session_id: &SessionId) -> Option<SessionRecord> {
    let record = state.records.remove(session_id)?;
    if let Some(ids) = state.index.get_mut(&record.identity_id) {
        ids.remove(session_id);
        if ids.is_empty() {
            state.index.remove(&record.identity_id);
        }
    }
    Some(record)
}

impl SessionRepository for MemorySessionRepository {
    async fn create(&self, record: &SessionRecord) -> AuthResult<()> {
        self.check_reachable()?;
        self.insert_raw(record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &SessionId) -> AuthResult<Option<SessionRecord>> {
        self.check_reachable()?;
        Ok(self.state.lock().await.records.get(session_id).cloned())
    }

    async fn touch(&self, session_id: &SessionId, seen_at: DateTime<Utc>) -> AuthResult<()> {
        self.check_reachable()?;
        if let Some(record) = self.state.lock().await.records.get_mut(session_id) {
            record.touch(seen_at);
        }
        Ok(())
    }

    async fn destroy(&self, session_id: &SessionId) -> AuthResult<bool> {
        self.check_reachable()?;
        Ok(remove(&mut *self.state.lock().await, session_id).is_some())
    }

    async fn destroy_all_for_identity(&self, identity_id: &IdentityId) -> AuthResult<u64> {
        self.check_reachable()?;
        let mut state = self.state.lock().await;
        let ids = state.index.remove(identity_id).unwrap_or_default();
        let mut deleted = 0;
        for id in ids {
            if state.records.remove(&id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

/// Shared in-memory identity directory
#[derive(Clone, Default)]
pub struct MemoryIdentityDirectory {
    identities: Arc<Mutex<HashSet<IdentityId>>>,
}

impl MemoryIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, identity_id: IdentityId) {
        self.identities.lock().await.insert(identity_id);
    }

    pub async fn remove(&self, identity_id: &IdentityId) {
        self.identities.lock().await.remove(identity_id);
    }
}

impl IdentityDirectory for MemoryIdentityDirectory {
    async fn identity_exists(&self, identity_id: &IdentityId) -> AuthResult<bool> {
        Ok(self.identities.lock().await.contains(identity_id))
    }
}
