//! Shared harness for account scenarios
//!
//! One `Fabric` is one deployment: a shared session store, a shared bus
//! and two fleet members (`relay_a`, `relay_b`) subscribed to it.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use account::application::ports::{AccountDeps, AccountPorts};
use account::domain::identity::{Identity, MediaSnapshot, ProfileUpdate};
use account::domain::repository::{
    BlobStore, DocumentStore, IdentityLease, IdentityRepository, PaymentProvider,
};
use account::domain::value_object::{DisplayName, Email};
use account::infra::revoker::FabricRevoker;
use account::{AccountConfig, AccountError, AccountResult, AccountState};
use auth::infra::memory::MemorySessionRepository;
use auth::{AuthConfig, AuthGateState, IssueSessionUseCase, IssuedSession, SignOutUseCase};
use chrono::Utc;
use kernel::id::{FleetMemberId, IdentityId};
use realtime::infra::memory::MemoryFanoutBus;
use realtime::{FanoutRelay, RealtimeConfig};
use tokio::sync::Mutex;

// ============================================================================
// Identity repository
// ============================================================================

#[derive(Default)]
struct IdentityState {
    identities: HashMap<IdentityId, Identity>,
    post_pictures: Vec<(IdentityId, String)>,
}

#[derive(Clone, Default)]
pub struct MemoryIdentityRepository {
    state: Arc<Mutex<IdentityState>>,
    fail_delete: Arc<AtomicBool>,
    fail_snapshot: Arc<AtomicBool>,
}

impl MemoryIdentityRepository {
    pub async fn insert(&self, identity: Identity) {
        self.state
            .lock()
            .await
            .identities
            .insert(identity.identity_id, identity);
    }

    pub async fn add_post_picture(&self, identity_id: IdentityId, url: &str) {
        self.state
            .lock()
            .await
            .post_pictures
            .push((identity_id, url.to_string()));
    }

    pub async fn get(&self, identity_id: &IdentityId) -> Option<Identity> {
        self.state.lock().await.identities.get(identity_id).cloned()
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_snapshot(&self, fail: bool) {
        self.fail_snapshot.store(fail, Ordering::SeqCst);
    }
}

impl IdentityRepository for MemoryIdentityRepository {
    async fn find(&self, identity_id: &IdentityId) -> AccountResult<Option<Identity>> {
        Ok(self.get(identity_id).await)
    }

    async fn snapshot_media(&self, identity_id: &IdentityId) -> AccountResult<MediaSnapshot> {
        if self.fail_snapshot.load(Ordering::SeqCst) {
            return Err(AccountError::unavailable("relational store", "offline"));
        }
        let state = self.state.lock().await;
        let profile = state
            .identities
            .get(identity_id)
            .and_then(|i| i.picture_url.clone());
        let posts = state
            .post_pictures
            .iter()
            .filter(|(owner, _)| owner == identity_id)
            .map(|(_, url)| url.clone());
        Ok(MediaSnapshot::new(profile.into_iter().chain(posts)))
    }

    async fn delete(&self, identity_id: &IdentityId) -> AccountResult<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AccountError::unavailable("relational store", "offline"));
        }
        let mut state = self.state.lock().await;
        state.post_pictures.retain(|(owner, _)| owner != identity_id);
        Ok(state.identities.remove(identity_id).is_some())
    }

    async fn update_profile(
        &self,
        identity_id: &IdentityId,
        update: &ProfileUpdate,
    ) -> AccountResult<Option<Identity>> {
        let mut state = self.state.lock().await;
        let Some(identity) = state.identities.get_mut(identity_id) else {
            return Ok(None);
        };
        if let Some(name) = &update.display_name {
            identity.display_name = name.clone();
        }
        if let Some(bio) = &update.bio {
            identity.bio = (!bio.is_empty()).then(|| bio.clone());
        }
        identity.updated_at = Utc::now();
        Ok(Some(identity.clone()))
    }

    async fn set_picture(
        &self,
        identity_id: &IdentityId,
        url: &str,
    ) -> AccountResult<Option<Option<String>>> {
        let mut state = self.state.lock().await;
        Ok(state
            .identities
            .get_mut(identity_id)
            .map(|identity| identity.picture_url.replace(url.to_string())))
    }

    async fn set_payment_customer(
        &self,
        identity_id: &IdentityId,
        customer_id: &str,
    ) -> AccountResult<()> {
        let mut state = self.state.lock().await;
        let identity = state
            .identities
            .get_mut(identity_id)
            .ok_or(AccountError::NotFound)?;
        identity.payment_customer_id = Some(customer_id.to_string());
        Ok(())
    }
}

impl auth::IdentityDirectory for MemoryIdentityRepository {
    async fn identity_exists(&self, identity_id: &IdentityId) -> auth::AuthResult<bool> {
        Ok(self.state.lock().await.identities.contains_key(identity_id))
    }
}

// ============================================================================
// Document store
// ============================================================================

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<Mutex<HashMap<IdentityId, u64>>>,
    fail: Arc<AtomicBool>,
}

impl MemoryDocumentStore {
    pub async fn put(&self, identity_id: IdentityId, count: u64) {
        *self.documents.lock().await.entry(identity_id).or_default() += count;
    }

    pub async fn count(&self, identity_id: &IdentityId) -> u64 {
        self.documents
            .lock()
            .await
            .get(identity_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn delete_all_for_identity(&self, identity_id: &IdentityId) -> AccountResult<u64> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AccountError::unavailable("document store", "offline"));
        }
        Ok(self
            .documents
            .lock()
            .await
            .remove(identity_id)
            .unwrap_or_default())
    }
}

// ============================================================================
// Blob store
// ============================================================================

pub const BLOB_BASE: &str = "https://blobs.test";

#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashSet<String>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    deletes: Arc<AtomicUsize>,
}

impl MemoryBlobStore {
    pub async fn put(&self, url: &str) {
        self.blobs.lock().await.insert(url.to_string());
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.blobs.lock().await.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    /// Make deleting this URL fail
    pub async fn fail_on(&self, url: &str) {
        self.failing.lock().await.insert(url.to_string());
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, _content_type: &str, _bytes: Vec<u8>) -> AccountResult<String> {
        let url = format!("{BLOB_BASE}/{key}");
        self.put(&url).await;
        Ok(url)
    }

    async fn delete(&self, url: &str) -> AccountResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().await.contains(url) {
            return Err(AccountError::unavailable("blob store", "simulated failure"));
        }
        // Missing blobs are fine
        self.blobs.lock().await.remove(url);
        Ok(())
    }
}

// ============================================================================
// Payment provider
// ============================================================================

#[derive(Clone, Default)]
pub struct MemoryPaymentProvider {
    customers: Arc<AtomicUsize>,
    cards: Arc<AtomicUsize>,
}

impl MemoryPaymentProvider {
    pub fn customers_created(&self) -> usize {
        self.customers.load(Ordering::SeqCst)
    }
}

impl PaymentProvider for MemoryPaymentProvider {
    async fn create_customer(&self, _email: &str) -> AccountResult<String> {
        let n = self.customers.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("cus_{n}"))
    }

    async fn create_card(&self, _card_token: &str, customer_id: &str) -> AccountResult<String> {
        let n = self.cards.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("card_{n}_{customer_id}"))
    }
}

// ============================================================================
// Lease
// ============================================================================

#[derive(Clone, Default)]
pub struct MemoryIdentityLease {
    held: Arc<Mutex<HashMap<IdentityId, String>>>,
}

impl MemoryIdentityLease {
    pub async fn is_held(&self, identity_id: &IdentityId) -> bool {
        self.held.lock().await.contains_key(identity_id)
    }
}

impl IdentityLease for MemoryIdentityLease {
    async fn acquire(&self, identity_id: &IdentityId, _ttl: Duration) -> AccountResult<Option<String>> {
        let mut held = self.held.lock().await;
        if held.contains_key(identity_id) {
            return Ok(None);
        }
        let token = uuid::Uuid::new_v4().to_string();
        held.insert(*identity_id, token.clone());
        Ok(Some(token))
    }

    async fn release(&self, identity_id: &IdentityId, token: &str) -> AccountResult<()> {
        let mut held = self.held.lock().await;
        if held.get(identity_id).map(String::as_str) == Some(token) {
            held.remove(identity_id);
        }
        Ok(())
    }
}

// ============================================================================
// Ports + fabric
// ============================================================================

pub enum TestPorts {}

impl AccountPorts for TestPorts {
    type Identities = MemoryIdentityRepository;
    type Documents = MemoryDocumentStore;
    type Blobs = MemoryBlobStore;
    type Payments = MemoryPaymentProvider;
    type Revoker = FabricRevoker<MemorySessionRepository, MemoryFanoutBus>;
    type Lease = MemoryIdentityLease;
}

pub struct Fabric {
    pub sessions: MemorySessionRepository,
    pub bus: MemoryFanoutBus,
    pub identities: MemoryIdentityRepository,
    pub documents: MemoryDocumentStore,
    pub blobs: MemoryBlobStore,
    pub payments: MemoryPaymentProvider,
    pub lease: MemoryIdentityLease,
    pub auth_config: Arc<AuthConfig>,
    pub relay_a: FanoutRelay<MemoryFanoutBus>,
    pub relay_b: FanoutRelay<MemoryFanoutBus>,
}

impl Fabric {
    pub async fn new() -> Self {
        let bus = MemoryFanoutBus::new();
        let relay_a = member(&bus).await;
        let relay_b = member(&bus).await;

        Self {
            sessions: MemorySessionRepository::new(),
            bus,
            identities: MemoryIdentityRepository::default(),
            documents: MemoryDocumentStore::default(),
            blobs: MemoryBlobStore::default(),
            payments: MemoryPaymentProvider::default(),
            lease: MemoryIdentityLease::default(),
            auth_config: Arc::new(AuthConfig::development()),
            relay_a,
            relay_b,
        }
    }

    /// Adapters as wired on member A
    pub fn deps(&self, config: AccountConfig) -> AccountDeps<TestPorts> {
        AccountDeps {
            identities: Arc::new(self.identities.clone()),
            documents: Arc::new(self.documents.clone()),
            blobs: Arc::new(self.blobs.clone()),
            payments: Arc::new(self.payments.clone()),
            revoker: Arc::new(FabricRevoker::new(
                SignOutUseCase::new(Arc::new(self.sessions.clone())),
                self.relay_a.clone(),
            )),
            lease: Arc::new(self.lease.clone()),
            config: Arc::new(config),
        }
    }

    pub fn auth_state(&self) -> AuthGateState<MemorySessionRepository, MemoryIdentityRepository> {
        AuthGateState::new(
            Arc::new(self.sessions.clone()),
            Arc::new(self.identities.clone()),
            self.auth_config.clone(),
        )
    }

    pub fn account_state(
        &self,
        config: AccountConfig,
    ) -> AccountState<TestPorts, MemorySessionRepository, MemoryIdentityRepository> {
        AccountState {
            auth: self.auth_state(),
            deps: self.deps(config),
        }
    }

    /// Identity with a profile picture, authored pictures and documents
    pub async fn seed_identity(&self, post_pictures: usize, documents: u64) -> Identity {
        let identity_id = IdentityId::new();
        let picture = format!("{BLOB_BASE}/pictures/{identity_id}/profile.png");
        self.blobs.put(&picture).await;

        let now = Utc::now();
        let identity = Identity {
            identity_id,
            email: Email::new(format!("{identity_id}@example.com")).unwrap(),
            display_name: DisplayName::new("Tester", 50).unwrap(),
            bio: None,
            picture_url: Some(picture),
            payment_customer_id: None,
            created_at: now,
            updated_at: now,
        };
        self.identities.insert(identity.clone()).await;

        for n in 0..post_pictures {
            let url = format!("{BLOB_BASE}/posts/{identity_id}/{n}.png");
            self.blobs.put(&url).await;
            self.identities.add_post_picture(identity_id, &url).await;
        }
        self.documents.put(identity_id, documents).await;

        identity
    }

    pub async fn issue_session(&self, identity_id: IdentityId) -> IssuedSession {
        IssueSessionUseCase::new(Arc::new(self.sessions.clone()), self.auth_config.clone())
            .execute(identity_id, BTreeMap::new())
            .await
            .unwrap()
    }

    pub fn cookie(&self, issued: &IssuedSession) -> String {
        format!("{}={}", self.auth_config.session_cookie_name, issued.sealed_cookie)
    }
}

async fn member(bus: &MemoryFanoutBus) -> FanoutRelay<MemoryFanoutBus> {
    let config = RealtimeConfig::development().with_fleet_member_id(FleetMemberId::new());
    let relay = FanoutRelay::new(Arc::new(bus.clone()), Arc::new(config));
    relay.spawn_subscriber().await.unwrap();
    relay
}
