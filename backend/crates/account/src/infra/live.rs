//! Production adapter set

use auth::RedisSessionRepository;
use realtime::RedisFanoutBus;

use crate::application::ports::AccountPorts;
use crate::infra::http::{HttpBlobStore, HttpPaymentProvider};
use crate::infra::lease::RedisIdentityLease;
use crate::infra::postgres::{PgDocumentStore, PgIdentityRepository};
use crate::infra::revoker::FabricRevoker;

/// Postgres, Redis and HTTP adapters
pub enum LivePorts {}

impl AccountPorts for LivePorts {
    type Identities = PgIdentityRepository;
    type Documents = PgDocumentStore;
    type Blobs = HttpBlobStore;
    type Payments = HttpPaymentProvider;
    type Revoker = FabricRevoker<RedisSessionRepository, RedisFanoutBus>;
    type Lease = RedisIdentityLease;
}
