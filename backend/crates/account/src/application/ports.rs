//! Adapter bundle
//!
//! The account use cases talk to six collaborators. [`AccountPorts`] names
//! one concrete implementation of each so the use cases carry a single
//! type parameter.

use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::domain::repository::{
    AccessRevoker, BlobStore, DocumentStore, IdentityLease, IdentityRepository, PaymentProvider,
};

/// Concrete adapter types for one deployment (or one test)
pub trait AccountPorts: Send + Sync + 'static {
    type Identities: IdentityRepository + Send + Sync + 'static;
    type Documents: DocumentStore + Send + Sync + 'static;
    type Blobs: BlobStore + Send + Sync + 'static;
    type Payments: PaymentProvider + Send + Sync + 'static;
    type Revoker: AccessRevoker + Send + Sync + 'static;
    type Lease: IdentityLease + Send + Sync + 'static;
}

/// Shared handles to every adapter plus configuration
pub struct AccountDeps<P: AccountPorts> {
    pub identities: Arc<P::Identities>,
    pub documents: Arc<P::Documents>,
    pub blobs: Arc<P::Blobs>,
    pub payments: Arc<P::Payments>,
    pub revoker: Arc<P::Revoker>,
    pub lease: Arc<P::Lease>,
    pub config: Arc<AccountConfig>,
}

impl<P: AccountPorts> Clone for AccountDeps<P> {
    fn clone(&self) -> Self {
        Self {
            identities: self.identities.clone(),
            documents: self.documents.clone(),
            blobs: self.blobs.clone(),
            payments: self.payments.clone(),
            revoker: self.revoker.clone(),
            lease: self.lease.clone(),
            config: self.config.clone(),
        }
    }
}
