//! Delete Account Use Case
//!
//! The one irreversible operation spanning every backend:
//!
//! 1. Snapshot owned media references (the row is the only list of them)
//! 2. Delete the relational record; the only step whose failure aborts
//! 3. Delete each blob independently, collecting failures
//! 4. Bulk-delete derived documents (concurrently with 3)
//! 5. Destroy sessions and publish a force-close for open connections
//!
//! Failures after step 2 never roll it back: the account stays deleted and
//! each failure is logged and reported. No cross-store transaction, no
//! progress ledger; a re-run over an already deleted identity is a no-op
//! that still retries steps 4 and 5.

use futures_util::future::join_all;
use kernel::id::IdentityId;

use crate::application::ports::{AccountDeps, AccountPorts};
use crate::domain::deletion::{CleanupStep, DeletionPhase, DeletionReport};
use crate::domain::identity::MediaSnapshot;
use crate::domain::repository::{
    AccessRevoker, BlobStore, DocumentStore, IdentityLease, IdentityRepository,
};
use crate::error::{AccountError, AccountResult};

/// Delete account use case
pub struct DeleteAccountUseCase<P: AccountPorts> {
    deps: AccountDeps<P>,
}

impl<P: AccountPorts> DeleteAccountUseCase<P> {
    pub fn new(deps: AccountDeps<P>) -> Self {
        Self { deps }
    }

    /// Run the whole sequence to completion
    ///
    /// `Err` only when nothing irreversible happened (lease held, snapshot
    /// or relational delete failed).
    pub async fn execute(&self, identity_id: IdentityId) -> AccountResult<DeletionReport> {
        let lease = match self.deps.config.deletion_lease_ttl {
            Some(ttl) => Some(
                self.deps
                    .lease
                    .acquire(&identity_id, ttl)
                    .await?
                    .ok_or(AccountError::DeletionInProgress)?,
            ),
            None => None,
        };

        let result = self.run(identity_id).await;

        if let Some(token) = lease {
            if let Err(e) = self.deps.lease.release(&identity_id, &token).await {
                // Expires on its own
                tracing::warn!(error = %e, identity_id = %identity_id, "Failed to release deletion lease");
            }
        }

        result
    }

    async fn run(&self, identity_id: IdentityId) -> AccountResult<DeletionReport> {
        trace_phase(&identity_id, DeletionPhase::Pending);

        // 1. Must complete before anything is deleted
        let media = self.deps.identities.snapshot_media(&identity_id).await?;
        tracing::info!(
            identity_id = %identity_id,
            media_refs = media.len(),
            "Media references snapshotted"
        );

        // 2. Point of no return
        let existed = self.deps.identities.delete(&identity_id).await?;
        if !existed {
            tracing::info!(identity_id = %identity_id, "Identity already absent, continuing cleanup");
        }
        trace_phase(&identity_id, DeletionPhase::RelationalDeleted);

        let mut report = DeletionReport::new(identity_id, existed);

        // 3 + 4
        let (blob_failures, documents) = tokio::join!(
            self.delete_blobs(&media),
            self.deps.documents.delete_all_for_identity(&identity_id)
        );

        report.blobs_deleted = media.len() - blob_failures.len();
        for (url, reason) in blob_failures {
            report.record_failure(CleanupStep::Blob, url, reason);
        }
        trace_phase(&identity_id, DeletionPhase::BlobsCleaned);

        match documents {
            Ok(deleted) => report.documents_deleted = deleted,
            Err(e) => report.record_failure(CleanupStep::Documents, identity_id.to_string(), e.to_string()),
        }
        trace_phase(&identity_id, DeletionPhase::DocumentsCleaned);

        // 5
        match self.deps.revoker.revoke_sessions(&identity_id).await {
            Ok(revoked) => report.sessions_revoked = revoked,
            Err(e) => report.record_failure(CleanupStep::Sessions, identity_id.to_string(), e.to_string()),
        }
        if let Err(e) = self.deps.revoker.force_close_connections(&identity_id).await {
            report.record_failure(CleanupStep::Connections, identity_id.to_string(), e.to_string());
        }
        trace_phase(&identity_id, DeletionPhase::Done);

        if report.is_clean() {
            tracing::info!(
                identity_id = %identity_id,
                blobs_deleted = report.blobs_deleted,
                documents_deleted = report.documents_deleted,
                sessions_revoked = report.sessions_revoked,
                "Account deleted"
            );
        } else {
            tracing::warn!(
                identity_id = %identity_id,
                failures = report.failures.len(),
                "Account deleted with partial cleanup failures, reconcile manually"
            );
        }

        Ok(report)
    }

    /// Returns `(url, reason)` of every blob that could not be deleted
    async fn delete_blobs(&self, media: &MediaSnapshot) -> Vec<(String, String)> {
        let results = join_all(media.urls().iter().map(|url| async move {
            (url, self.deps.blobs.delete(url).await)
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(url, result)| result.err().map(|e| (url.clone(), e.to_string())))
            .collect()
    }
}

fn trace_phase(identity_id: &IdentityId, phase: DeletionPhase) {
    tracing::info!(identity_id = %identity_id, phase = %phase, "Account deletion phase");
}
