//! Account Deletion Types
//!
//! Deletion is not a persisted job. Phases are traced so a crash in the
//! middle can be reconciled from logs, and every best-effort cleanup
//! failure lands in the [`DeletionReport`].

use derive_more::Display;
use kernel::id::IdentityId;
use serde::Serialize;

/// Progress of one deletion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
pub enum DeletionPhase {
    #[display("pending")]
    Pending,
    #[display("relational_deleted")]
    RelationalDeleted,
    #[display("blobs_cleaned")]
    BlobsCleaned,
    #[display("documents_cleaned")]
    DocumentsCleaned,
    #[display("done")]
    Done,
}

/// Cleanup step after the relational record is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum CleanupStep {
    #[display("blob")]
    Blob,
    #[display("documents")]
    Documents,
    #[display("sessions")]
    Sessions,
    #[display("connections")]
    Connections,
}

/// A cleanup step that failed after the point of no return
///
/// Never surfaced to the caller as a failure; kept for manual
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialCleanupFailure {
    pub step: CleanupStep,
    /// Blob URL, or the identity id for per-identity steps
    pub target: String,
    pub reason: String,
}

/// Outcome of one deletion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    pub identity_id: IdentityId,
    /// `false` when the relational record was already gone
    pub relational_deleted: bool,
    pub blobs_deleted: usize,
    pub documents_deleted: u64,
    pub sessions_revoked: u64,
    pub failures: Vec<PartialCleanupFailure>,
}

impl DeletionReport {
    pub fn new(identity_id: IdentityId, relational_deleted: bool) -> Self {
        Self {
            identity_id,
            relational_deleted,
            blobs_deleted: 0,
            documents_deleted: 0,
            sessions_revoked: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures_for(&self, step: CleanupStep) -> impl Iterator<Item = &PartialCleanupFailure> {
        self.failures.iter().filter(move |f| f.step == step)
    }

    pub(crate) fn record_failure(
        &mut self,
        step: CleanupStep,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) {
        let failure = PartialCleanupFailure {
            step,
            target: target.into(),
            reason: reason.into(),
        };
        tracing::warn!(
            identity_id = %self.identity_id,
            step = %failure.step,
            target_ref = %failure.target,
            reason = %failure.reason,
            "Partial cleanup failure"
        );
        self.failures.push(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_ordered() {
        assert!(DeletionPhase::Pending < DeletionPhase::RelationalDeleted);
        assert!(DeletionPhase::DocumentsCleaned < DeletionPhase::Done);
        assert_eq!(DeletionPhase::BlobsCleaned.to_string(), "blobs_cleaned");
    }

    #[test]
    fn test_report_collects_failures() {
        let mut report = DeletionReport::new(IdentityId::new(), true);
        assert!(report.is_clean());

        report.record_failure(CleanupStep::Blob, "https://blob/x", "timeout");
        report.record_failure(CleanupStep::Sessions, "id", "down");

        assert!(!report.is_clean());
        assert_eq!(report.failures_for(CleanupStep::Blob).count(), 1);
        assert_eq!(report.failures[0].target, "https://blob/x");
    }
}
