//! Identity Entity
//!
//! Owned by the relational store. Sessions, derived documents and blobs
//! refer to an identity but are not owned by it.

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;

use crate::domain::value_object::{DisplayName, Email};

/// Identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub identity_id: IdentityId,
    pub email: Email,
    pub display_name: DisplayName,
    pub bio: Option<String>,
    pub picture_url: Option<String>,
    /// Payment provider customer, created on first card
    pub payment_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile change; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<DisplayName>,
    /// `Some("")` clears the bio
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.bio.is_none()
    }
}

/// Media references an identity owns, profile picture first
///
/// Captured before the relational row goes away; afterwards it is the
/// only record of which blobs must be cleaned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaSnapshot {
    urls: Vec<String>,
}

impl MediaSnapshot {
    /// Build from references in owner order, dropping duplicates
    pub fn new(urls: impl IntoIterator<Item = String>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let urls = urls
            .into_iter()
            .filter(|u| !u.is_empty() && seen.insert(u.clone()))
            .collect();
        Self { urls }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_keeps_order_and_drops_duplicates() {
        let snapshot = MediaSnapshot::new(vec![
            "https://blob/a".to_string(),
            "https://blob/b".to_string(),
            String::new(),
            "https://blob/a".to_string(),
        ]);
        assert_eq!(snapshot.urls(), ["https://blob/a", "https://blob/b"]);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_empty_profile_update() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            bio: Some(String::new()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
