//! Account Configuration

use std::time::Duration;

/// Account application configuration
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Largest accepted profile picture
    pub max_picture_bytes: usize,
    /// Accepted picture content types
    pub allowed_picture_types: Vec<String>,
    /// Per-identity deletion lease; `None` disables the lease
    pub deletion_lease_ttl: Option<Duration>,
    pub max_display_name_chars: usize,
    pub max_bio_chars: usize,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            max_picture_bytes: 5 * 1024 * 1024, // 5 MiB
            allowed_picture_types: ["image/png", "image/jpeg", "image/webp", "image/gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            deletion_lease_ttl: Some(Duration::from_secs(60)),
            max_display_name_chars: 50,
            max_bio_chars: 500,
        }
    }
}

impl AccountConfig {
    /// Create config for development (no deletion lease)
    pub fn development() -> Self {
        Self {
            deletion_lease_ttl: None,
            ..Default::default()
        }
    }

    pub fn picture_type_allowed(&self, content_type: &str) -> bool {
        self.allowed_picture_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(content_type))
    }

    /// File extension for a stored picture
    pub fn picture_extension(content_type: &str) -> &'static str {
        match content_type.to_ascii_lowercase().as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}
