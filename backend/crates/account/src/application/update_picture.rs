//! Update Picture Use Case
//!
//! Upload first, then point the identity at the new blob, then drop the
//! previous blob. A failed upload changes nothing; a failed cleanup of the
//! old blob leaves an orphan and is only logged.

use kernel::id::IdentityId;

use crate::application::config::AccountConfig;
use crate::application::ports::{AccountDeps, AccountPorts};
use crate::domain::repository::{BlobStore, IdentityRepository};
use crate::error::{AccountError, AccountResult};

/// Picture upload input
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Update picture use case
pub struct UpdatePictureUseCase<P: AccountPorts> {
    deps: AccountDeps<P>,
}

impl<P: AccountPorts> UpdatePictureUseCase<P> {
    pub fn new(deps: AccountDeps<P>) -> Self {
        Self { deps }
    }

    /// Returns the public URL of the new picture
    pub async fn execute(&self, identity_id: IdentityId, upload: PictureUpload) -> AccountResult<String> {
        let config = &self.deps.config;

        if upload.bytes.is_empty() {
            return Err(AccountError::Validation("Picture is empty".into()));
        }
        if upload.bytes.len() > config.max_picture_bytes {
            return Err(AccountError::PayloadTooLarge {
                max_bytes: config.max_picture_bytes,
            });
        }
        if !config.picture_type_allowed(&upload.content_type) {
            return Err(AccountError::UnsupportedMediaType(upload.content_type));
        }

        let key = format!(
            "pictures/{}/{}.{}",
            identity_id,
            uuid::Uuid::new_v4(),
            AccountConfig::picture_extension(&upload.content_type)
        );
        let url = self
            .deps
            .blobs
            .upload(&key, &upload.content_type, upload.bytes)
            .await?;

        let previous = match self.deps.identities.set_picture(&identity_id, &url).await {
            Ok(Some(previous)) => previous,
            Ok(None) => {
                self.discard(&url).await;
                return Err(AccountError::NotFound);
            }
            Err(e) => {
                self.discard(&url).await;
                return Err(e);
            }
        };

        if let Some(previous) = previous.filter(|p| *p != url) {
            self.discard(&previous).await;
        }

        tracing::info!(identity_id = %identity_id, url = %url, "Profile picture replaced");
        Ok(url)
    }

    async fn discard(&self, url: &str) {
        if let Err(e) = self.deps.blobs.delete(url).await {
            tracing::warn!(error = %e, url = %url, "Failed to delete unused picture blob");
        }
    }
}
