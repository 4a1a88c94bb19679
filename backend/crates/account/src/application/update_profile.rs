//! Update Profile Use Case

use kernel::id::IdentityId;

use crate::application::ports::{AccountDeps, AccountPorts};
use crate::domain::identity::{Identity, ProfileUpdate};
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::DisplayName;
use crate::error::{AccountError, AccountResult};

/// Raw profile input
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

/// Update profile use case
pub struct UpdateProfileUseCase<P: AccountPorts> {
    deps: AccountDeps<P>,
}

impl<P: AccountPorts> UpdateProfileUseCase<P> {
    pub fn new(deps: AccountDeps<P>) -> Self {
        Self { deps }
    }

    pub async fn execute(&self, identity_id: IdentityId, input: ProfileInput) -> AccountResult<Identity> {
        let update = self.validate(input)?;

        let identity = self
            .deps
            .identities
            .update_profile(&identity_id, &update)
            .await?
            .ok_or(AccountError::NotFound)?;

        tracing::info!(identity_id = %identity_id, "Profile updated");
        Ok(identity)
    }

    fn validate(&self, input: ProfileInput) -> AccountResult<ProfileUpdate> {
        let config = &self.deps.config;

        let display_name = input
            .display_name
            .map(|name| DisplayName::new(&name, config.max_display_name_chars))
            .transpose()?;

        let bio = input.bio.map(|b| b.trim().to_string());
        if let Some(bio) = &bio {
            if bio.chars().count() > config.max_bio_chars {
                return Err(AccountError::Validation(format!(
                    "Bio must be at most {} characters",
                    config.max_bio_chars
                )));
            }
        }

        let update = ProfileUpdate { display_name, bio };
        if update.is_empty() {
            return Err(AccountError::Validation("Nothing to update".into()));
        }
        Ok(update)
    }
}
