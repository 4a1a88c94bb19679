//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::{AttachedCard, ProfileInput};
use crate::domain::identity::Identity;

/// Update profile request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileInput {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileInput {
            display_name: req.display_name,
            bio: req.bio,
        }
    }
}

/// Profile response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub identity_id: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub picture_url: Option<String>,
    pub has_payment_customer: bool,
    pub updated_at_ms: i64,
}

impl From<Identity> for ProfileResponse {
    fn from(identity: Identity) -> Self {
        ProfileResponse {
            identity_id: identity.identity_id.to_string(),
            display_name: identity.display_name.to_string(),
            bio: identity.bio,
            picture_url: identity.picture_url,
            has_payment_customer: identity.payment_customer_id.is_some(),
            updated_at_ms: identity.updated_at.timestamp_millis(),
        }
    }
}

/// Update picture response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureResponse {
    pub picture_url: String,
}

/// Attach payment card request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachCardRequest {
    pub card_token: String,
}

/// Attach payment card response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachCardResponse {
    pub card_id: String,
}

impl From<AttachedCard> for AttachCardResponse {
    fn from(card: AttachedCard) -> Self {
        AttachCardResponse {
            card_id: card.card_id,
        }
    }
}
