//! HTTP Handlers
//!
//! Every route sits behind the auth gate, so a handler only runs with a
//! valid session and, for these mutating methods, a matching CSRF token.

use auth::presentation::cookies;
use auth::{AuthContext, IdentityDirectory, SessionRepository};
use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{
    AccountPorts, AttachPaymentCardUseCase, DeleteAccountUseCase, PictureUpload,
    UpdatePictureUseCase, UpdateProfileUseCase,
};
use crate::error::{AccountError, AccountResult};
use crate::presentation::dto::{
    AttachCardRequest, AttachCardResponse, PictureResponse, ProfileResponse, UpdateProfileRequest,
};
use crate::presentation::state::AccountState;

/// Multipart field carrying the picture
const PICTURE_FIELD: &str = "picture";

/// PATCH /api/account/profile
pub async fn update_profile<P, S, D>(
    State(state): State<AccountState<P, S, D>>,
    context: AuthContext,
    Json(req): Json<UpdateProfileRequest>,
) -> AccountResult<Json<ProfileResponse>>
where
    P: AccountPorts,
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    let identity = UpdateProfileUseCase::new(state.deps.clone())
        .execute(context.identity_id(), req.into())
        .await?;

    Ok(Json(identity.into()))
}

/// POST /api/account/picture (multipart)
pub async fn update_picture<P, S, D>(
    State(state): State<AccountState<P, S, D>>,
    context: AuthContext,
    mut multipart: Multipart,
) -> AccountResult<Json<PictureResponse>>
where
    P: AccountPorts,
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    let max_bytes = state.deps.config.max_picture_bytes;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AccountError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some(PICTURE_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| AccountError::UnsupportedMediaType("missing".into()))?;
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AccountError::PayloadTooLarge { max_bytes }
            } else {
                AccountError::Validation(format!("Malformed upload: {e}"))
            }
        })?;

        upload = Some(PictureUpload {
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload
        .ok_or_else(|| AccountError::Validation(format!("Missing '{PICTURE_FIELD}' field")))?;

    let picture_url = UpdatePictureUseCase::new(state.deps.clone())
        .execute(context.identity_id(), upload)
        .await?;

    Ok(Json(PictureResponse { picture_url }))
}

/// POST /api/account/payment-card
pub async fn attach_payment_card<P, S, D>(
    State(state): State<AccountState<P, S, D>>,
    context: AuthContext,
    Json(req): Json<AttachCardRequest>,
) -> AccountResult<impl IntoResponse>
where
    P: AccountPorts,
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    let card = AttachPaymentCardUseCase::new(state.deps.clone())
        .execute(context.identity_id(), &req.card_token)
        .await?;

    Ok((StatusCode::CREATED, Json(AttachCardResponse::from(card))))
}

/// DELETE /api/account
///
/// Success once the relational record is gone; cleanup failures are
/// logged, not returned.
pub async fn delete_account<P, S, D>(
    State(state): State<AccountState<P, S, D>>,
    context: AuthContext,
) -> AccountResult<impl IntoResponse>
where
    P: AccountPorts,
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
{
    DeleteAccountUseCase::new(state.deps.clone())
        .execute(context.identity_id())
        .await?;

    Ok((
        StatusCode::NO_CONTENT,
        cookies::clear_headers(&state.auth.config),
    ))
}
