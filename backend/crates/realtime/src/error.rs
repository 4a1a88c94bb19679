//! Realtime Error Types
//!
//! Handshake failures reuse [`AuthError`] unchanged so that a refused
//! connection looks exactly like a refused HTTP request.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Realtime-specific result type alias
pub type RealtimeResult<T> = Result<T, RealtimeError>;

/// Realtime-specific error variants
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Handshake did not authenticate
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Browser handshake from an origin not on the allow list
    #[error("Origin not allowed: {0}")]
    OriginRejected(String),

    /// Room name failed validation
    #[error("Invalid room name")]
    InvalidRoom,

    /// Connection already sits in the maximum number of rooms
    #[error("Room limit reached")]
    RoomLimit,

    /// Pub/sub bus unreachable
    #[error("Fanout bus unavailable: {0}")]
    BusUnavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RealtimeError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RealtimeError::Auth(e) => e.kind(),
            RealtimeError::OriginRejected(_) => ErrorKind::Forbidden,
            RealtimeError::InvalidRoom | RealtimeError::RoomLimit => {
                ErrorKind::UnprocessableEntity
            }
            RealtimeError::BusUnavailable(_) => ErrorKind::ServiceUnavailable,
            RealtimeError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Short machine-readable code, also used in error frames
    pub fn code(&self) -> &'static str {
        match self {
            RealtimeError::Auth(e) => match e.kind() {
                ErrorKind::Unauthorized => "UNAUTHENTICATED",
                ErrorKind::Forbidden => "FORBIDDEN",
                ErrorKind::ServiceUnavailable => "UPSTREAM_UNAVAILABLE",
                _ => "INTERNAL",
            },
            RealtimeError::OriginRejected(_) => "ORIGIN_REJECTED",
            RealtimeError::InvalidRoom | RealtimeError::RoomLimit => "VALIDATION_FAILED",
            RealtimeError::BusUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            RealtimeError::Internal(_) => "INTERNAL",
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            RealtimeError::Auth(e) => e.to_app_error(),
            RealtimeError::OriginRejected(_) => {
                AppError::forbidden("Origin not allowed").with_code(self.code())
            }
            RealtimeError::InvalidRoom | RealtimeError::RoomLimit => {
                AppError::unprocessable(self.to_string()).with_code(self.code())
            }
            RealtimeError::BusUnavailable(_) => {
                AppError::service_unavailable("Realtime temporarily unavailable")
                    .with_code(self.code())
            }
            RealtimeError::Internal(_) => AppError::internal("Internal server error"),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            RealtimeError::BusUnavailable(msg) => {
                tracing::error!(message = %msg, "Fanout bus unavailable");
            }
            RealtimeError::Internal(msg) => {
                tracing::error!(message = %msg, "Realtime internal error");
            }
            RealtimeError::OriginRejected(origin) => {
                tracing::warn!(origin = %origin, "Realtime handshake from foreign origin");
            }
            _ => {
                tracing::debug!(error = %self, "Realtime error");
            }
        }
    }
}

impl IntoResponse for RealtimeError {
    fn into_response(self) -> Response {
        match self {
            // AuthError logs itself
            RealtimeError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

impl From<redis::RedisError> for RealtimeError {
    fn from(err: redis::RedisError) -> Self {
        if platform::kv::is_unavailable(&err) {
            RealtimeError::BusUnavailable(err.to_string())
        } else {
            RealtimeError::Internal(format!("fanout bus: {err}"))
        }
    }
}

impl From<serde_json::Error> for RealtimeError {
    fn from(err: serde_json::Error) -> Self {
        RealtimeError::Internal(format!("relay event encoding: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_rejections_keep_auth_status() {
        let err = RealtimeError::from(AuthError::SessionExpired);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "UNAUTHENTICATED");

        let err = RealtimeError::from(AuthError::StoreUnavailable("down".into()));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_origin_rejected_is_forbidden() {
        let response = RealtimeError::OriginRejected("https://evil.example".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
