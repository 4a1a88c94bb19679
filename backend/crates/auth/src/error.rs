//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Every variant that means "no usable session" maps to 401 with the
//! `UNAUTHENTICATED` code; the distinct variants only exist for logging.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session cookie was presented
    #[error("No session presented")]
    MissingSession,

    /// Cookie signature did not verify
    #[error("Session cookie failed verification")]
    TamperedSession,

    /// Session id is absent from the store
    #[error("Session not found")]
    SessionNotFound,

    /// Session is past its absolute expiry
    #[error("Session expired")]
    SessionExpired,

    /// Session refers to an identity that no longer exists
    #[error("Session identity no longer exists")]
    IdentityMissing,

    /// Mutating request without a matching CSRF token
    #[error("CSRF token missing or mismatched")]
    CsrfMismatch,

    /// Authenticated but not allowed
    #[error("Forbidden")]
    Forbidden,

    /// Session store (or identity lookup) unreachable; fail closed
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingSession
            | AuthError::TamperedSession
            | AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::IdentityMissing => ErrorKind::Unauthorized,
            AuthError::CsrfMismatch | AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::StoreUnavailable(_) => ErrorKind::ServiceUnavailable,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether the caller should be treated as not logged in
    pub fn is_unauthenticated(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// Convert to AppError
    ///
    /// Messages are deliberately coarse; the variant detail goes to logs only.
    pub fn to_app_error(&self) -> AppError {
        match self {
            e if e.is_unauthenticated() => AppError::unauthorized("Authentication required")
                .with_code("UNAUTHENTICATED")
                .with_action("Sign in again"),
            AuthError::CsrfMismatch => AppError::forbidden("CSRF token missing or mismatched")
                .with_code("CSRF_MISMATCH")
                .with_action("Reload the page and retry"),
            AuthError::StoreUnavailable(_) => {
                AppError::service_unavailable("Authentication temporarily unavailable")
                    .with_code("UPSTREAM_UNAVAILABLE")
            }
            AuthError::Forbidden => AppError::forbidden("Forbidden").with_code("FORBIDDEN"),
            _ => AppError::internal("Internal server error"),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::StoreUnavailable(msg) => {
                tracing::error!(message = %msg, "Session store unavailable, failing closed");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::TamperedSession => {
                tracing::warn!("Session cookie signature mismatch");
            }
            AuthError::CsrfMismatch => {
                tracing::warn!("CSRF verification failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<redis::RedisError> for AuthError {
    fn from(err: redis::RedisError) -> Self {
        if platform::kv::is_unavailable(&err) {
            AuthError::StoreUnavailable(err.to_string())
        } else {
            AuthError::Internal(format!("session store: {err}"))
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Internal(format!("session record encoding: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::MissingSession, StatusCode::UNAUTHORIZED),
            (AuthError::TamperedSession, StatusCode::UNAUTHORIZED),
            (AuthError::SessionNotFound, StatusCode::UNAUTHORIZED),
            (AuthError::SessionExpired, StatusCode::UNAUTHORIZED),
            (AuthError::IdentityMissing, StatusCode::UNAUTHORIZED),
            (AuthError::CsrfMismatch, StatusCode::FORBIDDEN),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (
                AuthError::StoreUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AuthError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.status_code(), expected_status);
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let app = AuthError::Internal("redis script SHA abc failed".into()).to_app_error();
        assert!(!app.message().contains("redis"));
    }

    #[test]
    fn test_store_unavailable_is_retryable() {
        let app = AuthError::StoreUnavailable("timeout".into()).to_app_error();
        assert!(app.is_retryable());
        assert_eq!(app.code(), Some("UPSTREAM_UNAVAILABLE"));
    }

    #[test]
    fn test_redis_io_error_maps_to_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: AuthError = redis::RedisError::from(io).into();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
    }
}
