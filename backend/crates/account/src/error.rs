//! Account Error Types
//!
//! This module provides account-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use realtime::RealtimeError;
use thiserror::Error;

/// Account-specific result type alias
pub type AccountResult<T> = Result<T, AccountError>;

/// Account-specific error variants
#[derive(Debug, Error)]
pub enum AccountError {
    /// Session or fabric error passed through from the auth crate
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Input failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Identity no longer exists
    #[error("Identity not found")]
    NotFound,

    /// Another deletion of the same identity holds the lease
    #[error("Deletion already in progress")]
    DeletionInProgress,

    /// Upload larger than allowed
    #[error("Payload too large (max {max_bytes} bytes)")]
    PayloadTooLarge { max_bytes: usize },

    /// Upload of a type we do not store
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// A backing service could not be reached
    #[error("{service} unavailable: {detail}")]
    UpstreamUnavailable {
        service: &'static str,
        detail: String,
    },

    /// A backing service answered with an error
    #[error("{service} rejected the request: {detail}")]
    Upstream {
        service: &'static str,
        detail: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    pub fn unavailable(service: &'static str, detail: impl ToString) -> Self {
        AccountError::UpstreamUnavailable {
            service,
            detail: detail.to_string(),
        }
    }

    pub fn upstream(service: &'static str, detail: impl ToString) -> Self {
        AccountError::Upstream {
            service,
            detail: detail.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::Auth(e) => e.kind(),
            AccountError::Validation(_) => ErrorKind::UnprocessableEntity,
            AccountError::NotFound => ErrorKind::NotFound,
            AccountError::DeletionInProgress => ErrorKind::Conflict,
            AccountError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            AccountError::UnsupportedMediaType(_) => ErrorKind::UnsupportedMediaType,
            AccountError::UpstreamUnavailable { .. } => ErrorKind::ServiceUnavailable,
            AccountError::Upstream { .. } => ErrorKind::BadGateway,
            AccountError::Database(_) | AccountError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AccountError::Auth(e) => e.to_app_error(),
            AccountError::Validation(msg) => {
                AppError::unprocessable(msg.clone()).with_code("VALIDATION_FAILED")
            }
            AccountError::NotFound => {
                AppError::new(ErrorKind::NotFound, "Account not found").with_code("NOT_FOUND")
            }
            AccountError::DeletionInProgress => {
                AppError::conflict("Account deletion already in progress")
                    .with_code("DELETION_IN_PROGRESS")
            }
            AccountError::PayloadTooLarge { max_bytes } => AppError::new(
                ErrorKind::PayloadTooLarge,
                format!("Upload exceeds {max_bytes} bytes"),
            )
            .with_code("PAYLOAD_TOO_LARGE"),
            AccountError::UnsupportedMediaType(_) => {
                AppError::new(ErrorKind::UnsupportedMediaType, "Unsupported image type")
                    .with_code("UNSUPPORTED_MEDIA_TYPE")
            }
            AccountError::UpstreamUnavailable { .. } => {
                AppError::service_unavailable("A backing service is temporarily unavailable")
                    .with_code("UPSTREAM_UNAVAILABLE")
            }
            AccountError::Upstream { .. } => {
                AppError::new(ErrorKind::BadGateway, "A backing service rejected the request")
                    .with_code("UPSTREAM_ERROR")
            }
            AccountError::Database(_) | AccountError::Internal(_) => {
                AppError::internal("Internal server error")
            }
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AccountError::Database(msg) => {
                tracing::error!(message = %msg, "Account database error");
            }
            AccountError::Internal(msg) => {
                tracing::error!(message = %msg, "Account internal error");
            }
            AccountError::UpstreamUnavailable { service, detail } => {
                tracing::error!(service = %service, detail = %detail, "Backing service unavailable");
            }
            AccountError::Upstream { service, detail } => {
                tracing::warn!(service = %service, detail = %detail, "Backing service error");
            }
            AccountError::DeletionInProgress => {
                tracing::warn!("Concurrent account deletion rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        match self {
            AccountError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AccountError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(
            err,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
        ) {
            AccountError::unavailable("relational store", err)
        } else {
            AccountError::Database(err.to_string())
        }
    }
}

impl From<redis::RedisError> for AccountError {
    fn from(err: redis::RedisError) -> Self {
        if platform::kv::is_unavailable(&err) {
            AccountError::unavailable("key-value store", err)
        } else {
            AccountError::Internal(format!("key-value store: {err}"))
        }
    }
}

impl From<RealtimeError> for AccountError {
    fn from(err: RealtimeError) -> Self {
        match err {
            RealtimeError::Auth(e) => AccountError::Auth(e),
            RealtimeError::BusUnavailable(detail) => AccountError::unavailable("fanout bus", detail),
            other => AccountError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(AccountError, StatusCode)> = vec![
            (AccountError::Auth(AuthError::MissingSession), StatusCode::UNAUTHORIZED),
            (AccountError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AccountError::NotFound, StatusCode::NOT_FOUND),
            (AccountError::DeletionInProgress, StatusCode::CONFLICT),
            (
                AccountError::PayloadTooLarge { max_bytes: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AccountError::UnsupportedMediaType("text/plain".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                AccountError::unavailable("blob store", "timeout"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AccountError::upstream("payment", "402"), StatusCode::BAD_GATEWAY),
            (
                AccountError::Database("boom".into()),
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
    fn test_validation_code() {
        let app = AccountError::Validation("too long".into()).to_app_error();
        assert_eq!(app.code(), Some("VALIDATION_FAILED"));
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err = AccountError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let app = err.to_app_error();
        assert!(app.is_retryable());
        assert_eq!(app.code(), Some("UPSTREAM_UNAVAILABLE"));

        let response = err.into_response();
        assert!(response.headers().contains_key("retry-after"));
    }

    #[test]
    fn test_row_not_found_is_not_an_outage() {
        let err = AccountError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_database_detail_is_not_exposed() {
        let app = AccountError::Database("relation identities does not exist".into()).to_app_error();
        assert!(!app.message().contains("identities"));
    }
}
