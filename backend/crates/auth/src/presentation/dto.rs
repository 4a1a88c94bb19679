//! API DTOs (Data Transfer Objects)

use serde::Serialize;

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub identity_id: String,
    pub session_id: String,
    pub expires_at_ms: i64,
}

/// CSRF token response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

/// Sign out everywhere response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutAllResponse {
    pub sessions_revoked: u64,
}
