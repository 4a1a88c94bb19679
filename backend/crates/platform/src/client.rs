//! Client identification utilities
//!
//! Request metadata captured into session attributes at issuance time.
//! Nothing here is used to bind or re-validate a session.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Longest User-Agent kept in a session record
const MAX_USER_AGENT_LEN: usize = 256;

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

/// Extract the User-Agent header, truncated on a char boundary
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    let ua = headers.get(header::USER_AGENT)?.to_str().ok()?;
    Some(ua.chars().take(MAX_USER_AGENT_LEN).collect())
}
