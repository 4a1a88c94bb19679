//! Cookie helpers for the session and CSRF channels

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::response::Response;

use crate::application::config::AuthConfig;
use crate::application::issue_session::IssuedSession;

/// Set-Cookie headers for a freshly issued session
pub fn session_headers(config: &AuthConfig, issued: &IssuedSession) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append_cookie(
        &mut headers,
        &config.session_cookie().build_set_cookie(&issued.sealed_cookie),
    );
    attach_csrf(&mut headers, config, &issued.csrf_token);
    headers
}

/// Expire both cookies
pub fn clear_headers(config: &AuthConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, &config.session_cookie().build_delete_cookie());
    append_cookie(&mut headers, &config.csrf_cookie().build_delete_cookie());
    headers
}

/// Put the current CSRF token on the readable channels
pub fn attach_csrf(headers: &mut HeaderMap, config: &AuthConfig, token: &str) {
    append_cookie(headers, &config.csrf_cookie().build_set_cookie(token));
    if let (Ok(name), Ok(value)) = (
        HeaderName::from_bytes(config.csrf_header_name.as_bytes()),
        HeaderValue::from_str(token),
    ) {
        headers.insert(name, value);
    }
}

/// Whether the response already expires the session cookie
pub fn clears_session(response: &Response, config: &AuthConfig) -> bool {
    let prefix = format!("{}=;", config.session_cookie_name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}

fn append_cookie(headers: &mut HeaderMap, cookie: &str) {
    if let Some(value) = platform::cookie::to_header_value(cookie) {
        headers.append(header::SET_COOKIE, value);
    }
}
