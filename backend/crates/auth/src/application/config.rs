//! Application Configuration
//!
//! Configuration for the session fabric: signing secret, TTL and the two
//! client-side channels (sealed session cookie, readable CSRF channel).

use std::time::Duration;

use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::error::{AuthError, AuthResult};

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name (HttpOnly)
    pub session_cookie_name: String,
    /// Readable cookie carrying the current CSRF token
    pub csrf_cookie_name: String,
    /// Request/response header carrying the CSRF token
    pub csrf_header_name: String,
    /// Session secret key for HMAC sealing (32 bytes)
    pub session_secret: [u8; 32],
    /// Absolute session lifetime
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy of the session cookie
    pub cookie_same_site: SameSite,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "sid".to_string(),
            csrf_cookie_name: "csrf_token".to_string(),
            csrf_header_name: "x-csrf-token".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(48 * 3600), // 48 hours
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: platform::crypto::random_secret(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Session TTL as a chrono duration
    pub fn session_ttl_chrono(&self) -> AuthResult<chrono::Duration> {
        chrono::Duration::from_std(self.session_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))
    }

    /// Cookie carrying the sealed session id
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs()),
        }
    }

    /// Script-readable cookie carrying the CSRF token
    ///
    /// Strict so that it is never attached to cross-site navigations.
    pub fn csrf_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.csrf_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: false,
            same_site: SameSite::Strict,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs()),
        }
    }
}
