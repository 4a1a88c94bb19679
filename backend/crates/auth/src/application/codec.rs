//! Session Codec
//!
//! Seals a session id into the cookie value `<uuid>.<base64url(hmac)>`.
//! Tampering is detected without a store round trip, and the store key
//! cannot be derived from anything but a cookie this fleet issued.

use kernel::id::SessionId;
use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};

use crate::error::{AuthError, AuthResult};

const DOMAIN: &[u8] = b"session:v1:";

/// Signs and verifies session cookie values
#[derive(Clone)]
pub struct SessionCodec {
    secret: [u8; 32],
}

impl SessionCodec {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Seal a session id into a cookie value
    pub fn seal(&self, session_id: &SessionId) -> String {
        let id = session_id.to_string();
        let tag = hmac_sha256(&self.secret, &[DOMAIN, id.as_bytes()]);
        format!("{}.{}", id, to_base64url(&tag))
    }

    /// Verify a cookie value and recover the session id
    pub fn unseal(&self, sealed: &str) -> AuthResult<SessionId> {
        let (id, tag_b64) = sealed.split_once('.').ok_or(AuthError::TamperedSession)?;
        let tag = from_base64url(tag_b64).map_err(|_| AuthError::TamperedSession)?;

        if !verify_hmac_sha256(&self.secret, &[DOMAIN, id.as_bytes()], &tag) {
            return Err(AuthError::TamperedSession);
        }

        id.parse().map_err(|_| AuthError::TamperedSession)
    }
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}
