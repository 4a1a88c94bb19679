//! Environment Configuration
//!
//! Everything the server reads from the environment, parsed once at
//! start-up. Library crates only ever see their typed config structs.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose;
use kernel::id::FleetMemberId;

const DEFAULT_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";

/// Server environment
#[derive(Debug)]
pub struct ServerEnv {
    pub database_url: String,
    /// Derived documents; defaults to the relational database
    pub document_database_url: String,
    pub redis_url: String,
    /// `None` outside release builds means "generate one"
    pub session_secret: Option<[u8; 32]>,
    pub session_ttl: Option<Duration>,
    pub fleet_member_id: FleetMemberId,
    pub blob_api_url: String,
    pub blob_public_url: String,
    pub payment_api_url: String,
    pub payment_api_key: String,
    pub frontend_origins: Vec<String>,
    pub bind_addr: SocketAddr,
    /// `None` when unset, `Some(None)` when explicitly disabled
    pub deletion_lease: Option<Option<Duration>>,
}

impl ServerEnv {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = required("DATABASE_URL")?;
        let document_database_url =
            env::var("DOCUMENT_DATABASE_URL").unwrap_or_else(|_| database_url.clone());

        let session_secret = match env::var("SESSION_SECRET") {
            Ok(encoded) => Some(decode_secret(&encoded)?),
            Err(_) if cfg!(debug_assertions) => None,
            Err(_) => bail!("SESSION_SECRET must be set in production"),
        };

        let fleet_member_id = match env::var("FLEET_MEMBER_ID") {
            Ok(id) => id
                .parse()
                .with_context(|| format!("FLEET_MEMBER_ID is not a UUID: {id}"))?,
            Err(_) => FleetMemberId::new(),
        };

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a socket address")?;

        Ok(Self {
            database_url,
            document_database_url,
            redis_url: required("REDIS_URL")?,
            session_secret,
            session_ttl: optional_secs("SESSION_TTL_SECS")?.flatten(),
            fleet_member_id,
            blob_api_url: required("BLOB_API_URL")?,
            blob_public_url: required("BLOB_PUBLIC_URL")?,
            payment_api_url: required("PAYMENT_API_URL")?,
            payment_api_key: required("PAYMENT_API_KEY")?,
            frontend_origins: parse_origins(
                &env::var("FRONTEND_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string()),
            ),
            bind_addr,
            deletion_lease: optional_secs("DELETION_LEASE_SECS")?,
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} must be set in environment"))
}

/// `Ok(None)` when unset; a zero value parses to `Some(None)`
fn optional_secs(name: &str) -> anyhow::Result<Option<Option<Duration>>> {
    match env::var(name) {
        Ok(raw) => parse_secs(&raw)
            .map(Some)
            .with_context(|| format!("{name} is not a number of seconds")),
        Err(_) => Ok(None),
    }
}

fn parse_secs(raw: &str) -> anyhow::Result<Option<Duration>> {
    let secs: u64 = raw.trim().parse()?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

fn decode_secret(encoded: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .context("SESSION_SECRET is not valid base64")?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("SESSION_SECRET must be 32 bytes, got {}", b.len()))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("30").unwrap(), Some(Duration::from_secs(30)));
        assert_eq!(parse_secs("0").unwrap(), None);
        assert!(parse_secs("soon").is_err());
    }

    #[test]
    fn test_decode_secret_requires_32_bytes() {
        let good = general_purpose::STANDARD.encode([7u8; 32]);
        assert_eq!(decode_secret(&good).unwrap(), [7u8; 32]);

        let short = general_purpose::STANDARD.encode([7u8; 16]);
        assert!(decode_secret(&short).is_err());
        assert!(decode_secret("not base64!").is_err());
    }

    #[test]
    fn test_parse_origins_skips_blanks() {
        assert_eq!(
            parse_origins(" http://a.test ,,http://b.test "),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
