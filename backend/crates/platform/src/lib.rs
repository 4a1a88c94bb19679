//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, random secrets, Base64url)
//! - Cookie management
//! - Client metadata extraction
//! - Shared key-value / pub-sub backend connection

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod kv;
