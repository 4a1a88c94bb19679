//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every fleet member agrees on:
//! - Common error types and result aliases
//! - Typed identifiers (identity, session, connection, fleet member)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
