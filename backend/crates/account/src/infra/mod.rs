//! Infrastructure Layer
//!
//! Database, HTTP and key-value implementations.

pub mod http;
pub mod lease;
pub mod live;
pub mod postgres;
pub mod revoker;
