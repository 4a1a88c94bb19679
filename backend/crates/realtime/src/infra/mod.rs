//! Infrastructure Layer
//!
//! Fanout bus implementations.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod redis;
