//! Infrastructure Layer
//!
//! Session store implementations.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod redis;
