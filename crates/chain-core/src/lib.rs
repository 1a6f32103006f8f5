// chain-core/src/lib.rs

//! Foundational chain types
//!
//! This crate provides:
//! - Arbitrary-precision coin amounts with checked arithmetic
//! - Account addresses with a deterministic ordering
//! - Role and motion enums shared across the governance surface

pub mod address;
pub mod types;

pub use address::Address;
pub use types::{Amount, Motion, Role, StakeAmount, StakeChange, Timestamp};

/// Result type for core type operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while handling core types
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown motion: {0}")]
    UnknownMotion(String),
}
