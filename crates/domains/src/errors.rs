//! # DomainError
//!
//! Failures reported by port implementations. Services translate these
//! into their own error taxonomy before anything reaches a caller.

use thiserror::Error;

/// The error type returned by every repository and adapter port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Referenced entity does not exist (entity name, id)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// A uniqueness constraint was violated (e.g., duplicate email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// A value read back from the store could not be mapped to a model
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Infrastructure failure (e.g., DB down, SMTP unreachable)
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A specialized Result type for port operations.
pub type DomainResult<T> = std::result::Result<T, DomainError>;

/// Token issuance/verification failures.
///
/// Callers that face the network must not reveal which variant occurred.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, malformed payload, unparsable subject, or expired
    #[error("invalid token: {0}")]
    Invalid(String),

    /// The claims could not be signed
    #[error("token encoding failed: {0}")]
    Encoding(String),
}
