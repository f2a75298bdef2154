//! # ServiceError
//!
//! The error taxonomy every service operation reports. The HTTP layer maps
//! each variant to exactly one status code.

use domains::{DomainError, InvalidPage, ParseLabelError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Malformed or out-of-range input for a single field
    #[error("validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// Missing, invalid or expired token, or the principal is gone.
    /// Always the same message whatever the cause.
    #[error("could not validate credentials")]
    Unauthenticated,

    /// Authenticated but not allowed (role or ownership)
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    /// e.g., the email is already registered
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure; the detail is logged, never returned
    #[error("internal service error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    pub fn not_found(entity: &str, id: i64) -> Self {
        Self::NotFound(format!("{entity} {id}"))
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(entity, id) => Self::NotFound(format!("{entity} {id}")),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            DomainError::Corrupt(msg) | DomainError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<InvalidPage> for ServiceError {
    fn from(err: InvalidPage) -> Self {
        let field = match err {
            InvalidPage::NegativeSkip => "skip",
            InvalidPage::NonPositiveLimit => "limit",
        };
        Self::validation(field, err.to_string())
    }
}

impl From<ParseLabelError> for ServiceError {
    fn from(err: ParseLabelError) -> Self {
        Self::validation(err.kind, err.to_string())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_detail_becomes_internal() {
        let err: ServiceError = DomainError::Internal("pool timed out".into()).into();
        assert_eq!(err, ServiceError::Internal("pool timed out".into()));
    }

    #[test]
    fn bad_target_type_is_a_field_error() {
        let err: ServiceError = "comment".parse::<domains::ContentKind>().unwrap_err().into();
        match err {
            ServiceError::Validation { field, .. } => assert_eq!(field, "target_type"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
