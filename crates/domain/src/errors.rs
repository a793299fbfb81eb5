//! Domain error types.

use thiserror::Error;

/// Failure reported by a store implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("database error: {0}")]
    Database(String),
}

/// Errors returned by domain services.
///
/// All variants except `Storage` are expected outcomes the caller can act on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("User is already a member of this group")]
    DuplicateMembership,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invitation has expired")]
    InvitationExpired,

    #[error("User already participates in this competition")]
    AlreadyParticipant,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    pub fn forbidden(why: impl Into<String>) -> Self {
        DomainError::Forbidden(why.into())
    }

    pub fn validation(why: impl Into<String>) -> Self {
        DomainError::Validation(why.into())
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::Storage(err.to_string())
    }
}
