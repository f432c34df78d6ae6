//! Domain error types.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Message content is empty after trimming whitespace
    #[error("message content must not be empty")]
    EmptyMessageContent,
}

/// Errors reported by the persistence and identity collaborators.
///
/// The hub never retries on these; the triggering command is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The referenced record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// The credential could not be resolved to an identity
    #[error("invalid or expired credential")]
    InvalidCredential,

    /// The backing store failed
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
