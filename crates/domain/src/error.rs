//! Error types for the domain crate.

use thiserror::Error;

/// Errors raised while building domain values from caller input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A poll tally was given the same option label twice
    #[error("Duplicate poll option: {label}")]
    DuplicateOption { label: String },

    /// A poll option label was empty after trimming
    #[error("Poll option label must not be empty")]
    EmptyOptionLabel,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DomainError>;
