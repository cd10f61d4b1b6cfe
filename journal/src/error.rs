//! Journal error types.

use brewline_core::{CommitSeq, ErrorKind};
use brewline_registry::ValidationError;
use brewline_store::StoreError;
use thiserror::Error;

/// Journal errors.
#[derive(Debug, Error)]
pub enum JournalError {
    /// IO error during journal operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line that is not a valid commit.
    #[error("invalid entry at line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    /// Commits must be replayed in increasing sequence order.
    #[error("commit {seq} follows {previous}")]
    OutOfOrder { seq: CommitSeq, previous: CommitSeq },

    /// A commit carries no record state to apply.
    #[error("commit {seq} is missing its record")]
    MissingRecord { seq: CommitSeq },

    /// A recorded record no longer validates.
    #[error("commit {seq} does not validate: {source}")]
    Validation {
        seq: CommitSeq,
        #[source]
        source: ValidationError,
    },

    /// The store rejected a replayed change.
    #[error("commit {seq} could not be applied: {source}")]
    Store {
        seq: CommitSeq,
        #[source]
        source: StoreError,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl JournalError {
    pub fn invalid_format(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            line,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Journal
    }
}

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;
