//! Live query error types.

use brewline_core::ErrorKind;
use brewline_query::QueryError;
use thiserror::Error;

use crate::SubscriptionId;

/// Errors that can occur while managing subscriptions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LiveError {
    #[error("Subscription not found: {0}")]
    NotFound(SubscriptionId),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl LiveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LiveError::NotFound(_) => ErrorKind::NotFound,
            LiveError::Query(e) => e.kind(),
        }
    }
}

/// Result type for live query operations.
pub type LiveResult<T> = Result<T, LiveError>;
