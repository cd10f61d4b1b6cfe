//! Session error types.

use brewline_core::ErrorKind;
use brewline_journal::JournalError;
use brewline_live::LiveError;
use brewline_mutation::MutationError;
use brewline_query::QueryError;
use brewline_registry::{SchemaError, ValidationError};
use brewline_relation::RelationError;
use brewline_store::StoreError;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The credential was rejected or has expired.
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// A snapshot cannot replace the store while subscriptions are open.
    #[error("cannot import a snapshot with {count} open subscriptions")]
    SubscriptionsOpen { count: usize },

    /// A snapshot cannot replace the store of a journaled database: the
    /// journal would no longer rebuild it.
    #[error("cannot import a snapshot into a journaled database")]
    JournaledImport,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Relation(#[from] RelationError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Live(#[from] LiveError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Error category, shared by every layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Unauthorized { .. } => ErrorKind::Unauthorized,
            SessionError::SubscriptionsOpen { .. } | SessionError::JournaledImport => ErrorKind::Consistency,
            SessionError::Schema(e) => e.kind(),
            SessionError::Validation(e) => e.kind(),
            SessionError::Query(e) => e.kind(),
            SessionError::Relation(e) => e.kind(),
            SessionError::Mutation(e) => e.kind(),
            SessionError::Live(e) => e.kind(),
            SessionError::Journal(e) => e.kind(),
            SessionError::Store(e) => e.kind(),
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
