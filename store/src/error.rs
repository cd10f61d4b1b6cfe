//! Store error types.

use brewline_core::{ErrorKind, RecordId};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// No collection exists for the entity type.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// A record with this id already exists.
    #[error("Duplicate id for {entity}: {id}")]
    DuplicateId { entity: String, id: RecordId },

    /// Record not found.
    #[error("{entity} not found: {id}")]
    RecordNotFound { entity: String, id: RecordId },

    /// Lookup on a field the foreign-key index does not cover.
    #[error("Field {entity}.{field} is not indexed")]
    NotIndexed { entity: String, field: String },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::UnknownCollection(_) | StoreError::DuplicateId { .. } => {
                ErrorKind::Validation
            }
            StoreError::RecordNotFound { .. } => ErrorKind::NotFound,
            StoreError::NotIndexed { .. } => ErrorKind::Schema,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
