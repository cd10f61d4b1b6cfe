//! Mutation error types.

use brewline_core::{ErrorKind, RecordId};
use brewline_registry::ValidationError;
use brewline_relation::RelationError;
use brewline_store::StoreError;
use thiserror::Error;

/// Result type for mutation operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Errors that can occur during mutation execution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MutationError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: RecordId },

    #[error("Invalid id for {entity}: ids must be non-empty")]
    InvalidId { entity: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Relation(#[from] RelationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MutationError {
    pub fn not_found(entity: impl Into<String>, id: &RecordId) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.clone(),
        }
    }

    pub fn invalid_id(entity: impl Into<String>) -> Self {
        Self::InvalidId {
            entity: entity.into(),
        }
    }

    pub fn unknown_entity(name: impl Into<String>) -> Self {
        Self::Validation(ValidationError::UnknownEntity(name.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MutationError::NotFound { .. } => ErrorKind::NotFound,
            MutationError::InvalidId { .. } => ErrorKind::Validation,
            MutationError::Validation(e) => e.kind(),
            MutationError::Relation(e) => e.kind(),
            MutationError::Store(e) => e.kind(),
        }
    }
}
