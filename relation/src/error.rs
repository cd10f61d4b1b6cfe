//! Relation error types.

use brewline_core::{ErrorKind, RecordId};
use brewline_registry::RelationKind;
use brewline_store::StoreError;
use thiserror::Error;

/// Errors that can occur while checking or resolving relations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelationError {
    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    #[error("Unknown relation {relation} on {entity}")]
    UnknownRelation { entity: String, relation: String },

    #[error("Relation {entity}.{relation} is {found}, expected {expected}")]
    WrongKind {
        entity: String,
        relation: String,
        expected: RelationKind,
        found: RelationKind,
    },

    #[error("{entity}.{field} references missing {target} {id}")]
    DanglingReference {
        entity: String,
        field: String,
        target: String,
        id: RecordId,
    },

    #[error("{entity}.{relation} of {owner} expects at most one {target}, found {count}")]
    Cardinality {
        entity: String,
        relation: String,
        owner: RecordId,
        target: String,
        count: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RelationError {
    pub fn unknown_relation(entity: impl Into<String>, relation: impl Into<String>) -> Self {
        Self::UnknownRelation {
            entity: entity.into(),
            relation: relation.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RelationError::UnknownEntity(_)
            | RelationError::UnknownRelation { .. }
            | RelationError::WrongKind { .. } => ErrorKind::Validation,
            RelationError::DanglingReference { .. } => ErrorKind::Referential,
            RelationError::Cardinality { .. } => ErrorKind::Consistency,
            RelationError::Store(e) => e.kind(),
        }
    }
}

/// Result type for relation operations.
pub type RelationResult<T> = Result<T, RelationError>;
