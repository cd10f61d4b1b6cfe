//! Query error types.

use brewline_core::ErrorKind;
use brewline_store::StoreError;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur during query execution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("Unknown entity type: {name}")]
    UnknownEntity { name: String },

    #[error("Unknown field: {field} on entity {entity}")]
    UnknownField { entity: String, field: String },

    #[error("Cannot compare {field} ({left}) with {right}")]
    Incomparable {
        field: String,
        left: String,
        right: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueryError {
    pub fn unknown_entity(name: impl Into<String>) -> Self {
        Self::UnknownEntity { name: name.into() }
    }

    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn incomparable(
        field: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::Incomparable {
            field: field.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Store(e) => e.kind(),
            _ => ErrorKind::Query,
        }
    }
}
