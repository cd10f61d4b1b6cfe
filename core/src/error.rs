//! Error taxonomy shared by every Brewline layer.
//!
//! Each crate defines its own error enum; all of them classify into one of
//! these kinds so callers can branch without matching every variant.

use std::fmt;

/// The category an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid schema declaration, fatal at registration.
    Schema,
    /// Field payload violates the declared schema.
    Validation,
    /// A foreign key points at a record that does not exist.
    Referential,
    /// The addressed record does not exist.
    NotFound,
    /// Stored data contradicts a relation's cardinality.
    Consistency,
    /// A filter could not be evaluated.
    Query,
    /// The session credential was rejected.
    Unauthorized,
    /// The commit journal failed to read or write.
    Journal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Referential => "ReferentialError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Consistency => "ConsistencyError",
            ErrorKind::Query => "QueryError",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Journal => "JournalError",
        };
        f.write_str(name)
    }
}
