//! Brewline Relation
//!
//! Enforces referential rules on write and computes derived relation
//! views on read. Foreign keys are the single source of truth: "owns many"
//! and "has one" views are projections over the store's foreign-key index
//! and are never persisted.

mod error;
mod resolver;

pub use error::{RelationError, RelationResult};
pub use resolver::RelationResolver;
