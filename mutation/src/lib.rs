//! Brewline Mutation
//!
//! Execute write operations (create/update/delete).
//!
//! Responsibilities:
//! - Validate mutations against the schema and referential rules
//! - Assign ids, defaults and timestamps
//! - Commit each change atomically and in a single global order
//! - Publish every commit to registered listeners
//!
//! # Module Structure
//!
//! - `engine` - MutationEngine: commit section, sequencing, publishing
//! - `ops/` - Individual operation implementations (create, update, delete)
//! - `error` - Error types for mutation failures
//! - `result` - Mutation requests and outcomes

mod engine;
mod error;
mod ops;
mod result;

pub use engine::MutationEngine;
pub use error::{MutationError, MutationResult};
pub use result::{Mutation, MutationOutcome};
