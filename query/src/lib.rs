//! Brewline Query
//!
//! Filters and list execution over the store.
//!
//! Responsibilities:
//! - Evaluate filters against records
//! - Choose the foreign-key index when a filter pins a reference
//! - Return results in a stable order

mod error;
mod executor;
mod filter;
mod plan;

pub use error::{QueryError, QueryResult};
pub use executor::{sort_records, QueryExecutor};
pub use filter::Filter;
pub use plan::{ListQuery, QueryPlan, QueryPlanner};
