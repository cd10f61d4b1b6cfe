//! Brewline Store
//!
//! In-memory store of record. One concurrent collection per entity type,
//! keyed by record id, plus a foreign-key index that serves derived
//! relation views and indexed list filters without scanning.

mod error;
mod index;
mod snapshot;
mod store;

pub use error::{StoreError, StoreResult};
pub use index::ForeignKeyIndex;
pub use snapshot::StoreSnapshot;
pub use store::Store;
