//! Serializable copy of the store.
//!
//! Layout: one collection per entity type, each record keyed by id. Enum
//! fields hold their literal member name and relation fields hold plain
//! ids, so the encoded form carries no type tags.

use brewline_core::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub collections: BTreeMap<String, BTreeMap<RecordId, Record>>,
}

impl StoreSnapshot {
    /// Total number of records across collections.
    pub fn record_count(&self) -> usize {
        self.collections.values().map(BTreeMap::len).sum()
    }

    /// Iterate every record.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.collections.values().flat_map(BTreeMap::values)
    }
}
