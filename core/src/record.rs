//! Record structure.
//!
//! A record is one instance of an entity type: its identity, its field map
//! and the metadata the store maintains for it.

use crate::{Fields, RecordId, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Names of the metadata fields every record exposes alongside its fields.
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Returns true if `name` is managed by the store rather than the caller.
pub fn is_metadata_field(name: &str) -> bool {
    matches!(name, ID_FIELD | CREATED_AT_FIELD | UPDATED_AT_FIELD)
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier within the entity collection.
    pub id: RecordId,
    /// Entity type name (reference to registry).
    pub entity: String,
    /// Field values.
    pub fields: Fields,
    /// Bumped on every committed update.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Create a new record at version 1.
    pub fn new(id: RecordId, entity: impl Into<String>, fields: Fields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            entity: entity.into(),
            fields,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Get a field value by name. Null and absent fields both return `None`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// Get a field or metadata value by name, as seen by filters.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match name {
            ID_FIELD => Some(Value::Id(self.id.clone())),
            CREATED_AT_FIELD => Some(Value::DateTime(self.created_at)),
            UPDATED_AT_FIELD => Some(Value::DateTime(self.updated_at)),
            _ => self.get(name).cloned(),
        }
    }

    /// Get the id stored in a reference field.
    pub fn reference(&self, name: &str) -> Option<RecordId> {
        self.get(name).and_then(Value::as_id).map(RecordId::from)
    }

    /// Get every id stored in an id-list field. Non-id elements are skipped.
    pub fn references(&self, name: &str) -> Vec<RecordId> {
        self.get(name)
            .and_then(Value::as_list)
            .map(|items| items.iter().filter_map(Value::as_id).map(RecordId::from).collect())
            .unwrap_or_default()
    }

    /// Apply a partial field map. Null values clear the field.
    pub fn merge(&mut self, partial: Fields) {
        for (name, value) in partial {
            if value.is_null() {
                self.fields.remove(&name);
            } else {
                self.fields.insert(name, value);
            }
        }
    }

    /// Mark the record as updated.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}
