//! Core record storage implementation.

use crate::index::ForeignKeyIndex;
use crate::{StoreError, StoreResult, StoreSnapshot};
use brewline_core::{Record, RecordId};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};

/// The in-memory store of record.
///
/// The set of collections is fixed at construction. Reads never block on
/// each other; writes to one record lock only the shard holding it. Keeping
/// a collection and the foreign-key index in step is the caller's job:
/// the mutation engine performs all writes from one commit section.
#[derive(Debug)]
pub struct Store {
    /// Entity name -> (record id -> record)
    collections: HashMap<String, DashMap<RecordId, Record>>,
    /// Foreign-key index
    fk_index: ForeignKeyIndex,
}

impl Store {
    /// Create an empty store with one collection per entity and the given
    /// (entity, field) foreign keys indexed.
    pub fn new<E, S, K, KE, KF>(entities: E, foreign_keys: K) -> Self
    where
        E: IntoIterator<Item = S>,
        S: Into<String>,
        K: IntoIterator<Item = (KE, KF)>,
        KE: Into<String>,
        KF: Into<String>,
    {
        Self {
            collections: entities
                .into_iter()
                .map(|name| (name.into(), DashMap::new()))
                .collect(),
            fk_index: ForeignKeyIndex::new(foreign_keys),
        }
    }

    fn collection(&self, entity: &str) -> StoreResult<&DashMap<RecordId, Record>> {
        self.collections
            .get(entity)
            .ok_or_else(|| StoreError::UnknownCollection(entity.to_string()))
    }

    // ==================== Write Operations ====================

    /// Insert a new record. Fails if the id is already taken.
    pub fn insert(&self, record: Record) -> StoreResult<()> {
        let collection = self.collection(&record.entity)?;
        match collection.entry(record.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::DuplicateId {
                entity: record.entity,
                id: record.id,
            }),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                self.fk_index.insert(&record);
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Replace an existing record wholesale, returning the previous state.
    pub fn replace(&self, record: Record) -> StoreResult<Record> {
        let collection = self.collection(&record.entity)?;
        let mut slot = collection
            .get_mut(&record.id)
            .ok_or_else(|| StoreError::RecordNotFound {
                entity: record.entity.clone(),
                id: record.id.clone(),
            })?;
        self.fk_index.update(slot.value(), &record);
        Ok(std::mem::replace(&mut *slot, record))
    }

    /// Remove a record, returning it.
    pub fn remove(&self, entity: &str, id: &RecordId) -> StoreResult<Record> {
        let collection = self.collection(entity)?;
        let (_, record) = collection
            .remove(id)
            .ok_or_else(|| StoreError::RecordNotFound {
                entity: entity.to_string(),
                id: id.clone(),
            })?;
        self.fk_index.remove(&record);
        Ok(record)
    }

    // ==================== Read Operations ====================

    /// Get a record by id.
    pub fn get(&self, entity: &str, id: &RecordId) -> StoreResult<Option<Record>> {
        Ok(self.collection(entity)?.get(id).map(|r| r.value().clone()))
    }

    /// Check if a record exists. Unknown entities hold nothing.
    pub fn contains(&self, entity: &str, id: &RecordId) -> bool {
        self.collections
            .get(entity)
            .is_some_and(|c| c.contains_key(id))
    }

    /// Every record of an entity, in no particular order.
    pub fn scan(&self, entity: &str) -> StoreResult<Vec<Record>> {
        Ok(self
            .collection(entity)?
            .iter()
            .map(|r| r.value().clone())
            .collect())
    }

    /// Number of records of an entity.
    pub fn len(&self, entity: &str) -> StoreResult<usize> {
        Ok(self.collection(entity)?.len())
    }

    /// Check if an entity has a collection.
    pub fn has_collection(&self, entity: &str) -> bool {
        self.collections.contains_key(entity)
    }

    /// Check whether `entity.field` lookups are served by the index.
    pub fn is_indexed(&self, entity: &str, field: &str) -> bool {
        self.fk_index.is_indexed(entity, field)
    }

    /// Records of `entity` whose foreign key `field` references `target`.
    pub fn find_by_foreign_key(
        &self,
        entity: &str,
        field: &str,
        target: &RecordId,
    ) -> StoreResult<Vec<Record>> {
        let collection = self.collection(entity)?;
        if !self.fk_index.is_indexed(entity, field) {
            return Err(StoreError::NotIndexed {
                entity: entity.to_string(),
                field: field.to_string(),
            });
        }
        // An id can outlive its record for a moment while a delete is in
        // flight; skip those.
        Ok(self
            .fk_index
            .get(entity, field, target)
            .iter()
            .filter_map(|id| collection.get(id).map(|r| r.value().clone()))
            .collect())
    }

    // ==================== Snapshots ====================

    /// Copy every collection into a serializable snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        let collections = self
            .collections
            .iter()
            .map(|(entity, records)| {
                let records: BTreeMap<RecordId, Record> = records
                    .iter()
                    .map(|r| (r.key().clone(), r.value().clone()))
                    .collect();
                (entity.clone(), records)
            })
            .collect();
        StoreSnapshot { collections }
    }

    /// Replace the contents of the store with a snapshot.
    ///
    /// Every snapshot collection must exist in this store. The store is
    /// left untouched when that check fails.
    pub fn restore(&self, snapshot: StoreSnapshot) -> StoreResult<()> {
        if let Some(unknown) = snapshot
            .collections
            .keys()
            .find(|name| !self.collections.contains_key(name.as_str()))
        {
            return Err(StoreError::UnknownCollection(unknown.clone()));
        }

        for collection in self.collections.values() {
            collection.clear();
        }
        self.fk_index.clear();

        for (_, records) in snapshot.collections {
            for (_, record) in records {
                self.insert(record)?;
            }
        }
        Ok(())
    }
}
