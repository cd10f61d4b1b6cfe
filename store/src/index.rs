//! Foreign-key index for relation lookups.

use brewline_core::{Record, RecordId};
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};

/// Key for the foreign-key index: (entity, field, referenced id)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FkKey {
    entity: String,
    field: String,
    target: RecordId,
}

/// Foreign-key index: (entity, field, referenced id) -> Set<RecordId>
///
/// Only the (entity, field) pairs declared at construction are indexed.
#[derive(Debug, Default)]
pub struct ForeignKeyIndex {
    /// Indexed fields per entity.
    fields: HashMap<String, Vec<String>>,
    index: DashMap<FkKey, HashSet<RecordId>>,
}

impl ForeignKeyIndex {
    pub fn new<I, E, F>(keys: I) -> Self
    where
        I: IntoIterator<Item = (E, F)>,
        E: Into<String>,
        F: Into<String>,
    {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        for (entity, field) in keys {
            let entry = fields.entry(entity.into()).or_default();
            let field = field.into();
            if !entry.contains(&field) {
                entry.push(field);
            }
        }
        Self {
            fields,
            index: DashMap::new(),
        }
    }

    /// Check whether `entity.field` is indexed.
    pub fn is_indexed(&self, entity: &str, field: &str) -> bool {
        self.fields
            .get(entity)
            .is_some_and(|f| f.iter().any(|name| name == field))
    }

    /// Index every foreign key the record holds.
    pub fn insert(&self, record: &Record) {
        for field in self.indexed_fields(&record.entity) {
            if let Some(target) = record.reference(field) {
                self.index
                    .entry(Self::key(&record.entity, field, target))
                    .or_default()
                    .insert(record.id.clone());
            }
        }
    }

    /// Drop every foreign key the record holds.
    pub fn remove(&self, record: &Record) {
        for field in self.indexed_fields(&record.entity) {
            if let Some(target) = record.reference(field) {
                let key = Self::key(&record.entity, field, target);
                self.index.remove_if_mut(&key, |_, set| {
                    set.remove(&record.id);
                    set.is_empty()
                });
            }
        }
    }

    /// Move the index entries of a record from its old to its new state.
    pub fn update(&self, before: &Record, after: &Record) {
        self.remove(before);
        self.insert(after);
    }

    /// Ids of `entity` records whose `field` references `target`.
    pub fn get(&self, entity: &str, field: &str, target: &RecordId) -> Vec<RecordId> {
        let key = Self::key(entity, field, target.clone());
        self.index
            .get(&key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop all entries, keeping the indexed field set.
    pub fn clear(&self) {
        self.index.clear();
    }

    fn indexed_fields(&self, entity: &str) -> impl Iterator<Item = &str> {
        self.fields
            .get(entity)
            .into_iter()
            .flat_map(|f| f.iter().map(|s| s.as_str()))
    }

    fn key(entity: &str, field: &str, target: RecordId) -> FkKey {
        FkKey {
            entity: entity.to_string(),
            field: field.to_string(),
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewline_core::fields;
    use chrono::Utc;

    fn recipe(id: &str, user: &str) -> Record {
        Record::new(
            RecordId::new(id),
            "Recipe",
            fields! { "userId" => RecordId::new(user), "title" => "Drip" },
            Utc::now(),
        )
    }

    #[test]
    fn test_insert_and_get() {
        // GIVEN an index over Recipe.userId
        let index = ForeignKeyIndex::new([("Recipe", "userId")]);

        // WHEN two recipes of u1 are inserted
        index.insert(&recipe("r1", "u1"));
        index.insert(&recipe("r2", "u1"));
        index.insert(&recipe("r3", "u2"));

        // THEN both are found under u1
        let mut ids = index.get("Recipe", "userId", &RecordId::new("u1"));
        ids.sort();
        assert_eq!(ids, vec![RecordId::new("r1"), RecordId::new("r2")]);
    }

    #[test]
    fn test_remove_drops_empty_sets() {
        let index = ForeignKeyIndex::new([("Recipe", "userId")]);
        let r1 = recipe("r1", "u1");
        index.insert(&r1);

        index.remove(&r1);

        assert!(index.get("Recipe", "userId", &RecordId::new("u1")).is_empty());
        assert!(index.index.is_empty());
    }

    #[test]
    fn test_update_moves_entry() {
        // GIVEN r1 owned by u1
        let index = ForeignKeyIndex::new([("Recipe", "userId")]);
        let before = recipe("r1", "u1");
        index.insert(&before);

        // WHEN reassigned to u2
        let after = recipe("r1", "u2");
        index.update(&before, &after);

        // THEN only u2 sees it
        assert!(index.get("Recipe", "userId", &RecordId::new("u1")).is_empty());
        assert_eq!(
            index.get("Recipe", "userId", &RecordId::new("u2")),
            vec![RecordId::new("r1")]
        );
    }

    #[test]
    fn test_unindexed_fields_are_ignored() {
        let index = ForeignKeyIndex::new([("Event", "storeId")]);
        index.insert(&recipe("r1", "u1"));

        assert!(!index.is_indexed("Recipe", "userId"));
        assert!(index.is_indexed("Event", "storeId"));
        assert!(index.get("Recipe", "userId", &RecordId::new("u1")).is_empty());
    }
}
