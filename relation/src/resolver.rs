//! Relation resolution.

use brewline_core::{Fields, Record, RecordId, Value};
use brewline_query::sort_records;
use brewline_registry::{Registry, RelationDef, RelationKind};
use brewline_store::Store;
use tracing::debug;

use crate::{RelationError, RelationResult};

/// Resolves relation descriptors against the store.
pub struct RelationResolver<'r, 's> {
    registry: &'r Registry,
    store: &'s Store,
}

impl<'r, 's> RelationResolver<'r, 's> {
    /// Create a new resolver.
    pub fn new(registry: &'r Registry, store: &'s Store) -> Self {
        Self { registry, store }
    }

    // ==================== Write-side checks ====================

    /// Check that every non-null belongsTo foreign key in `fields` points at
    /// an existing record of the relation's target.
    ///
    /// Only keys present in `fields` are checked, so an update that leaves
    /// a dangling key alone does not fail on it.
    pub fn validate_references(&self, entity: &str, fields: &Fields) -> RelationResult<()> {
        let def = self
            .registry
            .get_entity(entity)
            .ok_or_else(|| RelationError::UnknownEntity(entity.to_string()))?;

        for relation in def.belongs_to() {
            let Some(id) = fields.get(&relation.foreign_key).and_then(Value::as_id) else {
                continue;
            };
            let id = RecordId::from(id);
            if !self.store.contains(&relation.target, &id) {
                debug!(
                    entity,
                    field = %relation.foreign_key,
                    target = %relation.target,
                    id = %id,
                    "rejecting dangling reference"
                );
                return Err(RelationError::DanglingReference {
                    entity: entity.to_string(),
                    field: relation.foreign_key.clone(),
                    target: relation.target.clone(),
                    id,
                });
            }
        }
        Ok(())
    }

    // ==================== Derived views ====================

    /// Every target record whose foreign key references `owner`.
    pub fn has_many(&self, entity: &str, owner: &RecordId, relation: &str) -> RelationResult<Vec<Record>> {
        let def = self.relation(entity, relation, RelationKind::HasMany)?;
        let mut records = self
            .store
            .find_by_foreign_key(&def.target, &def.foreign_key, owner)?;
        sort_records(&mut records);
        Ok(records)
    }

    /// The single target record whose foreign key references `owner`.
    ///
    /// More than one match is reported, never resolved by picking one.
    pub fn has_one(&self, entity: &str, owner: &RecordId, relation: &str) -> RelationResult<Option<Record>> {
        let def = self.relation(entity, relation, RelationKind::HasOne)?;
        let mut records = self
            .store
            .find_by_foreign_key(&def.target, &def.foreign_key, owner)?;
        match records.len() {
            0 | 1 => Ok(records.pop()),
            count => Err(RelationError::Cardinality {
                entity: entity.to_string(),
                relation: relation.to_string(),
                owner: owner.clone(),
                target: def.target.clone(),
                count,
            }),
        }
    }

    /// The parent a record's foreign key points at. Dangling or absent keys
    /// resolve to `None`.
    pub fn belongs_to(&self, record: &Record, relation: &str) -> RelationResult<Option<Record>> {
        let def = self.relation(&record.entity, relation, RelationKind::BelongsTo)?;
        match record.reference(&def.foreign_key) {
            Some(id) => Ok(self.store.get(&def.target, &id)?),
            None => Ok(None),
        }
    }

    /// Resolve an id-list field against one target entity, in list order.
    /// Dangling ids are dropped.
    pub fn resolve_ids(&self, record: &Record, field: &str, target: &str) -> RelationResult<Vec<Record>> {
        let mut resolved = Vec::new();
        for id in record.references(field) {
            if let Some(found) = self.store.get(target, &id)? {
                resolved.push(found);
            }
        }
        Ok(resolved)
    }

    /// Resolve an id-list field whose ids may belong to any of `candidates`.
    ///
    /// No type tag is stored with the ids, so each id is probed against the
    /// candidate collections in order and the first hit wins. Dangling ids
    /// are dropped. The entity of each result is on the record itself.
    pub fn resolve_polymorphic(
        &self,
        record: &Record,
        field: &str,
        candidates: &[&str],
    ) -> RelationResult<Vec<Record>> {
        let mut resolved = Vec::new();
        for id in record.references(field) {
            for entity in candidates {
                if let Some(found) = self.store.get(entity, &id)? {
                    resolved.push(found);
                    break;
                }
            }
        }
        Ok(resolved)
    }

    fn relation(&self, entity: &str, name: &str, expected: RelationKind) -> RelationResult<&'r RelationDef> {
        if !self.registry.has_entity(entity) {
            return Err(RelationError::UnknownEntity(entity.to_string()));
        }
        let def = self
            .registry
            .get_relation(entity, name)
            .ok_or_else(|| RelationError::unknown_relation(entity, name))?;
        if def.kind != expected {
            return Err(RelationError::WrongKind {
                entity: entity.to_string(),
                relation: name.to_string(),
                expected,
                found: def.kind,
            });
        }
        Ok(def)
    }
}
