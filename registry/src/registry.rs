//! The Registry - immutable schema lookup.

use crate::{CustomTypeDef, EntityDef, EnumDef, RelationDef};
use std::collections::{BTreeSet, HashMap};

/// The Registry provides runtime lookup of schema definitions.
/// It is immutable after construction.
#[derive(Debug)]
pub struct Registry {
    /// Entity definitions by name.
    entities: HashMap<String, EntityDef>,
    /// Enumerations by name.
    enums: HashMap<String, EnumDef>,
    /// Custom types by name.
    custom_types: HashMap<String, CustomTypeDef>,
}

impl Registry {
    /// Create a registry (use RegistryBuilder for construction).
    pub(crate) fn new(
        entities: HashMap<String, EntityDef>,
        enums: HashMap<String, EnumDef>,
        custom_types: HashMap<String, CustomTypeDef>,
    ) -> Self {
        Self {
            entities,
            enums,
            custom_types,
        }
    }

    // ==================== Entity Lookups ====================

    /// Get an entity definition by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// Check if an entity type is declared.
    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Get all entity definitions.
    pub fn all_entities(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.values()
    }

    /// Get all entity names, sorted.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ==================== Enum / Custom Type Lookups ====================

    /// Get an enumeration by name.
    pub fn get_enum(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    /// Get the number of enumerations.
    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    /// Get a custom type by name.
    pub fn get_custom_type(&self, name: &str) -> Option<&CustomTypeDef> {
        self.custom_types.get(name)
    }

    // ==================== Relation Lookups ====================

    /// Get a relation declared on an entity.
    pub fn get_relation(&self, entity: &str, relation: &str) -> Option<&RelationDef> {
        self.entities
            .get(entity)
            .and_then(|e| e.get_relation(relation))
    }

    /// Every (entity, field) pair that holds a foreign key for some
    /// relation. These are the fields the store must index.
    pub fn foreign_keys(&self) -> BTreeSet<(String, String)> {
        self.entities
            .values()
            .flat_map(|entity| {
                entity.relations.values().map(move |relation| {
                    (
                        relation.key_holder(&entity.name).to_string(),
                        relation.foreign_key.clone(),
                    )
                })
            })
            .collect()
    }
}
