//! RegistryBuilder for constructing an immutable Registry.

use crate::{
    validate, CustomTypeDef, EntityDef, EnumDef, FieldDef, FieldType, Registry, RelationDef,
    RelationKind,
};
use brewline_core::ErrorKind;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during registry construction.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Duplicate entity name: {0}")]
    DuplicateEntity(String),

    #[error("Duplicate enum name: {0}")]
    DuplicateEnum(String),

    #[error("Duplicate custom type name: {0}")]
    DuplicateCustomType(String),

    #[error("Duplicate field or relation '{name}' on {owner}")]
    DuplicateMember { owner: String, name: String },

    #[error("Enum {0} has no members")]
    EmptyEnum(String),

    #[error("Enum {name} lists member '{member}' twice")]
    DuplicateEnumMember { name: String, member: String },

    #[error("Field {owner}.{field} references unknown enum {name}")]
    UnknownEnum {
        owner: String,
        field: String,
        name: String,
    },

    #[error("Field {owner}.{field} references unknown custom type {name}")]
    UnknownCustomType {
        owner: String,
        field: String,
        name: String,
    },

    #[error("Relation {entity}.{relation} targets unknown entity {target}")]
    UnknownRelationTarget {
        entity: String,
        relation: String,
        target: String,
    },

    #[error("Relation {entity}.{relation}: foreign key {holder}.{field} does not exist")]
    MissingForeignKey {
        entity: String,
        relation: String,
        holder: String,
        field: String,
    },

    #[error("Relation {entity}.{relation}: foreign key {holder}.{field} must be a single Id, found {found}")]
    InvalidForeignKey {
        entity: String,
        relation: String,
        holder: String,
        field: String,
        found: String,
    },

    #[error("Default for {owner}.{field} is invalid: {reason}")]
    InvalidDefault {
        owner: String,
        field: String,
        reason: String,
    },
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Schema
    }
}

/// Builder for constructing an immutable Registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Entities being built, keyed by name.
    entities: HashMap<String, EntityDef>,
    /// Enumerations, keyed by name.
    enums: HashMap<String, EnumDef>,
    /// Custom types, keyed by name.
    custom_types: HashMap<String, CustomTypeDef>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity definition.
    pub fn define_entity(&mut self, name: impl Into<String>) -> EntityBuilder<'_> {
        EntityBuilder {
            builder: self,
            def: EntityDef::new(name),
            duplicate: None,
        }
    }

    /// Add a closed enumeration.
    pub fn define_enum<I, S>(&mut self, name: impl Into<String>, members: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.enums.contains_key(&name) {
            return Err(SchemaError::DuplicateEnum(name));
        }

        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Err(SchemaError::EmptyEnum(name));
        }
        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.as_str()) {
                return Err(SchemaError::DuplicateEnumMember {
                    name,
                    member: member.clone(),
                });
            }
        }

        self.enums.insert(name.clone(), EnumDef { name, members });
        Ok(())
    }

    /// Add a custom (struct) type.
    pub fn define_custom_type(&mut self, name: impl Into<String>) -> CustomTypeBuilder<'_> {
        CustomTypeBuilder {
            builder: self,
            def: CustomTypeDef {
                name: name.into(),
                fields: BTreeMap::new(),
            },
            duplicate: None,
        }
    }

    /// Build the immutable Registry.
    ///
    /// Cross references (enum and custom-type names, relation targets and
    /// foreign keys) are resolved here, so definition order does not matter.
    pub fn build(self) -> Result<Registry, SchemaError> {
        for custom in self.custom_types.values() {
            for field in custom.fields.values() {
                self.check_field_type(&custom.name, field)?;
            }
        }

        for entity in self.entities.values() {
            for field in entity.fields.values() {
                self.check_field_type(&entity.name, field)?;
            }
            for relation in entity.relations.values() {
                self.check_relation(entity, relation)?;
            }
        }

        let registry = Registry::new(self.entities, self.enums, self.custom_types);

        // Defaults are checked against the finished registry so enum and
        // custom-type defaults resolve.
        for entity in registry.all_entities() {
            for field in entity.fields.values() {
                if let Some(default) = &field.default {
                    validate::coerce_field(&registry, &entity.name, field, default.clone())
                        .map_err(|e| SchemaError::InvalidDefault {
                            owner: entity.name.clone(),
                            field: field.name.clone(),
                            reason: e.to_string(),
                        })?;
                }
            }
        }

        debug!(
            entities = registry.entity_count(),
            enums = registry.enum_count(),
            "schema registry built"
        );
        Ok(registry)
    }

    fn check_field_type(&self, owner: &str, field: &FieldDef) -> Result<(), SchemaError> {
        match &field.field_type {
            FieldType::Enum(name) if !self.enums.contains_key(name) => {
                Err(SchemaError::UnknownEnum {
                    owner: owner.to_string(),
                    field: field.name.clone(),
                    name: name.clone(),
                })
            }
            FieldType::Custom(name) if !self.custom_types.contains_key(name) => {
                Err(SchemaError::UnknownCustomType {
                    owner: owner.to_string(),
                    field: field.name.clone(),
                    name: name.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_relation(&self, entity: &EntityDef, relation: &RelationDef) -> Result<(), SchemaError> {
        if !self.entities.contains_key(&relation.target) {
            return Err(SchemaError::UnknownRelationTarget {
                entity: entity.name.clone(),
                relation: relation.name.clone(),
                target: relation.target.clone(),
            });
        }

        let holder_name = relation.key_holder(&entity.name);
        let holder = self.entities.get(holder_name);
        let key = holder.and_then(|h| h.get_field(&relation.foreign_key));
        let Some(key) = key else {
            return Err(SchemaError::MissingForeignKey {
                entity: entity.name.clone(),
                relation: relation.name.clone(),
                holder: holder_name.to_string(),
                field: relation.foreign_key.clone(),
            });
        };

        if key.field_type != FieldType::Id || key.array {
            return Err(SchemaError::InvalidForeignKey {
                entity: entity.name.clone(),
                relation: relation.name.clone(),
                holder: holder_name.to_string(),
                field: relation.foreign_key.clone(),
                found: key.type_label(),
            });
        }
        Ok(())
    }
}

/// Builder for an entity definition.
pub struct EntityBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    def: EntityDef,
    /// First member name declared twice, reported by `done`.
    duplicate: Option<String>,
}

impl<'a> EntityBuilder<'a> {
    /// Add a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        if self.is_declared(&field.name) {
            self.duplicate.get_or_insert(field.name.clone());
        }
        self.def.fields.insert(field.name.clone(), field);
        self
    }

    /// Declare that this entity holds `foreign_key`, referencing one `target`.
    pub fn belongs_to(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.relation(name.into(), RelationKind::BelongsTo, target.into(), foreign_key.into())
    }

    /// Declare a derived view of every `target` whose `foreign_key` is this record.
    pub fn has_many(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.relation(name.into(), RelationKind::HasMany, target.into(), foreign_key.into())
    }

    /// Like `has_many`, but at most one `target` may match.
    pub fn has_one(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.relation(name.into(), RelationKind::HasOne, target.into(), foreign_key.into())
    }

    fn relation(mut self, name: String, kind: RelationKind, target: String, foreign_key: String) -> Self {
        if self.is_declared(&name) {
            self.duplicate.get_or_insert(name.clone());
        }
        self.def.relations.insert(
            name.clone(),
            RelationDef {
                name,
                kind,
                target,
                foreign_key,
            },
        );
        self
    }

    fn is_declared(&self, name: &str) -> bool {
        self.def.fields.contains_key(name) || self.def.relations.contains_key(name)
    }

    /// Finish building this entity.
    pub fn done(self) -> Result<(), SchemaError> {
        if self.builder.entities.contains_key(&self.def.name) {
            return Err(SchemaError::DuplicateEntity(self.def.name));
        }
        if let Some(name) = self.duplicate {
            return Err(SchemaError::DuplicateMember {
                owner: self.def.name,
                name,
            });
        }

        self.builder.entities.insert(self.def.name.clone(), self.def);
        Ok(())
    }
}

/// Builder for a custom type definition.
pub struct CustomTypeBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    def: CustomTypeDef,
    duplicate: Option<String>,
}

impl<'a> CustomTypeBuilder<'a> {
    /// Add a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        if self.def.fields.contains_key(&field.name) {
            self.duplicate.get_or_insert(field.name.clone());
        }
        self.def.fields.insert(field.name.clone(), field);
        self
    }

    /// Finish building this custom type.
    pub fn done(self) -> Result<(), SchemaError> {
        if self.builder.custom_types.contains_key(&self.def.name) {
            return Err(SchemaError::DuplicateCustomType(self.def.name));
        }
        if let Some(name) = self.duplicate {
            return Err(SchemaError::DuplicateMember {
                owner: self.def.name,
                name,
            });
        }

        self.builder
            .custom_types
            .insert(self.def.name.clone(), self.def);
        Ok(())
    }
}
