//! Field validation against the registry.
//!
//! Payloads arrive as loosely typed field maps (often decoded from JSON).
//! Validation checks every field against its declaration and returns the
//! map with declared types restored: ISO strings become dates and
//! timestamps, strings in Id fields become record references.

use crate::{FieldDef, FieldType, Registry};
use brewline_core::{is_metadata_field, parse_date, parse_datetime, ErrorKind, Fields, Record, RecordId, Value};
use chrono::{DateTime, Utc};
use regex_lite::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Errors raised when a payload violates the declared schema.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    #[error("Unknown field {entity}.{field}")]
    UnknownField { entity: String, field: String },

    #[error("Field {entity}.{field} is managed by the store and cannot be written")]
    ReadOnlyField { entity: String, field: String },

    #[error("Type mismatch for {entity}.{field}: expected {expected}, got {actual}")]
    TypeMismatch {
        entity: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid value '{value}' for {entity}.{field}: not a member of {enum_name}")]
    InvalidEnumValue {
        entity: String,
        field: String,
        enum_name: String,
        value: String,
    },

    #[error("Field {entity}.{field} expects a list, got {actual}")]
    NotAList {
        entity: String,
        field: String,
        actual: String,
    },

    #[error("Field {entity}.{field} expects a single value, got a list")]
    UnexpectedList { entity: String, field: String },

    #[error("Field {entity}.{field} contains a null element")]
    NullElement { entity: String, field: String },

    #[error("Field {entity}.{field} holds at most {max} items, got {actual}")]
    TooManyItems {
        entity: String,
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Missing required field {entity}.{field}")]
    MissingRequired { entity: String, field: String },

    #[error("Required field {entity}.{field} is empty")]
    EmptyRequired { entity: String, field: String },

    #[error("Invalid email for {entity}.{field}: '{value}'")]
    InvalidEmail {
        entity: String,
        field: String,
        value: String,
    },

    #[error("Duplicate id for {entity}: {id}")]
    DuplicateId { entity: String, id: RecordId },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }

    pub fn type_mismatch(
        entity: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            entity: entity.into(),
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_required(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingRequired {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl Registry {
    /// Validate a (possibly partial) payload for `entity`.
    ///
    /// Nulls pass through untouched: on create they mean absent, on update
    /// they clear the field. Required fields are not checked here, see
    /// [`Registry::check_required`].
    pub fn validate_fields(&self, entity: &str, fields: Fields) -> ValidationResult<Fields> {
        let def = self
            .get_entity(entity)
            .ok_or_else(|| ValidationError::UnknownEntity(entity.to_string()))?;

        let mut normalized = Fields::new();
        for (name, value) in fields {
            if is_metadata_field(&name) {
                return Err(ValidationError::ReadOnlyField {
                    entity: entity.to_string(),
                    field: name,
                });
            }
            let field = def
                .get_field(&name)
                .ok_or_else(|| ValidationError::unknown_field(entity, &name))?;
            let value = coerce_field(self, entity, field, value)?;
            normalized.insert(name, value);
        }
        Ok(normalized)
    }

    /// Check that every required field of `entity` is present and non-empty.
    pub fn check_required(&self, entity: &str, fields: &Fields) -> ValidationResult<()> {
        let def = self
            .get_entity(entity)
            .ok_or_else(|| ValidationError::UnknownEntity(entity.to_string()))?;
        check_required_fields(entity, def.fields.values(), fields)
    }

    /// Fill absent fields from declared defaults and creation stamps.
    pub fn apply_defaults(&self, entity: &str, fields: &mut Fields, now: DateTime<Utc>) -> ValidationResult<()> {
        let def = self
            .get_entity(entity)
            .ok_or_else(|| ValidationError::UnknownEntity(entity.to_string()))?;

        for field in def.fields.values() {
            if fields.get(&field.name).is_some_and(|v| !v.is_null()) {
                continue;
            }
            let value = if field.stamp_on_create {
                match field.field_type {
                    FieldType::Date => Some(Value::Date(now.date_naive())),
                    _ => Some(Value::DateTime(now)),
                }
            } else {
                field.default.clone()
            };
            if let Some(value) = value {
                fields.insert(field.name.clone(), value);
            }
        }
        Ok(())
    }

    /// Re-check a stored record (from a snapshot or journal) and restore the
    /// declared types its fields lost in serialization.
    pub fn restore_record(&self, mut record: Record) -> ValidationResult<Record> {
        let fields = std::mem::take(&mut record.fields);
        let mut fields = self.validate_fields(&record.entity, fields)?;
        fields.retain(|_, value| !value.is_null());
        self.check_required(&record.entity, &fields)?;
        record.fields = fields;
        Ok(record)
    }
}

fn check_required_fields<'a>(
    owner: &str,
    defs: impl Iterator<Item = &'a FieldDef>,
    fields: &BTreeMap<String, Value>,
) -> ValidationResult<()> {
    for def in defs.filter(|d| d.required) {
        match fields.get(&def.name) {
            None | Some(Value::Null) => {
                return Err(ValidationError::missing_required(owner, &def.name));
            }
            Some(value) if is_blank(value) => {
                return Err(ValidationError::EmptyRequired {
                    entity: owner.to_string(),
                    field: def.name.clone(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::List(items) => items.is_empty(),
        _ => false,
    }
}

/// Validate one field value and restore its declared type.
pub(crate) fn coerce_field(
    registry: &Registry,
    owner: &str,
    field: &FieldDef,
    value: Value,
) -> ValidationResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    if !field.array {
        if value.is_list() {
            return Err(ValidationError::UnexpectedList {
                entity: owner.to_string(),
                field: field.name.clone(),
            });
        }
        return coerce_scalar(registry, owner, &field.name, &field.field_type, value);
    }

    let items = match value {
        Value::List(items) => items,
        other => {
            return Err(ValidationError::NotAList {
                entity: owner.to_string(),
                field: field.name.clone(),
                actual: other.type_name().to_string(),
            })
        }
    };
    if let Some(max) = field.max_items {
        if items.len() > max {
            return Err(ValidationError::TooManyItems {
                entity: owner.to_string(),
                field: field.name.clone(),
                max,
                actual: items.len(),
            });
        }
    }

    items
        .into_iter()
        .map(|item| {
            if item.is_null() {
                return Err(ValidationError::NullElement {
                    entity: owner.to_string(),
                    field: field.name.clone(),
                });
            }
            coerce_scalar(registry, owner, &field.name, &field.field_type, item)
        })
        .collect::<ValidationResult<Vec<_>>>()
        .map(Value::List)
}

fn coerce_scalar(
    registry: &Registry,
    owner: &str,
    name: &str,
    field_type: &FieldType,
    value: Value,
) -> ValidationResult<Value> {
    let mismatch = |value: &Value| {
        ValidationError::type_mismatch(owner, name, field_type.to_string(), value.type_name())
    };

    match (field_type, value) {
        (FieldType::String, v @ Value::String(_)) => Ok(v),
        (FieldType::Email, Value::String(s)) => {
            if is_email(&s) {
                Ok(Value::String(s))
            } else {
                Err(ValidationError::InvalidEmail {
                    entity: owner.to_string(),
                    field: name.to_string(),
                    value: s,
                })
            }
        }
        (FieldType::Int, v @ Value::Int(_)) => Ok(v),
        (FieldType::Float, v @ Value::Float(_)) => Ok(v),
        (FieldType::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
        (FieldType::Bool, v @ Value::Bool(_)) => Ok(v),
        (FieldType::Date, v @ Value::Date(_)) => Ok(v),
        (FieldType::Date, v @ Value::String(_)) => v
            .as_str()
            .and_then(parse_date)
            .map(Value::Date)
            .ok_or_else(|| mismatch(&v)),
        (FieldType::DateTime, v @ Value::DateTime(_)) => Ok(v),
        (FieldType::DateTime, v @ Value::String(_)) => v
            .as_str()
            .and_then(parse_datetime)
            .map(Value::DateTime)
            .ok_or_else(|| mismatch(&v)),
        (FieldType::Id, v @ Value::Id(_)) => Ok(v),
        (FieldType::Id, Value::String(s)) if !s.is_empty() => Ok(Value::Id(RecordId::new(s))),
        (FieldType::Enum(enum_name), Value::String(s)) => {
            let member = registry
                .get_enum(enum_name)
                .is_some_and(|e| e.contains(&s));
            if member {
                Ok(Value::String(s))
            } else {
                Err(ValidationError::InvalidEnumValue {
                    entity: owner.to_string(),
                    field: name.to_string(),
                    enum_name: enum_name.clone(),
                    value: s,
                })
            }
        }
        (FieldType::Custom(type_name), Value::Object(object)) => {
            coerce_object(registry, owner, name, type_name, object)
        }
        (_, other) => Err(mismatch(&other)),
    }
}

fn coerce_object(
    registry: &Registry,
    owner: &str,
    name: &str,
    type_name: &str,
    object: BTreeMap<String, Value>,
) -> ValidationResult<Value> {
    let custom = registry
        .get_custom_type(type_name)
        .ok_or_else(|| ValidationError::type_mismatch(owner, name, type_name, "Object"))?;

    let mut normalized = BTreeMap::new();
    for (key, value) in object {
        let path = format!("{}.{}", name, key);
        let field = custom
            .fields
            .get(&key)
            .ok_or_else(|| ValidationError::unknown_field(owner, &path))?;
        let value = coerce_field(registry, owner, field, value).map_err(|e| nest(e, name))?;
        if !value.is_null() {
            normalized.insert(key, value);
        }
    }

    check_required_fields(owner, custom.fields.values(), &normalized).map_err(|e| nest(e, name))?;
    Ok(Value::Object(normalized))
}

/// Prefix the field path of a nested error with its parent field.
fn nest(error: ValidationError, parent: &str) -> ValidationError {
    use ValidationError::*;
    let prefix = |field: String| {
        if field.starts_with(&format!("{}.", parent)) {
            field
        } else {
            format!("{}.{}", parent, field)
        }
    };
    match error {
        TypeMismatch { entity, field, expected, actual } => TypeMismatch {
            entity,
            field: prefix(field),
            expected,
            actual,
        },
        MissingRequired { entity, field } => MissingRequired {
            entity,
            field: prefix(field),
        },
        EmptyRequired { entity, field } => EmptyRequired {
            entity,
            field: prefix(field),
        },
        other => other,
    }
}

fn is_email(s: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}
