//! Create operation - builds a new record.

use brewline_core::{Fields, Record, RecordId};
use brewline_registry::{Registry, ValidationError};
use brewline_relation::RelationResolver;
use brewline_store::Store;
use chrono::{DateTime, Utc};

use crate::error::{MutationError, MutationResult};

/// Validate a create request and build the record to insert.
pub fn prepare_create(
    registry: &Registry,
    store: &Store,
    entity: &str,
    id: Option<RecordId>,
    fields: Fields,
    now: DateTime<Utc>,
) -> MutationResult<Record> {
    if id.as_ref().is_some_and(|id| id.as_str().is_empty()) {
        return Err(MutationError::invalid_id(entity));
    }

    // Validate fields and restore declared types; nulls mean absent
    let mut fields = registry.validate_fields(entity, fields)?;
    fields.retain(|_, value| !value.is_null());

    // Fill defaults and server stamps, then check required fields
    registry.apply_defaults(entity, &mut fields, now)?;
    registry.check_required(entity, &fields)?;

    // Foreign keys must point at existing parents
    RelationResolver::new(registry, store).validate_references(entity, &fields)?;

    let id = match id {
        Some(id) if store.contains(entity, &id) => {
            return Err(ValidationError::DuplicateId {
                entity: entity.to_string(),
                id,
            }
            .into())
        }
        Some(id) => id,
        None => RecordId::generate(),
    };

    Ok(Record::new(id, entity, fields, now))
}
