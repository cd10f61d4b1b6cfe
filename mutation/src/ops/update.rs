//! Update operation - merges a partial field map into a record.

use brewline_core::{Fields, RecordId};
use brewline_registry::Registry;
use brewline_relation::RelationResolver;
use brewline_store::Store;
use chrono::{DateTime, Utc};

use crate::error::{MutationError, MutationResult};
use crate::result::MutationOutcome;

/// Validate an update and build the new record state.
///
/// An empty partial yields [`MutationOutcome::Unchanged`]: the record is
/// left as is and nothing is committed.
pub fn prepare_update(
    registry: &Registry,
    store: &Store,
    entity: &str,
    id: &RecordId,
    partial: Fields,
    now: DateTime<Utc>,
) -> MutationResult<MutationOutcome> {
    if !registry.has_entity(entity) {
        return Err(MutationError::unknown_entity(entity));
    }
    let before = store
        .get(entity, id)?
        .ok_or_else(|| MutationError::not_found(entity, id))?;

    if partial.is_empty() {
        return Ok(MutationOutcome::Unchanged(before));
    }

    let partial = registry.validate_fields(entity, partial)?;
    let mut after = before.clone();
    after.merge(partial);

    // Required fields may not be cleared
    registry.check_required(entity, &after.fields)?;

    // The merged record must hold the same references a create would accept
    RelationResolver::new(registry, store).validate_references(entity, &after.fields)?;

    after.touch(now);
    Ok(MutationOutcome::Updated { before, after })
}
