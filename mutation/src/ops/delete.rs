//! Delete operation - removes a record by id.

use brewline_core::{Record, RecordId};
use brewline_registry::Registry;
use brewline_store::Store;

use crate::error::{MutationError, MutationResult};

/// Look up the record a delete will remove.
///
/// Deletes never cascade: records referencing this one keep their now
/// dangling ids, and readers tolerate them.
pub fn prepare_delete(
    registry: &Registry,
    store: &Store,
    entity: &str,
    id: &RecordId,
) -> MutationResult<Record> {
    if !registry.has_entity(entity) {
        return Err(MutationError::unknown_entity(entity));
    }
    store
        .get(entity, id)?
        .ok_or_else(|| MutationError::not_found(entity, id))
}
