//! Query execution.

use brewline_core::{Record, RecordId};
use brewline_registry::Registry;
use brewline_store::Store;
use tracing::trace;

use crate::plan::{ListQuery, QueryPlan, QueryPlanner};
use crate::{QueryError, QueryResult};

/// Query executor.
pub struct QueryExecutor<'r, 's> {
    registry: &'r Registry,
    store: &'s Store,
}

impl<'r, 's> QueryExecutor<'r, 's> {
    /// Create a new executor.
    pub fn new(registry: &'r Registry, store: &'s Store) -> Self {
        Self { registry, store }
    }

    /// Execute a list query. Results are ordered by creation time, then id.
    pub fn list(&self, query: &ListQuery) -> QueryResult<Vec<Record>> {
        let plan = QueryPlanner::new(self.registry, self.store).plan(query)?;
        trace!(entity = %query.entity, plan = ?plan, "executing list");

        let candidates = match &plan {
            QueryPlan::CollectionScan { entity } => self.store.scan(entity)?,
            QueryPlan::ForeignKeyLookup {
                entity,
                field,
                target,
            } => self.store.find_by_foreign_key(entity, field, target)?,
        };

        let mut records = Vec::with_capacity(candidates.len());
        for record in candidates {
            if query.matches(&record)? {
                records.push(record);
            }
        }
        sort_records(&mut records);
        Ok(records)
    }

    /// Fetch one record by id.
    pub fn get(&self, entity: &str, id: &RecordId) -> QueryResult<Option<Record>> {
        if !self.registry.has_entity(entity) {
            return Err(QueryError::unknown_entity(entity));
        }
        Ok(self.store.get(entity, id)?)
    }
}

/// Sort records into list order: creation time, then id.
pub fn sort_records(records: &mut [Record]) {
    records.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
