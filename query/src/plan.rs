//! Query planning.

use brewline_core::{is_metadata_field, RecordId};
use brewline_registry::Registry;
use brewline_store::Store;

use crate::{Filter, QueryError, QueryResult};

/// A list request: every record of `entity` matching `filter`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub entity: String,
    pub filter: Option<Filter>,
}

impl ListQuery {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filter: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Evaluate the query's filter against one record of its entity.
    pub fn matches(&self, record: &brewline_core::Record) -> QueryResult<bool> {
        match &self.filter {
            Some(filter) => filter.matches(record),
            None => Ok(true),
        }
    }
}

/// How candidate records are produced before the filter runs.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// Scan every record of the entity.
    CollectionScan { entity: String },

    /// Read candidates from the foreign-key index.
    ForeignKeyLookup {
        entity: String,
        field: String,
        target: RecordId,
    },
}

/// Query planner.
pub struct QueryPlanner<'r, 's> {
    registry: &'r Registry,
    store: &'s Store,
}

impl<'r, 's> QueryPlanner<'r, 's> {
    /// Create a new planner.
    pub fn new(registry: &'r Registry, store: &'s Store) -> Self {
        Self { registry, store }
    }

    /// Check the query against the schema and choose an access path.
    pub fn plan(&self, query: &ListQuery) -> QueryResult<QueryPlan> {
        let entity = self
            .registry
            .get_entity(&query.entity)
            .ok_or_else(|| QueryError::unknown_entity(&query.entity))?;

        let Some(filter) = &query.filter else {
            return Ok(QueryPlan::CollectionScan {
                entity: query.entity.clone(),
            });
        };

        for field in filter.fields() {
            if !entity.has_field(field) && !is_metadata_field(field) {
                return Err(QueryError::unknown_field(&query.entity, field));
            }
        }

        // First pinned field the store keeps an index for
        let indexed = filter
            .pinned_references()
            .into_iter()
            .find(|(field, _)| self.store.is_indexed(&query.entity, field));
        match indexed {
            Some((field, target)) => Ok(QueryPlan::ForeignKeyLookup {
                entity: query.entity.clone(),
                field: field.to_string(),
                target,
            }),
            None => Ok(QueryPlan::CollectionScan {
                entity: query.entity.clone(),
            }),
        }
    }
}
