//! Mutation requests and outcomes.

use brewline_core::{Fields, Record, RecordId};

/// A write request.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Create a record. `id` is generated when `None`.
    Create {
        entity: String,
        id: Option<RecordId>,
        fields: Fields,
    },
    /// Merge `fields` into an existing record. Null values clear fields.
    Update {
        entity: String,
        id: RecordId,
        fields: Fields,
    },
    /// Delete a record. Nothing cascades.
    Delete { entity: String, id: RecordId },
}

impl Mutation {
    pub fn create(entity: impl Into<String>, fields: Fields) -> Self {
        Mutation::Create {
            entity: entity.into(),
            id: None,
            fields,
        }
    }

    pub fn update(entity: impl Into<String>, id: RecordId, fields: Fields) -> Self {
        Mutation::Update {
            entity: entity.into(),
            id,
            fields,
        }
    }

    pub fn delete(entity: impl Into<String>, id: RecordId) -> Self {
        Mutation::Delete {
            entity: entity.into(),
            id,
        }
    }

    /// The entity type this mutation targets.
    pub fn entity(&self) -> &str {
        match self {
            Mutation::Create { entity, .. }
            | Mutation::Update { entity, .. }
            | Mutation::Delete { entity, .. } => entity,
        }
    }
}

/// Outcome of a mutation operation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// Created a record.
    Created(Record),
    /// Updated a record.
    Updated { before: Record, after: Record },
    /// Empty update: nothing was committed.
    Unchanged(Record),
    /// Deleted a record.
    Deleted(Record),
}

impl MutationOutcome {
    /// The record as it stands after the mutation (the removed record for
    /// deletes).
    pub fn record(&self) -> &Record {
        match self {
            MutationOutcome::Created(r)
            | MutationOutcome::Unchanged(r)
            | MutationOutcome::Deleted(r) => r,
            MutationOutcome::Updated { after, .. } => after,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            MutationOutcome::Created(r)
            | MutationOutcome::Unchanged(r)
            | MutationOutcome::Deleted(r) => r,
            MutationOutcome::Updated { after, .. } => after,
        }
    }

    /// Whether the mutation produced a commit.
    pub fn committed(&self) -> bool {
        !matches!(self, MutationOutcome::Unchanged(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewline_core::fields;
    use chrono::Utc;

    #[test]
    fn test_outcome_record() {
        // GIVEN
        let record = Record::new(RecordId::new("t1"), "Todo", fields! { "content" => "grind" }, Utc::now());
        let mut after = record.clone();
        after.touch(Utc::now());

        // THEN
        let updated = MutationOutcome::Updated {
            before: record.clone(),
            after: after.clone(),
        };
        assert_eq!(updated.record().version, 2);
        assert!(updated.committed());
        assert!(!MutationOutcome::Unchanged(record.clone()).committed());
        assert_eq!(MutationOutcome::Deleted(record.clone()).into_record(), record);
    }

    #[test]
    fn test_mutation_entity() {
        let mutation = Mutation::delete("Recipe", RecordId::new("r1"));
        assert_eq!(mutation.entity(), "Recipe");
    }
}
