//! Commits: the unit of change published by the mutation engine.

use crate::{CommitSeq, Record, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of change a commit applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "created"),
            ChangeKind::Updated => write!(f, "updated"),
            ChangeKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// A single committed change to one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub seq: CommitSeq,
    pub kind: ChangeKind,
    pub entity: String,
    pub id: RecordId,
    /// Record state before the change (absent for creates).
    pub before: Option<Record>,
    /// Record state after the change (absent for deletes).
    pub after: Option<Record>,
    pub committed_at: DateTime<Utc>,
}

impl Commit {
    pub fn created(seq: CommitSeq, record: Record, at: DateTime<Utc>) -> Self {
        Self {
            seq,
            kind: ChangeKind::Created,
            entity: record.entity.clone(),
            id: record.id.clone(),
            before: None,
            after: Some(record),
            committed_at: at,
        }
    }

    pub fn updated(seq: CommitSeq, before: Record, after: Record, at: DateTime<Utc>) -> Self {
        Self {
            seq,
            kind: ChangeKind::Updated,
            entity: after.entity.clone(),
            id: after.id.clone(),
            before: Some(before),
            after: Some(after),
            committed_at: at,
        }
    }

    pub fn deleted(seq: CommitSeq, record: Record, at: DateTime<Utc>) -> Self {
        Self {
            seq,
            kind: ChangeKind::Deleted,
            entity: record.entity.clone(),
            id: record.id.clone(),
            before: Some(record),
            after: None,
            committed_at: at,
        }
    }
}

/// Receives every commit, in commit order, while the commit is still
/// serialized against other writers.
///
/// Implementations must not block: they run inside the commit section.
pub trait CommitListener: Send + Sync {
    fn on_commit(&self, commit: &Commit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    #[test]
    fn test_commit_constructors() {
        // GIVEN a record and an updated copy
        let now = Utc::now();
        let before = Record::new(RecordId::new("u1"), "User", fields! { "firstname" => "Ana" }, now);
        let mut after = before.clone();
        after.merge(fields! { "username" => "ana" });
        after.touch(now);

        // WHEN commits are built for each kind
        let created = Commit::created(CommitSeq::new(1), before.clone(), now);
        let updated = Commit::updated(CommitSeq::new(2), before.clone(), after.clone(), now);
        let deleted = Commit::deleted(CommitSeq::new(3), after.clone(), now);

        // THEN before/after are populated per kind
        assert_eq!(created.kind, ChangeKind::Created);
        assert!(created.before.is_none());
        assert_eq!(updated.before.as_ref().map(|r| r.version), Some(1));
        assert_eq!(updated.after.as_ref().map(|r| r.version), Some(2));
        assert_eq!(deleted.after, None);
        assert_eq!(deleted.entity, "User");
        assert_eq!(deleted.id, RecordId::new("u1"));
    }

    #[test]
    fn test_change_kind_display() {
        assert_eq!(ChangeKind::Created.to_string(), "created");
        assert_eq!(ChangeKind::Deleted.to_string(), "deleted");
    }
}
