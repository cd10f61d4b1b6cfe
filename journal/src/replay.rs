//! Rebuilding a store from recorded commits.

use brewline_core::{ChangeKind, Commit, CommitSeq, Record};
use brewline_registry::Registry;
use brewline_store::Store;
use tracing::info;

use crate::error::{JournalError, JournalResult};

/// Statistics from recovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Number of commits applied.
    pub commits_replayed: usize,
    /// Number of records created.
    pub records_created: usize,
    /// Number of records updated.
    pub records_updated: usize,
    /// Number of records deleted.
    pub records_deleted: usize,
    /// Sequence number of the last commit applied.
    pub last_seq: Option<CommitSeq>,
}

/// Apply `commits` to `store` in order.
///
/// Recorded records are re-validated against `registry`, which restores
/// the field types lost in serialization. Replay stops at the first commit
/// that cannot be applied.
pub fn replay(
    commits: impl IntoIterator<Item = Commit>,
    registry: &Registry,
    store: &Store,
) -> JournalResult<RecoveryStats> {
    let mut stats = RecoveryStats::default();

    for commit in commits {
        let seq = commit.seq;
        if let Some(previous) = stats.last_seq {
            if seq <= previous {
                return Err(JournalError::OutOfOrder { seq, previous });
            }
        }

        let store_error = |source| JournalError::Store { seq, source };
        match commit.kind {
            ChangeKind::Created => {
                let record = restore(registry, seq, commit.after)?;
                store.insert(record).map_err(store_error)?;
                stats.records_created += 1;
            }
            ChangeKind::Updated => {
                let record = restore(registry, seq, commit.after)?;
                store.replace(record).map_err(store_error)?;
                stats.records_updated += 1;
            }
            ChangeKind::Deleted => {
                store.remove(&commit.entity, &commit.id).map_err(store_error)?;
                stats.records_deleted += 1;
            }
        }

        stats.commits_replayed += 1;
        stats.last_seq = Some(seq);
    }

    info!(
        commits = stats.commits_replayed,
        created = stats.records_created,
        updated = stats.records_updated,
        deleted = stats.records_deleted,
        "journal replayed"
    );
    Ok(stats)
}

fn restore(registry: &Registry, seq: CommitSeq, record: Option<Record>) -> JournalResult<Record> {
    let record = record.ok_or(JournalError::MissingRecord { seq })?;
    registry
        .restore_record(record)
        .map_err(|source| JournalError::Validation { seq, source })
}
