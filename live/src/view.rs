//! Client-side reconstruction of a live query result.

use std::collections::HashMap;

use brewline_core::{CommitSeq, Record, RecordId};
use brewline_query::sort_records;

use crate::subscription::{Change, Delta, Subscription};

/// The matching set as seen by a subscriber: the snapshot with every delta
/// applied in order.
#[derive(Debug, Clone)]
pub struct LiveView {
    records: HashMap<RecordId, Record>,
    seq: CommitSeq,
}

impl LiveView {
    pub fn new(snapshot: &[Record], seq: CommitSeq) -> Self {
        Self {
            records: snapshot.iter().map(|r| (r.id.clone(), r.clone())).collect(),
            seq,
        }
    }

    /// Start from a subscription's snapshot.
    pub fn from_subscription(subscription: &Subscription) -> Self {
        Self::new(subscription.snapshot(), subscription.snapshot_seq())
    }

    pub fn apply(&mut self, change: &Change) {
        match &change.delta {
            Delta::Added { record } | Delta::Updated { record } => {
                self.records.insert(record.id.clone(), record.clone());
            }
            Delta::Removed { id } => {
                self.records.remove(id);
            }
        }
        self.seq = change.seq;
    }

    /// Apply every change currently queued on `subscription`.
    pub fn catch_up(&mut self, subscription: &mut Subscription) -> usize {
        let changes = subscription.drain();
        for change in &changes {
            self.apply(change);
        }
        changes.len()
    }

    /// Sequence number of the last change applied.
    pub fn seq(&self) -> CommitSeq {
        self.seq
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in list order.
    pub fn records(&self) -> Vec<Record> {
        let mut records: Vec<Record> = self.records.values().cloned().collect();
        sort_records(&mut records);
        records
    }
}
