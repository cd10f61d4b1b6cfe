//! Subscription handle and the values it yields.

use std::fmt;
use std::sync::Weak;

use brewline_core::{CommitSeq, Record, RecordId};
use brewline_query::ListQuery;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::manager::SubscriptionTable;

/// Unique subscription identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Snapshot is being computed.
    Initializing,
    /// Snapshot delivered; deltas flow.
    Streaming,
    /// Cancelled. Nothing more is yielded.
    Cancelled,
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionState::Initializing => write!(f, "initializing"),
            SubscriptionState::Streaming => write!(f, "streaming"),
            SubscriptionState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A change to a subscription's matching set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Delta {
    /// A record started matching.
    Added { record: Record },
    /// A matching record changed and still matches.
    Updated { record: Record },
    /// A record stopped matching or was deleted.
    Removed { id: RecordId },
}

impl Delta {
    /// Id of the record this delta concerns.
    pub fn id(&self) -> &RecordId {
        match self {
            Delta::Added { record } | Delta::Updated { record } => &record.id,
            Delta::Removed { id } => id,
        }
    }
}

/// A delta tagged with the commit that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub seq: CommitSeq,
    pub delta: Delta,
}

/// Client handle for one live query.
///
/// Dropping the handle cancels the subscription.
pub struct Subscription {
    id: SubscriptionId,
    query: ListQuery,
    snapshot: Vec<Record>,
    snapshot_seq: CommitSeq,
    receiver: UnboundedReceiver<Change>,
    token: CancellationToken,
    table: Weak<SubscriptionTable>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        query: ListQuery,
        snapshot: Vec<Record>,
        snapshot_seq: CommitSeq,
        receiver: UnboundedReceiver<Change>,
        token: CancellationToken,
        table: Weak<SubscriptionTable>,
    ) -> Self {
        Self {
            id,
            query,
            snapshot,
            snapshot_seq,
            receiver,
            token,
            table,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Records matching the query when the subscription was opened, in
    /// list order.
    pub fn snapshot(&self) -> &[Record] {
        &self.snapshot
    }

    /// Last commit reflected in the snapshot. Every delta carries a later
    /// sequence number.
    pub fn snapshot_seq(&self) -> CommitSeq {
        self.snapshot_seq
    }

    pub fn state(&self) -> SubscriptionState {
        if self.token.is_cancelled() {
            SubscriptionState::Cancelled
        } else {
            SubscriptionState::Streaming
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the next change.
    ///
    /// Returns `None` once the subscription is cancelled, including for
    /// changes that were already queued.
    pub async fn next(&mut self) -> Option<Change> {
        if self.token.is_cancelled() {
            return None;
        }
        let change = self.receiver.recv().await;
        if self.token.is_cancelled() {
            return None;
        }
        change
    }

    /// Take the next queued change without waiting.
    pub fn try_next(&mut self) -> Option<Change> {
        if self.token.is_cancelled() {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(change) => Some(change),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain every queued change without waiting.
    pub fn drain(&mut self) -> Vec<Change> {
        let mut changes = Vec::new();
        while let Some(change) = self.try_next() {
            changes.push(change);
        }
        changes
    }

    /// Stop the subscription and release its server-side state.
    pub fn cancel(&mut self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        self.receiver.close();
        if let Some(table) = self.table.upgrade() {
            table.remove(&self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("entity", &self.query.entity)
            .field("snapshot", &self.snapshot.len())
            .field("snapshot_seq", &self.snapshot_seq)
            .field("state", &self.state())
            .finish()
    }
}
