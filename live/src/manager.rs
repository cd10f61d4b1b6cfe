//! Subscription manager - reconciles commits with live queries.
//!
//! Subscriptions live in a concurrent table indexed by id and by entity.
//! The manager is a [`CommitListener`]: for every commit it visits the
//! subscriptions on the committed entity, compares the record against each
//! member set and pushes at most one delta per subscription.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use brewline_core::{Commit, CommitListener, CommitSeq, RecordId};
use brewline_query::{ListQuery, QueryExecutor, QueryResult};
use brewline_registry::Registry;
use brewline_store::Store;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{LiveError, LiveResult};
use crate::subscription::{Change, Delta, Subscription, SubscriptionId, SubscriptionState};

// ==================== Table ====================

/// Server-side state of one subscription.
pub(crate) struct SubscriptionEntry {
    id: SubscriptionId,
    query: ListQuery,
    /// Ids currently in the subscriber's view.
    members: Mutex<HashSet<RecordId>>,
    sender: UnboundedSender<Change>,
    token: CancellationToken,
    state: Mutex<SubscriptionState>,
}

/// Registered subscriptions.
#[derive(Default)]
pub(crate) struct SubscriptionTable {
    entries: DashMap<SubscriptionId, Arc<SubscriptionEntry>>,
    by_entity: DashMap<String, HashSet<SubscriptionId>>,
    delivered: AtomicU64,
    dropped: AtomicU64,
    pruned: AtomicU64,
}

impl SubscriptionTable {
    fn insert(&self, entry: Arc<SubscriptionEntry>) {
        self.by_entity
            .entry(entry.query.entity.clone())
            .or_default()
            .insert(entry.id);
        self.entries.insert(entry.id, entry);
    }

    /// Cancel and forget a subscription.
    pub(crate) fn remove(&self, id: &SubscriptionId) -> Option<Arc<SubscriptionEntry>> {
        let (_, entry) = self.entries.remove(id)?;
        entry.token.cancel();
        *entry.state.lock() = SubscriptionState::Cancelled;
        if let Some(mut ids) = self.by_entity.get_mut(&entry.query.entity) {
            ids.remove(id);
        }
        self.by_entity
            .remove_if(&entry.query.entity, |_, ids| ids.is_empty());
        debug!(subscription = %id, entity = %entry.query.entity, "subscription cancelled");
        Some(entry)
    }

    fn for_entity(&self, entity: &str) -> Vec<Arc<SubscriptionEntry>> {
        match self.by_entity.get(entity) {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.entries.get(id).map(|entry| entry.value().clone()))
                .collect(),
            None => Vec::new(),
        }
    }
}

// ==================== Manager ====================

/// Delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveStats {
    /// Open subscriptions.
    pub active: usize,
    /// Deltas handed to subscriber channels.
    pub delivered: u64,
    /// Deltas skipped because the query could not be evaluated.
    pub dropped: u64,
    /// Subscriptions removed because their receiver was gone.
    pub pruned: u64,
}

/// Live query subscription manager.
pub struct SubscriptionManager {
    registry: Arc<Registry>,
    store: Arc<Store>,
    table: Arc<SubscriptionTable>,
}

impl SubscriptionManager {
    pub fn new(registry: Arc<Registry>, store: Arc<Store>) -> Self {
        Self {
            registry,
            store,
            table: Arc::new(SubscriptionTable::default()),
        }
    }

    /// Open a subscription whose snapshot reflects every commit up to `at`.
    ///
    /// The caller must keep commits out while this runs (see
    /// `MutationEngine::quiesce`), so that no commit falls between the
    /// snapshot and registration.
    pub fn subscribe(&self, query: ListQuery, at: CommitSeq) -> LiveResult<Subscription> {
        let snapshot = QueryExecutor::new(&self.registry, &self.store).list(&query)?;

        let id = SubscriptionId::generate();
        let token = CancellationToken::new();
        let (sender, receiver) = mpsc::unbounded_channel();
        let entry = Arc::new(SubscriptionEntry {
            id,
            query: query.clone(),
            members: Mutex::new(snapshot.iter().map(|r| r.id.clone()).collect()),
            sender,
            token: token.clone(),
            state: Mutex::new(SubscriptionState::Initializing),
        });
        self.table.insert(entry.clone());
        *entry.state.lock() = SubscriptionState::Streaming;

        debug!(
            subscription = %id,
            entity = %query.entity,
            snapshot = snapshot.len(),
            seq = %at,
            "subscription opened"
        );
        Ok(Subscription::new(
            id,
            query,
            snapshot,
            at,
            receiver,
            token,
            Arc::downgrade(&self.table),
        ))
    }

    /// Cancel a subscription by id.
    pub fn unsubscribe(&self, id: &SubscriptionId) -> LiveResult<()> {
        self.table
            .remove(id)
            .map(|_| ())
            .ok_or(LiveError::NotFound(*id))
    }

    /// State of a registered subscription. Released subscriptions are
    /// unknown.
    pub fn state(&self, id: &SubscriptionId) -> Option<SubscriptionState> {
        self.table.entries.get(id).map(|entry| *entry.state.lock())
    }

    pub fn active_count(&self) -> usize {
        self.table.entries.len()
    }

    pub fn stats(&self) -> LiveStats {
        LiveStats {
            active: self.active_count(),
            delivered: self.table.delivered.load(Ordering::Relaxed),
            dropped: self.table.dropped.load(Ordering::Relaxed),
            pruned: self.table.pruned.load(Ordering::Relaxed),
        }
    }

    /// Work out the delta one commit produces for one subscription, and
    /// move the member set along with it.
    fn reconcile(entry: &SubscriptionEntry, commit: &Commit) -> QueryResult<Option<Delta>> {
        let matched = match &commit.after {
            Some(record) => entry.query.matches(record)?.then_some(record),
            None => None,
        };

        let mut members = entry.members.lock();
        let delta = match (members.contains(&commit.id), matched) {
            (false, Some(record)) => {
                members.insert(record.id.clone());
                Some(Delta::Added {
                    record: record.clone(),
                })
            }
            (true, Some(record)) => Some(Delta::Updated {
                record: record.clone(),
            }),
            (true, None) => {
                members.remove(&commit.id);
                Some(Delta::Removed {
                    id: commit.id.clone(),
                })
            }
            (false, None) => None,
        };
        Ok(delta)
    }
}

impl CommitListener for SubscriptionManager {
    fn on_commit(&self, commit: &Commit) {
        for entry in self.table.for_entity(&commit.entity) {
            if entry.token.is_cancelled() {
                self.table.remove(&entry.id);
                continue;
            }

            let delta = match Self::reconcile(&entry, commit) {
                Ok(Some(delta)) => delta,
                Ok(None) => continue,
                Err(error) => {
                    self.table.dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        subscription = %entry.id,
                        seq = %commit.seq,
                        id = %commit.id,
                        %error,
                        "dropped delta"
                    );
                    continue;
                }
            };

            trace!(subscription = %entry.id, seq = %commit.seq, id = %delta.id(), "delta");
            let change = Change {
                seq: commit.seq,
                delta,
            };
            if entry.sender.send(change).is_err() {
                self.table.pruned.fetch_add(1, Ordering::Relaxed);
                warn!(subscription = %entry.id, "receiver gone, pruning subscription");
                self.table.remove(&entry.id);
            } else {
                self.table.delivered.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
