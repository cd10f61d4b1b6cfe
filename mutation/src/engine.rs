//! Mutation engine - the single writer.
//!
//! Every mutation runs inside one commit section: validate, write to the
//! store, assign the next sequence number and publish to listeners. Holding
//! the section across all four steps gives every commit a place in one
//! global order, and listeners see commits in exactly that order.

use std::sync::Arc;

use brewline_core::{Commit, CommitListener, CommitSeq, Fields, Record, RecordId};
use brewline_registry::Registry;
use brewline_store::Store;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::MutationResult;
use crate::ops;
use crate::result::{Mutation, MutationOutcome};

/// Mutation engine.
pub struct MutationEngine {
    registry: Arc<Registry>,
    store: Arc<Store>,
    /// Commit section. Holds the sequence number of the last commit.
    last_seq: Mutex<CommitSeq>,
    listeners: RwLock<Vec<Arc<dyn CommitListener>>>,
}

impl MutationEngine {
    /// Create a new engine writing into `store`.
    pub fn new(registry: Arc<Registry>, store: Arc<Store>) -> Self {
        Self::resume(registry, store, CommitSeq::new(0))
    }

    /// Create an engine whose next commit follows `last_seq`, for stores
    /// rebuilt from a journal.
    pub fn resume(registry: Arc<Registry>, store: Arc<Store>, last_seq: CommitSeq) -> Self {
        Self {
            registry,
            store,
            last_seq: Mutex::new(last_seq),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Register a listener for every subsequent commit.
    pub fn add_listener(&self, listener: Arc<dyn CommitListener>) {
        self.listeners.write().push(listener);
    }

    /// Sequence number of the most recent commit.
    pub fn last_seq(&self) -> CommitSeq {
        *self.last_seq.lock()
    }

    /// Run `f` with the commit section held, so no commit can land while
    /// it runs. `f` receives the last committed sequence number.
    pub fn quiesce<R>(&self, f: impl FnOnce(CommitSeq) -> R) -> R {
        let last = self.last_seq.lock();
        f(*last)
    }

    // ==================== Operations ====================

    /// Create a record with a generated id.
    pub fn create(&self, entity: &str, fields: Fields) -> MutationResult<Record> {
        self.apply(Mutation::create(entity, fields))
            .map(MutationOutcome::into_record)
    }

    /// Create a record with a caller-chosen id.
    pub fn create_with_id(&self, entity: &str, id: RecordId, fields: Fields) -> MutationResult<Record> {
        self.apply(Mutation::Create {
            entity: entity.to_string(),
            id: Some(id),
            fields,
        })
        .map(MutationOutcome::into_record)
    }

    /// Merge a partial field map into an existing record.
    pub fn update(&self, entity: &str, id: &RecordId, partial: Fields) -> MutationResult<Record> {
        self.apply(Mutation::update(entity, id.clone(), partial))
            .map(MutationOutcome::into_record)
    }

    /// Delete a record, returning its final state.
    pub fn delete(&self, entity: &str, id: &RecordId) -> MutationResult<Record> {
        self.apply(Mutation::delete(entity, id.clone()))
            .map(MutationOutcome::into_record)
    }

    /// Apply one mutation atomically.
    pub fn apply(&self, mutation: Mutation) -> MutationResult<MutationOutcome> {
        let mut last = self.last_seq.lock();
        let now = Utc::now();
        let registry = self.registry.as_ref();
        let store = self.store.as_ref();
        let seq = last.next();

        let (outcome, commit) = match mutation {
            Mutation::Create { entity, id, fields } => {
                let record = ops::prepare_create(registry, store, &entity, id, fields, now)?;
                store.insert(record.clone())?;
                let commit = Commit::created(seq, record.clone(), now);
                (MutationOutcome::Created(record), commit)
            }
            Mutation::Update { entity, id, fields } => {
                match ops::prepare_update(registry, store, &entity, &id, fields, now)? {
                    MutationOutcome::Updated { before, after } => {
                        store.replace(after.clone())?;
                        let commit = Commit::updated(seq, before.clone(), after.clone(), now);
                        (MutationOutcome::Updated { before, after }, commit)
                    }
                    unchanged => return Ok(unchanged),
                }
            }
            Mutation::Delete { entity, id } => {
                ops::prepare_delete(registry, store, &entity, &id)?;
                let record = store.remove(&entity, &id)?;
                let commit = Commit::deleted(seq, record.clone(), now);
                (MutationOutcome::Deleted(record), commit)
            }
        };

        *last = seq;
        debug!(seq = %seq, kind = %commit.kind, entity = %commit.entity, id = %commit.id, "committed");
        for listener in self.listeners.read().iter() {
            listener.on_commit(&commit);
        }
        Ok(outcome)
    }
}
