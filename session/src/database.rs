//! Database facade.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use brewline_core::{Commit, CommitListener, CommitSeq};
use brewline_journal::{replay, FileJournal, Journal, MemoryJournal};
use brewline_live::{LiveStats, SubscriptionManager};
use brewline_mutation::MutationEngine;
use brewline_registry::Registry;
use brewline_store::{Store, StoreSnapshot};
use chrono::Utc;
use tracing::{debug, info};

use crate::access::AccessPolicy;
use crate::config::{DatabaseConfig, JournalMode};
use crate::error::{SessionError, SessionResult};
use crate::schema::coffee_registry;
use crate::session::{Session, SessionId};

/// An entity-graph database: store, mutation engine, live queries and an
/// optional commit journal behind one handle.
pub struct Database {
    registry: Arc<Registry>,
    store: Arc<Store>,
    engine: MutationEngine,
    live: Arc<SubscriptionManager>,
    journal: Option<Arc<dyn Journal>>,
    access: AccessPolicy,
    next_session: AtomicU64,
}

impl Database {
    /// Open a database over `registry`.
    ///
    /// A file journal is replayed into the store before the database
    /// accepts writes, and new commits continue its sequence. A torn final
    /// line left by a crash is cut off first.
    pub fn open(registry: Registry, config: DatabaseConfig) -> SessionResult<Self> {
        let registry = Arc::new(registry);
        let store = Arc::new(Store::new(registry.entity_names(), registry.foreign_keys()));

        let mut last_seq = CommitSeq::new(0);
        let journal: Option<Arc<dyn Journal>> = match &config.journal {
            JournalMode::Disabled => None,
            JournalMode::Memory => Some(Arc::new(MemoryJournal::new())),
            JournalMode::File(path) => {
                let stats = replay(FileJournal::recover(path)?, &registry, &store)?;
                info!(path = %path.display(), commits = stats.commits_replayed, "database recovered");
                if let Some(seq) = stats.last_seq {
                    last_seq = seq;
                }
                Some(Arc::new(FileJournal::open(path)?))
            }
        };

        let engine = MutationEngine::resume(registry.clone(), store.clone(), last_seq);
        let live = Arc::new(SubscriptionManager::new(registry.clone(), store.clone()));
        engine.add_listener(live.clone());
        if let Some(journal) = &journal {
            engine.add_listener(Arc::new(JournalListener(journal.clone())));
        }

        let access = match &config.api_key {
            Some(key) => AccessPolicy::api_key(
                key.clone(),
                config.api_key_issued_at.unwrap_or_else(Utc::now),
                config.api_key_ttl_days,
            ),
            None => AccessPolicy::open(),
        };

        debug!(
            entities = registry.entity_count(),
            journal = ?config.journal,
            seq = %last_seq,
            "database opened"
        );
        Ok(Self {
            registry,
            store,
            engine,
            live,
            journal,
            access,
            next_session: AtomicU64::new(1),
        })
    }

    /// Open a database over the coffee application schema.
    pub fn coffee(config: DatabaseConfig) -> SessionResult<Self> {
        Self::open(coffee_registry()?, config)
    }

    /// Open a session with `credential`.
    pub fn open_session(&self, credential: &str) -> SessionResult<Session<'_>> {
        self.access.authenticate(credential, Utc::now())?;
        let id: SessionId = self.next_session.fetch_add(1, Ordering::Relaxed);
        debug!(session = id, "session opened");
        Ok(Session::new(id, self))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Sequence number of the most recent commit.
    pub fn last_seq(&self) -> CommitSeq {
        self.engine.last_seq()
    }

    pub fn live_stats(&self) -> LiveStats {
        self.live.stats()
    }

    /// Every journaled commit. Empty without a journal.
    pub fn journal_commits(&self) -> SessionResult<Vec<Commit>> {
        match &self.journal {
            Some(journal) => Ok(journal.commits()?),
            None => Ok(Vec::new()),
        }
    }

    /// A consistent copy of every collection.
    pub fn export_snapshot(&self) -> StoreSnapshot {
        self.engine.quiesce(|_| self.store.snapshot())
    }

    /// Replace the store's contents with `snapshot`.
    ///
    /// Every record is re-validated, restoring declared field types. The
    /// import is not journaled, so it is refused when a journal is
    /// configured. It is also refused while subscriptions are open, since
    /// they would miss the change.
    pub fn import_snapshot(&self, snapshot: StoreSnapshot) -> SessionResult<()> {
        if self.journal.is_some() {
            return Err(SessionError::JournaledImport);
        }

        let mut restored = StoreSnapshot::default();
        for (entity, records) in snapshot.collections {
            let collection = restored.collections.entry(entity.clone()).or_default();
            for (id, mut record) in records {
                record.entity = entity.clone();
                record.id = id.clone();
                collection.insert(id, self.registry.restore_record(record)?);
            }
        }

        self.engine.quiesce(|_| {
            let count = self.live.active_count();
            if count > 0 {
                return Err(SessionError::SubscriptionsOpen { count });
            }
            self.store.restore(restored)?;
            Ok(())
        })?;
        info!("snapshot imported");
        Ok(())
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn engine(&self) -> &MutationEngine {
        &self.engine
    }

    pub(crate) fn live(&self) -> &SubscriptionManager {
        &self.live
    }

    pub(crate) fn access(&self) -> &AccessPolicy {
        &self.access
    }
}

/// Forwards commits to a type-erased journal.
struct JournalListener(Arc<dyn Journal>);

impl CommitListener for JournalListener {
    fn on_commit(&self, commit: &Commit) {
        self.0.on_commit(commit);
    }
}
