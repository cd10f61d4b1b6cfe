//! Client sessions.
//!
//! Every read, write and subscription runs through a session opened with
//! the database's API key. The key's expiry is checked on each call.

use brewline_core::{Fields, Record, RecordId};
use brewline_live::Subscription;
use brewline_query::{Filter, ListQuery, QueryExecutor};
use brewline_relation::RelationResolver;
use chrono::Utc;

use crate::database::Database;
use crate::error::SessionResult;

/// Session ID type.
pub type SessionId = u64;

/// Entities a `following` list may point at, probed in order.
const FOLLOWABLE: [&str; 2] = ["User", "Store"];

/// A Brewline session.
pub struct Session<'db> {
    /// Unique session ID.
    id: SessionId,
    db: &'db Database,
}

impl<'db> Session<'db> {
    pub(crate) fn new(id: SessionId, db: &'db Database) -> Self {
        Self { id, db }
    }

    /// Get the session ID.
    pub fn id(&self) -> SessionId {
        self.id
    }

    fn authorize(&self) -> SessionResult<()> {
        self.db.access().check_expiry(Utc::now())
    }

    fn resolver(&self) -> RelationResolver<'db, 'db> {
        RelationResolver::new(self.db.registry(), self.db.store())
    }

    // ==================== Reads ====================

    /// Records of `entity` matching `filter`, ordered by creation time.
    pub fn list(&self, entity: &str, filter: Option<Filter>) -> SessionResult<Vec<Record>> {
        self.authorize()?;
        let query = ListQuery {
            entity: entity.to_string(),
            filter,
        };
        Ok(QueryExecutor::new(self.db.registry(), self.db.store()).list(&query)?)
    }

    pub fn get(&self, entity: &str, id: &RecordId) -> SessionResult<Option<Record>> {
        self.authorize()?;
        Ok(QueryExecutor::new(self.db.registry(), self.db.store()).get(entity, id)?)
    }

    /// Open a live query: the current matches plus a feed of changes.
    pub fn subscribe(&self, entity: &str, filter: Option<Filter>) -> SessionResult<Subscription> {
        self.authorize()?;
        let query = ListQuery {
            entity: entity.to_string(),
            filter,
        };
        let subscription = self
            .db
            .engine()
            .quiesce(|seq| self.db.live().subscribe(query, seq))?;
        Ok(subscription)
    }

    // ==================== Writes ====================

    pub fn create(&self, entity: &str, fields: Fields) -> SessionResult<Record> {
        self.authorize()?;
        Ok(self.db.engine().create(entity, fields)?)
    }

    /// Create with a caller-chosen id, making retries safe.
    pub fn create_with_id(&self, entity: &str, id: RecordId, fields: Fields) -> SessionResult<Record> {
        self.authorize()?;
        Ok(self.db.engine().create_with_id(entity, id, fields)?)
    }

    pub fn update(&self, entity: &str, id: &RecordId, partial: Fields) -> SessionResult<Record> {
        self.authorize()?;
        Ok(self.db.engine().update(entity, id, partial)?)
    }

    pub fn delete(&self, entity: &str, id: &RecordId) -> SessionResult<Record> {
        self.authorize()?;
        Ok(self.db.engine().delete(entity, id)?)
    }

    // ==================== Relations ====================

    pub fn has_many(&self, entity: &str, owner: &RecordId, relation: &str) -> SessionResult<Vec<Record>> {
        self.authorize()?;
        Ok(self.resolver().has_many(entity, owner, relation)?)
    }

    pub fn has_one(&self, entity: &str, owner: &RecordId, relation: &str) -> SessionResult<Option<Record>> {
        self.authorize()?;
        Ok(self.resolver().has_one(entity, owner, relation)?)
    }

    pub fn belongs_to(&self, record: &Record, relation: &str) -> SessionResult<Option<Record>> {
        self.authorize()?;
        Ok(self.resolver().belongs_to(record, relation)?)
    }

    /// Resolve an id-array field, skipping ids that no longer exist.
    pub fn resolve_ids(&self, record: &Record, field: &str, target: &str) -> SessionResult<Vec<Record>> {
        self.authorize()?;
        Ok(self.resolver().resolve_ids(record, field, target)?)
    }

    /// Users and stores a user follows.
    pub fn resolve_following(&self, user: &Record) -> SessionResult<Vec<Record>> {
        self.authorize()?;
        Ok(self.resolver().resolve_polymorphic(user, "following", &FOLLOWABLE)?)
    }
}
