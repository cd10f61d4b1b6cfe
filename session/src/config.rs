//! Database configuration.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where commits are journaled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JournalMode {
    /// No journal.
    #[default]
    Disabled,
    /// Keep commits in memory.
    Memory,
    /// Append commits to a JSON-lines file, replayed on open.
    File(PathBuf),
}

/// Configuration for a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    /// Shared API key. Without one every credential is accepted.
    pub api_key: Option<String>,
    /// Days the API key stays valid after issue.
    pub api_key_ttl_days: i64,
    /// When the API key was issued. Defaults to the time the database opens.
    pub api_key_issued_at: Option<DateTime<Utc>>,
    pub journal: JournalMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_ttl_days: 30,
            api_key_issued_at: None,
            journal: JournalMode::Disabled,
        }
    }
}

impl DatabaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_key_ttl_days(mut self, days: i64) -> Self {
        self.api_key_ttl_days = days;
        self
    }

    pub fn with_api_key_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.api_key_issued_at = Some(issued_at);
        self
    }

    pub fn with_journal(mut self, journal: JournalMode) -> Self {
        self.journal = journal;
        self
    }
}
