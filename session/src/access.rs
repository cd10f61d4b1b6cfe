//! API key access policy.
//!
//! One coarse rule: a holder of the shared key may perform every
//! operation on every entity until the key expires.

use chrono::{DateTime, Duration, Utc};

use crate::error::{SessionError, SessionResult};

/// Shared API key check.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessPolicy {
    key: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessPolicy {
    /// A policy for `key`, valid for `ttl_days` after `issued_at`.
    pub fn api_key(key: impl Into<String>, issued_at: DateTime<Utc>, ttl_days: i64) -> Self {
        Self {
            key: Some(key.into()),
            expires_at: Some(issued_at + Duration::days(ttl_days)),
        }
    }

    /// A policy that accepts every credential.
    pub fn open() -> Self {
        Self {
            key: None,
            expires_at: None,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Check a credential presented when a session opens.
    pub fn authenticate(&self, credential: &str, now: DateTime<Utc>) -> SessionResult<()> {
        match &self.key {
            None => Ok(()),
            Some(key) if key == credential => self.check_expiry(now),
            Some(_) => Err(SessionError::unauthorized("invalid API key")),
        }
    }

    /// Check that the key is still valid at `now`.
    pub fn check_expiry(&self, now: DateTime<Utc>) -> SessionResult<()> {
        match self.expires_at {
            Some(expires_at) if now >= expires_at => {
                Err(SessionError::unauthorized(format!("API key expired at {}", expires_at)))
            }
            _ => Ok(()),
        }
    }
}
