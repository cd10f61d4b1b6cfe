//! Brewline Journal
//!
//! Commit journal and recovery.
//!
//! Responsibilities:
//! - Record every commit in commit order
//! - Persist commits as JSON lines
//! - Rebuild a store by replaying recorded commits

mod error;
mod journal;
mod replay;

pub use error::{JournalError, JournalResult};
pub use journal::{FileJournal, Journal, MemoryJournal};
pub use replay::{replay, RecoveryStats};
