//! Brewline integration test fixtures.
//!
//! Provides:
//! - Ready-made coffee databases and sample records
//! - A seeded generator of recipe mutations for replay properties

mod fixtures;
mod generator;

pub use fixtures::{coffee_db, coffee_db_with, recipe, user, API_KEY};
pub use generator::{MutationGenerator, Step};

pub mod prelude {
    pub use crate::{coffee_db, coffee_db_with, recipe, user, MutationGenerator, Step, API_KEY};
    pub use brewline_core::{fields, ErrorKind, Fields, Record, RecordId, Value};
    pub use brewline_live::{Change, Delta, LiveView, Subscription};
    pub use brewline_query::Filter;
    pub use brewline_session::{Database, DatabaseConfig, JournalMode, Session};
}
