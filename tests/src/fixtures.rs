//! Database and record fixtures.

use brewline_core::{fields, Record, RecordId};
use brewline_session::{Database, DatabaseConfig, Session};

/// API key every fixture database is opened with.
pub const API_KEY: &str = "da2-test-key";

/// A coffee database guarded by [`API_KEY`].
pub fn coffee_db() -> Database {
    coffee_db_with(DatabaseConfig::new())
}

/// A coffee database with `config`, guarded by [`API_KEY`].
pub fn coffee_db_with(config: DatabaseConfig) -> Database {
    match Database::coffee(config.with_api_key(API_KEY)) {
        Ok(db) => db,
        Err(e) => panic!("coffee database failed to open: {}", e),
    }
}

/// Create a user named `firstname` with a derived email.
pub fn user(session: &Session<'_>, firstname: &str) -> Record {
    let email = format!("{}@brewline.test", firstname.to_lowercase());
    match session.create("User", fields! { "firstname" => firstname, "email" => email }) {
        Ok(record) => record,
        Err(e) => panic!("user fixture rejected: {}", e),
    }
}

/// Create a recipe by `author`.
pub fn recipe(session: &Session<'_>, author: &RecordId, title: &str) -> Record {
    match session.create("Recipe", fields! { "userId" => author.clone(), "title" => title }) {
        Ok(record) => record,
        Err(e) => panic!("recipe fixture rejected: {}", e),
    }
}
