//! Brewline Session
//!
//! The database facade and client sessions.
//!
//! Responsibilities:
//! - Assemble store, mutation engine, live queries and journal
//! - Gate every operation behind an API key session
//! - Provide the coffee application schema

mod access;
mod config;
mod database;
mod error;
mod schema;
mod session;

pub use access::AccessPolicy;
pub use config::{DatabaseConfig, JournalMode};
pub use database::Database;
pub use error::{SessionError, SessionResult};
pub use schema::{coffee_registry, BrewMethod, DrinkType};
pub use session::{Session, SessionId};
