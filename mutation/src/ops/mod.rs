//! Mutation operation implementations.
//!
//! Each operation validates its request and prepares the new record state
//! without touching the store; the engine applies the result inside the
//! commit section.

mod create;
mod delete;
mod update;

pub use create::prepare_create;
pub use delete::prepare_delete;
pub use update::prepare_update;
