//! Brewline Registry
//!
//! Runtime schema lookup. Single source of truth for entities, enums,
//! custom types and relation descriptors, and the validator for field
//! payloads. The registry is immutable after construction via
//! RegistryBuilder.

mod builder;
mod registry;
mod types;
mod validate;

pub use builder::{CustomTypeBuilder, EntityBuilder, RegistryBuilder, SchemaError};
pub use registry::Registry;
pub use types::*;
pub use validate::{ValidationError, ValidationResult};
