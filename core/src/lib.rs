//! Brewline Core Types
//!
//! This crate provides the foundational types used throughout Brewline:
//! - Record identity (RecordId, CommitSeq)
//! - Field values (the Value enum and the Fields map)
//! - Records and the commits that change them
//! - The error taxonomy shared by every layer

mod commit;
mod error;
mod id;
mod record;
mod value;

pub use commit::*;
pub use error::*;
pub use id::*;
pub use record::*;
pub use value::*;
