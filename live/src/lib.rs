//! Brewline Live
//!
//! Live query subscriptions.
//!
//! A subscription starts with a snapshot of the records matching its query,
//! then receives one delta per commit that changes the matching set:
//! - `Added` when a record starts matching
//! - `Updated` when a matching record changes and still matches
//! - `Removed` when a record stops matching or is deleted
//!
//! Applying the snapshot and then every delta in order reconstructs the
//! current result of the query ([`LiveView`]).

mod error;
mod manager;
mod subscription;
mod view;

pub use error::{LiveError, LiveResult};
pub use manager::{LiveStats, SubscriptionManager};
pub use subscription::{Change, Delta, Subscription, SubscriptionId, SubscriptionState};
pub use view::LiveView;
