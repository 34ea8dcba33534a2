//! Generic query cache shared by every view of the application.
//!
//! This module provides a domain-agnostic cache that:
//! - Keys entries by a logical query identity (`QueryKey`)
//! - Runs at most one fetch per key at a time and shares its result
//! - Broadcasts entry updates to every subscriber of the key
//! - Serves stale data while revalidating, and refetches after invalidation

mod layer;
mod subscription;
mod traits;

pub use layer::QueryCache;
pub use subscription::Subscription;
pub use traits::{QueryEntry, QueryKey, QueryStatus};
