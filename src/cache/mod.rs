//! Two caching tiers for catalog data
//!
//! This module provides the session-scoped in-memory cache (expiring
//! entries keyed by catalog identity) and the durable on-disk page store
//! that persists fetched records across sessions. The in-memory tier
//! avoids disk and network within a session; the disk tier avoids network
//! across sessions.

mod expiring;
mod store;

pub use expiring::ExpiringCache;
pub use store::{load_json, write_json, NameIndexEntry, PageStore, StoreError, PAGE_SIZE};
