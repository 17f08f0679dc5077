//! Remote catalog access
//!
//! This module provides the network collaborator (a reqwest-backed PokeAPI
//! client behind the `RecordSource` trait) and the reconciling fetcher
//! that diffs requested ranges against the durable store and fetches only
//! what is missing.

mod client;
mod fetcher;

pub use client::{ApiError, PokeApiClient, RecordSource};
pub use fetcher::{FetchError, ReconcilingFetcher};
