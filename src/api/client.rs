//! PokeAPI client
//!
//! Thin request/response wrapper around the remote catalog. No retry and
//! no backoff: failures propagate to the caller, which aborts the current
//! command and keeps the session alive.

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::data::{Area, Pokemon};

/// Base URL for the PokeAPI catalog
const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Errors that can occur when fetching catalog records
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Network seam for one record kind
///
/// Both lookups are simple request/response calls keyed by identity or by
/// catalog name. Tests substitute an in-memory implementation.
#[allow(async_fn_in_trait)]
pub trait RecordSource<R> {
    /// Fetches the record with the given one-based identity.
    async fn fetch_by_id(&self, id: u32) -> Result<R, ApiError>;

    /// Fetches the record with the given catalog name.
    async fn fetch_by_name(&self, name: &str) -> Result<R, ApiError>;
}

/// Client for fetching records from the PokeAPI catalog
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PokeApiClient {
    /// Create a new PokeApiClient against the public catalog
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: POKEAPI_BASE_URL.to_string(),
        }
    }

    /// Create a new PokeApiClient with a custom base URL
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches and decodes one resource.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/{}/", self.base_url, path);
        debug!(%url, "fetching catalog resource");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl RecordSource<Area> for PokeApiClient {
    async fn fetch_by_id(&self, id: u32) -> Result<Area, ApiError> {
        self.get_json(&format!("location-area/{id}")).await
    }

    async fn fetch_by_name(&self, name: &str) -> Result<Area, ApiError> {
        self.get_json(&format!("location-area/{name}")).await
    }
}

impl RecordSource<Pokemon> for PokeApiClient {
    async fn fetch_by_id(&self, id: u32) -> Result<Pokemon, ApiError> {
        self.get_json(&format!("pokemon/{id}")).await
    }

    async fn fetch_by_name(&self, name: &str) -> Result<Pokemon, ApiError> {
        self.get_json(&format!("pokemon/{name}")).await
    }
}
