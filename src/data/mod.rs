//! Catalog record models
//!
//! This module contains the decoded shapes of the remote catalog's record
//! kinds and the capability trait the caching and reconciliation layers
//! are written against. The same shapes are used for wire decoding and
//! for the on-disk page format.

pub mod area;
pub mod pokemon;

pub use area::{Area, PokemonEncounter};
pub use pokemon::Pokemon;

use serde::{Deserialize, Serialize};

/// Capabilities every catalog record kind exposes
///
/// Identities are one-based and stable; names are globally unique within
/// the remote catalog. The fetch and cache algorithms are written once
/// against this trait and instantiated per record kind.
pub trait CatalogRecord {
    /// Stable one-based identity in the remote catalog.
    fn id(&self) -> u32;

    /// Stable catalog name.
    fn name(&self) -> &str;
}

/// A `{name, url}` reference to another catalog resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}
