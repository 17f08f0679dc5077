//! Location area records
//!
//! Decoded shape of PokeAPI's `location-area` resource, reduced to the
//! fields the application uses. Unknown fields in the wire response are
//! ignored by serde.

use serde::{Deserialize, Serialize};

use super::{CatalogRecord, NamedResource};

/// A location area: one entry of the paginated location catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// One-based catalog identity
    pub id: u32,
    /// Unique area name, e.g. `canalave-city-area`
    pub name: String,
    /// Pokémon encounterable in this area
    #[serde(default)]
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

/// One encounterable Pokémon within an area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedResource,
}

impl CatalogRecord for Area {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
