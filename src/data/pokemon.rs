//! Pokémon records
//!
//! Decoded shape of PokeAPI's `pokemon` resource, reduced to the fields
//! the catch and inspect commands use.

use serde::{Deserialize, Serialize};

use super::{CatalogRecord, NamedResource};

/// A Pokémon record from the remote catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    /// One-based catalog identity
    pub id: u32,
    /// Unique Pokémon name, e.g. `pikachu`
    pub name: String,
    /// Base experience yield; null in the catalog for some forms
    pub base_experience: Option<u32>,
    /// Height in decimeters
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Base stat values keyed by stat name
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    /// Type slots
    #[serde(default)]
    pub types: Vec<PokemonType>,
}

/// One base stat entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    pub stat: NamedResource,
}

/// One type slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonType {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

impl Pokemon {
    /// Base stat value by stat name (`hp`, `attack`, ...), 0 if absent.
    pub fn stat(&self, name: &str) -> u32 {
        self.stats
            .iter()
            .find(|entry| entry.stat.name == name)
            .map(|entry| entry.base_stat)
            .unwrap_or(0)
    }

    /// Type names in slot order.
    pub fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|slot| slot.kind.name.clone()).collect()
    }
}

impl CatalogRecord for Pokemon {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
