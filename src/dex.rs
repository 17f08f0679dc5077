//! Caught-Pokémon ledger
//!
//! Records every catch attempt the user makes, keyed by Pokémon name,
//! together with a flattened description captured from the catalog record
//! at the first attempt. Persisted as a single JSON document and saved
//! after every mutation; the file being absent means an empty ledger, a
//! corrupt file is an error.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{load_json, write_json, StoreError};
use crate::data::Pokemon;

/// Flattened description of a Pokémon, as shown by `inspect`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DexDescription {
    pub height: u32,
    pub weight: u32,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
    pub types: Vec<String>,
}

impl From<&Pokemon> for DexDescription {
    fn from(pokemon: &Pokemon) -> Self {
        Self {
            height: pokemon.height,
            weight: pokemon.weight,
            hp: pokemon.stat("hp"),
            attack: pokemon.stat("attack"),
            defense: pokemon.stat("defense"),
            special_attack: pokemon.stat("special-attack"),
            special_defense: pokemon.stat("special-defense"),
            speed: pokemon.stat("speed"),
            types: pokemon.type_names(),
        }
    }
}

/// One ledger entry: the attempt history for a single Pokémon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DexEntry {
    pub name: String,
    pub catch_count: u32,
    pub fail_catch_count: u32,
    pub description: DexDescription,
    /// Set once, at the first successful catch
    pub first_caught_at: Option<DateTime<Utc>>,
}

/// The caught-Pokémon ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pokedex {
    pub caught_pokemon: HashMap<String, DexEntry>,
}

impl Pokedex {
    /// Loads the ledger. An absent file yields an empty ledger; a file
    /// that exists but fails to parse is an error.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        Ok(load_json(path)?.unwrap_or_default())
    }

    /// Persists the whole ledger, creating the parent directory lazily.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        write_json(path, self)
    }

    /// Records one catch attempt. The description is captured from the
    /// record on the first attempt for the name.
    pub fn record_attempt(&mut self, pokemon: &Pokemon, caught: bool) -> &DexEntry {
        let entry = self
            .caught_pokemon
            .entry(pokemon.name.clone())
            .or_insert_with(|| DexEntry {
                name: pokemon.name.clone(),
                catch_count: 0,
                fail_catch_count: 0,
                description: DexDescription::from(pokemon),
                first_caught_at: None,
            });

        if caught {
            entry.catch_count += 1;
            if entry.first_caught_at.is_none() {
                entry.first_caught_at = Some(Utc::now());
            }
        } else {
            entry.fail_catch_count += 1;
        }
        entry
    }

    /// Attempt history for a name, if any attempt was ever recorded.
    pub fn get(&self, name: &str) -> Option<&DexEntry> {
        self.caught_pokemon.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_pokemon() -> Pokemon {
        serde_json::from_str(
            r#"{
                "id": 25,
                "name": "pikachu",
                "base_experience": 112,
                "height": 4,
                "weight": 60,
                "stats": [
                    {"base_stat": 35, "stat": {"name": "hp", "url": ""}},
                    {"base_stat": 55, "stat": {"name": "attack", "url": ""}}
                ],
                "types": [
                    {"type": {"name": "electric", "url": ""}}
                ]
            }"#,
        )
        .expect("sample pokemon should parse")
    }

    #[test]
    fn test_record_attempt_counts_catches_and_failures() {
        let mut dex = Pokedex::default();
        let pokemon = sample_pokemon();

        dex.record_attempt(&pokemon, false);
        dex.record_attempt(&pokemon, true);
        dex.record_attempt(&pokemon, true);

        let entry = dex.get("pikachu").expect("entry should exist");
        assert_eq!(entry.catch_count, 2);
        assert_eq!(entry.fail_catch_count, 1);
        assert_eq!(entry.description.hp, 35);
        assert_eq!(entry.description.types, vec!["electric"]);
    }

    #[test]
    fn test_first_caught_timestamp_set_once() {
        let mut dex = Pokedex::default();
        let pokemon = sample_pokemon();

        dex.record_attempt(&pokemon, false);
        assert!(dex.get("pikachu").unwrap().first_caught_at.is_none());

        dex.record_attempt(&pokemon, true);
        let first = dex.get("pikachu").unwrap().first_caught_at;
        assert!(first.is_some());

        dex.record_attempt(&pokemon, true);
        assert_eq!(dex.get("pikachu").unwrap().first_caught_at, first);
    }

    #[test]
    fn test_get_unknown_name_returns_none() {
        let dex = Pokedex::default();
        assert!(dex.get("mewtwo").is_none());
    }

    #[test]
    fn test_ledger_save_load_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("pokedex.json");

        let mut dex = Pokedex::default();
        dex.record_attempt(&sample_pokemon(), true);
        dex.save(&path).expect("save should succeed");

        let loaded = Pokedex::load(&path).expect("load should succeed");
        assert_eq!(loaded.caught_pokemon, dex.caught_pokemon);
    }

    #[test]
    fn test_load_absent_ledger_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dex = Pokedex::load(&temp_dir.path().join("pokedex.json")).expect("load should succeed");
        assert!(dex.caught_pokemon.is_empty());
    }

    #[test]
    fn test_load_corrupt_ledger_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("pokedex.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(Pokedex::load(&path).is_err());
    }
}
