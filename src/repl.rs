//! Interactive command dispatch
//!
//! Owns all session state: the pagination cursor, the in-memory area-name
//! cache, one reconciling fetcher per record kind, and the caught-Pokémon
//! ledger. Free-text input is lowercased and whitespace-split; the first
//! word selects a command and the rest are its arguments. Commands return
//! their output as a string for the caller to print.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::api::{FetchError, ReconcilingFetcher, RecordSource};
use crate::cache::{ExpiringCache, PageStore, StoreError, PAGE_SIZE};
use crate::data::{Area, Pokemon};
use crate::dex::Pokedex;

/// Catch succeeds when a unit roll clears the base-experience rate.
const CATCH_RATE_DIVISOR: f64 = 644.0;

/// Command table: name, argument count, help text
const COMMANDS: &[(&str, usize, &str)] = &[
    ("map", 0, "Lists the next 20 location areas"),
    ("mapb", 0, "Lists the previous 20 location areas"),
    (
        "explore",
        1,
        "Lists all Pokemon in the area, takes an area name eg. explore canalave-city-area",
    ),
    (
        "catch",
        1,
        "Attempts to catch named Pokemon. If successful adds it to the Pokedex",
    ),
    (
        "inspect",
        1,
        "Displays Pokemon data if the user has attempted to catch the Pokemon before",
    ),
    ("help", 0, "Displays a help message"),
    ("exit", 0, "Exit the Pokedex"),
];

/// Errors surfaced to the user by command dispatch
#[derive(Debug, Error)]
pub enum ReplError {
    #[error("{0} is not a valid command")]
    UnknownCommand(String),

    #[error("{command} expects {expected} argument(s) and got {got}")]
    WrongArgumentCount {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("need to try catching {0} before inspecting it")]
    NeverAttempted(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Session state and command callbacks
///
/// Generic over the network source so tests can drive the full command
/// flow against an in-memory catalog.
pub struct Repl<S> {
    next: u32,
    previous: u32,
    area_names: ExpiringCache,
    areas: ReconcilingFetcher<Area, S>,
    pokemon: ReconcilingFetcher<Pokemon, S>,
    dex: Pokedex,
    dex_path: PathBuf,
    pub should_quit: bool,
}

impl<S> Repl<S>
where
    S: RecordSource<Area> + RecordSource<Pokemon> + Clone,
{
    /// Builds a session: page stores under `cache_dir`, the ledger at
    /// `dex_path` (loaded now, absent file meaning empty), and an
    /// in-memory area-name cache with the given TTL.
    pub fn new(
        cache_dir: &Path,
        dex_path: PathBuf,
        ttl: Duration,
        source: S,
    ) -> Result<Self, StoreError> {
        let areas = ReconcilingFetcher::new(
            PageStore::new(cache_dir.join("areas.json")),
            source.clone(),
        );
        let pokemon =
            ReconcilingFetcher::new(PageStore::new(cache_dir.join("pokemon.json")), source);
        let dex = Pokedex::load(&dex_path)?;

        Ok(Self {
            next: 0,
            previous: 0,
            area_names: ExpiringCache::new(ttl),
            areas,
            pokemon,
            dex,
            dex_path,
            should_quit: false,
        })
    }

    /// Parses one input line and runs the selected command.
    ///
    /// Blank input is a no-op. Unknown commands and wrong argument counts
    /// are errors for the caller to print; they do not end the session.
    pub async fn dispatch(&mut self, line: &str) -> Result<String, ReplError> {
        let words = clean_input(line);
        let Some((command, args)) = words.split_first() else {
            return Ok(String::new());
        };

        match (command.as_str(), args) {
            ("map", []) => self.command_map().await,
            ("mapb", []) => self.command_map_back().await,
            ("explore", [name]) => self.command_explore(name).await,
            ("catch", [name]) => self.command_catch(name).await,
            ("inspect", [name]) => self.command_inspect(name),
            ("help", []) => Ok(self.command_help()),
            ("exit", []) => Ok(self.command_exit()),
            (name, args) => match COMMANDS.iter().find(|(cmd, _, _)| *cmd == name) {
                Some((_, expected, _)) => Err(ReplError::WrongArgumentCount {
                    command: name.to_string(),
                    expected: *expected,
                    got: args.len(),
                }),
                None => Err(ReplError::UnknownCommand(name.to_string())),
            },
        }
    }

    /// `map`: the next 20 areas, then advance the cursor.
    ///
    /// Serves from the in-memory cache when the whole span is present;
    /// otherwise reconciles against disk and network and feeds the result
    /// back into the in-memory tier.
    async fn command_map(&mut self) -> Result<String, ReplError> {
        let names = self.area_page(self.next).await?;
        self.previous = self.next;
        self.next += PAGE_SIZE;
        Ok(names.join("\n"))
    }

    /// `mapb`: the previous 20 areas, then move the cursor back.
    async fn command_map_back(&mut self) -> Result<String, ReplError> {
        if self.previous == 0 {
            return Ok("you're on the first page".to_string());
        }

        let names = self.area_page(self.previous - PAGE_SIZE).await?;
        self.next = self.previous;
        self.previous -= PAGE_SIZE;
        Ok(names.join("\n"))
    }

    /// Area names for the 20-wide span starting at `min_index`, via the
    /// two cache tiers.
    async fn area_page(&mut self, min_index: u32) -> Result<Vec<String>, ReplError> {
        let first_id = min_index + 1;
        let last_id = min_index + PAGE_SIZE;

        if let Some(names) = self.area_names.get_range(first_id, last_id).await {
            return Ok(names);
        }

        let areas = self.areas.fetch_range(min_index, last_id - 1).await?;
        let names: Vec<String> = areas.iter().map(|area| area.name.clone()).collect();
        self.area_names.insert_range(first_id, names.clone()).await;
        Ok(names)
    }

    /// `explore <area>`: encounterable Pokémon in the named area.
    async fn command_explore(&mut self, name: &str) -> Result<String, ReplError> {
        let area = self.areas.fetch_by_name(name).await?;

        let mut out = format!("Exploring {name}...\nFound Pokemon:");
        for encounter in &area.pokemon_encounters {
            out.push_str(&format!("\n - {}", encounter.pokemon.name));
        }
        Ok(out)
    }

    /// `catch <pokemon>`: roll against base experience and record the
    /// attempt in the ledger.
    async fn command_catch(&mut self, name: &str) -> Result<String, ReplError> {
        let pokemon = self.pokemon.fetch_by_name(name).await?;

        let caught = catch_roll(pokemon.base_experience.unwrap_or_default());
        self.dex.record_attempt(&pokemon, caught);
        self.dex.save(&self.dex_path)?;

        let outcome = if caught {
            format!("{name} was caught!")
        } else {
            format!("{name} escaped!")
        };
        Ok(format!("Throwing a Pokeball at {name}...\n{outcome}"))
    }

    /// `inspect <pokemon>`: ledger stats and description for a Pokémon
    /// with at least one recorded attempt. Never touches the network.
    fn command_inspect(&self, name: &str) -> Result<String, ReplError> {
        let entry = self
            .dex
            .get(name)
            .ok_or_else(|| ReplError::NeverAttempted(name.to_string()))?;

        let mut out = format!(
            "Name: {}\nSuccessful Catches: {}\nFailed Catches: {}",
            entry.name, entry.catch_count, entry.fail_catch_count
        );
        if let Some(first_caught_at) = entry.first_caught_at {
            out.push_str(&format!(
                "\nFirst Caught: {}",
                first_caught_at.format("%Y-%m-%d %H:%M UTC")
            ));
        }

        let description = &entry.description;
        out.push_str(&format!(
            "\nHeight: {}\nWeight: {}\nStats:",
            description.height, description.weight
        ));
        for (stat, value) in [
            ("hp", description.hp),
            ("attack", description.attack),
            ("defense", description.defense),
            ("special-attack", description.special_attack),
            ("special-defense", description.special_defense),
            ("speed", description.speed),
        ] {
            out.push_str(&format!("\n - {stat}: {value}"));
        }

        out.push_str("\nTypes:");
        for kind in &description.types {
            out.push_str(&format!("\n - {kind}"));
        }
        Ok(out)
    }

    fn command_help(&self) -> String {
        let mut out = "Welcome to the Pokedex!\nUsage:\n".to_string();
        for (name, _, description) in COMMANDS {
            out.push_str(&format!("\n{name}: {description}"));
        }
        out
    }

    fn command_exit(&mut self) -> String {
        self.should_quit = true;
        "Closing the Pokedex... Goodbye!".to_string()
    }
}

/// Lowercases and whitespace-splits one input line.
pub fn clean_input(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// One catch roll: succeeds when a uniform unit float clears the rate
/// `base_experience / 644`. Zero base experience always catches; 644 or
/// more never does.
fn catch_roll(base_experience: u32) -> bool {
    let catch_rate = f64::from(base_experience) / CATCH_RATE_DIVISOR;
    rand::random::<f64>() >= catch_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use crate::api::ApiError;
    use crate::data::{NamedResource, PokemonEncounter};

    /// In-memory catalog that records every network call it serves
    #[derive(Clone, Default)]
    struct MockCatalog {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockCatalog {
        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn area(id: u32) -> Area {
            Area {
                id,
                name: format!("area-{id}"),
                pokemon_encounters: vec![PokemonEncounter {
                    pokemon: NamedResource {
                        name: "tentacool".to_string(),
                        url: String::new(),
                    },
                }],
            }
        }

        fn pokemon(id: u32, name: &str) -> Pokemon {
            Pokemon {
                id,
                name: name.to_string(),
                base_experience: Some(0),
                height: 4,
                weight: 60,
                stats: Vec::new(),
                types: Vec::new(),
            }
        }
    }

    impl RecordSource<Area> for MockCatalog {
        async fn fetch_by_id(&self, id: u32) -> Result<Area, ApiError> {
            self.record(format!("area/{id}"));
            Ok(Self::area(id))
        }

        async fn fetch_by_name(&self, name: &str) -> Result<Area, ApiError> {
            self.record(format!("area/{name}"));
            let id = name
                .strip_prefix("area-")
                .and_then(|suffix| suffix.parse().ok())
                .unwrap_or(1);
            Ok(Self::area(id))
        }
    }

    impl RecordSource<Pokemon> for MockCatalog {
        async fn fetch_by_id(&self, id: u32) -> Result<Pokemon, ApiError> {
            self.record(format!("pokemon/{id}"));
            Ok(Self::pokemon(id, "pikachu"))
        }

        async fn fetch_by_name(&self, name: &str) -> Result<Pokemon, ApiError> {
            self.record(format!("pokemon/{name}"));
            Ok(Self::pokemon(25, name))
        }
    }

    fn create_test_repl() -> (Repl<MockCatalog>, MockCatalog, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let catalog = MockCatalog::default();
        let repl = Repl::new(
            temp_dir.path(),
            temp_dir.path().join("pokedex.json"),
            Duration::from_secs(60),
            catalog.clone(),
        )
        .expect("repl should build");
        (repl, catalog, temp_dir)
    }

    #[test]
    fn test_clean_input_lowercases_and_splits() {
        assert_eq!(clean_input("  MAP  "), vec!["map"]);
        assert_eq!(
            clean_input("Explore Canalave-City-Area"),
            vec!["explore", "canalave-city-area"]
        );
        assert_eq!(clean_input("one  two\tthree"), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_clean_input_empty_line() {
        assert!(clean_input("").is_empty());
        assert!(clean_input("   \t  ").is_empty());
    }

    #[test]
    fn test_catch_roll_extremes() {
        // Rate 0 always clears; rate >= 1 never does.
        assert!(catch_roll(0));
        assert!(!catch_roll(644));
        assert!(!catch_roll(1000));
    }

    #[tokio::test]
    async fn test_unknown_command_is_an_error() {
        let (mut repl, _catalog, _temp_dir) = create_test_repl();
        let err = repl.dispatch("warp").await.expect_err("must be rejected");
        assert!(matches!(err, ReplError::UnknownCommand(_)));
    }

    #[tokio::test]
    async fn test_wrong_argument_count_is_an_error() {
        let (mut repl, _catalog, _temp_dir) = create_test_repl();
        let err = repl.dispatch("explore").await.expect_err("must be rejected");
        assert!(matches!(
            err,
            ReplError::WrongArgumentCount { expected: 1, got: 0, .. }
        ));
    }

    #[tokio::test]
    async fn test_blank_line_is_a_no_op() {
        let (mut repl, _catalog, _temp_dir) = create_test_repl();
        assert_eq!(repl.dispatch("  ").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_map_lists_twenty_areas_and_advances() {
        let (mut repl, catalog, _temp_dir) = create_test_repl();

        let output = repl.dispatch("map").await.expect("map should succeed");
        let names: Vec<&str> = output.lines().collect();
        assert_eq!(names.len(), 20);
        assert_eq!(names[0], "area-1");
        assert_eq!(names[19], "area-20");
        assert_eq!(catalog.call_count(), 20);

        let output = repl.dispatch("map").await.expect("map should succeed");
        assert!(output.starts_with("area-21"));
        assert_eq!(catalog.call_count(), 40);
    }

    #[tokio::test]
    async fn test_mapb_on_first_page_is_a_soft_no_op() {
        let (mut repl, catalog, _temp_dir) = create_test_repl();

        let output = repl.dispatch("mapb").await.expect("mapb should succeed");
        assert_eq!(output, "you're on the first page");
        assert_eq!(catalog.call_count(), 0);

        // One page in, backing up still reports the first page.
        repl.dispatch("map").await.expect("map should succeed");
        let output = repl.dispatch("mapb").await.expect("mapb should succeed");
        assert_eq!(output, "you're on the first page");
    }

    #[tokio::test]
    async fn test_mapb_serves_previous_page_from_memory() {
        let (mut repl, catalog, _temp_dir) = create_test_repl();

        repl.dispatch("map").await.expect("map should succeed");
        repl.dispatch("map").await.expect("map should succeed");
        assert_eq!(catalog.call_count(), 40);

        // Page one is still in the expiring cache: no further calls.
        let output = repl.dispatch("mapb").await.expect("mapb should succeed");
        assert!(output.starts_with("area-1\n"));
        assert_eq!(catalog.call_count(), 40);

        // Forward again is also still cached.
        let output = repl.dispatch("map").await.expect("map should succeed");
        assert!(output.starts_with("area-21"));
        assert_eq!(catalog.call_count(), 40);
    }

    #[tokio::test]
    async fn test_explore_lists_encounters() {
        let (mut repl, _catalog, _temp_dir) = create_test_repl();

        let output = repl
            .dispatch("explore area-3")
            .await
            .expect("explore should succeed");
        assert!(output.starts_with("Exploring area-3..."));
        assert!(output.contains(" - tentacool"));
    }

    #[tokio::test]
    async fn test_catch_records_attempt_in_ledger() {
        let (mut repl, _catalog, temp_dir) = create_test_repl();

        // Mock base experience is 0, so the roll always succeeds.
        let output = repl
            .dispatch("catch pikachu")
            .await
            .expect("catch should succeed");
        assert!(output.contains("pikachu was caught!"));

        let ledger = Pokedex::load(&temp_dir.path().join("pokedex.json"))
            .expect("ledger should load");
        assert_eq!(ledger.get("pikachu").expect("entry").catch_count, 1);
    }

    #[tokio::test]
    async fn test_inspect_requires_a_prior_attempt() {
        let (mut repl, _catalog, _temp_dir) = create_test_repl();

        let err = repl
            .dispatch("inspect mewtwo")
            .await
            .expect_err("must be rejected");
        assert!(matches!(err, ReplError::NeverAttempted(_)));

        repl.dispatch("catch mewtwo").await.expect("catch should succeed");
        let output = repl
            .dispatch("inspect mewtwo")
            .await
            .expect("inspect should succeed");
        assert!(output.starts_with("Name: mewtwo"));
        assert!(output.contains("Successful Catches: 1"));
        assert!(output.contains(" - hp: 0"));
    }

    #[tokio::test]
    async fn test_help_lists_every_command() {
        let (mut repl, _catalog, _temp_dir) = create_test_repl();
        let output = repl.dispatch("help").await.expect("help should succeed");
        for (name, _, _) in COMMANDS {
            assert!(output.contains(name), "help should mention {name}");
        }
    }

    #[tokio::test]
    async fn test_exit_sets_quit_flag() {
        let (mut repl, _catalog, _temp_dir) = create_test_repl();
        let output = repl.dispatch("exit").await.expect("exit should succeed");
        assert!(output.contains("Goodbye"));
        assert!(repl.should_quit);
    }
}
