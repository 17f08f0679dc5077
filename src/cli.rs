//! Command-line interface parsing
//!
//! This module handles parsing of CLI arguments using clap and resolves
//! them into concrete settings, falling back to XDG-compliant cache and
//! data directories when no overrides are given.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use directories::ProjectDirs;
use thiserror::Error;

/// Error types for CLI argument resolution
#[derive(Debug, Error)]
pub enum CliError {
    /// No home directory to derive default paths from
    #[error("could not determine a home directory; pass --cache-dir and --data-dir explicitly")]
    NoHomeDirectory,
}

/// Pokedex CLI - browse the PokeAPI catalog from an interactive prompt
#[derive(Parser, Debug)]
#[command(name = "pokedexcli")]
#[command(about = "Interactive Pokedex over the PokeAPI catalog")]
#[command(version)]
pub struct Cli {
    /// Directory for the durable catalog cache (default: XDG cache dir)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Directory for the caught-Pokemon ledger (default: XDG data dir)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Seconds a page of area names stays in the in-memory cache
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub ttl_secs: u64,
}

/// Settings resolved from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where page segments and name indexes live
    pub cache_dir: PathBuf,
    /// Ledger document path
    pub dex_path: PathBuf,
    /// In-memory cache time-to-live
    pub ttl: Duration,
}

impl Settings {
    /// Resolves settings from parsed CLI arguments.
    ///
    /// Explicit directories win; otherwise XDG paths for this application
    /// are used. Fails only when neither an override nor a home directory
    /// is available.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let project_dirs = ProjectDirs::from("", "", "pokedexcli");

        let cache_dir = cli
            .cache_dir
            .clone()
            .or_else(|| project_dirs.as_ref().map(|dirs| dirs.cache_dir().to_path_buf()))
            .ok_or(CliError::NoHomeDirectory)?;
        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| project_dirs.as_ref().map(|dirs| dirs.data_dir().to_path_buf()))
            .ok_or(CliError::NoHomeDirectory)?;

        Ok(Self {
            cache_dir,
            dex_path: data_dir.join("pokedex.json"),
            ttl: Duration::from_secs(cli.ttl_secs),
        })
    }
}
