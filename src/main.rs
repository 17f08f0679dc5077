//! Pokedex CLI - browse the PokeAPI catalog from an interactive prompt
//!
//! A line-oriented terminal application: the user is dropped into a
//! `Pokedex > ` prompt and pages through location areas, explores them,
//! and catches and inspects Pokémon. Fetched catalog data is cached in
//! memory for the session and on disk across sessions.

use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pokedexcli::api::PokeApiClient;
use pokedexcli::cli::{Cli, Settings};
use pokedexcli::repl::Repl;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Quiet by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "pokedexcli=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;

    let mut repl = Repl::new(
        &settings.cache_dir,
        settings.dex_path.clone(),
        settings.ttl,
        PokeApiClient::new(),
    )?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("Pokedex > ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF ends the session like `exit`.
            break;
        }

        match repl.dispatch(&line).await {
            Ok(output) if output.is_empty() => {}
            Ok(output) => println!("{output}"),
            Err(err) => println!("command returned error: {err}"),
        }

        if repl.should_quit {
            break;
        }
    }

    Ok(())
}
