//! rps_live - command-line entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use rps_live::db::MatchRepository;
use rps_live::{MatchConfig, MoveOutcome, PlayerId, ServerConfig, SessionRegistry, Slot};
use rps_rules::Move;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();
    initialize_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Migrate { db_path } => migrate(override_db_path(config, db_path)),
        Command::Play {
            player1,
            player2,
            moves1,
            moves2,
            best_of,
            extended,
            db_path,
        } => {
            let config = override_db_path(config, db_path);
            let best_of = best_of.unwrap_or(*config.default_best_of());
            let match_config = MatchConfig::new(best_of, extended, false)?;
            play(&config, match_config, (player1, moves1), (player2, moves2))
        }
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rps_live=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[instrument(skip(path), fields(path = %path.display()))]
fn load_config(path: &Path) -> Result<ServerConfig> {
    if path.exists() {
        Ok(ServerConfig::from_file(path)?)
    } else {
        info!("Config file not found at {}, using defaults", path.display());
        Ok(ServerConfig::default())
    }
}

fn override_db_path(config: ServerConfig, db_path: Option<String>) -> ServerConfig {
    match db_path {
        Some(path) => config.with_db_path(path),
        None => config,
    }
}

fn open_repository(config: &ServerConfig) -> Result<MatchRepository> {
    let repository = MatchRepository::new(config.db_path().clone())?;
    repository
        .run_migrations()
        .with_context(|| format!("migrating {}", config.db_path()))?;
    Ok(repository)
}

/// Hosts the registry with periodic eviction until Ctrl+C.
#[instrument(skip(config))]
async fn serve(config: ServerConfig) -> Result<()> {
    let repository = open_repository(&config)?;
    let registry = SessionRegistry::with_settings(Arc::new(repository), config.registry_settings());
    let eviction = registry.spawn_eviction(config.eviction_interval());

    info!(
        db_path = %config.db_path(),
        idle_timeout_secs = config.idle_timeout_secs(),
        "Registry ready. Press Ctrl+C to exit."
    );
    tokio::signal::ctrl_c().await?;

    eviction.abort();
    info!(remaining = registry.len(), "Shutting down");
    Ok(())
}

#[instrument(skip(config))]
fn migrate(config: ServerConfig) -> Result<()> {
    let repository = MatchRepository::new(config.db_path().clone())?;
    let applied = repository.run_migrations()?;
    println!("Applied {} migration(s) to {}", applied, config.db_path());
    Ok(())
}

/// Plays a scripted series through the registry and stores the result.
#[instrument(skip(config, first, second))]
fn play(
    config: &ServerConfig,
    match_config: MatchConfig,
    first: (String, Vec<String>),
    second: (String, Vec<String>),
) -> Result<()> {
    let repository = open_repository(config)?;
    let registry = SessionRegistry::with_settings(Arc::new(repository), config.registry_settings());

    let id = registry.create(match_config);
    let session = registry.get(&id)?;
    let player1 = PlayerId::new(first.0);
    let player2 = PlayerId::new(second.0);
    session.connect_player(player1.clone())?;
    session.connect_player(player2.clone())?;

    let moves1 = parse_moves(&first.1)?;
    let moves2 = parse_moves(&second.1)?;
    if moves1.len() != moves2.len() {
        warn!(moves1 = moves1.len(), moves2 = moves2.len(), "Move lists differ in length");
    }

    for (mv1, mv2) in moves1.into_iter().zip(moves2) {
        session.apply_move(&player1, mv1)?;
        match session.apply_move(&player2, mv2)? {
            MoveOutcome::Waiting => bail!("round did not resolve"),
            MoveOutcome::RoundResolved { round } => println!(
                "Round {}: {} vs {} -> {}",
                round.number(),
                round.player1_move(),
                round.player2_move(),
                round.outcome()
            ),
            MoveOutcome::SeriesComplete { round, winner } => {
                println!(
                    "Round {}: {} vs {} -> {}",
                    round.number(),
                    round.player1_move(),
                    round.player2_move(),
                    round.outcome()
                );
                let live = session.snapshot();
                if let Some(player) = live.player(winner) {
                    println!("Series won by {} ({})", player, winner);
                }
                break;
            }
        }
    }

    let live = session.snapshot();
    if live.series_winner().is_none() {
        bail!(
            "series undecided after {} round(s): {}-{}",
            live.round_history().len(),
            live.wins(Slot::Player1),
            live.wins(Slot::Player2)
        );
    }

    let record_id = registry.finalize(&id)?;
    println!("Stored as match {} in {}", record_id, config.db_path());
    Ok(())
}

fn parse_moves(raw: &[String]) -> Result<Vec<Move>> {
    raw.iter()
        .map(|s| {
            Move::from_db_string(&s.trim().to_uppercase())
                .with_context(|| format!("parsing move '{}'", s))
        })
        .collect()
}
