//! Matchday CLI
//!
//! Command-line client for the match feed:
//! - Fetch and print the current matches
//! - Follow the feed by polling or over the push channel
//! - Generate a configuration file

use anyhow::Context;
use clap::{Parser, Subcommand};
use matchday::{
    generate_default_config, Config, Endpoints, FeedClient, LoggingConfig, Match, MatchStore,
    PushState,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "matchday")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live football match feed client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all matches once
    Fetch,

    /// Fetch a single match
    Show {
        /// Match ID
        id: i64,
    },

    /// Poll the matches endpoint and print each new snapshot
    Poll {
        /// Poll interval in milliseconds (default: from config)
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },

    /// Follow snapshots pushed over the WebSocket channel
    Watch,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch => {
            let config = setup(&cli.config, &cli.base_url)?;
            let store = MatchStore::new(config.feed)?;

            store.fetch_all().await.with_context(|| {
                format!("Cannot fetch matches from {}", store.endpoints().matches_url())
            })?;
            print_matches(&store.matches(), &cli.format)?;
        }

        Commands::Show { id } => {
            let config = setup(&cli.config, &cli.base_url)?;
            let endpoints = Endpoints::from_config(&config.feed)?;
            let client = FeedClient::new(endpoints, config.feed.request_timeout())?;

            match client.fetch_match(id).await? {
                Some(m) => print_match_detail(&m, &cli.format)?,
                None => {
                    eprintln!("Match {} not found", id);
                    std::process::exit(1);
                }
            }
        }

        Commands::Poll { interval_ms } => {
            let mut config = setup(&cli.config, &cli.base_url)?;
            if let Some(ms) = interval_ms {
                config.feed.poll_interval_ms = ms;
            }
            let store = MatchStore::new(config.feed)?;
            let mut updates = store.subscribe();

            store.start_polling().await;

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = updates.borrow_and_update().clone();
                        print_matches(&snapshot, &cli.format)?;
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Interrupted, stopping");
                        break;
                    }
                }
            }

            store.stop_polling().await;
        }

        Commands::Watch => {
            let config = setup(&cli.config, &cli.base_url)?;
            let store = MatchStore::new(config.feed)?;
            let mut updates = store.subscribe();

            store.connect_ws().await.with_context(|| {
                format!("Cannot connect to {}", store.endpoints().push_url())
            })?;

            let mut liveness = tokio::time::interval(Duration::from_secs(1));

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = updates.borrow_and_update().clone();
                        print_matches(&snapshot, &cli.format)?;
                    }
                    _ = liveness.tick() => {
                        if store.push_state().await == PushState::Closed {
                            eprintln!("Push channel closed");
                            std::process::exit(1);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Interrupted, closing push channel");
                        break;
                    }
                }
            }

            store.disconnect().await;
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Wrote default config to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Load configuration and start logging
fn setup(path: &Option<PathBuf>, base_url: &Option<String>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = base_url {
        config.feed.base_url = url.clone();
    }

    init_tracing(&config.logging);
    tracing::debug!(base_url = %config.feed.base_url, "Configuration loaded");

    Ok(config)
}

/// Install the tracing subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("matchday={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_matches(matches: &[Match], format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string(matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No matches.");
        return Ok(());
    }

    println!(
        "{:<6} {:<18} {:<20} {:^7} {:<20} {:<10} {}",
        "ID", "League", "Home", "Score", "Away", "Status", "Min"
    );
    println!("{}", "-".repeat(90));

    for m in matches {
        println!(
            "{:<6} {:<18} {:<20} {:^7} {:<20} {:<10} {}",
            m.id,
            m.league,
            m.home_team,
            m.score_line(),
            m.away_team,
            m.status,
            m.current_minute.map(|min| format!("{}'", min)).unwrap_or_default()
        );
    }
    println!();

    Ok(())
}

fn print_match_detail(m: &Match, format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(m)?);
        return Ok(());
    }

    println!("{} ({})", m.league, m.status);
    println!("{} {} {}", m.home_team, m.score_line(), m.away_team);
    println!("Kickoff: {}", m.kickoff_time);
    if let Some(minute) = m.current_minute {
        println!("Minute: {}'", minute);
    }

    if !m.events.is_empty() {
        println!();
        for event in &m.events {
            match &event.sub_in {
                Some(sub_in) => println!(
                    "  {:>3}'  {:<14} {} ({} on for {})",
                    event.minute, event.kind, event.team, sub_in, event.player
                ),
                None => println!(
                    "  {:>3}'  {:<14} {} ({})",
                    event.minute, event.kind, event.team, event.player
                ),
            }
        }
    }

    Ok(())
}
