//! Marquee server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! SQLite store, and runs one of three modes: `serve` (the HTTP API),
//! `scrape` (one sequential pass over every stored theater), or `onboard`
//! (geocode and upsert theaters from a JSON seed file).

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use marquee_api::{AppState, ServerConfig, router};
use marquee_extract::ExtractionRules;
use marquee_scrape::{
  Geocoder, PageFetcher,
  onboard::{TheaterSeed, onboard_theaters},
  run::scrape_all,
};
use marquee_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Movie showtime scraper and proximity API")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the query API.
  Serve,
  /// Run one scrape pass over all stored theaters, then exit.
  Scrape,
  /// Onboard theaters from a JSON seed file of {name, url, address} entries.
  Onboard {
    file: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MARQUEE"))
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = SqliteStore::open(&server_cfg.db_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.db_path))?;

  match cli.command {
    Command::Serve => {
      let state = AppState {
        store:    Arc::new(store),
        fetcher:  PageFetcher::new(server_cfg.user_agent.clone()),
        geocoder: Geocoder::new(server_cfg.geocode_endpoint.clone()),
        rules:    ExtractionRules::default(),
      };

      let app = router(state).layer(TraceLayer::new_for_http());
      let address = format!("{}:{}", server_cfg.host, server_cfg.port);

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }

    Command::Scrape => {
      let fetcher = PageFetcher::new(server_cfg.user_agent.clone());
      let summary = scrape_all(&store, &fetcher, &ExtractionRules::default()).await?;
      tracing::info!(
        theaters = summary.theaters,
        succeeded = summary.succeeded,
        failed = summary.failed,
        schedules = summary.schedules,
        "scrape pass finished"
      );
    }

    Command::Onboard { file } => {
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {file:?}"))?;
      let seeds: Vec<TheaterSeed> =
        serde_json::from_str(&raw).context("seed file is not a JSON array of theaters")?;

      let geocoder = Geocoder::new(server_cfg.geocode_endpoint.clone());
      let stored = onboard_theaters(&store, &geocoder, seeds).await?;
      tracing::info!(count = stored.len(), "onboarding finished");
    }
  }

  Ok(())
}
