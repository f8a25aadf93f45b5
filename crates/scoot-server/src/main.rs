//! scoot-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), overlays
//! `SCOOT_*` environment variables, builds an in-process session store, and
//! serves the onboarding API over HTTP.
//!
//! ```
//! cargo run -p scoot-server --bin server -- --config config.toml
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use scoot_core::fixtures;
use scoot_server::{ServerConfig, router, spawn_sweeper};
use scoot_store_memory::MemoryStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "ScootScoot onboarding session server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SCOOT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = Arc::new(
    MemoryStore::new().with_default_expiration(server_cfg.default_expiration_hours),
  );

  if server_cfg.seed_fixtures {
    let seeded = fixtures::seed(store.as_ref(), &server_cfg.fixture_shop_id)
      .await
      .context("failed to seed fixture sessions")?;
    tracing::info!(
      count = seeded.len(),
      shop_id = %server_cfg.fixture_shop_id,
      "seeded fixture sessions"
    );
  }

  let _sweeper = server_cfg
    .sweep_interval()
    .map(|every| spawn_sweeper(Arc::clone(&store), every));

  let app = router(store, &server_cfg);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
