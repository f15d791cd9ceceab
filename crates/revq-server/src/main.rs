//! `revq-server`: serves the reviewer queue API backed by a SQLite file.
//!
//! Settings come from a TOML file (`--config`, default `config.toml`, may be
//! absent) and `REVQ_*` environment variables, which win. For example
//! `REVQ_STORE_PATH=/var/lib/revq.db revq-server`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use revq_server::ServerConfig;
use revq_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Review team assignment server")]
struct Cli {
  /// TOML file with host, port and store_path.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  init_tracing();

  let cli = Cli::parse();
  let server_cfg = load_config(cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("cannot open review store {}", store_path.display()))?;

  let address = server_cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("cannot listen on {address}"))?;
  tracing::info!(%address, store = %store_path.display(), "revq-server ready");

  axum::serve(listener, revq_server::router(Arc::new(store)))
    .await
    .context("http server stopped")
}

/// `RUST_LOG` wins; otherwise INFO.
fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();
}

fn load_config(path: PathBuf) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("REVQ"))
    .build()
    .context("cannot read configuration")?
    .try_deserialize()
    .context("invalid server configuration")
}

fn expand_tilde(path: &Path) -> PathBuf {
  let Ok(home) = std::env::var("HOME") else {
    return path.to_path_buf();
  };
  match path.strip_prefix("~") {
    Ok(rest) => PathBuf::from(home).join(rest),
    Err(_) => path.to_path_buf(),
  }
}
