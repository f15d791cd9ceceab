//! HTTP server for revq.
//!
//! Mounts the JSON API from `revq-api` under `/api` next to a health check,
//! backed by any [`ReviewStore`].

use std::{path::PathBuf, sync::Arc};

use axum::{Router, http::StatusCode, routing::get};
use revq_core::store::ReviewStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `REVQ_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ReviewStore + 'static,
{
  Router::new()
    .route("/healthz", get(|| async { StatusCode::NO_CONTENT }))
    .nest("/api", revq_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{Config, File, FileFormat};
  use revq_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn oneshot(uri: &str) -> axum::response::Response {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router(store).oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn health_check() {
    assert_eq!(oneshot("/healthz").await.status(), StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn api_is_nested() {
    let resp = oneshot("/api/teams/secdir/policy").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "review team secdir has no settings");
  }

  #[test]
  fn config_defaults() {
    let cfg: ServerConfig = Config::builder()
      .add_source(File::from_str("store_path = \"~/revq.db\"", FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("~/revq.db"));
  }
}
