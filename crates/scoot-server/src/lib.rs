//! HTTP host for the ScootScoot onboarding API.
//!
//! Wires a [`SessionStore`] into the JSON router, adds request tracing and a
//! health probe, and runs the periodic expiry sweep the store itself does not
//! schedule.

use std::{sync::Arc, time::Duration};

use axum::{Json, Router, routing::get};
use scoot_core::store::SessionStore;
use serde::{Deserialize, Serialize};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SCOOT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                     String,
  pub port:                     u16,
  /// Origin activation links point at.
  pub app_origin:               String,
  pub default_expiration_hours: u32,
  /// `0` disables the background sweep.
  pub sweep_interval_secs:      u64,
  pub seed_fixtures:            bool,
  pub fixture_shop_id:          String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                     "127.0.0.1".to_string(),
      port:                     8080,
      app_origin:               "http://localhost:8080".to_string(),
      default_expiration_hours: scoot_core::lifecycle::DEFAULT_EXPIRATION_HOURS,
      sweep_interval_secs:      60,
      seed_fixtures:            false,
      fixture_shop_id:          "shop-demo".to_string(),
    }
  }
}

impl ServerConfig {
  pub fn sweep_interval(&self) -> Option<Duration> {
    (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
  status:  &'static str,
  version: &'static str,
}

async fn health() -> Json<HealthResponse> {
  Json(HealthResponse { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

/// The full application: `/health` plus the JSON API under `/api`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: SessionStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", scoot_api::api_router(store, &config.app_origin))
    .layer(TraceLayer::new_for_http())
}

// ─── Expiry sweep ─────────────────────────────────────────────────────────────

/// Run [`SessionStore::process_expired_sessions`] every `every` until the
/// returned task is aborted. Failures are logged and the sweep continues.
pub fn spawn_sweeper<S>(store: Arc<S>, every: Duration) -> JoinHandle<()>
where
  S: SessionStore + 'static,
{
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      match store.process_expired_sessions().await {
        Ok(0) => {}
        Ok(n) => tracing::debug!(expired = n, "sweep tick"),
        Err(e) => tracing::warn!(error = %e, "expiry sweep failed"),
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use axum::{body::Body, http::Request};
  use chrono::{Duration as ChronoDuration, TimeZone, Utc};
  use config::{Config, File, FileFormat};
  use scoot_core::{clock::ManualClock, session::SessionStatus};
  use scoot_store_memory::MemoryStore;
  use tower::ServiceExt as _;

  use super::*;

  #[test]
  fn config_falls_back_to_defaults() {
    let cfg: ServerConfig = Config::builder()
      .add_source(File::from_str("port = 9000\nseed_fixtures = true", FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    assert_eq!(cfg.port, 9000);
    assert!(cfg.seed_fixtures);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.default_expiration_hours, 24);
    assert_eq!(cfg.sweep_interval(), Some(Duration::from_secs(60)));
  }

  #[test]
  fn zero_interval_disables_sweeper() {
    let cfg = ServerConfig { sweep_interval_secs: 0, ..ServerConfig::default() };
    assert!(cfg.sweep_interval().is_none());
  }

  #[tokio::test]
  async fn health_and_api_are_mounted() {
    let app = router(Arc::new(MemoryStore::new()), &ServerConfig::default());

    let resp = app
      .clone()
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert!(resp.status().is_success());

    let resp = app
      .oneshot(Request::get("/api/shops/shop-1/sessions").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert!(resp.status().is_success());
  }

  #[tokio::test]
  async fn sweeper_expires_overdue_sessions() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    let session = store.create_session("shop-1".into(), Some(1)).await.unwrap();
    clock.advance(ChronoDuration::hours(2));

    let handle = spawn_sweeper(Arc::clone(&store), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.abort();

    let stored = store.get_session(session.session_id).await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Expired);
  }
}
