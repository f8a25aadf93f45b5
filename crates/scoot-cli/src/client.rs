//! Async HTTP client wrapping the ScootScoot onboarding JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder};
use scoot_core::{
  session::{CreatedSession, NewNotification, OnboardingSession, SessionStatus},
  step::OnboardingStep,
  store::SweepReport,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Connection settings for the onboarding API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the onboarding JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send `req`, turning non-2xx responses into errors carrying the server's
  /// `{"error": ...}` message.
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    tracing::debug!(request = what, "sending");
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;

    let status = resp.status();
    if !status.is_success() {
      let body: Value = resp.json().await.unwrap_or_default();
      let message = body["error"].as_str().unwrap_or("no details");
      return Err(anyhow!("{what} → {status}: {message}"));
    }
    resp.json().await.with_context(|| format!("deserialising {what}"))
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  /// `POST /api/sessions`
  pub async fn create(&self, shop_id: &str, hours: Option<u32>) -> Result<CreatedSession> {
    let req = self
      .client
      .post(self.url("/sessions"))
      .json(&json!({ "shop_id": shop_id, "expiration_hours": hours }));
    self.send(req, "POST /sessions").await
  }

  /// `GET /api/sessions/<id>`
  pub async fn get(&self, id: Uuid) -> Result<OnboardingSession> {
    let req = self.client.get(self.url(&format!("/sessions/{id}")));
    self.send(req, "GET /sessions/:id").await
  }

  /// `GET /api/sessions/by-code/<code>`
  pub async fn by_code(&self, code: &str) -> Result<OnboardingSession> {
    let req = self.client.get(self.url(&format!("/sessions/by-code/{code}")));
    self.send(req, "GET /sessions/by-code/:code").await
  }

  /// `GET /api/shops/<shop_id>/sessions`
  pub async fn by_shop(&self, shop_id: &str) -> Result<Vec<OnboardingSession>> {
    let req = self.client.get(self.url(&format!("/shops/{shop_id}/sessions")));
    self.send(req, "GET /shops/:shop_id/sessions").await
  }

  /// `GET /api/riders/<rider_id>/sessions`
  pub async fn by_rider(&self, rider_id: &str) -> Result<Vec<OnboardingSession>> {
    let req = self.client.get(self.url(&format!("/riders/{rider_id}/sessions")));
    self.send(req, "GET /riders/:rider_id/sessions").await
  }

  // ── Activation and progress ───────────────────────────────────────────────

  /// `POST /api/activate`. `payload` is a typed code or a scanned link.
  pub async fn activate(&self, payload: &str, rider_id: &str) -> Result<OnboardingSession> {
    let req = self
      .client
      .post(self.url("/activate"))
      .json(&json!({ "payload": payload, "rider_id": rider_id }));
    self.send(req, "POST /activate").await
  }

  /// `PUT /api/sessions/<id>/steps/<step>`
  pub async fn step(
    &self,
    id: Uuid,
    step: OnboardingStep,
    completed: bool,
  ) -> Result<OnboardingSession> {
    let req = self
      .client
      .put(self.url(&format!("/sessions/{id}/steps/{step}")))
      .json(&json!({ "completed": completed }));
    self.send(req, "PUT /sessions/:id/steps/:step").await
  }

  /// `PUT /api/sessions/<id>/status`
  pub async fn status(&self, id: Uuid, status: SessionStatus) -> Result<OnboardingSession> {
    let req = self
      .client
      .put(self.url(&format!("/sessions/{id}/status")))
      .json(&json!({ "status": status }));
    self.send(req, "PUT /sessions/:id/status").await
  }

  // ── Bookkeeping ───────────────────────────────────────────────────────────

  /// `POST /api/sessions/<id>/notifications`
  pub async fn notify(&self, id: Uuid, notification: &NewNotification) -> Result<OnboardingSession> {
    let req = self
      .client
      .post(self.url(&format!("/sessions/{id}/notifications")))
      .json(notification);
    self.send(req, "POST /sessions/:id/notifications").await
  }

  /// `POST /api/sessions/<id>/extend`
  pub async fn extend(&self, id: Uuid, additional_hours: u32) -> Result<OnboardingSession> {
    let req = self
      .client
      .post(self.url(&format!("/sessions/{id}/extend")))
      .json(&json!({ "additional_hours": additional_hours }));
    self.send(req, "POST /sessions/:id/extend").await
  }

  /// `POST /api/sessions/<id>/metadata`
  pub async fn metadata(&self, id: Uuid, entries: &Map<String, Value>) -> Result<OnboardingSession> {
    let req = self
      .client
      .post(self.url(&format!("/sessions/{id}/metadata")))
      .json(entries);
    self.send(req, "POST /sessions/:id/metadata").await
  }

  /// `POST /api/sweep`
  pub async fn sweep(&self) -> Result<SweepReport> {
    let req = self.client.post(self.url("/sweep"));
    self.send(req, "POST /sweep").await
  }
}
