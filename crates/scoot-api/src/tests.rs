//! Router tests against an in-memory store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{Duration, TimeZone, Utc};
use scoot_core::clock::ManualClock;
use scoot_store_memory::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

const ORIGIN: &str = "https://scootscoot.test";

fn app() -> (Router, ManualClock) {
  let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
  let store = MemoryStore::with_clock(clock.clone());
  (api_router(Arc::new(store), ORIGIN), clock)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
  };
  (status, json)
}

async fn create(app: &Router, shop: &str) -> Value {
  let (status, body) = send(app, "POST", "/sessions", Some(json!({ "shop_id": shop }))).await;
  assert_eq!(status, StatusCode::CREATED);
  body
}

// ── Create and read ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_session_and_link() {
  let (app, _) = app();
  let body = create(&app, "shop-1").await;

  let code = body["session"]["activation_code"].as_str().unwrap();
  assert_eq!(body["session"]["status"], "pending");
  assert_eq!(body["session"]["current_step"], "basic-info");
  assert_eq!(body["activation_url"], format!("{ORIGIN}/activate?code={code}"));
}

#[tokio::test]
async fn create_rejects_blank_shop() {
  let (app, _) = app();
  let (status, body) = send(&app, "POST", "/sessions", Some(json!({ "shop_id": "  " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("shop_id"));
}

#[tokio::test]
async fn oversized_lifetimes_are_bad_requests() {
  let (app, _) = app();
  let (status, body) = send(
    &app,
    "POST",
    "/sessions",
    Some(json!({ "shop_id": "shop-1", "expiration_hours": u32::MAX })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("date range"));

  let created = create(&app, "shop-1").await;
  let id = created["session"]["session_id"].as_str().unwrap();
  let (status, _) = send(
    &app,
    "POST",
    &format!("/sessions/{id}/extend"),
    Some(json!({ "additional_hours": u32::MAX })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, session) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(session["expires_at"], created["session"]["expires_at"]);
}

#[tokio::test]
async fn lookups_resolve_and_miss() {
  let (app, _) = app();
  let body = create(&app, "shop-1").await;
  let id = body["session"]["session_id"].as_str().unwrap();
  let code = body["session"]["activation_code"].as_str().unwrap();

  let (status, by_id) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(by_id["activation_code"], code);

  let (status, by_code) = send(&app, "GET", &format!("/sessions/by-code/{code}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(by_code["session_id"], id);

  let (status, shop) = send(&app, "GET", "/shops/shop-1/sessions", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(shop.as_array().unwrap().len(), 1);

  let (status, link) = send(&app, "GET", &format!("/sessions/{id}/activation-link"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(link["activation_code"], code);

  let missing = uuid::Uuid::new_v4();
  let (status, body) = send(&app, "GET", &format!("/sessions/{missing}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("not found"));
}

// ── Activation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn activate_with_scanned_link() {
  let (app, _) = app();
  let body = create(&app, "shop-1").await;
  let url = body["activation_url"].as_str().unwrap();

  let (status, session) = send(
    &app,
    "POST",
    "/activate",
    Some(json!({ "payload": url, "rider_id": "rider-7" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(session["status"], "activated");
  assert_eq!(session["rider_id"], "rider-7");

  let (status, riders) = send(&app, "GET", "/riders/rider-7/sessions", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(riders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn second_activation_is_not_found() {
  let (app, _) = app();
  let body = create(&app, "shop-1").await;
  let code = body["session"]["activation_code"].clone();

  let (status, _) =
    send(&app, "POST", "/activate", Some(json!({ "code": code, "rider_id": "rider-7" }))).await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) =
    send(&app, "POST", "/activate", Some(json!({ "code": code, "rider_id": "rider-8" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], crate::activation::REQUEST_NEW_CODE);
}

#[tokio::test]
async fn activate_rejects_malformed_code() {
  let (app, _) = app();
  let (status, _) =
    send(&app, "POST", "/activate", Some(json!({ "code": "12ab", "rider_id": "rider-7" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Progress ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn walk_every_step_to_completion() {
  let (app, _) = app();
  let body = create(&app, "shop-1").await;
  let id = body["session"]["session_id"].as_str().unwrap().to_owned();
  let code = body["session"]["activation_code"].clone();
  send(&app, "POST", "/activate", Some(json!({ "code": code, "rider_id": "rider-7" }))).await;

  let steps = ["basic-info", "document-upload", "signature", "consent", "face-verification"];
  let mut last = Value::Null;
  for step in steps {
    let (status, session) = send(
      &app,
      "PUT",
      &format!("/sessions/{id}/steps/{step}"),
      Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "step {step}");
    last = session;
  }

  assert_eq!(last["status"], "completed");
  assert!(last["current_step"].is_null());
  assert!(last["completed_at"].is_string());
  assert_eq!(last["completed_steps"]["face-verification"], true);
}

#[tokio::test]
async fn step_on_pending_session_conflicts() {
  let (app, _) = app();
  let body = create(&app, "shop-1").await;
  let id = body["session"]["session_id"].as_str().unwrap();

  let (status, body) = send(
    &app,
    "PUT",
    &format!("/sessions/{id}/steps/basic-info"),
    Some(json!({ "completed": true })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("not been activated"));
}

#[tokio::test]
async fn unknown_step_is_rejected() {
  let (app, _) = app();
  let body = create(&app, "shop-1").await;
  let id = body["session"]["session_id"].as_str().unwrap();

  let (status, _) = send(
    &app,
    "PUT",
    &format!("/sessions/{id}/steps/selfie"),
    Some(json!({ "completed": true })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn illegal_status_write_conflicts() {
  let (app, _) = app();
  let body = create(&app, "shop-1").await;
  let id = body["session"]["session_id"].as_str().unwrap();

  let (status, expired) =
    send(&app, "PUT", &format!("/sessions/{id}/status"), Some(json!({ "status": "expired" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(expired["status"], "expired");

  let (status, _) =
    send(&app, "PUT", &format!("/sessions/{id}/status"), Some(json!({ "status": "pending" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ── Bookkeeping and sweep ───────────────────────────────────────────────────

#[tokio::test]
async fn notifications_extension_and_metadata() {
  let (app, _) = app();
  let body = create(&app, "shop-1").await;
  let id = body["session"]["session_id"].as_str().unwrap();
  let expires_at = body["session"]["expires_at"].as_str().unwrap();
  let expires_at: chrono::DateTime<Utc> = expires_at.parse().unwrap();

  let (status, session) = send(
    &app,
    "POST",
    &format!("/sessions/{id}/notifications"),
    Some(json!({
      "channel": "sms",
      "recipient": "+15550100",
      "template": "activation-code",
      "successful": true,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(session["notifications_sent"][0]["channel"], "sms");

  let (status, session) = send(
    &app,
    "POST",
    &format!("/sessions/{id}/extend"),
    Some(json!({ "additional_hours": 6 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let extended: chrono::DateTime<Utc> = session["expires_at"].as_str().unwrap().parse().unwrap();
  assert_eq!(extended - expires_at, Duration::hours(6));

  let (status, session) = send(
    &app,
    "POST",
    &format!("/sessions/{id}/metadata"),
    Some(json!({ "kiosk": "front-desk" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(session["metadata"]["kiosk"], "front-desk");
}

#[tokio::test]
async fn sweep_reports_expired_count() {
  let (app, clock) = app();
  create(&app, "shop-1").await;
  create(&app, "shop-1").await;

  let (status, report) = send(&app, "POST", "/sweep", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["expired"], 0);

  clock.advance(Duration::hours(25));
  let (_, report) = send(&app, "POST", "/sweep", None).await;
  assert_eq!(report["expired"], 2);

  let (_, sessions) = send(&app, "GET", "/shops/shop-1/sessions", None).await;
  assert!(sessions.as_array().unwrap().iter().all(|s| s["status"] == "expired"));
}
