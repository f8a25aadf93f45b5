//! Handlers for session creation, lookup, and bookkeeping.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sessions` | Body: `{"shop_id":"...","expiration_hours":24}`; returns 201 + [`CreatedSession`] |
//! | `GET`  | `/sessions/:id` | 404 if not found |
//! | `GET`  | `/sessions/by-code/:code` | 404 if not found |
//! | `GET`  | `/shops/:shop_id/sessions` | Oldest first |
//! | `GET`  | `/riders/:rider_id/sessions` | Activation order |
//! | `POST` | `/sessions/:id/notifications` | Body: [`NewNotification`] |
//! | `POST` | `/sessions/:id/extend` | Body: `{"additional_hours":12}` |
//! | `POST` | `/sessions/:id/metadata` | Body: any JSON object, shallow-merged |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use scoot_core::{
  activation::activation_url,
  session::{CreatedSession, NewNotification, OnboardingSession},
  store::SessionStore,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

pub(crate) fn not_found(id: Uuid) -> ApiError {
  ApiError::NotFound(format!("session {id} not found"))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub shop_id:          String,
  /// Defaults to the store's configured lifetime.
  pub expiration_hours: Option<u32>,
}

/// `POST /sessions`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore,
{
  if body.shop_id.trim().is_empty() {
    return Err(ApiError::BadRequest("shop_id must not be empty".into()));
  }

  let session = state
    .store
    .create_session(body.shop_id, body.expiration_hours)
    .await
    .map_err(ApiError::store)?;
  let activation_url = activation_url(&state.app_origin, &session.activation_code);
  Ok((StatusCode::CREATED, Json(CreatedSession { session, activation_url })))
}

// ─── Lookups ──────────────────────────────────────────────────────────────────

/// `GET /sessions/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<OnboardingSession>, ApiError>
where
  S: SessionStore,
{
  let session = state
    .store
    .get_session(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(session))
}

/// `GET /sessions/by-code/:code`
pub async fn by_code<S>(
  State(state): State<ApiState<S>>,
  Path(code): Path<String>,
) -> Result<Json<OnboardingSession>, ApiError>
where
  S: SessionStore,
{
  let session = state
    .store
    .get_session_by_activation_code(&code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no session with code {code}")))?;
  Ok(Json(session))
}

/// `GET /shops/:shop_id/sessions`
pub async fn by_shop<S>(
  State(state): State<ApiState<S>>,
  Path(shop_id): Path<String>,
) -> Result<Json<Vec<OnboardingSession>>, ApiError>
where
  S: SessionStore,
{
  let sessions = state
    .store
    .get_sessions_by_shop(&shop_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sessions))
}

/// `GET /riders/:rider_id/sessions`
pub async fn by_rider<S>(
  State(state): State<ApiState<S>>,
  Path(rider_id): Path<String>,
) -> Result<Json<Vec<OnboardingSession>>, ApiError>
where
  S: SessionStore,
{
  let sessions = state
    .store
    .get_sessions_by_rider(&rider_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sessions))
}

// ─── Bookkeeping ──────────────────────────────────────────────────────────────

/// `POST /sessions/:id/notifications`
pub async fn notify<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewNotification>,
) -> Result<Json<OnboardingSession>, ApiError>
where
  S: SessionStore,
{
  let session = state
    .store
    .record_notification(id, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub struct ExtendBody {
  pub additional_hours: u32,
}

/// `POST /sessions/:id/extend`
pub async fn extend<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ExtendBody>,
) -> Result<Json<OnboardingSession>, ApiError>
where
  S: SessionStore,
{
  let session = state
    .store
    .extend_session_expiration(id, body.additional_hours)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(session))
}

/// `POST /sessions/:id/metadata`
pub async fn merge_metadata<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(entries): Json<Map<String, Value>>,
) -> Result<Json<OnboardingSession>, ApiError>
where
  S: SessionStore,
{
  let session = state
    .store
    .add_session_metadata(id, entries)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(session))
}
