//! Rider activation.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/activate` | Body: `{"code":"483920","rider_id":"..."}` or `{"payload":"<scanned link>","rider_id":"..."}` |
//! | `GET`  | `/sessions/:id/activation-link` | Code and QR link for an existing session |

use axum::{
  Json,
  extract::{Path, State},
};
use scoot_core::{
  activation::{activation_url, parse_activation_payload},
  session::OnboardingSession,
  store::SessionStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, sessions::not_found};

/// Shown to riders whose code no longer works.
pub const REQUEST_NEW_CODE: &str = "session expired or unknown, please request a new code";

#[derive(Debug, Deserialize)]
pub struct ActivateBody {
  /// A typed activation code.
  pub code:     Option<String>,
  /// A scanned QR payload; used when `code` is absent.
  pub payload:  Option<String>,
  pub rider_id: String,
}

/// `POST /activate`
pub async fn activate<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<ActivateBody>,
) -> Result<Json<OnboardingSession>, ApiError>
where
  S: SessionStore,
{
  if body.rider_id.trim().is_empty() {
    return Err(ApiError::BadRequest("rider_id must not be empty".into()));
  }

  let code = body
    .code
    .as_deref()
    .or(body.payload.as_deref())
    .and_then(parse_activation_payload)
    .ok_or_else(|| ApiError::BadRequest("a 6-digit code or activation link is required".into()))?;

  let session = state
    .store
    .activate_session(&code, body.rider_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(REQUEST_NEW_CODE.into()))?;
  Ok(Json(session))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivationLink {
  pub activation_code: String,
  pub activation_url:  String,
}

/// `GET /sessions/:id/activation-link`
pub async fn link<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ActivationLink>, ApiError>
where
  S: SessionStore,
{
  let session = state
    .store
    .get_session(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(ActivationLink {
    activation_url:  activation_url(&state.app_origin, &session.activation_code),
    activation_code: session.activation_code,
  }))
}
