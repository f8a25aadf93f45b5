//! Status and step updates.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/sessions/:id/status` | Body: `{"status":"expired"}`; 409 on an illegal transition |
//! | `PUT`  | `/sessions/:id/steps/:step` | Body: `{"completed":true}`; 409 if the session does not accept steps |

use axum::{
  Json,
  extract::{Path, State},
};
use scoot_core::{
  session::{OnboardingSession, SessionStatus},
  step::OnboardingStep,
  store::SessionStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, sessions::not_found};

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: SessionStatus,
}

/// `PUT /sessions/:id/status`
pub async fn set_status<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<OnboardingSession>, ApiError>
where
  S: SessionStore,
{
  let session = state
    .store
    .update_session_status(id, body.status)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub struct StepBody {
  #[serde(default = "default_completed")]
  pub completed: bool,
}

fn default_completed() -> bool { true }

/// `PUT /sessions/:id/steps/:step`
pub async fn set_step<S>(
  State(state): State<ApiState<S>>,
  Path((id, step)): Path<(Uuid, OnboardingStep)>,
  Json(body): Json<StepBody>,
) -> Result<Json<OnboardingSession>, ApiError>
where
  S: SessionStore,
{
  let session = state
    .store
    .update_session_step(id, step, body.completed)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(session))
}
