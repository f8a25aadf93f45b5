//! Handler for `POST /sweep`: an on-demand expiry sweep.

use axum::{Json, extract::State};
use scoot_core::store::{SessionStore, SweepReport};

use crate::{ApiState, error::ApiError};

/// `POST /sweep`
pub async fn handler<S>(State(state): State<ApiState<S>>) -> Result<Json<SweepReport>, ApiError>
where
  S: SessionStore,
{
  let expired = state
    .store
    .process_expired_sessions()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(SweepReport { expired }))
}
