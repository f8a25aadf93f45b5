//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The store refused the operation under its session rules.
  #[error("conflict: {0}")]
  Conflict(String),

  /// The store could not take the request right now; retrying may succeed.
  #[error("unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by the [`scoot_core::Error`] in its source
  /// chain. Backend errors with no core error behind them are
  /// [`ApiError::Store`] failures.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let core = std::iter::successors(
      Some(&e as &(dyn std::error::Error + 'static)),
      |err| err.source(),
    )
    .find_map(|err| err.downcast_ref::<scoot_core::Error>());

    match core {
      Some(scoot_core::Error::ExpirationOutOfRange { .. }) => ApiError::BadRequest(e.to_string()),
      Some(scoot_core::Error::CodeSpaceExhausted { .. }) => {
        tracing::warn!(error = %e, "activation code space exhausted");
        ApiError::Unavailable(e.to_string())
      }
      Some(_) => ApiError::Conflict(e.to_string()),
      None => {
        tracing::error!(error = %e, "session store failure");
        ApiError::Store(Box::new(e))
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  #[error("disk on fire")]
  struct Unrelated;

  fn wrapped(core: scoot_core::Error) -> scoot_store_memory::Error { core.into() }

  #[test]
  fn classifies_by_core_error_in_chain() {
    let exhausted = wrapped(scoot_core::Error::CodeSpaceExhausted { attempts: 128 });
    assert!(matches!(ApiError::store(exhausted), ApiError::Unavailable(_)));

    let range = wrapped(scoot_core::Error::ExpirationOutOfRange { hours: u32::MAX });
    assert!(matches!(ApiError::store(range), ApiError::BadRequest(_)));

    let rule = wrapped(scoot_core::Error::NotActivated(uuid::Uuid::nil()));
    assert!(matches!(ApiError::store(rule), ApiError::Conflict(_)));

    assert!(matches!(ApiError::store(Unrelated), ApiError::Store(_)));
  }

  #[test]
  fn exhaustion_maps_to_service_unavailable() {
    let resp = ApiError::Unavailable("full".into()).into_response();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  }
}
