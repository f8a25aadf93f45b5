//! JSON REST API for ScootScoot onboarding sessions.
//!
//! Exposes an axum [`Router`] backed by any [`scoot_core::store::SessionStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", scoot_api::api_router(store.clone(), "https://scootscoot.app"))
//! ```

pub mod activation;
pub mod error;
pub mod progress;
pub mod sessions;
pub mod sweep;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use scoot_core::store::SessionStore;

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:      Arc<S>,
  /// Origin the activation links point at, e.g. `https://scootscoot.app`.
  pub app_origin: Arc<str>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), app_origin: Arc::clone(&self.app_origin) }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, app_origin: &str) -> Router<()>
where
  S: SessionStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let state = ApiState { store, app_origin: Arc::from(app_origin) };

  Router::new()
    // Sessions
    .route("/sessions", post(sessions::create::<S>))
    .route("/sessions/{id}", get(sessions::get_one::<S>))
    .route("/sessions/{id}/activation-link", get(activation::link::<S>))
    .route("/sessions/by-code/{code}", get(sessions::by_code::<S>))
    .route("/shops/{shop_id}/sessions", get(sessions::by_shop::<S>))
    .route("/riders/{rider_id}/sessions", get(sessions::by_rider::<S>))
    // Activation and progress
    .route("/activate", post(activation::activate::<S>))
    .route("/sessions/{id}/status", put(progress::set_status::<S>))
    .route("/sessions/{id}/steps/{step}", put(progress::set_step::<S>))
    // Bookkeeping
    .route("/sessions/{id}/notifications", post(sessions::notify::<S>))
    .route("/sessions/{id}/extend", post(sessions::extend::<S>))
    .route("/sessions/{id}/metadata", post(sessions::merge_metadata::<S>))
    // Expiry sweep
    .route("/sweep", post(sweep::handler::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
