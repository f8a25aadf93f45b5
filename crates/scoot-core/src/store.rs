//! The `SessionStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `scoot-store-memory`).
//! Higher layers (`scoot-api`, the server's expiry sweep, fixtures) depend on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
  session::{NewNotification, OnboardingSession, SessionStatus},
  step::OnboardingStep,
};

/// Abstraction over the authoritative registry of onboarding sessions.
///
/// Lookups that do not resolve return `Ok(None)` (or an empty `Vec`); errors
/// are reserved for rule violations and backend failures. Callers receive
/// copies: the only way to change a session is through these methods.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Creation ──────────────────────────────────────────────────────────

  /// Start a `Pending` session for `shop_id` with a fresh activation code.
  ///
  /// `expiration_hours` defaults to the backend's configured lifetime.
  fn create_session(
    &self,
    shop_id: String,
    expiration_hours: Option<u32>,
  ) -> impl Future<Output = Result<OnboardingSession, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<OnboardingSession>, Self::Error>> + Send + '_;

  fn get_session_by_activation_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<OnboardingSession>, Self::Error>> + Send + 'a;

  /// Every session the shop has started, oldest first.
  fn get_sessions_by_shop<'a>(
    &'a self,
    shop_id: &'a str,
  ) -> impl Future<Output = Result<Vec<OnboardingSession>, Self::Error>> + Send + 'a;

  /// Every session the rider has activated, in activation order.
  fn get_sessions_by_rider<'a>(
    &'a self,
    rider_id: &'a str,
  ) -> impl Future<Output = Result<Vec<OnboardingSession>, Self::Error>> + Send + 'a;

  // ── Transitions ───────────────────────────────────────────────────────

  /// Bind `rider_id` to the pending session holding `code`.
  ///
  /// Returns `None` if the code is unknown, the session is no longer
  /// pending, or its deadline has passed. In the last case the session is
  /// marked `Expired` as a side effect.
  fn activate_session<'a>(
    &'a self,
    code: &'a str,
    rider_id: String,
  ) -> impl Future<Output = Result<Option<OnboardingSession>, Self::Error>> + Send + 'a;

  /// Explicit status write, validated against the transition table.
  fn update_session_status(
    &self,
    id: Uuid,
    status: SessionStatus,
  ) -> impl Future<Output = Result<Option<OnboardingSession>, Self::Error>> + Send + '_;

  /// Mark one step done or not done, advancing the step pointer and
  /// completing the session as appropriate.
  fn update_session_step(
    &self,
    id: Uuid,
    step: OnboardingStep,
    completed: bool,
  ) -> impl Future<Output = Result<Option<OnboardingSession>, Self::Error>> + Send + '_;

  // ── Bookkeeping ───────────────────────────────────────────────────────

  fn record_notification(
    &self,
    id: Uuid,
    notification: NewNotification,
  ) -> impl Future<Output = Result<Option<OnboardingSession>, Self::Error>> + Send + '_;

  fn extend_session_expiration(
    &self,
    id: Uuid,
    additional_hours: u32,
  ) -> impl Future<Output = Result<Option<OnboardingSession>, Self::Error>> + Send + '_;

  fn add_session_metadata(
    &self,
    id: Uuid,
    entries: Map<String, Value>,
  ) -> impl Future<Output = Result<Option<OnboardingSession>, Self::Error>> + Send + '_;

  // ── Sweep ─────────────────────────────────────────────────────────────

  /// Expire every open session whose deadline has passed. Returns how many
  /// sessions changed.
  fn process_expired_sessions(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

/// Outcome of one [`SessionStore::process_expired_sessions`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
  /// Sessions moved to `expired` by this sweep.
  pub expired: usize,
}
