//! [`MemoryStore`], the in-process implementation of [`SessionStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand_core::OsRng;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use scoot_core::{
  activation::allocate_code,
  clock::{Clock, SystemClock},
  lifecycle::DEFAULT_EXPIRATION_HOURS,
  session::{NewNotification, OnboardingSession, SessionStatus},
  step::OnboardingStep,
  store::SessionStore,
};

use crate::{
  error::{Error, Result},
  registry::Registry,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The process-wide onboarding session registry.
///
/// Clones share the same registry and clock.
#[derive(Clone)]
pub struct MemoryStore {
  pub(crate) registry:      Arc<RwLock<Registry>>,
  clock:                    Arc<dyn Clock>,
  default_expiration_hours: u32,
}

impl Default for MemoryStore {
  fn default() -> Self { Self::new() }
}

impl MemoryStore {
  /// An empty store on wall-clock time with a 24-hour default lifetime.
  pub fn new() -> Self { Self::with_clock(SystemClock) }

  /// An empty store reading time from `clock`.
  pub fn with_clock(clock: impl Clock) -> Self {
    Self {
      registry:                 Arc::new(RwLock::new(Registry::default())),
      clock:                    Arc::new(clock),
      default_expiration_hours: DEFAULT_EXPIRATION_HOURS,
    }
  }

  /// Lifetime applied when `create_session` is not given one.
  pub fn with_default_expiration(mut self, hours: u32) -> Self {
    self.default_expiration_hours = hours;
    self
  }

  /// Number of sessions ever created.
  pub async fn len(&self) -> usize { self.registry.read().await.len() }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }

  fn now(&self) -> DateTime<Utc> { self.clock.now() }

  /// Replace session `id` with `f(current, now)` under the write lock.
  ///
  /// `now` is read once the lock is held, so timestamps follow lock order.
  async fn modify<F>(&self, id: Uuid, f: F) -> Result<Option<OnboardingSession>>
  where
    F: FnOnce(&OnboardingSession, DateTime<Utc>) -> scoot_core::Result<OnboardingSession>,
  {
    let mut registry = self.registry.write().await;
    let now = self.now();
    let Some(current) = registry.get(id) else {
      return Ok(None);
    };
    let next = f(current, now)?;
    registry.replace(next.clone());
    Ok(Some(next))
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for MemoryStore {
  type Error = Error;

  // ── Creation ──────────────────────────────────────────────────────────────

  async fn create_session(
    &self,
    shop_id: String,
    expiration_hours: Option<u32>,
  ) -> Result<OnboardingSession> {
    let hours = expiration_hours.unwrap_or(self.default_expiration_hours);

    let mut registry = self.registry.write().await;
    let now = self.now();
    let code = allocate_code(&mut OsRng, |c| registry.code_taken(c))?;
    let session = OnboardingSession::new(shop_id, code, now, hours)?;
    registry.insert(session.clone());

    tracing::info!(
      session_id = %session.session_id,
      shop_id = %session.shop_id,
      expires_at = %session.expires_at,
      "onboarding session created"
    );
    Ok(session)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_session(&self, id: Uuid) -> Result<Option<OnboardingSession>> {
    Ok(self.registry.read().await.get(id).cloned())
  }

  async fn get_session_by_activation_code(
    &self,
    code: &str,
  ) -> Result<Option<OnboardingSession>> {
    Ok(self.registry.read().await.get_by_code(code).cloned())
  }

  async fn get_sessions_by_shop(&self, shop_id: &str) -> Result<Vec<OnboardingSession>> {
    Ok(self.registry.read().await.by_shop(shop_id))
  }

  async fn get_sessions_by_rider(&self, rider_id: &str) -> Result<Vec<OnboardingSession>> {
    Ok(self.registry.read().await.by_rider(rider_id))
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  async fn activate_session(
    &self,
    code: &str,
    rider_id: String,
  ) -> Result<Option<OnboardingSession>> {
    let mut registry = self.registry.write().await;
    let now = self.now();

    let Some(current) = registry.get_by_code(code).cloned() else {
      tracing::debug!(code, "activation refused: unknown code");
      return Ok(None);
    };

    if current.is_overdue(now) {
      tracing::info!(session_id = %current.session_id, "activation refused: session expired");
      registry.replace(current.expired());
      return Ok(None);
    }

    let Some(activated) = current.activated(rider_id, now) else {
      tracing::debug!(
        session_id = %current.session_id,
        status = %current.status,
        "activation refused: session not pending"
      );
      return Ok(None);
    };

    tracing::info!(
      session_id = %activated.session_id,
      rider_id = activated.rider_id.as_deref().unwrap_or_default(),
      "onboarding session activated"
    );
    registry.replace(activated.clone());
    Ok(Some(activated))
  }

  async fn update_session_status(
    &self,
    id: Uuid,
    status: SessionStatus,
  ) -> Result<Option<OnboardingSession>> {
    self.modify(id, |s, now| s.with_status(status, now)).await
  }

  async fn update_session_step(
    &self,
    id: Uuid,
    step: OnboardingStep,
    completed: bool,
  ) -> Result<Option<OnboardingSession>> {
    let mut registry = self.registry.write().await;
    let now = self.now();
    let Some(current) = registry.get(id).cloned() else {
      return Ok(None);
    };

    if current.is_overdue(now) {
      registry.replace(current.expired());
      return Err(scoot_core::Error::SessionClosed { id, status: SessionStatus::Expired }.into());
    }

    let next = current.with_step(step, completed, now)?;
    if next.status == SessionStatus::Completed {
      tracing::info!(session_id = %id, "onboarding session completed");
    }
    registry.replace(next.clone());
    Ok(Some(next))
  }

  // ── Bookkeeping ───────────────────────────────────────────────────────────

  async fn record_notification(
    &self,
    id: Uuid,
    notification: NewNotification,
  ) -> Result<Option<OnboardingSession>> {
    self
      .modify(id, move |s, now| Ok(s.with_notification(notification, now)))
      .await
  }

  async fn extend_session_expiration(
    &self,
    id: Uuid,
    additional_hours: u32,
  ) -> Result<Option<OnboardingSession>> {
    self.modify(id, |s, _| s.extended(additional_hours)).await
  }

  async fn add_session_metadata(
    &self,
    id: Uuid,
    entries: Map<String, Value>,
  ) -> Result<Option<OnboardingSession>> {
    self.modify(id, move |s, _| Ok(s.with_metadata(entries))).await
  }

  // ── Sweep ─────────────────────────────────────────────────────────────────

  async fn process_expired_sessions(&self) -> Result<usize> {
    let mut registry = self.registry.write().await;
    let now = self.now();

    let overdue: Vec<OnboardingSession> = registry
      .sessions()
      .filter(|s| s.is_overdue(now))
      .map(OnboardingSession::expired)
      .collect();

    let count = overdue.len();
    for session in overdue {
      registry.replace(session);
    }

    if count > 0 {
      tracing::info!(count, "expired overdue onboarding sessions");
    }
    Ok(count)
  }
}
