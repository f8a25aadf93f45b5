//! Session transitions.
//!
//! Every transition borrows the current record and returns a replacement;
//! nothing here mutates a stored session. Stores call these under their own
//! lock and swap the result in.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  session::{NewNotification, NotificationRecord, OnboardingSession, SessionStatus},
  step::{OnboardingStep, StepProgress},
};

/// Session lifetime when the caller does not ask for one.
pub const DEFAULT_EXPIRATION_HOURS: u32 = 24;

fn deadline(from: DateTime<Utc>, hours: u32) -> Result<DateTime<Utc>> {
  from
    .checked_add_signed(Duration::hours(i64::from(hours)))
    .ok_or(Error::ExpirationOutOfRange { hours })
}

impl OnboardingSession {
  /// A fresh `Pending` session for `shop_id`.
  pub fn new(
    shop_id: impl Into<String>,
    activation_code: String,
    now: DateTime<Utc>,
    expiration_hours: u32,
  ) -> Result<Self> {
    Ok(Self {
      session_id: Uuid::new_v4(),
      shop_id: shop_id.into(),
      rider_id: None,
      activation_code,
      status: SessionStatus::Pending,
      completed_steps: StepProgress::default(),
      current_step: Some(OnboardingStep::FIRST),
      created_at: now,
      activated_at: None,
      completed_at: None,
      expires_at: deadline(now, expiration_hours)?,
      notifications_sent: Vec::new(),
      metadata: None,
    })
  }

  /// An open session whose deadline has passed. Terminal sessions are never
  /// overdue.
  pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
    !self.status.is_terminal() && now > self.expires_at
  }

  pub fn expired(&self) -> Self {
    Self { status: SessionStatus::Expired, ..self.clone() }
  }

  /// Bind `rider_id` to a pending session. Returns `None` if the session is
  /// not pending.
  pub fn activated(&self, rider_id: impl Into<String>, now: DateTime<Utc>) -> Option<Self> {
    if self.status != SessionStatus::Pending {
      return None;
    }
    Some(Self {
      rider_id: Some(rider_id.into()),
      status: SessionStatus::Activated,
      activated_at: Some(now),
      current_step: Some(OnboardingStep::FIRST),
      ..self.clone()
    })
  }

  /// An explicit status write, checked against
  /// [`SessionStatus::can_transition_to`].
  ///
  /// Writing the current status is a no-op.
  pub fn with_status(&self, to: SessionStatus, now: DateTime<Utc>) -> Result<Self> {
    if to == self.status {
      return Ok(self.clone());
    }
    if !self.status.can_transition_to(to) {
      return Err(Error::InvalidTransition { from: self.status, to });
    }

    let mut next = self.clone();
    next.status = to;
    if to == SessionStatus::Completed {
      if !next.completed_steps.all_complete() {
        return Err(Error::IncompleteSteps(self.session_id));
      }
      next.completed_at.get_or_insert(now);
    }
    Ok(next)
  }

  /// Mark `step` done or not done.
  ///
  /// Only activated or in-progress sessions accept steps. Completing the step
  /// `current_step` points at advances the pointer; completing the last
  /// outstanding step completes the session.
  pub fn with_step(
    &self,
    step: OnboardingStep,
    completed: bool,
    now: DateTime<Utc>,
  ) -> Result<Self> {
    match self.status {
      SessionStatus::Pending => return Err(Error::NotActivated(self.session_id)),
      SessionStatus::Completed | SessionStatus::Expired => {
        return Err(Error::SessionClosed { id: self.session_id, status: self.status });
      }
      SessionStatus::Activated | SessionStatus::InProgress => {}
    }

    let mut next = self.clone();
    next.completed_steps.set(step, completed);
    if completed && next.current_step == Some(step) {
      next.current_step = step.next();
    }
    next.status = SessionStatus::InProgress;

    if next.completed_steps.all_complete() {
      next.status = SessionStatus::Completed;
      next.completed_at.get_or_insert(now);
    }
    Ok(next)
  }

  pub fn with_notification(&self, notification: NewNotification, now: DateTime<Utc>) -> Self {
    let mut next = self.clone();
    next.notifications_sent.push(NotificationRecord {
      channel:    notification.channel,
      recipient:  notification.recipient,
      sent_at:    now,
      template:   notification.template,
      successful: notification.successful,
    });
    next
  }

  /// Push the deadline back by `additional_hours`. Fails rather than wrap if
  /// the new deadline is not representable.
  pub fn extended(&self, additional_hours: u32) -> Result<Self> {
    Ok(Self {
      expires_at: deadline(self.expires_at, additional_hours)?,
      ..self.clone()
    })
  }

  /// Shallow-merge `entries` into the metadata bag; incoming keys win.
  pub fn with_metadata(&self, entries: Map<String, Value>) -> Self {
    let mut next = self.clone();
    next.metadata.get_or_insert_with(Map::new).extend(entries);
    next
  }
}
