//! The onboarding session record and its status.
//!
//! A session is created by a shop, bound to a rider through its activation
//! code, and walked through the fixed [`OnboardingStep`] sequence. Records are
//! never edited in place; see [`crate::lifecycle`] for the transitions that
//! produce replacement records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::step::{OnboardingStep, StepProgress};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a session sits in its lifecycle.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
  Pending,
  Activated,
  InProgress,
  Completed,
  Expired,
}

impl SessionStatus {
  /// `Completed` and `Expired` admit no further transitions.
  pub fn is_terminal(self) -> bool { matches!(self, Self::Completed | Self::Expired) }

  /// Whether a session in this status is bound to a rider.
  pub fn has_rider(self) -> bool {
    matches!(self, Self::Activated | Self::InProgress | Self::Completed)
  }

  /// The transition table for explicit status writes.
  ///
  /// `Pending -> Activated` is absent: it needs a rider and only happens
  /// through activation. `InProgress -> Completed` is additionally gated on
  /// every step being done, which the table cannot see.
  pub fn can_transition_to(self, next: Self) -> bool {
    use SessionStatus::*;
    matches!(
      (self, next),
      (Pending, Expired)
        | (Activated, InProgress | Expired)
        | (InProgress, Completed | Expired)
    )
  }
}

// ─── Notifications ───────────────────────────────────────────────────────────

/// The channel a notification went out on.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationChannel {
  Email,
  Sms,
  Push,
}

/// A notification the caller wants recorded against a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
  pub channel:    NotificationChannel,
  pub recipient:  String,
  pub template:   String,
  pub successful: bool,
}

/// A notification as stored on the session, stamped by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
  pub channel:    NotificationChannel,
  pub recipient:  String,
  pub sent_at:    DateTime<Utc>,
  pub template:   String,
  pub successful: bool,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A shop-initiated rider onboarding workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingSession {
  pub session_id:         Uuid,
  pub shop_id:            String,
  /// Set exactly once, on activation.
  pub rider_id:           Option<String>,
  /// Six digits, or eight if the six-digit space was saturated.
  pub activation_code:    String,
  pub status:             SessionStatus,
  pub completed_steps:    StepProgress,
  /// The step the rider should complete next; `None` once the last step is
  /// done.
  pub current_step:       Option<OnboardingStep>,
  pub created_at:         DateTime<Utc>,
  pub activated_at:       Option<DateTime<Utc>>,
  pub completed_at:       Option<DateTime<Utc>>,
  pub expires_at:         DateTime<Utc>,
  /// Append-only.
  pub notifications_sent: Vec<NotificationRecord>,
  pub metadata:           Option<Map<String, Value>>,
}

/// A freshly created session together with the link to render as a QR code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
  pub session:        OnboardingSession,
  pub activation_url: String,
}
