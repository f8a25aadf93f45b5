//! The fixed onboarding step sequence and per-session step progress.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

/// One of the five onboarding sub-tasks, declared in the order a rider must
/// complete them.
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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OnboardingStep {
  BasicInfo,
  DocumentUpload,
  Signature,
  Consent,
  FaceVerification,
}

impl OnboardingStep {
  /// The step every new or freshly activated session points at.
  pub const FIRST: Self = Self::BasicInfo;

  /// The step after `self`, or `None` for the last one.
  pub fn next(self) -> Option<Self> {
    Self::iter().skip_while(|s| *s != self).nth(1)
  }
}

/// Completion flags for every [`OnboardingStep`].
///
/// Serialises as an object keyed by step name, e.g.
/// `{"basic-info": true, "document-upload": false, ...}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
  #[serde(rename = "basic-info")]
  basic_info:        bool,
  #[serde(rename = "document-upload")]
  document_upload:   bool,
  signature:         bool,
  consent:           bool,
  #[serde(rename = "face-verification")]
  face_verification: bool,
}

impl StepProgress {
  pub fn is_complete(&self, step: OnboardingStep) -> bool {
    match step {
      OnboardingStep::BasicInfo => self.basic_info,
      OnboardingStep::DocumentUpload => self.document_upload,
      OnboardingStep::Signature => self.signature,
      OnboardingStep::Consent => self.consent,
      OnboardingStep::FaceVerification => self.face_verification,
    }
  }

  pub fn set(&mut self, step: OnboardingStep, completed: bool) {
    let slot = match step {
      OnboardingStep::BasicInfo => &mut self.basic_info,
      OnboardingStep::DocumentUpload => &mut self.document_upload,
      OnboardingStep::Signature => &mut self.signature,
      OnboardingStep::Consent => &mut self.consent,
      OnboardingStep::FaceVerification => &mut self.face_verification,
    };
    *slot = completed;
  }

  pub fn all_complete(&self) -> bool {
    OnboardingStep::iter().all(|s| self.is_complete(s))
  }

  /// Steps currently marked complete, in sequence order.
  pub fn completed(&self) -> impl Iterator<Item = OnboardingStep> + '_ {
    OnboardingStep::iter().filter(|s| self.is_complete(*s))
  }
}
