//! The session arena and its secondary indexes.
//!
//! Indexes are only ever appended to: codes are never released and shop and
//! rider lists are never pruned, so terminal sessions stay reachable.

use std::collections::HashMap;

use scoot_core::session::OnboardingSession;
use uuid::Uuid;

#[derive(Debug, Default)]
pub(crate) struct Registry {
  sessions: HashMap<Uuid, OnboardingSession>,
  by_code:  HashMap<String, Uuid>,
  by_shop:  HashMap<String, Vec<Uuid>>,
  by_rider: HashMap<String, Vec<Uuid>>,
}

impl Registry {
  /// Add a new session and index it by code and shop.
  pub(crate) fn insert(&mut self, session: OnboardingSession) {
    let id = session.session_id;
    self.by_code.insert(session.activation_code.clone(), id);
    self.by_shop.entry(session.shop_id.clone()).or_default().push(id);
    if let Some(rider) = &session.rider_id {
      self.by_rider.entry(rider.clone()).or_default().push(id);
    }
    self.sessions.insert(id, session);
  }

  /// Swap in a replacement record, indexing the rider the first time one
  /// appears.
  pub(crate) fn replace(&mut self, session: OnboardingSession) {
    let id = session.session_id;
    let had_rider = self
      .sessions
      .get(&id)
      .is_some_and(|old| old.rider_id.is_some());
    if !had_rider && let Some(rider) = &session.rider_id {
      self.by_rider.entry(rider.clone()).or_default().push(id);
    }
    self.sessions.insert(id, session);
  }

  pub(crate) fn get(&self, id: Uuid) -> Option<&OnboardingSession> { self.sessions.get(&id) }

  pub(crate) fn get_by_code(&self, code: &str) -> Option<&OnboardingSession> {
    self.by_code.get(code).and_then(|id| self.sessions.get(id))
  }

  pub(crate) fn code_taken(&self, code: &str) -> bool { self.by_code.contains_key(code) }

  pub(crate) fn by_shop(&self, shop_id: &str) -> Vec<OnboardingSession> {
    self.collect(self.by_shop.get(shop_id))
  }

  pub(crate) fn by_rider(&self, rider_id: &str) -> Vec<OnboardingSession> {
    self.collect(self.by_rider.get(rider_id))
  }

  pub(crate) fn sessions(&self) -> impl Iterator<Item = &OnboardingSession> {
    self.sessions.values()
  }

  pub(crate) fn len(&self) -> usize { self.sessions.len() }

  fn collect(&self, ids: Option<&Vec<Uuid>>) -> Vec<OnboardingSession> {
    ids
      .into_iter()
      .flatten()
      .filter_map(|id| self.sessions.get(id).cloned())
      .collect()
  }
}
