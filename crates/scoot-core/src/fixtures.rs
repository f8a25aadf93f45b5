//! Development fixtures: one session in every status, built through the
//! public [`SessionStore`] API.

use crate::{
  session::{OnboardingSession, SessionStatus},
  store::SessionStore,
};

/// Seed `store` with a pending, activated, in-progress, completed, and
/// expired session for `shop_id`. Returns the sessions in that order.
pub async fn seed<S: SessionStore>(
  store: &S,
  shop_id: &str,
) -> Result<Vec<OnboardingSession>, S::Error> {
  let mut seeded = Vec::with_capacity(5);

  seeded.push(store.create_session(shop_id.to_owned(), None).await?);

  for (rider, steps) in [("rider-demo-1", 0), ("rider-demo-2", 2), ("rider-demo-3", 5)] {
    let created = store.create_session(shop_id.to_owned(), None).await?;
    let Some(mut session) =
      store.activate_session(&created.activation_code, rider.to_owned()).await?
    else {
      continue;
    };
    let mut step = session.current_step;
    for _ in 0..steps {
      let Some(current) = step else { break };
      match store.update_session_step(session.session_id, current, true).await? {
        Some(updated) => session = updated,
        None => break,
      }
      step = session.current_step;
    }
    seeded.push(session);
  }

  let stale = store.create_session(shop_id.to_owned(), None).await?;
  if let Some(expired) = store
    .update_session_status(stale.session_id, SessionStatus::Expired)
    .await?
  {
    seeded.push(expired);
  }

  Ok(seeded)
}
