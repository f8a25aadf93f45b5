//! Error types for `scoot-core`.
//!
//! Lookup misses are not errors; they surface as `Ok(None)` from the store.
//! Everything here is a session rule violation or a limit the store ran into.

use thiserror::Error;
use uuid::Uuid;

use crate::session::SessionStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot move session from {from} to {to}")]
  InvalidTransition {
    from: SessionStatus,
    to:   SessionStatus,
  },

  #[error("session {0} still has incomplete steps")]
  IncompleteSteps(Uuid),

  #[error("session {0} has not been activated by a rider")]
  NotActivated(Uuid),

  #[error("session {id} is {status} and accepts no further steps")]
  SessionClosed { id: Uuid, status: SessionStatus },

  #[error("no free activation code after {attempts} attempts")]
  CodeSpaceExhausted { attempts: usize },

  #[error("a deadline {hours} hours out is beyond the representable date range")]
  ExpirationOutOfRange { hours: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
