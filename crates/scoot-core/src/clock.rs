//! Time sources for session stores.

use std::sync::{
  Arc,
  atomic::{AtomicI64, Ordering},
};

use chrono::{DateTime, Duration, Utc};

/// Where a store reads "now" from.
pub trait Clock: Send + Sync + 'static {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to, at millisecond resolution.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the store.
#[derive(Debug, Clone)]
pub struct ManualClock {
  millis: Arc<AtomicI64>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self { millis: Arc::new(AtomicI64::new(start.timestamp_millis())) }
  }

  pub fn set(&self, to: DateTime<Utc>) {
    self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
  }

  pub fn advance(&self, by: Duration) {
    self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn manual_clock_is_shared_between_clones() {
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    let handle = clock.clone();

    handle.advance(Duration::hours(25));
    assert_eq!(clock.now(), start + Duration::hours(25));

    handle.set(start);
    assert_eq!(clock.now(), start);
  }
}
