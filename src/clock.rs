//! Injectable time source.
//!
//! The scheduler never calls `Utc::now()` itself; it asks its clock.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

pub trait Clock {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

impl<F> Clock for F
where
  F: Fn() -> DateTime<Utc>,
{
  fn now(&self) -> DateTime<Utc> {
    self()
  }
}

/// Clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// the other to a scheduler.
#[derive(Debug, Clone)]
pub struct ManualClock {
  instant: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self {
      instant: Arc::new(Mutex::new(start)),
    }
  }

  pub fn set(&self, instant: DateTime<Utc>) {
    *self.lock() = instant;
  }

  pub fn advance(&self, by: Duration) {
    let mut guard = self.lock();
    *guard += by;
  }

  pub fn advance_days(&self, days: i64) {
    self.advance(Duration::days(days));
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
    // A plain timestamp cannot be left half-written
    self.instant.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.lock()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_manual_clock_advances() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    let shared = clock.clone();

    clock.advance_days(2);
    assert_eq!(shared.now(), start + Duration::days(2));

    shared.set(start);
    assert_eq!(clock.now(), start);
  }

  #[test]
  fn test_closure_is_a_clock() {
    let fixed = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let clock = move || fixed;
    assert_eq!(Clock::now(&clock), fixed);
  }

  #[test]
  fn test_system_clock_moves_forward() {
    let first = SystemClock.now();
    let second = SystemClock.now();
    assert!(second >= first);
  }
}
