//! Test fixtures: fixed instants and schedulers on a manual clock.

use chrono::{DateTime, TimeZone, Utc};

use crate::clock::ManualClock;
use crate::domain::ItemKind;
use crate::srs::Scheduler;

/// Midday on 2024-05-01, the default starting instant for tests
pub fn fixed_start() -> DateTime<Utc> {
  at_day(1)
}

/// Midday on the given day of May 2024
pub fn at_day(day: u32) -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(2024, 5, day, 12, 0, 0)
    .single()
    .unwrap_or_else(|| panic!("invalid test day {}", day))
}

/// Scheduler driven by a manual clock starting at `fixed_start()`.
///
/// The returned clock shares its instant with the scheduler's.
pub fn manual_scheduler() -> (Scheduler<ManualClock>, ManualClock) {
  let clock = ManualClock::new(fixed_start());
  (Scheduler::with_clock(clock.clone()), clock)
}

/// Scheduler with one item of each id, all created at `fixed_start()`
pub fn scheduler_with(ids: &[&str]) -> (Scheduler<ManualClock>, ManualClock) {
  let (mut scheduler, clock) = manual_scheduler();
  for id in ids {
    scheduler
      .create_item(*id, ItemKind::Exercise, format!("{} notes", id))
      .unwrap_or_else(|e| panic!("fixture item {}: {}", id, e));
  }
  (scheduler, clock)
}
