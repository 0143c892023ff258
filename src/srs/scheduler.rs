//! The review scheduler: owns the item collection and applies SM-2 to it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use super::persistence::{self, Collection};
use super::sm2::{calculate_sm2, Sm2Result};
use super::stats::{study_goals, ReviewAnalytics, SchedulerStats, StudyGoal};
use crate::clock::{Clock, SystemClock};
use crate::domain::{ItemKind, Quality, ReviewItem, ReviewRecord};
use crate::error::{Result, SchedulerError};
use crate::store::DurableStore;

/// What a review did to an item, for immediate feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
  pub interval: i64,
  pub ease_factor: f64,
  pub repetitions: i64,
  pub is_graduated: bool,
  pub next_due_at: DateTime<Utc>,
}

/// Interval a rating would produce, for labelling answer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntervalPreview {
  pub quality: Quality,
  pub interval: i64,
}

/// Spaced-repetition scheduler over a single collection of review items.
///
/// Pure in-memory state plus an injected clock. Persistence happens only
/// through [`Scheduler::save`] / [`Scheduler::load`] (or the store helpers);
/// callers decide when to save.
pub struct Scheduler<C = SystemClock> {
  items: Collection,
  clock: C,
}

impl Scheduler<SystemClock> {
  pub fn new() -> Self {
    Self::with_clock(SystemClock)
  }
}

impl Default for Scheduler<SystemClock> {
  fn default() -> Self {
    Self::new()
  }
}

impl<C: Clock> Scheduler<C> {
  pub fn with_clock(clock: C) -> Self {
    Self {
      items: Collection::new(),
      clock,
    }
  }

  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  pub fn clock(&self) -> &C {
    &self.clock
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn get(&self, id: &str) -> Option<&ReviewItem> {
    self.items.get(id)
  }

  /// All items, ordered by id
  pub fn items(&self) -> impl Iterator<Item = &ReviewItem> {
    self.items.values()
  }

  /// Start tracking a learning unit. It is due immediately.
  pub fn create_item(
    &mut self,
    id: impl Into<String>,
    kind: ItemKind,
    content: impl Into<String>,
  ) -> Result<&ReviewItem> {
    let id = id.into();
    if id.trim().is_empty() {
      return Err(SchedulerError::invalid("item id must not be empty"));
    }
    if self.items.contains_key(&id) {
      return Err(SchedulerError::AlreadyExists(id));
    }

    let item = ReviewItem::new(id.clone(), kind, content.into(), self.clock.now());
    tracing::info!("Added review item '{}' ({})", id, kind.as_str());
    Ok(self.items.entry(id).or_insert(item))
  }

  /// Apply a review. Nothing changes unless both the id and the quality are
  /// valid and the new due date is representable.
  pub fn review(&mut self, id: &str, quality: u8) -> Result<ReviewOutcome> {
    let quality = Quality::new(quality)?;
    let item = self
      .items
      .get_mut(id)
      .ok_or_else(|| SchedulerError::NotFound(id.to_string()))?;
    let now = self.clock.now();

    let result = calculate_sm2(quality, item.ease_factor, item.interval_days, item.repetition_count);

    item.schedule(result.interval_days, now)?;
    item.last_reviewed_at = Some(now);
    item.ease_factor = result.ease_factor;
    item.repetition_count = result.repetitions;
    item.last_quality = Some(quality);
    item.total_review_count += 1;
    item.push_history(ReviewRecord {
      date: now,
      quality,
      interval: result.interval_days,
      ease_factor: result.ease_factor,
    });

    tracing::debug!(
      "Reviewed '{}' with quality {}: interval {}d, ease {:.2}, repetitions {}",
      id,
      quality.value(),
      result.interval_days,
      result.ease_factor,
      result.repetitions
    );

    Ok(ReviewOutcome {
      interval: result.interval_days,
      ease_factor: result.ease_factor,
      repetitions: result.repetitions,
      is_graduated: result.is_graduated,
      next_due_at: item.next_due_at,
    })
  }

  /// Put back a previously taken snapshot of an item
  pub(crate) fn restore(&mut self, item: ReviewItem) {
    self.items.insert(item.id.clone(), item);
  }

  pub(crate) fn discard(&mut self, id: &str) {
    self.items.remove(id);
  }

  /// The interval `review(id, quality)` would set, without touching state
  pub fn preview_interval(&self, id: &str, quality: u8) -> Result<i64> {
    let quality = Quality::new(quality)?;
    Ok(self.preview(id, quality)?.interval_days)
  }

  /// Previews for each of the review buttons
  pub fn preview_buttons(&self, id: &str) -> Result<Vec<IntervalPreview>> {
    Quality::BUTTONS
      .iter()
      .map(|&quality| -> Result<IntervalPreview> {
        Ok(IntervalPreview {
          quality,
          interval: self.preview(id, quality)?.interval_days,
        })
      })
      .collect()
  }

  fn preview(&self, id: &str, quality: Quality) -> Result<Sm2Result> {
    let item = self
      .items
      .get(id)
      .ok_or_else(|| SchedulerError::NotFound(id.to_string()))?;
    Ok(calculate_sm2(quality, item.ease_factor, item.interval_days, item.repetition_count))
  }

  /// Items with `next_due_at <= as_of`, earliest first, ties by id
  pub fn items_due_for_review(&self, as_of: DateTime<Utc>) -> Vec<&ReviewItem> {
    let mut due: Vec<&ReviewItem> = self.items.values().filter(|item| item.is_due(as_of)).collect();
    due.sort_by(|a, b| by_due_then_id(a, b));
    due
  }

  /// Items due right now according to the scheduler's clock
  pub fn due_now(&self) -> Vec<&ReviewItem> {
    self.items_due_for_review(self.clock.now())
  }

  /// The next `limit` items that are not yet due, earliest first
  pub fn upcoming(&self, as_of: DateTime<Utc>, limit: usize) -> Vec<&ReviewItem> {
    let mut upcoming: Vec<&ReviewItem> =
      self.items.values().filter(|item| !item.is_due(as_of)).collect();
    upcoming.sort_by(|a, b| by_due_then_id(a, b));
    upcoming.truncate(limit);
    upcoming
  }

  pub fn stats(&self, as_of: DateTime<Utc>) -> SchedulerStats {
    SchedulerStats::compute(self.items.values(), as_of)
  }

  pub fn analytics(&self, as_of: DateTime<Utc>) -> ReviewAnalytics {
    ReviewAnalytics::compute(self.items.values(), as_of)
  }

  pub fn goals(&self, as_of: DateTime<Utc>) -> Vec<StudyGoal> {
    study_goals(&self.stats(as_of))
  }

  /// Replace the collection with a serialized one. On error the current
  /// collection is kept as it was.
  pub fn load(&mut self, raw: &str) -> Result<()> {
    let items = persistence::decode(raw, self.clock.now())?;
    tracing::info!("Loaded {} review item(s)", items.len());
    self.items = items;
    Ok(())
  }

  pub fn save(&self) -> Result<String> {
    persistence::encode(&self.items)
  }

  /// Load from `store[key]`. An absent key means an empty collection.
  pub fn load_from(&mut self, store: &dyn DurableStore, key: &str) -> Result<()> {
    match store.get(key)? {
      Some(raw) => self.load(&raw),
      None => {
        tracing::info!("No stored review data under '{}', starting empty", key);
        self.items.clear();
        Ok(())
      }
    }
  }

  pub fn save_to(&self, store: &mut dyn DurableStore, key: &str) -> Result<()> {
    let raw = self.save()?;
    store.set(key, &raw)?;
    tracing::debug!("Saved {} review item(s) under '{}'", self.items.len(), key);
    Ok(())
  }
}

fn by_due_then_id(a: &ReviewItem, b: &ReviewItem) -> Ordering {
  a.next_due_at
    .cmp(&b.next_due_at)
    .then_with(|| a.id.cmp(&b.id))
}
