use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::Quality;
use crate::config::{DEFAULT_EASE_FACTOR, GRADUATION_INTERVAL_DAYS, HISTORY_LIMIT};
use crate::error::{Result, SchedulerError};

/// What kind of learning unit an item stands for. Classification only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
  Chapter,
  Exercise,
  Concept,
  Formula,
  Pattern,
}

impl ItemKind {
  pub const ALL: [ItemKind; 5] = [
    Self::Chapter,
    Self::Exercise,
    Self::Concept,
    Self::Formula,
    Self::Pattern,
  ];

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "chapter" => Some(Self::Chapter),
      "exercise" => Some(Self::Exercise),
      "concept" => Some(Self::Concept),
      "formula" => Some(Self::Formula),
      "pattern" => Some(Self::Pattern),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Chapter => "chapter",
      Self::Exercise => "exercise",
      Self::Concept => "concept",
      Self::Formula => "formula",
      Self::Pattern => "pattern",
    }
  }
}

/// One applied review, as kept in an item's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
  pub date: DateTime<Utc>,
  pub quality: Quality,
  pub interval: i64,
  pub ease_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
  pub id: String,
  pub kind: ItemKind,
  pub content: String,
  pub created_at: DateTime<Utc>,
  pub last_reviewed_at: Option<DateTime<Utc>>,
  pub next_due_at: DateTime<Utc>,

  // SM-2 state
  pub interval_days: i64,
  pub ease_factor: f64,
  pub repetition_count: i64,
  pub last_quality: Option<Quality>,

  /// Newest last, at most `HISTORY_LIMIT` records
  pub review_history: Vec<ReviewRecord>,

  // Stats
  pub total_review_count: i64,
  pub average_quality: f64,
  pub is_graduated: bool,
}

impl ReviewItem {
  /// A fresh item, due immediately
  pub fn new(id: String, kind: ItemKind, content: String, now: DateTime<Utc>) -> Self {
    Self {
      id,
      kind,
      content,
      created_at: now,
      last_reviewed_at: None,
      next_due_at: now,
      interval_days: 0,
      ease_factor: DEFAULT_EASE_FACTOR,
      repetition_count: 0,
      last_quality: None,
      review_history: Vec::new(),
      total_review_count: 0,
      average_quality: 0.0,
      is_graduated: false,
    }
  }

  pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
    self.next_due_at <= as_of
  }

  /// The last `n` history records, oldest first
  pub fn recent_history(&self, n: usize) -> &[ReviewRecord] {
    let start = self.review_history.len().saturating_sub(n);
    &self.review_history[start..]
  }

  /// Append a record, dropping the oldest ones beyond the cap, and refresh
  /// the average quality over what is kept.
  pub(crate) fn push_history(&mut self, record: ReviewRecord) {
    self.review_history.push(record);
    truncate_history(&mut self.review_history);
    self.average_quality = average_quality(&self.review_history);
  }

  /// Set the interval and everything derived from it.
  /// Leaves the item untouched if the due date is out of range.
  pub(crate) fn schedule(&mut self, interval_days: i64, from: DateTime<Utc>) -> Result<()> {
    let next_due_at = due_after(from, interval_days).ok_or_else(|| {
      SchedulerError::invalid(format!(
        "interval of {} days from {} is out of range",
        interval_days, from
      ))
    })?;
    self.interval_days = interval_days;
    self.next_due_at = next_due_at;
    self.is_graduated = is_graduated(interval_days);
    Ok(())
  }
}

/// `from` plus `days`, or None when chrono cannot represent the result
pub(crate) fn due_after(from: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
  TimeDelta::try_days(days).and_then(|delta| from.checked_add_signed(delta))
}

pub fn is_graduated(interval_days: i64) -> bool {
  interval_days >= GRADUATION_INTERVAL_DAYS
}

/// Keep only the newest `HISTORY_LIMIT` records
pub(crate) fn truncate_history(history: &mut Vec<ReviewRecord>) {
  if history.len() > HISTORY_LIMIT {
    history.drain(..history.len() - HISTORY_LIMIT);
  }
}

pub(crate) fn average_quality(history: &[ReviewRecord]) -> f64 {
  if history.is_empty() {
    return 0.0;
  }
  let total: u32 = history.iter().map(|r| u32::from(r.quality.value())).sum();
  total as f64 / history.len() as f64
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
  }

  fn record(day: u32, quality: u8) -> ReviewRecord {
    ReviewRecord {
      date: at(day),
      quality: Quality::new(quality).unwrap(),
      interval: 1,
      ease_factor: 2.5,
    }
  }

  // ItemKind tests

  #[test]
  fn test_item_kind_from_str() {
    assert_eq!(ItemKind::from_str("chapter"), Some(ItemKind::Chapter));
    assert_eq!(ItemKind::from_str("pattern"), Some(ItemKind::Pattern));
    assert_eq!(ItemKind::from_str("Chapter"), None);
    assert_eq!(ItemKind::from_str(""), None);
  }

  #[test]
  fn test_item_kind_as_str_roundtrip() {
    for kind in ItemKind::ALL {
      assert_eq!(ItemKind::from_str(kind.as_str()), Some(kind));
    }
  }

  #[test]
  fn test_item_kind_serde_matches_as_str() {
    for kind in ItemKind::ALL {
      let json = serde_json::to_string(&kind).unwrap();
      assert_eq!(json, format!("\"{}\"", kind.as_str()));
    }
  }

  // ReviewItem tests

  #[test]
  fn test_new_item_is_due_immediately() {
    let item = ReviewItem::new("knapsack".into(), ItemKind::Exercise, String::new(), at(1));
    assert_eq!(item.next_due_at, at(1));
    assert!(item.is_due(at(1)));
    assert_eq!(item.interval_days, 0);
    assert_eq!(item.ease_factor, 2.5);
    assert_eq!(item.repetition_count, 0);
    assert!(item.last_quality.is_none());
    assert!(item.last_reviewed_at.is_none());
    assert!(!item.is_graduated);
  }

  #[test]
  fn test_schedule_derives_graduation() {
    let mut item = ReviewItem::new("lcs".into(), ItemKind::Concept, String::new(), at(1));
    item.schedule(20, at(2)).unwrap();
    assert!(!item.is_graduated);
    assert_eq!(item.next_due_at, at(22));

    item.schedule(21, at(2)).unwrap();
    assert!(item.is_graduated);
  }

  #[test]
  fn test_schedule_out_of_range_leaves_item() {
    let mut item = ReviewItem::new("lcs".into(), ItemKind::Concept, String::new(), at(1));
    item.schedule(6, at(1)).unwrap();
    let before = item.clone();

    let err = item.schedule(i64::MAX / 2, at(2)).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidArgument(_)));
    assert_eq!(item, before);

    let err = item.schedule(100, DateTime::<Utc>::MAX_UTC).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidArgument(_)));
    assert_eq!(item, before);
  }

  #[test]
  fn test_due_after() {
    assert_eq!(due_after(at(1), 6), Some(at(7)));
    assert_eq!(due_after(at(1), 9_000_000_000_000), None);
    assert_eq!(due_after(DateTime::<Utc>::MAX_UTC, 1), None);
  }

  #[test]
  fn test_push_history_caps_and_averages() {
    let mut item = ReviewItem::new("lis".into(), ItemKind::Pattern, String::new(), at(1));
    for day in 1..=25 {
      let quality = if day <= 5 { 0 } else { 4 };
      item.push_history(record(day, quality));
    }

    assert_eq!(item.review_history.len(), HISTORY_LIMIT);
    assert_eq!(item.review_history.first().unwrap().date, at(6));
    assert_eq!(item.review_history.last().unwrap().date, at(25));
    // The five failures were evicted
    assert_eq!(item.average_quality, 4.0);
  }

  #[test]
  fn test_recent_history() {
    let mut item = ReviewItem::new("fib".into(), ItemKind::Chapter, String::new(), at(1));
    assert!(item.recent_history(5).is_empty());

    for day in 1..=7 {
      item.push_history(record(day, 3));
    }
    let recent = item.recent_history(5);
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].date, at(3));
    assert_eq!(recent[4].date, at(7));
  }

  #[test]
  fn test_wire_field_names() {
    let item = ReviewItem::new("edit-distance".into(), ItemKind::Formula, "d[i][j]".into(), at(1));
    let value = serde_json::to_value(&item).unwrap();
    for key in [
      "id",
      "kind",
      "content",
      "createdAt",
      "lastReviewedAt",
      "nextDueAt",
      "intervalDays",
      "easeFactor",
      "repetitionCount",
      "lastQuality",
      "reviewHistory",
      "totalReviewCount",
      "averageQuality",
      "isGraduated",
    ] {
      assert!(value.get(key).is_some(), "missing {}", key);
    }
  }
}
