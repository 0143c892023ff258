//! JSON encoding of the review collection, with the legacy upgrade path.
//!
//! The collection is one JSON object keyed by item id. Records written by
//! the browser version of the tutorial (`type`, `created`, `lastReview`, `nextReview`,
//! `interval`, `repetitions`, `quality`, `totalReviews`, millisecond
//! timestamps) are read through field aliases.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::config::{
  DEFAULT_EASE_FACTOR, HISTORY_LIMIT, LEGACY_INTERVAL_DAYS, LEGACY_QUALITY, MAX_INTERVAL_DAYS,
  MIN_EASE_FACTOR,
};
use crate::domain::{
  average_quality, due_after, is_graduated, truncate_history, ItemKind, Quality, ReviewItem,
  ReviewRecord,
};
use crate::error::{Result, SchedulerError};

pub type Collection = BTreeMap<String, ReviewItem>;

pub fn encode(items: &Collection) -> Result<String> {
  serde_json::to_string(items)
    .map_err(|e| SchedulerError::invalid(format!("failed to serialize review items: {}", e)))
}

/// Decode a stored collection, upgrading legacy records.
///
/// All-or-nothing: the first malformed record fails the whole decode.
pub fn decode(raw: &str, now: DateTime<Utc>) -> Result<Collection> {
  let root: Value = serde_json::from_str(raw)
    .map_err(|e| SchedulerError::invalid(format!("stored review data is not valid JSON: {}", e)))?;

  let Value::Object(entries) = root else {
    return Err(SchedulerError::invalid("stored review data must be a JSON object"));
  };

  let mut items = Collection::new();
  let mut migrated = 0usize;

  for (key, value) in entries {
    let Value::Object(record) = value else {
      return Err(SchedulerError::invalid(format!("item '{}' is not an object", key)));
    };

    let legacy = needs_migration(&record);
    let stored: StoredItem = serde_json::from_value(Value::Object(record))
      .map_err(|e| SchedulerError::invalid(format!("item '{}': {}", key, e)))?;

    let item = if legacy {
      migrated += 1;
      stored.into_item(&key, Some(now), now)?
    } else {
      stored.into_item(&key, None, now)?
    };
    items.insert(key, item);
  }

  if migrated > 0 {
    tracing::info!("Migrated {} legacy review item(s) to SM-2 format", migrated);
  }

  Ok(items)
}

/// A record needs the one-time upgrade when any SM-2 field is missing.
/// `lastQuality: null` is a legitimate never-reviewed item, the others are not.
fn needs_migration(record: &Map<String, Value>) -> bool {
  let present = |names: &[&str], null_ok: bool| {
    names.iter().any(|name| match record.get(*name) {
      Some(Value::Null) => null_ok,
      Some(_) => true,
      None => false,
    })
  };

  !present(&["lastQuality", "quality"], true)
    || !present(&["easeFactor"], false)
    || !present(&["intervalDays", "interval"], false)
    || !present(&["repetitionCount", "repetitions"], false)
}

/// Epoch milliseconds (browser localStorage) or RFC 3339 text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Timestamp {
  Millis(i64),
  Text(String),
}

impl Timestamp {
  fn resolve(self, key: &str, field: &str) -> Result<DateTime<Utc>> {
    let parsed = match &self {
      Timestamp::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms),
      Timestamp::Text(text) => DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|d| d.with_timezone(&Utc)),
    };
    parsed.ok_or_else(|| {
      SchedulerError::invalid(format!("item '{}': invalid timestamp in {}: {:?}", key, field, self))
    })
  }
}

fn resolve_opt(ts: Option<Timestamp>, key: &str, field: &str) -> Result<Option<DateTime<Utc>>> {
  ts.map(|t| t.resolve(key, field)).transpose()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
  date: Timestamp,
  quality: u8,
  interval: i64,
  ease_factor: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
  id: Option<String>,
  #[serde(alias = "type")]
  kind: Option<String>,
  content: Option<String>,
  #[serde(alias = "created")]
  created_at: Option<Timestamp>,
  #[serde(alias = "lastReview")]
  last_reviewed_at: Option<Timestamp>,
  #[serde(alias = "nextReview")]
  next_due_at: Option<Timestamp>,
  #[serde(alias = "interval")]
  interval_days: Option<i64>,
  ease_factor: Option<f64>,
  #[serde(alias = "repetitions")]
  repetition_count: Option<i64>,
  #[serde(alias = "quality")]
  last_quality: Option<u8>,
  review_history: Option<Vec<StoredRecord>>,
  #[serde(alias = "totalReviews")]
  total_review_count: Option<i64>,
}

fn check_ease(ease_factor: f64) -> std::result::Result<f64, String> {
  if ease_factor.is_finite() && ease_factor >= MIN_EASE_FACTOR {
    Ok(ease_factor)
  } else {
    Err(format!("ease factor {} must be at least {}", ease_factor, MIN_EASE_FACTOR))
  }
}

fn check_interval(interval_days: i64) -> std::result::Result<i64, String> {
  if (0..=MAX_INTERVAL_DAYS).contains(&interval_days) {
    Ok(interval_days)
  } else {
    Err(format!("interval {} is outside 0..={}", interval_days, MAX_INTERVAL_DAYS))
  }
}

impl StoredItem {
  /// `migrate_at` is set for legacy records: missing SM-2 fields then take
  /// the upgrade defaults anchored at that instant.
  fn into_item(
    self,
    key: &str,
    migrate_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
  ) -> Result<ReviewItem> {
    let invalid = |reason: String| SchedulerError::invalid(format!("item '{}': {}", key, reason));

    let id = match self.id {
      Some(id) if id != key => {
        return Err(invalid(format!("id '{}' does not match its key", id)));
      }
      Some(id) => id,
      None => key.to_string(),
    };

    let kind = match self.kind {
      Some(kind) => {
        ItemKind::from_str(&kind).ok_or_else(|| invalid(format!("unknown kind '{}'", kind)))?
      }
      None => ItemKind::Chapter,
    };

    let ease_factor = check_ease(self.ease_factor.unwrap_or(DEFAULT_EASE_FACTOR)).map_err(invalid)?;

    let interval_days = match (self.interval_days, migrate_at) {
      (Some(interval), _) => interval,
      (None, Some(_)) => LEGACY_INTERVAL_DAYS,
      (None, None) => 0,
    };
    let interval_days = check_interval(interval_days).map_err(invalid)?;

    let repetition_count = self.repetition_count.unwrap_or(0);
    if repetition_count < 0 {
      return Err(invalid(format!("negative repetition count {}", repetition_count)));
    }

    let last_quality = match (self.last_quality, migrate_at) {
      (Some(q), _) => Some(q),
      (None, Some(_)) => Some(LEGACY_QUALITY),
      (None, None) => None,
    }
    .map(|q| Quality::new(q).map_err(|e| invalid(e.to_string())))
    .transpose()?;

    let mut review_history = self
      .review_history
      .unwrap_or_default()
      .into_iter()
      .map(|record| -> Result<ReviewRecord> {
        Ok(ReviewRecord {
          date: record.date.resolve(key, "reviewHistory")?,
          quality: Quality::new(record.quality).map_err(|e| invalid(e.to_string()))?,
          interval: check_interval(record.interval)
            .map_err(|reason| invalid(format!("reviewHistory: {}", reason)))?,
          ease_factor: check_ease(record.ease_factor)
            .map_err(|reason| invalid(format!("reviewHistory: {}", reason)))?,
        })
      })
      .collect::<Result<Vec<_>>>()?;
    if review_history.len() > HISTORY_LIMIT {
      tracing::warn!(
        "Item '{}' had {} history records, keeping the newest {}",
        key,
        review_history.len(),
        HISTORY_LIMIT
      );
      truncate_history(&mut review_history);
    }

    let created_at = resolve_opt(self.created_at, key, "createdAt")?.unwrap_or(now);
    let mut last_reviewed_at = resolve_opt(self.last_reviewed_at, key, "lastReviewedAt")?;
    let mut next_due_at = resolve_opt(self.next_due_at, key, "nextDueAt")?;

    if let Some(at) = migrate_at {
      last_reviewed_at = last_reviewed_at.or(Some(at));
      if next_due_at.is_none() {
        next_due_at = Some(
          due_after(at, LEGACY_INTERVAL_DAYS)
            .ok_or_else(|| invalid(format!("migration time {} is out of range", at)))?,
        );
      }
    }

    let next_due_at = match (next_due_at, last_reviewed_at) {
      (Some(due), _) => due,
      (None, Some(reviewed)) => due_after(reviewed, interval_days).ok_or_else(|| {
        invalid(format!("next review after {} is out of range", reviewed))
      })?,
      (None, None) => created_at,
    };

    let total_review_count = self
      .total_review_count
      .unwrap_or(review_history.len() as i64);
    if total_review_count < 0 {
      return Err(invalid(format!("negative review count {}", total_review_count)));
    }

    Ok(ReviewItem {
      id,
      kind,
      content: self.content.unwrap_or_default(),
      created_at,
      last_reviewed_at,
      next_due_at,
      interval_days,
      ease_factor,
      repetition_count,
      last_quality,
      average_quality: average_quality(&review_history),
      review_history,
      total_review_count,
      is_graduated: is_graduated(interval_days),
    })
  }
}
