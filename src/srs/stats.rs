//! Aggregate views over the review collection.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::{
  BACKLOG_GOAL_THRESHOLD, COLLECTION_GOAL_SIZE, DEFAULT_EASE_FACTOR, EASE_DIFFICULT_BELOW,
  EASE_EASY_FROM, MASTERY_GOAL_EASE, RECENT_WINDOW_DAYS,
};
use crate::domain::ReviewItem;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
  pub total: usize,
  pub due: usize,
  pub learning: usize,
  pub graduated: usize,
  /// Mean ease over all items, `DEFAULT_EASE_FACTOR` when there are none
  pub average_ease: f64,
  pub total_reviews: i64,
  /// Mean of the per-item average qualities, 0 when there are none
  pub average_quality: f64,
}

impl SchedulerStats {
  pub fn compute<'a>(items: impl IntoIterator<Item = &'a ReviewItem>, as_of: DateTime<Utc>) -> Self {
    let mut stats = SchedulerStats {
      total: 0,
      due: 0,
      learning: 0,
      graduated: 0,
      average_ease: DEFAULT_EASE_FACTOR,
      total_reviews: 0,
      average_quality: 0.0,
    };
    let mut ease_sum = 0.0;
    let mut quality_sum = 0.0;

    for item in items {
      stats.total += 1;
      if item.is_due(as_of) {
        stats.due += 1;
      }
      if item.is_graduated {
        stats.graduated += 1;
      } else {
        stats.learning += 1;
      }
      stats.total_reviews += item.total_review_count;
      ease_sum += item.ease_factor;
      quality_sum += item.average_quality;
    }

    if stats.total > 0 {
      stats.average_ease = ease_sum / stats.total as f64;
      stats.average_quality = quality_sum / stats.total as f64;
    }
    stats
  }

  /// Average quality on a 0-100 scale
  pub fn accuracy_percent(&self) -> f64 {
    self.average_quality * 20.0
  }
}

/// How many items fall into each ease band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EaseDistribution {
  /// ease < 2.0
  pub difficult: usize,
  /// 2.0 <= ease < 2.8
  pub normal: usize,
  /// ease >= 2.8
  pub easy: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAnalytics {
  pub stats: SchedulerStats,
  pub ease_distribution: EaseDistribution,
  /// Items last reviewed within the recent window
  pub recent_reviews: usize,
  pub accuracy_percent: f64,
}

impl ReviewAnalytics {
  pub fn compute<'a>(
    items: impl IntoIterator<Item = &'a ReviewItem> + Clone,
    as_of: DateTime<Utc>,
  ) -> Self {
    let stats = SchedulerStats::compute(items.clone(), as_of);
    let window_start = as_of - Duration::days(RECENT_WINDOW_DAYS);

    let mut ease_distribution = EaseDistribution::default();
    let mut recent_reviews = 0;
    for item in items {
      if item.ease_factor < EASE_DIFFICULT_BELOW {
        ease_distribution.difficult += 1;
      } else if item.ease_factor < EASE_EASY_FROM {
        ease_distribution.normal += 1;
      } else {
        ease_distribution.easy += 1;
      }

      if item
        .last_reviewed_at
        .is_some_and(|reviewed| reviewed > window_start && reviewed <= as_of)
      {
        recent_reviews += 1;
      }
    }

    Self {
      accuracy_percent: stats.accuracy_percent(),
      stats,
      ease_distribution,
      recent_reviews,
    }
  }
}

/// Next steps suggested from the current statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "goal", rename_all = "camelCase")]
pub enum StudyGoal {
  /// Items not yet graduated
  Graduate { learning: usize },
  /// Too many items overdue
  ClearBacklog { due: usize },
  /// Average ease is low
  ImproveMastery { average_ease: f64 },
  /// The collection is still small
  AddContent { total: usize },
}

pub fn study_goals(stats: &SchedulerStats) -> Vec<StudyGoal> {
  let mut goals = Vec::new();
  if stats.learning > 0 {
    goals.push(StudyGoal::Graduate { learning: stats.learning });
  }
  if stats.due > BACKLOG_GOAL_THRESHOLD {
    goals.push(StudyGoal::ClearBacklog { due: stats.due });
  }
  if stats.average_ease < MASTERY_GOAL_EASE {
    goals.push(StudyGoal::ImproveMastery {
      average_ease: stats.average_ease,
    });
  }
  if stats.total < COLLECTION_GOAL_SIZE {
    goals.push(StudyGoal::AddContent { total: stats.total });
  }
  goals
}
