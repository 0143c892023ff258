use crate::config::{MAX_INTERVAL_DAYS, MIN_EASE_FACTOR};
use crate::domain::{is_graduated, Quality};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2Result {
  pub ease_factor: f64,
  pub interval_days: i64,
  pub repetitions: i64,
  pub is_graduated: bool,
}

/// Apply one SM-2 step. Pure: the caller decides what "now" is.
///
/// The interval grows with the ease the item had going into this review;
/// the adjusted ease only affects the next one. Growth stops at
/// `MAX_INTERVAL_DAYS`.
pub fn calculate_sm2(
  quality: Quality,
  current_ease_factor: f64,
  current_interval: i64,
  current_repetitions: i64,
) -> Sm2Result {
  let q = f64::from(quality.value());

  // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
  let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
  let new_ease_factor = (current_ease_factor + ease_delta).max(MIN_EASE_FACTOR);

  let (new_interval, new_repetitions) = if quality.is_success() {
    let interval = match current_repetitions {
      0 => 1,
      1 => 6,
      _ => {
        let grown = ((current_interval as f64) * current_ease_factor).round();
        grown.min(MAX_INTERVAL_DAYS as f64) as i64
      }
    };
    (interval, current_repetitions + 1)
  } else {
    // Failed review: reset
    (1, 0)
  };

  Sm2Result {
    ease_factor: new_ease_factor,
    interval_days: new_interval,
    repetitions: new_repetitions,
    is_graduated: is_graduated(new_interval),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn q(value: u8) -> Quality {
    Quality::new(value).unwrap()
  }

  #[test]
  fn test_first_review_good() {
    let result = calculate_sm2(q(4), 2.5, 0, 0);
    assert_eq!(result.repetitions, 1);
    assert_eq!(result.interval_days, 1);
    assert!((result.ease_factor - 2.5).abs() < 0.01);
  }

  #[test]
  fn test_second_review_good() {
    let result = calculate_sm2(q(4), 2.5, 1, 1);
    assert_eq!(result.repetitions, 2);
    assert_eq!(result.interval_days, 6);
  }

  #[test]
  fn test_third_review_good() {
    let result = calculate_sm2(q(4), 2.5, 6, 2);
    assert_eq!(result.repetitions, 3);
    // 6 * 2.5 = 15
    assert_eq!(result.interval_days, 15);
  }

  #[test]
  fn test_interval_uses_ease_before_adjustment() {
    // Quality 3 lowers ease to 2.36, but the interval still grows by 2.5
    let result = calculate_sm2(q(3), 2.5, 6, 2);
    assert_eq!(result.interval_days, 15);
    assert!((result.ease_factor - 2.36).abs() < 1e-9);
  }

  #[test]
  fn test_failed_review_resets() {
    let result = calculate_sm2(q(0), 2.5, 15, 5);
    assert_eq!(result.repetitions, 0);
    assert_eq!(result.interval_days, 1);
    // Ease factor decreases for failed review
    assert!(result.ease_factor < 2.5);
  }

  #[test]
  fn test_hard_review() {
    let result = calculate_sm2(q(2), 2.5, 6, 2);
    assert_eq!(result.repetitions, 0);
    assert_eq!(result.interval_days, 1);
  }

  #[test]
  fn test_ease_deltas_per_quality() {
    let expected = [-0.8, -0.54, -0.32, -0.14, 0.0, 0.1];
    for (value, delta) in expected.iter().enumerate() {
      let result = calculate_sm2(q(value as u8), 2.5, 0, 0);
      assert!(
        (result.ease_factor - (2.5 + delta)).abs() < 1e-9,
        "quality {} gave {}",
        value,
        result.ease_factor
      );
    }
  }

  #[test]
  fn test_easy_review_increases_ease() {
    let result = calculate_sm2(q(5), 2.5, 1, 1);
    assert!(result.ease_factor > 2.5);
    assert_eq!(result.interval_days, 6);
  }

  #[test]
  fn test_ease_has_no_ceiling() {
    let mut ef = 2.5;
    for _ in 0..20 {
      ef = calculate_sm2(q(5), ef, 1, 1).ease_factor;
    }
    assert!((ef - 4.5).abs() < 1e-9);
  }

  #[test]
  fn test_interval_is_capped() {
    let result = calculate_sm2(q(5), 4.0, 30_000, 12);
    assert_eq!(result.interval_days, MAX_INTERVAL_DAYS);
    assert_eq!(result.repetitions, 13);
    assert!(result.is_graduated);

    // Already at the cap: stays there, and ease keeps rising
    let again = calculate_sm2(q(5), result.ease_factor, result.interval_days, result.repetitions);
    assert_eq!(again.interval_days, MAX_INTERVAL_DAYS);
    assert!(again.ease_factor > result.ease_factor);
  }

  #[test]
  fn test_ease_factor_floor() {
    // Multiple failed reviews should not go below 1.3
    let mut ef = 2.5;
    let mut interval = 10;
    let mut reps = 5;

    for _ in 0..10 {
      let result = calculate_sm2(q(0), ef, interval, reps);
      ef = result.ease_factor;
      interval = result.interval_days;
      reps = result.repetitions;
      assert!(ef >= MIN_EASE_FACTOR);
    }

    assert!((ef - MIN_EASE_FACTOR).abs() < 0.01);
  }

  #[test]
  fn test_graduation_flag_follows_interval() {
    let below = calculate_sm2(q(4), 2.5, 8, 3);
    assert_eq!(below.interval_days, 20);
    assert!(!below.is_graduated);

    let at = calculate_sm2(q(4), 2.5, 9, 3);
    assert_eq!(at.interval_days, 23);
    assert!(at.is_graduated);
  }

  #[test]
  fn test_interval_grows_exponentially() {
    let mut ef = 2.5;
    let mut interval = 0;
    let mut reps = 0;

    // Simulate 5 "Good" reviews
    for i in 0..5 {
      let result = calculate_sm2(q(4), ef, interval, reps);
      ef = result.ease_factor;
      interval = result.interval_days;
      reps = result.repetitions;

      match i {
        0 => assert_eq!(interval, 1),
        1 => assert_eq!(interval, 6),
        _ => assert!(interval > 6),
      }
    }

    // After 5 good reviews, interval should be substantial
    assert!(interval > 30);
  }
}
