use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::FAILURE_THRESHOLD;
use crate::error::SchedulerError;

/// Self-assessed recall quality, 0 (total failure) to 5 (perfect recall)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
  pub const AGAIN: Quality = Quality(0);
  pub const VERY_HARD: Quality = Quality(1);
  pub const HARD: Quality = Quality(2);
  pub const GOOD: Quality = Quality(3);
  pub const EASY: Quality = Quality(4);
  pub const PERFECT: Quality = Quality(5);

  pub const MAX: u8 = 5;

  /// Ratings offered by the four review buttons (Again, Hard, Good, Easy).
  /// Presentation only: the scheduler accepts every value in 0..=5.
  pub const BUTTONS: [Quality; 4] = [Self::AGAIN, Self::HARD, Self::GOOD, Self::EASY];

  pub fn new(value: u8) -> Result<Self, SchedulerError> {
    if value > Self::MAX {
      return Err(SchedulerError::invalid(format!(
        "quality must be between 0 and {}, got {}",
        Self::MAX,
        value
      )));
    }
    Ok(Self(value))
  }

  pub fn value(self) -> u8 {
    self.0
  }

  /// Recall counts as successful from Good upwards
  pub fn is_success(self) -> bool {
    self.0 >= FAILURE_THRESHOLD
  }

  pub fn label(self) -> &'static str {
    match self.0 {
      0 => "Again",
      1 => "Very hard",
      2 => "Hard",
      3 => "Good",
      4 => "Easy",
      _ => "Perfect",
    }
  }
}

impl TryFrom<u8> for Quality {
  type Error = SchedulerError;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<Quality> for u8 {
  fn from(quality: Quality) -> u8 {
    quality.0
  }
}

impl fmt::Display for Quality {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.0, self.label())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_accepts_full_range() {
    for value in 0..=5u8 {
      assert_eq!(Quality::new(value).unwrap().value(), value);
    }
  }

  #[test]
  fn test_rejects_out_of_range() {
    assert!(matches!(Quality::new(6), Err(SchedulerError::InvalidArgument(_))));
    assert!(Quality::new(u8::MAX).is_err());
  }

  #[test]
  fn test_success_threshold() {
    assert!(!Quality::AGAIN.is_success());
    assert!(!Quality::HARD.is_success());
    assert!(Quality::GOOD.is_success());
    assert!(Quality::PERFECT.is_success());
  }

  #[test]
  fn test_labels() {
    assert_eq!(Quality::AGAIN.label(), "Again");
    assert_eq!(Quality::VERY_HARD.label(), "Very hard");
    assert_eq!(Quality::GOOD.to_string(), "3 (Good)");
  }

  #[test]
  fn test_buttons_skip_very_hard_and_perfect() {
    let values: Vec<u8> = Quality::BUTTONS.iter().map(|q| q.value()).collect();
    assert_eq!(values, vec![0, 2, 3, 4]);
  }

  #[test]
  fn test_serde_rejects_out_of_range() {
    assert_eq!(serde_json::from_str::<Quality>("4").unwrap(), Quality::EASY);
    assert!(serde_json::from_str::<Quality>("7").is_err());
    assert_eq!(serde_json::to_string(&Quality::HARD).unwrap(), "2");
  }
}
