pub mod persistence;
pub mod scheduler;
pub mod sm2;
pub mod stats;

pub use scheduler::{IntervalPreview, ReviewOutcome, Scheduler};
pub use sm2::{calculate_sm2, Sm2Result};
pub use stats::{study_goals, EaseDistribution, ReviewAnalytics, SchedulerStats, StudyGoal};
