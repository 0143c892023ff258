//! Spaced-repetition scheduling for the dynamic programming tutorial.
//!
//! [`srs::Scheduler`] owns the review items and applies the SM-2 rule;
//! [`store`] provides the durable key-value backends it saves into and
//! [`handle::SchedulerHandle`] ties the two together for shared use.

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod handle;
pub mod paths;
pub mod srs;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{ItemKind, Quality, ReviewItem, ReviewRecord};
pub use error::{Result, SchedulerError, StoreError};
pub use handle::SchedulerHandle;
pub use srs::{ReviewOutcome, Scheduler, SchedulerStats};
