//! Daily reset scheduling
//!
//! Owns the single outstanding wake-up, reconciles boundaries missed while
//! not running, and archives each period's total before zeroing it.

pub mod scheduler;
pub mod state;

pub use scheduler::{PeriodScheduler, StartReport};
pub use state::{SchedulerEvent, SchedulerState};
