//! Typed persistence port

use alloc::vec::Vec;

use crate::model::{HistoryEntry, StepRecord};
use crate::schedule::ResetTime;

/// Durable home of the step record, reset time, and history
///
/// Failures never propagate: reads fall back to a safe default and writes
/// report `false`, so the caller keeps running from memory.
pub trait StepStore {
    /// Last persisted step record, or `None` when absent or unreadable
    fn load_step_data(&mut self) -> Option<StepRecord>;

    /// Persist the step record
    fn save_step_data(&mut self, record: &StepRecord) -> bool;

    /// Stored reset time; `00:00` when unset or malformed
    fn reset_time(&mut self) -> ResetTime;

    /// Validate and persist a reset time
    ///
    /// Returns `false` without touching storage when `candidate` is not
    /// strict `HH:MM`.
    fn set_reset_time(&mut self, candidate: &str) -> bool;

    /// Append to history, keeping only the most recent entries
    fn save_history(&mut self, entry: HistoryEntry) -> bool;

    /// History oldest-first; empty when absent or unreadable
    fn load_history(&mut self) -> Vec<HistoryEntry>;
}
