//! Period scheduler
//!
//! Arms one wake-up for the next reset boundary. On startup it checks
//! whether a boundary passed while nothing was running and, if so, resets
//! immediately. Each reset first archives the outgoing total to history.

use crate::engine::StepEngine;
use crate::model::HistoryEntry;
use crate::schedule::{self, ResetTime, DAY_MS};
use crate::traits::{Clock, StepStore, WakeTimer};

use super::state::{SchedulerEvent, SchedulerState};

/// Outcome of [`PeriodScheduler::start`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    /// History entry written by a catch-up reset, if one ran
    pub caught_up: Option<HistoryEntry>,
    /// Epoch milliseconds of the boundary the timer is armed for
    pub next_reset_ms: i64,
    /// Delay handed to the timer
    pub delay_ms: u64,
}

/// Owns the reset schedule and its wake-up timer
#[derive(Debug)]
pub struct PeriodScheduler<T> {
    timer: T,
    state: SchedulerState,
    /// Epoch milliseconds the armed wake-up is expected at
    deadline_ms: Option<i64>,
}

impl<T: WakeTimer> PeriodScheduler<T> {
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            state: SchedulerState::Stopped,
            deadline_ms: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// When the armed wake-up should fire
    pub fn deadline_ms(&self) -> Option<i64> {
        self.deadline_ms
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Reconcile missed boundaries, then arm for the next one
    ///
    /// Safe to call while armed: the previous wake-up is cancelled first,
    /// so at most one is ever outstanding.
    pub fn start<S: StepStore, C: Clock>(&mut self, engine: &mut StepEngine<S, C>) -> StartReport {
        self.timer.cancel();

        let reset = engine.store_mut().reset_time();
        engine.set_reset_time(reset);

        let now = engine.clock().now();
        let last = schedule::last_boundary_ms(reset, &now);
        let caught_up = match engine.store_mut().load_step_data() {
            Some(record) if record.timestamp < last => {
                tracing::info!(
                    steps = record.steps,
                    timestamp = record.timestamp,
                    boundary = last,
                    "reset boundary passed while stopped, catching up"
                );
                Some(self.execute_reset(engine))
            }
            _ => None,
        };

        let next_reset_ms = schedule::next_boundary_ms(reset, &now);
        let delay_ms = next_reset_ms.saturating_sub(now.timestamp_millis()).max(0) as u64;
        self.timer.arm(delay_ms);
        self.deadline_ms = Some(next_reset_ms);
        self.state = self.state.transition(SchedulerEvent::Start);
        tracing::info!(reset_time = %reset, delay_ms, "daily reset armed");

        StartReport {
            caught_up,
            next_reset_ms,
            delay_ms,
        }
    }

    /// Handle the armed wake-up: reset, then re-arm for 24 hours later
    ///
    /// Returns `None` if the scheduler was stopped before the wake-up
    /// was delivered.
    pub fn on_wake<S: StepStore, C: Clock>(
        &mut self,
        engine: &mut StepEngine<S, C>,
    ) -> Option<HistoryEntry> {
        let next = self.state.transition(SchedulerEvent::Wake);
        if !next.is_armed() {
            tracing::debug!("wake-up after stop ignored");
            return None;
        }

        let entry = self.execute_reset(engine);
        self.timer.arm(DAY_MS as u64);
        self.deadline_ms = Some(engine.clock().now_ms() + DAY_MS);
        self.state = next;
        Some(entry)
    }

    /// Archive the current count, then zero it
    pub fn execute_reset<S: StepStore, C: Clock>(
        &self,
        engine: &mut StepEngine<S, C>,
    ) -> HistoryEntry {
        // Capture before reset() zeroes it
        let steps = engine.count();
        let date = schedule::iso_timestamp(&engine.clock().now());
        let entry = HistoryEntry::new(steps, date);

        if !engine.store_mut().save_history(entry.clone()) {
            tracing::warn!(steps, "failed to archive daily total");
        }
        engine.reset();
        tracing::info!(steps, date = %entry.date, "daily total archived");
        entry
    }

    /// Validate, persist, and apply a new reset time
    ///
    /// On success the schedule (and catch-up check) is recomputed. On
    /// failure nothing changes.
    pub fn update_reset_time<S: StepStore, C: Clock>(
        &mut self,
        engine: &mut StepEngine<S, C>,
        candidate: &str,
    ) -> bool {
        let Ok(reset) = ResetTime::parse(candidate) else {
            tracing::warn!(candidate, "rejected invalid reset time");
            return false;
        };
        if !engine.store_mut().set_reset_time(candidate) {
            tracing::warn!(candidate, "failed to persist reset time");
            return false;
        }
        engine.set_reset_time(reset);
        self.start(engine);
        true
    }

    /// Cancel the outstanding wake-up; no-op when already stopped
    pub fn stop(&mut self) {
        if self.state.is_armed() {
            tracing::info!("daily reset disarmed");
        }
        self.timer.cancel();
        self.deadline_ms = None;
        self.state = self.state.transition(SchedulerEvent::Stop);
    }

    /// Next boundary in epoch milliseconds, for display
    pub fn next_reset_time<S: StepStore, C: Clock>(&self, engine: &StepEngine<S, C>) -> i64 {
        schedule::next_boundary_ms(engine.reset_time(), &engine.clock().now())
    }
}
