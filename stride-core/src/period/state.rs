//! Scheduler state machine
//!
//! Two states: no wake-up outstanding, or exactly one armed.

/// Scheduler states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerState {
    /// No wake-up outstanding
    #[default]
    Stopped,
    /// One wake-up armed for the next boundary
    Armed,
}

/// Events driving the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerEvent {
    /// `start()` called (also on reset-time change)
    Start,
    /// Armed wake-up elapsed
    Wake,
    /// `stop()` called
    Stop,
}

impl SchedulerState {
    pub fn is_armed(&self) -> bool {
        matches!(self, SchedulerState::Armed)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SchedulerEvent) -> Self {
        use SchedulerEvent::*;
        use SchedulerState::*;

        match (self, event) {
            (_, Start) => Armed,
            // Firing re-arms for the following day
            (Armed, Wake) => Armed,
            (_, Stop) => Stopped,
            // A late wake after stop() is dropped
            (Stopped, Wake) => Stopped,
        }
    }
}
