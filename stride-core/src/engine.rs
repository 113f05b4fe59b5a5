//! Step classification and the authoritative count
//!
//! The engine turns acceleration samples into steps with a single rule: a
//! sample is a step iff its magnitude is strictly above the threshold and
//! at least the debounce window has passed since the last accepted step.
//! There is no smoothing; the decision is a pure function of the sample
//! magnitude and the time since the last accepted step.
//!
//! Every change is written through to the [`StepStore`] and then announced
//! to observers. A failed write leaves the in-memory count correct; the next
//! successful write catches storage up.

use crate::config::EngineConfig;
use crate::model::{AccelerationSample, StepRecord};
use crate::observer::{ObserverError, ObserverId, ObserverList};
use crate::schedule::{self, ResetTime};
use crate::traits::{Clock, StepStore};

/// What [`StepEngine::initialize`] found in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Startup {
    /// Nothing stored; started from zero
    Fresh,
    /// Stored record belongs to the current period and was restored
    Restored(u32),
    /// Stored record belongs to an earlier period; started from zero
    Expired(StepRecord),
}

/// Owns the current count and the debounce state
#[derive(Debug)]
pub struct StepEngine<S, C> {
    store: S,
    clock: C,
    config: EngineConfig,
    reset_time: ResetTime,
    /// Only negative if something outside the engine corrupted it
    current_count: i64,
    last_step_ms: Option<i64>,
    observers: ObserverList,
}

impl<S: StepStore, C: Clock> StepEngine<S, C> {
    /// Create an engine; call [`initialize`](Self::initialize) before use
    pub fn new(store: S, clock: C, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config: config.sanitized(),
            reset_time: ResetTime::default(),
            current_count: 0,
            last_step_ms: None,
            observers: ObserverList::new(),
        }
    }

    /// Load the persisted count, keeping it only if it is from this period
    ///
    /// Does not start the motion feed.
    pub fn initialize(&mut self) -> Startup {
        self.reset_time = self.store.reset_time();
        let now_ms = self.clock.now_ms();

        let startup = match self.store.load_step_data() {
            Some(record) if self.is_within_current_period(record.timestamp) => {
                self.current_count = record.steps as i64;
                tracing::info!(steps = record.steps, "restored step count");
                return Startup::Restored(record.steps);
            }
            Some(record) => {
                tracing::info!(
                    steps = record.steps,
                    timestamp = record.timestamp,
                    "stored step count is from an earlier period"
                );
                Startup::Expired(record)
            }
            None => Startup::Fresh,
        };

        self.current_count = 0;
        if !self.store.save_step_data(&StepRecord::new(0, now_ms)) {
            tracing::warn!("failed to persist fresh step record");
        }
        startup
    }

    /// Load the persisted count verbatim, without a period check
    ///
    /// Lets a scheduler archive a count left over from an earlier period
    /// before [`initialize`](Self::initialize) would discard it.
    pub fn restore(&mut self) -> u32 {
        self.reset_time = self.store.reset_time();
        let steps = self.store.load_step_data().map_or(0, |r| r.steps);
        self.current_count = steps as i64;
        steps
    }

    /// Classify one sample; returns whether it counted as a step
    pub fn on_sample(&mut self, sample: &AccelerationSample) -> bool {
        if !sample.exceeds(self.config.step_threshold) {
            return false;
        }

        let now_ms = self.clock.now_ms();
        if let Some(last) = self.last_step_ms {
            if now_ms.saturating_sub(last) < self.config.debounce_ms as i64 {
                tracing::trace!(since_last_ms = now_ms - last, "step debounced");
                return false;
            }
        }

        self.last_step_ms = Some(now_ms);
        self.current_count = self.current_count.saturating_add(1);
        tracing::debug!(count = self.count(), "step detected");
        self.commit(now_ms);
        true
    }

    /// Add one step without classification
    ///
    /// Fallback for when no sensor feed is available.
    pub fn increment(&mut self) -> u32 {
        let now_ms = self.clock.now_ms();
        self.current_count = self.current_count.saturating_add(1);
        self.commit(now_ms);
        self.count()
    }

    /// Set the count to zero, persist, and notify
    pub fn reset(&mut self) {
        let now_ms = self.clock.now_ms();
        self.current_count = 0;
        tracing::info!("step count reset");
        self.commit(now_ms);
    }

    /// Current count, never negative
    pub fn count(&self) -> u32 {
        self.current_count.clamp(0, u32::MAX as i64) as u32
    }

    /// Whether `timestamp_ms` lies at or after the most recent boundary
    pub fn is_within_current_period(&self, timestamp_ms: i64) -> bool {
        schedule::is_within_period(self.reset_time, &self.clock.now(), timestamp_ms)
    }

    pub fn reset_time(&self) -> ResetTime {
        self.reset_time
    }

    /// Use a new reset time for period checks
    ///
    /// Storage is the scheduler's responsibility; this only keeps the
    /// engine's view in step with it.
    pub fn set_reset_time(&mut self, reset_time: ResetTime) {
        self.reset_time = reset_time;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register a count handler
    pub fn add_observer<F>(&mut self, handler: F) -> ObserverId
    where
        F: FnMut(u32) -> Result<(), ObserverError> + 'static,
    {
        self.observers.add(handler)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Write through to storage, then notify
    fn commit(&mut self, now_ms: i64) {
        let record = StepRecord::new(self.current_count, now_ms);
        if !self.store.save_step_data(&record) {
            tracing::warn!(steps = record.steps, "step count not persisted, keeping in memory");
        }
        self.observers.notify(record.steps);
    }
}
