//! Presentation-facing pedometer
//!
//! Bundles the engine and the period scheduler behind the calls a UI
//! makes: read the count, watch it change, change the reset time, look at
//! history. Boot ordering between the two lives here.

use chrono::{DateTime, FixedOffset};
use stride_core::engine::Startup;
use stride_core::schedule::from_epoch_ms;
use stride_core::traits::{activate, SampleHandler};
use stride_core::{
    AccelerationSample, Clock, EngineConfig, HistoryEntry, KvStepStore, MotionError,
    MotionSensor, ObserverError, ObserverId, PeriodScheduler, ResetTime, SchedulerState,
    StepEngine, StepStore, StrideError, WakeTimer,
};
use stride_hal::{KeyValueStore, StorageKey};

/// State of the motion feed as last negotiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorStatus {
    /// Activation not attempted yet
    #[default]
    Inactive,
    Listening,
    Unavailable,
    PermissionDenied,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Inactive => "inactive",
            SensorStatus::Listening => "listening",
            SensorStatus::Unavailable => "unavailable",
            SensorStatus::PermissionDenied => "permission denied",
        }
    }
}

/// What happened during [`Pedometer::boot`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReport {
    /// Count found in storage before any period check
    pub stored_steps: u32,
    /// Archived total if a boundary passed while stopped
    pub caught_up: Option<HistoryEntry>,
    pub startup: Startup,
    pub next_reset_ms: i64,
}

/// Snapshot for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub steps: u32,
    pub reset_time: ResetTime,
    pub next_reset: DateTime<FixedOffset>,
    pub sensor: SensorStatus,
    pub scheduler: SchedulerState,
}

pub struct Pedometer<K, C, T> {
    engine: StepEngine<KvStepStore<K>, C>,
    scheduler: PeriodScheduler<T>,
    sensor: SensorStatus,
}

impl<K: KeyValueStore, C: Clock, T: WakeTimer> Pedometer<K, C, T> {
    pub fn new(kv: K, clock: C, timer: T, config: EngineConfig) -> Self {
        Self {
            engine: StepEngine::new(KvStepStore::new(kv), clock, config),
            scheduler: PeriodScheduler::new(timer),
            sensor: SensorStatus::Inactive,
        }
    }

    /// Bring storage, schedule, and count into a consistent state
    ///
    /// The stored count is loaded verbatim first so a catch-up reset
    /// archives the real total of the missed period; only then does the
    /// engine apply its own period check. `default_reset_time` is written
    /// only when no reset time has ever been stored.
    pub fn boot(&mut self, default_reset_time: Option<&str>) -> BootReport {
        if let Some(time) = default_reset_time {
            let store = self.engine.store_mut();
            if !store.kv_mut().exists(StorageKey::ResetTime) && store.set_reset_time(time) {
                tracing::info!(reset_time = time, "applied default reset time");
            }
        }

        let stored_steps = self.engine.restore();
        let report = self.scheduler.start(&mut self.engine);
        let startup = self.engine.initialize();
        tracing::info!(steps = self.engine.count(), ?startup, "pedometer ready");

        BootReport {
            stored_steps,
            caught_up: report.caught_up,
            startup,
            next_reset_ms: report.next_reset_ms,
        }
    }

    /// Negotiate the motion feed; the count keeps working without it
    pub fn activate_sensor<M: MotionSensor + ?Sized>(
        &mut self,
        sensor: &mut M,
        on_sample: SampleHandler,
    ) -> Result<(), StrideError> {
        match activate(sensor, on_sample) {
            Ok(()) => {
                self.sensor = SensorStatus::Listening;
                Ok(())
            }
            Err(e) => {
                self.sensor = match e {
                    MotionError::Unavailable => SensorStatus::Unavailable,
                    MotionError::PermissionDenied => SensorStatus::PermissionDenied,
                };
                Err(e.into())
            }
        }
    }

    pub fn on_sample(&mut self, sample: &AccelerationSample) -> bool {
        self.engine.on_sample(sample)
    }

    /// Deliver the scheduler's wake-up
    pub fn on_wake(&mut self) -> Option<HistoryEntry> {
        self.scheduler.on_wake(&mut self.engine)
    }

    pub fn current_steps(&self) -> u32 {
        self.engine.count()
    }

    pub fn add_observer<F>(&mut self, handler: F) -> ObserverId
    where
        F: FnMut(u32) -> Result<(), ObserverError> + 'static,
    {
        self.engine.add_observer(handler)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.engine.remove_observer(id)
    }

    /// Next reset boundary in epoch milliseconds
    pub fn next_reset_time(&self) -> i64 {
        self.scheduler.next_reset_time(&self.engine)
    }

    /// Validate, persist, and reschedule; `false` leaves everything as it was
    pub fn update_reset_time(&mut self, candidate: &str) -> bool {
        self.scheduler
            .update_reset_time(&mut self.engine, candidate)
    }

    /// Count one step without the sensor
    pub fn add_manual_step(&mut self) -> u32 {
        self.engine.increment()
    }

    /// Archive the current total and start over, as a boundary would
    pub fn reset_now(&mut self) -> HistoryEntry {
        self.scheduler.execute_reset(&mut self.engine)
    }

    /// Archived daily totals, oldest first
    pub fn history(&mut self) -> Vec<HistoryEntry> {
        self.engine.store_mut().load_history()
    }

    pub fn reset_time(&self) -> ResetTime {
        self.engine.reset_time()
    }

    pub fn sensor_status(&self) -> SensorStatus {
        self.sensor
    }

    pub fn status(&self) -> Status {
        let offset = *self.engine.clock().now().offset();
        Status {
            steps: self.current_steps(),
            reset_time: self.reset_time(),
            next_reset: from_epoch_ms(self.next_reset_time(), offset),
            sensor: self.sensor,
            scheduler: self.scheduler.state(),
        }
    }

    /// Disarm the daily reset
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
    }

    pub fn engine(&self) -> &StepEngine<KvStepStore<K>, C> {
        &self.engine
    }

    pub fn scheduler(&self) -> &PeriodScheduler<T> {
        &self.scheduler
    }
}
