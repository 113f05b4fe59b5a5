//! Single-shot wake-up port

/// One outstanding wake-up at a time
///
/// When the delay elapses the platform delivers a wake event to whoever
/// owns the scheduler; the timer itself carries no callback so core types
/// never cross threads.
pub trait WakeTimer {
    /// Arm a wake-up `delay_ms` from now, replacing any pending one
    fn arm(&mut self, delay_ms: u64);

    /// Cancel the pending wake-up, if any
    fn cancel(&mut self);

    /// Whether a wake-up is pending
    fn is_armed(&self) -> bool;
}

/// Timer that records requests instead of firing
///
/// The test (or a simulation loop) decides when a wake-up happens.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManualTimer {
    pending: Option<u64>,
    arms: u32,
    cancels: u32,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay of the pending wake-up
    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    /// Number of `arm` calls so far
    pub fn arm_count(&self) -> u32 {
        self.arms
    }

    /// Number of `cancel` calls that dropped a pending wake-up
    pub fn cancel_count(&self) -> u32 {
        self.cancels
    }

    /// Consume the pending wake-up as if it fired
    pub fn fire(&mut self) -> Option<u64> {
        self.pending.take()
    }
}

impl WakeTimer for ManualTimer {
    fn arm(&mut self, delay_ms: u64) {
        self.pending = Some(delay_ms);
        self.arms += 1;
    }

    fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.cancels += 1;
        }
    }

    fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}
