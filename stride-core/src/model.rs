//! Records the pedometer produces and persists

use alloc::string::String;

use serde::{Deserialize, Serialize};

/// Maximum archived daily totals kept in history
pub const MAX_HISTORY: usize = 30;

/// One raw accelerometer reading (m/s²)
///
/// Produced by the motion sensor and consumed immediately; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelerationSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AccelerationSample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean norm of the three axes
    ///
    /// Classification compares this against the squared threshold, which
    /// keeps the crate free of floating-point `sqrt`.
    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// True iff the Euclidean norm is strictly above `threshold`
    pub fn exceeds(&self, threshold: f32) -> bool {
        let m2 = self.magnitude_squared();
        if threshold < 0.0 {
            return !m2.is_nan();
        }
        m2 > threshold * threshold
    }
}

/// Latest persisted step count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepRecord {
    /// Steps counted in the period the record was written in
    pub steps: u32,
    /// Epoch milliseconds of the write
    pub timestamp: i64,
}

impl StepRecord {
    /// Build a record, flooring a negative count at zero
    pub fn new(count: i64, timestamp: i64) -> Self {
        Self {
            steps: count.clamp(0, u32::MAX as i64) as u32,
            timestamp: timestamp.max(0),
        }
    }
}

/// Archived total for one finished period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub steps: u32,
    /// ISO-8601 instant the period was closed, e.g. `2024-01-01T16:00:00.000Z`
    pub date: String,
}

impl HistoryEntry {
    pub fn new(steps: u32, date: impl Into<String>) -> Self {
        Self {
            steps,
            date: date.into(),
        }
    }
}
