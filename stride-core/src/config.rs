//! Step classification configuration

use serde::{Deserialize, Serialize};

/// Default magnitude cutoff in m/s²
///
/// Gravity alone reads ~9.81, so a resting device never crosses it.
pub const DEFAULT_STEP_THRESHOLD: f32 = 12.0;

/// Default minimum gap between two accepted steps
pub const DEFAULT_DEBOUNCE_MS: u32 = 300;

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct EngineConfig {
    /// Acceleration magnitude a sample must exceed to count as a step (m/s²)
    pub step_threshold: f32,
    /// Minimum milliseconds between two accepted steps
    pub debounce_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_threshold: DEFAULT_STEP_THRESHOLD,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl EngineConfig {
    /// Replace non-finite or negative values with defaults
    pub fn sanitized(self) -> Self {
        let step_threshold = if self.step_threshold.is_finite() && self.step_threshold >= 0.0 {
            self.step_threshold
        } else {
            DEFAULT_STEP_THRESHOLD
        };
        Self {
            step_threshold,
            debounce_ms: self.debounce_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_keeps_valid() {
        let cfg = EngineConfig {
            step_threshold: 10.5,
            debounce_ms: 250,
        };
        assert_eq!(cfg.sanitized(), cfg);
    }

    #[test]
    fn test_sanitized_replaces_nan() {
        let cfg = EngineConfig {
            step_threshold: f32::NAN,
            debounce_ms: 250,
        }
        .sanitized();
        assert_eq!(cfg.step_threshold, DEFAULT_STEP_THRESHOLD);
        assert_eq!(cfg.debounce_ms, 250);
    }
}
