//! Error taxonomy
//!
//! None of these are fatal to the core. Sensor errors freeze the count at
//! its last value, storage errors fall back to defaults or in-memory state,
//! and an invalid reset time is rejected before anything is written.

use core::fmt;

use stride_hal::StorageError;

use crate::traits::MotionError;

/// Errors surfaced by core operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrideError {
    /// Motion sensor capability check failed
    SensorUnavailable,
    /// User or platform refused sensor access
    PermissionDenied,
    /// Persisted record missing, unreadable, or malformed
    StorageRead(StorageError),
    /// Persisted record could not be written
    StorageWrite(StorageError),
    /// Reset time is not strict `HH:MM`
    InvalidResetTime,
}

impl From<MotionError> for StrideError {
    fn from(e: MotionError) -> Self {
        match e {
            MotionError::Unavailable => StrideError::SensorUnavailable,
            MotionError::PermissionDenied => StrideError::PermissionDenied,
        }
    }
}

impl fmt::Display for StrideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrideError::SensorUnavailable => f.write_str("motion sensor unavailable"),
            StrideError::PermissionDenied => f.write_str("motion sensor permission denied"),
            StrideError::StorageRead(e) => write!(f, "storage read failed: {e}"),
            StrideError::StorageWrite(e) => write!(f, "storage write failed: {e}"),
            StrideError::InvalidResetTime => f.write_str("reset time must be HH:MM (00:00-23:59)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_errors_map() {
        assert_eq!(
            StrideError::from(MotionError::Unavailable),
            StrideError::SensorUnavailable
        );
        assert_eq!(
            StrideError::from(MotionError::PermissionDenied),
            StrideError::PermissionDenied
        );
    }
}
