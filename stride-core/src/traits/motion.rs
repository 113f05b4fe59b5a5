//! Motion sensor port

use alloc::boxed::Box;
use core::fmt;

use crate::model::AccelerationSample;

/// Callback receiving each sample from the sensor feed
pub type SampleHandler = Box<dyn FnMut(AccelerationSample) + Send>;

/// Errors starting the sample feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// No accelerometer on this platform
    Unavailable,
    /// Access was refused
    PermissionDenied,
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::Unavailable => f.write_str("accelerometer unavailable"),
            MotionError::PermissionDenied => f.write_str("accelerometer permission denied"),
        }
    }
}

/// Source of acceleration samples
///
/// Implementations deliver samples at sensor rate (tens of Hz) through the
/// handler passed to [`start_listening`](MotionSensor::start_listening).
pub trait MotionSensor {
    /// Whether the platform has a usable accelerometer
    fn is_available(&self) -> bool;

    /// Negotiate access
    ///
    /// Platforms that need no explicit grant return `true`.
    fn request_permission(&mut self) -> bool {
        true
    }

    /// Begin delivering samples to `on_sample`
    fn start_listening(&mut self, on_sample: SampleHandler) -> Result<(), MotionError>;

    /// Stop the feed; calling it while stopped is a no-op
    fn stop_listening(&mut self);
}

/// Check availability, negotiate permission, then start the feed
///
/// Kept separate from engine initialization so a caller can sequence
/// permission prompts where its platform needs them.
pub fn activate<M: MotionSensor + ?Sized>(
    sensor: &mut M,
    on_sample: SampleHandler,
) -> Result<(), MotionError> {
    if !sensor.is_available() {
        tracing::warn!("motion sensor unavailable");
        return Err(MotionError::Unavailable);
    }
    if !sensor.request_permission() {
        tracing::warn!("motion sensor permission denied");
        return Err(MotionError::PermissionDenied);
    }
    sensor.start_listening(on_sample)?;
    tracing::info!("motion sensor listening");
    Ok(())
}
