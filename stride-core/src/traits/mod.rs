//! Port traits
//!
//! These traits define the boundary between the pedometer logic and the
//! platform it runs on. Everything the core needs from the outside world
//! (time, samples, wake-ups, durable state) goes through one of them.

pub mod clock;
pub mod motion;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock};
pub use motion::{activate, MotionError, MotionSensor, SampleHandler};
pub use store::StepStore;
pub use timer::{ManualTimer, WakeTimer};
