//! Desktop runtime for the Stride pedometer
//!
//! Supplies the platform half of the core's ports and wires them
//! together:
//!
//! ```text
//!  replay file ──► ReplaySensor ──┐
//!                                 │ samples
//!  stdin ──► console ── commands ─┼──► Runtime ──► Pedometer ──► FileStore
//!                                 │ wake-ups        (engine +     (data dir)
//!  tokio clock ──► TokioWakeTimer ┘                  scheduler)
//! ```

pub mod adapters;
pub mod config;
pub mod console;
pub mod pedometer;
pub mod runtime;

pub use config::HostConfig;
pub use pedometer::{BootReport, Pedometer, SensorStatus, Status};
pub use runtime::{Command, Runtime};
