//! Platform-agnostic core logic for the Stride pedometer
//!
//! This crate contains everything that decides what the step count is,
//! independent of where samples come from or where state is stored:
//!
//! - Port traits (clock, motion sensor, wake timer, step store)
//! - Step classification with debounce ([`engine::StepEngine`])
//! - Daily reset scheduling and catch-up ([`period::PeriodScheduler`])
//! - Reset boundary math shared by both ([`schedule`])
//! - Observer fan-out for count changes
//! - Typed persistence over a [`stride_hal::KeyValueStore`]

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod observer;
pub mod period;
pub mod schedule;
pub mod storage;
pub mod traits;

pub use config::EngineConfig;
pub use engine::StepEngine;
pub use error::StrideError;
pub use model::{AccelerationSample, HistoryEntry, StepRecord, MAX_HISTORY};
pub use observer::{ObserverError, ObserverId, ObserverList};
pub use period::{PeriodScheduler, SchedulerEvent, SchedulerState};
pub use schedule::ResetTime;
pub use storage::{KvStepStore, MemoryStore};
pub use traits::{Clock, MotionError, MotionSensor, StepStore, WakeTimer};
