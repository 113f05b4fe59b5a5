//! Platform implementations of the core ports

pub mod clock;
pub mod file_store;
pub mod replay;
pub mod timer;

pub use clock::SystemClock;
pub use file_store::FileStore;
pub use replay::{parse_samples, NoSensor, ReplaySensor, ReplaySample};
pub use timer::{TokioWakeTimer, WakeSignal};
