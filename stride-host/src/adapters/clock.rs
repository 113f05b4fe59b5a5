//! Wall clock in the machine's local offset

use chrono::{DateTime, FixedOffset, Local};
use stride_core::Clock;

/// Reads the system clock on every call
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}
