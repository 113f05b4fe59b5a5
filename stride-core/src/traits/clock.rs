//! Time source

use alloc::rc::Rc;
use core::cell::Cell;

use chrono::{DateTime, FixedOffset};

use crate::schedule::from_epoch_ms;

/// Source of "now"
///
/// The offset of the returned instant is the local zone used for reset
/// boundaries.
pub trait Clock {
    /// Current instant in the local offset
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current instant in epoch milliseconds
    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same time, so a test can keep a handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Rc<Cell<i64>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Start at `now_ms` in the given offset
    pub fn new(now_ms: i64, offset: FixedOffset) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(now_ms)),
            offset,
        }
    }

    /// Start at `at`, keeping its offset
    pub fn at(at: DateTime<FixedOffset>) -> Self {
        Self::new(at.timestamp_millis(), *at.offset())
    }

    pub fn set(&self, at: DateTime<FixedOffset>) {
        self.now_ms.set(at.timestamp_millis());
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        from_epoch_ms(self.now_ms.get(), self.offset)
    }

    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let clock = ManualClock::new(1_000, FixedOffset::east_opt(0).unwrap());
        let handle = clock.clone();
        handle.advance_ms(500);
        assert_eq!(clock.now_ms(), 1_500);
        assert_eq!(clock.now().timestamp_millis(), 1_500);
    }
}
