//! Daily reset boundary math
//!
//! A boundary is the instant each day at which the counting period rolls
//! over, given by a wall-clock `HH:MM`. The engine and the scheduler both
//! derive period membership from these functions so they can never
//! disagree about which day a record belongs to.
//!
//! Wall-clock time is interpreted in the offset carried by `now`, so a
//! caller decides the local zone once (via its [`Clock`](crate::Clock)) and
//! every computation below is pure.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveTime, SecondsFormat, TimeDelta, Utc};

use crate::error::StrideError;

/// Milliseconds in one period
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Validated daily reset time
///
/// Only strict `HH:MM` is accepted: two-digit hour `00`-`23`, a colon, and
/// two-digit minute `00`-`59`. No seconds, no other separators, no padding
/// shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetTime {
    hour: u8,
    minute: u8,
}

impl ResetTime {
    /// Midnight, used whenever nothing valid is stored
    pub const MIDNIGHT: ResetTime = ResetTime { hour: 0, minute: 0 };

    /// Build from components, rejecting out-of-range values
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Parse strict `HH:MM`
    pub fn parse(text: &str) -> Result<Self, StrideError> {
        let &[h1, h2, b':', m1, m2] = text.as_bytes() else {
            return Err(StrideError::InvalidResetTime);
        };
        let hour = match (h1, h2) {
            (b'0'..=b'1', b'0'..=b'9') | (b'2', b'0'..=b'3') => (h1 - b'0') * 10 + (h2 - b'0'),
            _ => return Err(StrideError::InvalidResetTime),
        };
        let minute = match (m1, m2) {
            (b'0'..=b'5', b'0'..=b'9') => (m1 - b'0') * 10 + (m2 - b'0'),
            _ => return Err(StrideError::InvalidResetTime),
        };
        Ok(Self { hour, minute })
    }

    /// Check a candidate without keeping the result
    pub fn is_valid(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    fn as_naive(&self) -> NaiveTime {
        // hour < 24 and minute < 60 are invariants of the type
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for ResetTime {
    type Err = StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Today's boundary in `now`'s offset, regardless of which side of it `now` is
fn same_day_boundary(reset: ResetTime, now: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let offset = *now.offset();
    let local = now.date_naive().and_time(reset.as_naive());
    let utc = local - TimeDelta::seconds(offset.local_minus_utc() as i64);
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// First boundary strictly after `now`
///
/// A `now` exactly on the boundary counts as already past, so the result
/// moves to the following day.
pub fn next_boundary(reset: ResetTime, now: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let candidate = same_day_boundary(reset, now);
    if candidate <= *now {
        candidate + TimeDelta::milliseconds(DAY_MS)
    } else {
        candidate
    }
}

/// Most recent boundary at or before `now`
///
/// Always equal to `next_boundary(reset, now) - 24h`.
pub fn last_boundary(reset: ResetTime, now: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let candidate = same_day_boundary(reset, now);
    if candidate > *now {
        candidate - TimeDelta::milliseconds(DAY_MS)
    } else {
        candidate
    }
}

/// [`next_boundary`] in epoch milliseconds
pub fn next_boundary_ms(reset: ResetTime, now: &DateTime<FixedOffset>) -> i64 {
    next_boundary(reset, now).timestamp_millis()
}

/// [`last_boundary`] in epoch milliseconds
pub fn last_boundary_ms(reset: ResetTime, now: &DateTime<FixedOffset>) -> i64 {
    last_boundary(reset, now).timestamp_millis()
}

/// True iff `timestamp_ms` falls in the period containing `now`
pub fn is_within_period(reset: ResetTime, now: &DateTime<FixedOffset>, timestamp_ms: i64) -> bool {
    timestamp_ms >= last_boundary_ms(reset, now)
}

/// Convert epoch milliseconds into an instant in `offset`
///
/// Out-of-range values clamp to the Unix epoch.
pub fn from_epoch_ms(ms: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::from_timestamp_millis(ms)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&offset)
}

/// Render as UTC ISO-8601 with millisecond precision (`...T16:00:00.000Z`)
pub fn iso_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
