//! Sync window arithmetic.
//!
//! MWS rejects time-range queries whose end is "no later than two minutes
//! before the time that the request was submitted". Every window therefore
//! ends at wall-clock now minus a fixed buffer, and a start that would not be
//! strictly earlier than that end is pulled back by the same buffer.

use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::filter::TimeRange;

/// Default clock-skew buffer in seconds (3 minutes).
pub const CLOCK_SKEW_BUFFER_SECS: i64 = 180;

/// Smallest buffer MWS tolerates.
pub const MIN_CLOCK_SKEW_BUFFER_SECS: i64 = 120;

/// Wall-clock source. Injected so windows can be computed deterministically.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Computes safe query windows for a fixed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    buffer: Duration,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            buffer: Duration::seconds(CLOCK_SKEW_BUFFER_SECS),
        }
    }
}

impl TimeWindow {
    /// Build a window with a custom buffer. Buffers shorter than the MWS
    /// minimum are rejected.
    pub fn with_buffer_secs(secs: i64) -> Result<Self, crate::OrdersError> {
        if secs < MIN_CLOCK_SKEW_BUFFER_SECS {
            return Err(crate::OrdersError::Config(format!(
                "clock skew buffer must be >= {MIN_CLOCK_SKEW_BUFFER_SECS}s, got {secs}s"
            )));
        }
        Ok(Self {
            buffer: Duration::seconds(secs),
        })
    }

    pub fn buffer(&self) -> Duration {
        self.buffer
    }

    /// Current UTC time minus the buffer.
    pub fn now(&self, clock: &dyn Clock) -> DateTime<Utc> {
        clock.now_utc() - self.buffer
    }

    /// Returns `from` unchanged when it is strictly before `now`; otherwise
    /// clamps it to `now - buffer`. Never fails.
    pub fn validate(&self, from: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        if from >= now {
            now - self.buffer
        } else {
            from
        }
    }

    /// `[validate(from, now), now)` for the current instant.
    ///
    /// Both ends are truncated to whole seconds first, matching the wire
    /// timestamp format, so the comparison runs on the values that are sent.
    pub fn range(&self, from: DateTime<Utc>, clock: &dyn Clock) -> TimeRange {
        let now = self.now(clock).trunc_subsecs(0);
        let from = self.validate(from.trunc_subsecs(0), now);
        // buffer is whole seconds, so from < now still holds after validate()
        TimeRange::from_validated(from, now)
    }
}
