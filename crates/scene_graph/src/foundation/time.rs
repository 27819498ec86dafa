//! Logical time used for modification tracking
//!
//! Timestamps are ticks of a per-graph counter, not wall-clock time. Every
//! call to [`LogicalClock::tick`] returns a value strictly greater than all
//! earlier ones, which makes staleness checks a single comparison.

use std::fmt;

/// A point in logical time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeStamp(u64);

impl TimeStamp {
    /// The timestamp older than every tick of any clock
    pub const ZERO: TimeStamp = TimeStamp(0);

    /// Raw counter value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Monotonic counter handing out [`TimeStamp`]s
#[derive(Debug, Default)]
pub struct LogicalClock {
    current: u64,
}

impl LogicalClock {
    /// Create a clock whose first tick is `t1`
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock and return the new "now"
    pub fn tick(&mut self) -> TimeStamp {
        self.current += 1;
        TimeStamp(self.current)
    }

    /// Latest timestamp handed out, without advancing
    pub fn now(&self) -> TimeStamp {
        TimeStamp(self.current)
    }
}
