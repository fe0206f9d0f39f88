//! Frame identifiers and the clock that produces them.
//!
//! A [`FrameId`] is only ever used as a cache key: two queries that carry the
//! same id observe the same slot state. The engine never generates frame ids
//! itself; callers thread them through every call, either from their own tick
//! counter or from a [`FrameClock`].

use std::fmt;
use std::time::Instant;

/// Opaque, totally ordered identifier of one logical tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameId(pub u64);

impl FrameId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for FrameId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Monotonic elapsed-milliseconds clock.
///
/// Two reads inside the same millisecond yield the same [`FrameId`], which is
/// exactly the "same frame" notion the slot trackers gate on.
#[derive(Debug, Clone)]
pub struct FrameClock {
    started: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Milliseconds since [`FrameClock::start`], as a frame id.
    pub fn now(&self) -> FrameId {
        let elapsed = self.started.elapsed().as_millis();
        FrameId(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::start()
    }
}
