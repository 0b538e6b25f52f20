//! Wall-clock time model.
//!
//! # Design
//!
//! The engine is pull-driven: callers pass the current wall-clock time into
//! every operation and the engine never reads a clock itself.  Time is a
//! `Timestamp` holding integer milliseconds since the Unix epoch (the unit
//! browser clients report), so differences are exact and comparisons are
//! O(1).  Conversions to fractional seconds happen only at the point where a
//! distance is computed from a speed.

use std::fmt;

/// Milliseconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_millis(ms: i64) -> Self {
        Timestamp(ms)
    }

    /// Whole seconds since the epoch.
    #[inline]
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1_000)
    }

    /// Fractional seconds, rounded to the nearest millisecond.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        Timestamp((secs * 1_000.0).round() as i64)
    }

    /// Current system time.  Only binaries call this; the engine itself is
    /// always handed `now` explicitly.
    pub fn now() -> Self {
        let ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Timestamp(ms)
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Signed seconds elapsed from `earlier` to `self`.  Negative when
    /// `earlier` is later than `self`.
    #[inline]
    pub fn secs_since(self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0) as f64 / 1_000.0
    }

    /// Return the timestamp `secs` seconds after `self`.
    #[inline]
    pub fn plus_secs(self, secs: f64) -> Timestamp {
        Timestamp(self.0 + (secs * 1_000.0).round() as i64)
    }
}

impl std::ops::Add<i64> for Timestamp {
    type Output = Timestamp;
    /// Add milliseconds.
    #[inline]
    fn add(self, rhs: i64) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

impl std::ops::Sub for Timestamp {
    type Output = i64;
    /// Milliseconds between two timestamps.
    #[inline]
    fn sub(self, rhs: Timestamp) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
