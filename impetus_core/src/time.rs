// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time, timebase conversion and signed deltas.
//!
//! [`HostTime`] is a point on a monotonic clock. Hosts receive it in
//! platform-native ticks; an [`AnimationHost`](crate::host::AnimationHost)
//! converts incoming ticks to nanoseconds with its [`Timebase`] before any
//! animation sees them, so every `HostTime` inside the engine is in
//! nanoseconds.
//!
//! [`TimeDelta`] is a signed nanosecond span. Animation bookkeeping needs the
//! sign: a negative `time_offset` delays an animation, and curve-relative
//! times can fall before zero.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A point in time on a monotonic clock.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Creates a nanosecond time from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms.saturating_mul(1_000_000))
    }

    /// Converts this host time to nanoseconds using the given timebase.
    ///
    /// Uses `u128` intermediate arithmetic to avoid overflow.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        let wide = self.0 as u128 * timebase.numer as u128 / timebase.denom as u128;
        wide as u64
    }

    /// Returns the signed span from `earlier` to `self`.
    #[inline]
    #[must_use]
    pub const fn delta_since(self, earlier: Self) -> TimeDelta {
        TimeDelta::between(earlier.0, self.0)
    }

    /// Adds a signed delta, saturating at both ends of the clock.
    #[inline]
    #[must_use]
    pub const fn saturating_add_delta(self, delta: TimeDelta) -> Self {
        if delta.0 >= 0 {
            Self(self.0.saturating_add(delta.0.unsigned_abs()))
        } else {
            Self(self.0.saturating_sub(delta.0.unsigned_abs()))
        }
    }
}

impl Add<TimeDelta> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: TimeDelta) -> Self {
        self.saturating_add_delta(rhs)
    }
}

impl Sub<TimeDelta> for HostTime {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: TimeDelta) -> Self {
        self.saturating_add_delta(-rhs)
    }
}

impl Sub for HostTime {
    type Output = TimeDelta;

    #[inline]
    fn sub(self, rhs: Self) -> TimeDelta {
        self.delta_since(rhs)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from ticks to nanoseconds.
///
/// `nanoseconds = ticks * numer / denom`
///
/// This matches the `mach_timebase_info` pattern on macOS.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Timebase {
    /// A timebase where ticks are already nanoseconds (1:1).
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// A timebase where ticks are microseconds.
    pub const MICROS: Self = Self {
        numer: 1_000,
        denom: 1,
    };

    /// Creates a new timebase with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts a host tick reading into engine (nanosecond) time.
    #[inline]
    #[must_use]
    pub const fn to_engine_time(self, ticks: HostTime) -> HostTime {
        HostTime(self.ticks_to_nanos(ticks.0))
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A signed span of time in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeDelta(pub i64);

impl TimeDelta {
    /// A zero-length delta.
    pub const ZERO: Self = Self(0);

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> i64 {
        self.0
    }

    /// Creates a delta from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms.saturating_mul(1_000_000))
    }

    /// Creates a delta from whole microseconds.
    #[inline]
    #[must_use]
    pub const fn from_micros(us: i64) -> Self {
        Self(us.saturating_mul(1_000))
    }

    /// Creates a delta from fractional seconds, rounding to the nearest
    /// nanosecond. Non-finite input maps to zero.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float-to-int `as` saturates; out-of-range spans clamp to the i64 limits"
    )]
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() {
            return Self::ZERO;
        }
        Self(libm::round(secs * NANOS_PER_SEC as f64) as i64)
    }

    /// Returns the delta in fractional seconds.
    ///
    /// Whole seconds and the sub-second remainder are converted separately so
    /// that very long spans keep their fractional part.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        let whole = self.0 / NANOS_PER_SEC;
        let frac = self.0 % NANOS_PER_SEC;
        whole as f64 + frac as f64 / NANOS_PER_SEC as f64
    }

    /// Returns `true` if the delta is strictly negative.
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Signed span from `from` to `to`, both in nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "spans beyond i64 nanoseconds (~292 years) are clamped first"
    )]
    const fn between(from: u64, to: u64) -> Self {
        if to >= from {
            let d = to - from;
            if d > i64::MAX as u64 {
                Self(i64::MAX)
            } else {
                Self(d as i64)
            }
        } else {
            let d = from - to;
            if d > i64::MAX as u64 {
                Self(i64::MIN)
            } else {
                Self(-(d as i64))
            }
        }
    }
}

impl Add for TimeDelta {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl AddAssign for TimeDelta {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(rhs);
    }
}

impl Sub for TimeDelta {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl Neg for TimeDelta {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl fmt::Debug for TimeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeDelta({}ns)", self.0)
    }
}
