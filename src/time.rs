//! Host time abstractions used by the calibration procedure

use core::ops::Add;

#[cfg(feature = "defmt")]
use defmt::Format;

/// A source of monotonic time
///
/// The calibration deadline is measured against this clock, so it must never
/// jump backwards; wall clocks that can be adjusted at runtime are not
/// suitable. Wrap-around of the underlying counter is fine, as
/// [`Instant::duration_since`] is wrap-tolerant.
pub trait Monotonic {
    /// Returns the current instant
    fn now(&mut self) -> Instant;
}

/// Represents an instant in host time
///
/// Internally a microsecond count since an arbitrary, fixed epoch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Instant(u64);

impl Instant {
    /// Creates a new instance of `Instant` from a microsecond count
    pub const fn from_micros(value: u64) -> Self {
        Instant(value)
    }

    /// Returns the raw microsecond count
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the amount of time passed between the two `Instant`s
    ///
    /// Assumes that `&self` represents a later time than the argument
    /// `earlier`. Please make sure that this is the case, as this method has
    /// no way of knowing (the underlying counter can wrap, so comparing the
    /// numerical values doesn't tell anything about order).
    ///
    /// # Example
    ///
    /// ``` rust
    /// use as3935_ng::time::Instant;
    ///
    /// let instant_1 = Instant::from_micros(u64::MAX - 50);
    /// let instant_2 = Instant::from_micros(49);
    ///
    /// // Works as expected, even though the later timestamp is the
    /// // numerically smaller value.
    /// let duration = instant_2.duration_since(instant_1);
    /// assert_eq!(duration.as_micros(), 100);
    /// ```
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        Duration(self.0.wrapping_sub(earlier.0))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Self::Output {
        Instant(self.0.wrapping_add(rhs.0))
    }
}

/// A duration between two instants in host time
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Duration(u64);

impl Duration {
    /// Creates a new instance of `Duration` from a microsecond count
    pub const fn from_micros(value: u64) -> Self {
        Duration(value)
    }

    /// Creates a new instance of `Duration` from a millisecond count
    ///
    /// # Example
    ///
    /// ``` rust
    /// use as3935_ng::time::Duration;
    ///
    /// assert_eq!(Duration::from_millis(1).as_micros(), 1000);
    /// ```
    pub const fn from_millis(value: u64) -> Self {
        Duration(value * 1000)
    }

    /// Returns the raw microsecond count
    pub const fn as_micros(&self) -> u64 {
        self.0
    }
}
