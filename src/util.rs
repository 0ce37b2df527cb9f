//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: Float> Interval<T> {
    /// Restricts a value to the interval.
    /// Unlike `f64::clamp`, a NaN input saturates to `min`.
    pub fn clamp(&self, value: T) -> T {
        if value > self.max {
            self.max
        } else if value >= self.min {
            value
        } else {
            self.min
        }
    }

    pub fn inv_lerp(&self, value: T) -> T {
        (value - self.min) / (self.max - self.min)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// Iterates over `0..count`, starting at `start` and wrapping around.
pub fn rotated_range(count: usize, start: usize) -> impl Iterator<Item = usize> {
    (0..count)
        .map(move |i| i + start)
        .map(move |i| if i >= count { i - count } else { i })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clamp_saturates() {
        let range = Interval::new(-12.0, 3.0);
        assert_eq!(range.clamp(5.0), 3.0);
        assert_eq!(range.clamp(-20.0), -12.0);
        assert_eq!(range.clamp(1.5), 1.5);
        assert_eq!(range.clamp(f64::NAN), -12.0);
    }

    #[test]
    fn rotated_range_wraps() {
        let idxs = rotated_range(4, 2).collect::<Vec<_>>();
        assert_eq!(idxs, vec![2, 3, 0, 1]);
    }
}
