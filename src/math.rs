//! Angular and planar helpers for positions on the ring.

use cgmath::Point2;
use std::f64::consts::TAU;

/// A 2D point
pub type Point2d = Point2<f64>;

/// The forward angular distance from `from` to `to`, wrapped into `(0, 2π]`.
///
/// Coincident angles are a full lap apart, not zero.
pub fn wrapped_gap(from: f64, to: f64) -> f64 {
    let gap = to - from;
    if gap <= 0.0 {
        gap + TAU
    } else {
        gap
    }
}

/// Normalizes an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let angle = angle.rem_euclid(TAU);
    // `rem_euclid` may round up to exactly 2π for tiny negative inputs
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

/// The world space point at `angle` on a circle of the given `radius` centred on the origin.
pub fn polar(radius: f64, angle: f64) -> Point2d {
    Point2d::new(radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn gap_wraps_around_zero() {
        assert_approx_eq!(wrapped_gap(0.5, 1.5), 1.0);
        assert_approx_eq!(wrapped_gap(TAU - 0.25, 0.25), 0.5);
        assert_eq!(wrapped_gap(1.0, 1.0), TAU);
    }

    #[test]
    fn normalize_stays_in_range() {
        assert_approx_eq!(normalize_angle(TAU + 0.5), 0.5);
        assert_approx_eq!(normalize_angle(-0.5), TAU - 0.5);
        assert_eq!(normalize_angle(-1e-20), 0.0);
        assert!(normalize_angle(-1e-20) < TAU);
    }

    #[test]
    fn polar_lies_on_the_circle() {
        let top = polar(5.5, std::f64::consts::FRAC_PI_2);
        assert_approx_eq!(top.x, 0.0);
        assert_approx_eq!(top.y, 5.5);
        let p = polar(2.0, 4.0);
        assert_approx_eq!((p.x * p.x + p.y * p.y).sqrt(), 2.0);
    }
}
