//! Polar interpolation of complex samples.
//!
//! Spectral bins are interpolated as (magnitude, phase) pairs: magnitude
//! linearly, phase along the shortest arc. Linear interpolation of real and
//! imaginary parts would pull the result toward zero between bins of opposite
//! phase, and a naive phase average breaks at the +/-pi seam.

use std::f64::consts::{PI, TAU};

use num_complex::Complex64;

/// Interpolate from `phase1` toward `phase2` along the shortest arc.
///
/// The difference is taken modulo 2*pi and mapped into `(-pi, pi]` before
/// weighting, so `interpolate_phase(179 deg, -179 deg, 0.5)` is 180 deg, not 0.
/// The result is not wrapped back into `(-pi, pi]`.
pub fn interpolate_phase(phase1: f64, phase2: f64, weight: f64) -> f64 {
    let mut delta = (phase2 - phase1).rem_euclid(TAU);
    if delta > PI {
        delta -= TAU;
    }
    phase1 + weight * delta
}

/// Polar interpolation between two samples; `weight = 0` yields `a`.
pub fn polar_lerp(a: Complex64, b: Complex64, weight: f64) -> Complex64 {
    let magnitude = a.norm() + weight * (b.norm() - a.norm());
    Complex64::from_polar(magnitude, interpolate_phase(a.arg(), b.arg(), weight))
}

/// Polar bilinear interpolation over a 2x2 neighborhood.
///
/// `p00`/`p10` are the top neighbors (left/right), `p01`/`p11` the bottom ones.
pub fn polar_bilinear(
    p00: Complex64,
    p10: Complex64,
    p01: Complex64,
    p11: Complex64,
    fx: f64,
    fy: f64,
) -> Complex64 {
    let top = polar_lerp(p00, p10, fx);
    let bottom = polar_lerp(p01, p11, fx);
    polar_lerp(top, bottom, fy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn deg(d: f64) -> f64 {
        d.to_radians()
    }

    #[test]
    fn test_wraparound_takes_shortest_arc() {
        let mid = interpolate_phase(deg(179.0), deg(-179.0), 0.5);
        assert_abs_diff_eq!(mid.abs(), PI, epsilon = 1e-9);
        // a naive average would land at zero
        assert!(mid.cos() < -0.99);
    }

    #[test]
    fn test_plain_interpolation() {
        assert_abs_diff_eq!(interpolate_phase(deg(10.0), deg(50.0), 0.25), deg(20.0), epsilon = 1e-12);
        assert_abs_diff_eq!(interpolate_phase(deg(-170.0), deg(170.0), 0.5), deg(-180.0), epsilon = 1e-12);
        assert_abs_diff_eq!(interpolate_phase(1.0, 2.0, 0.0), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_polar_lerp() {
        let a = Complex64::from_polar(1.0, deg(179.0));
        let b = Complex64::from_polar(3.0, deg(-179.0));
        let mid = polar_lerp(a, b, 0.5);
        assert_abs_diff_eq!(mid.norm(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.re, -2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mid.im, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polar_bilinear_corners() {
        let p = [
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 2.0),
            Complex64::new(-3.0, 0.0),
            Complex64::new(0.0, -4.0),
        ];
        let at = |fx, fy| polar_bilinear(p[0], p[1], p[2], p[3], fx, fy);
        for (value, expected) in [(at(0.0, 0.0), p[0]), (at(1.0, 0.0), p[1]), (at(0.0, 1.0), p[2]), (at(1.0, 1.0), p[3])] {
            assert_abs_diff_eq!(value.re, expected.re, epsilon = 1e-12);
            assert_abs_diff_eq!(value.im, expected.im, epsilon = 1e-12);
        }
    }
}
