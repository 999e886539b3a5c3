//! Resampling rotators.
//!
//! The spectrum is centered with `fft_shift`, every destination bin is mapped
//! back through the inverse rotation to a (fractional) source position, the
//! source is sampled there and the result is shifted back with `ifft_shift`.
//! Source positions outside the plane wrap around, since a discrete spectrum
//! is periodic.
//!
//! Rotating the spectrum about DC rotates the image about pixel `(0, 0)`, so
//! the image is first moved to put `(w/2, h/2)` on the origin and moved back
//! afterwards.

use std::f64::consts::PI;

use ndarray::{Array2, Zip};
use num_complex::Complex64;
use tracing::debug;

use super::interpolate::polar_bilinear;
use super::{check_angle, is_negligible, reduce_degrees};
use crate::complex::ComplexPlane;
use crate::error::Result;
use crate::fourier::{fft_shift, ifft_shift, translate_spectrum};
use crate::window::hamming_centered;

/// Inverse rotation about the center bin of a shifted spectrum.
#[derive(Debug, Clone, Copy)]
struct InverseRotation {
    cos: f64,
    sin: f64,
    cx: f64,
    cy: f64,
}

impl InverseRotation {
    fn new(degrees: f64, width: usize, height: usize) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            cos,
            sin,
            cx: (width / 2) as f64,
            cy: (height / 2) as f64,
        }
    }

    /// Source position `R(-angle) * (u, v)` for destination bin `(x, y)`.
    fn source(&self, x: usize, y: usize) -> (f64, f64) {
        let u = x as f64 - self.cx;
        let v = y as f64 - self.cy;
        (
            self.cx + u * self.cos + v * self.sin,
            self.cy - u * self.sin + v * self.cos,
        )
    }
}

/// Wrap an index into `0..n`.
fn fit_to_cycle(i: isize, n: usize) -> usize {
    i.rem_euclid(n as isize) as usize
}

fn resample<F>(plane: &ComplexPlane, degrees: f64, sample: F) -> Result<ComplexPlane>
where
    F: Fn(&Array2<Complex64>, f64, f64) -> Complex64 + Sync,
{
    check_angle(degrees)?;
    let reduced = reduce_degrees(degrees);
    if is_negligible(reduced) {
        debug!(degrees, "rotation below threshold, copying");
        return Ok(plane.clone());
    }
    let (w, h) = plane.dims();
    let rotation = InverseRotation::new(reduced, w, h);
    let (cx, cy) = (rotation.cx, rotation.cy);
    let centered = fft_shift(&translate_spectrum(plane, -cx, -cy));
    let src = centered.array();

    let mut out = Array2::zeros((h, w));
    Zip::indexed(&mut out).par_for_each(|(y, x), value| {
        let (sx, sy) = rotation.source(x, y);
        *value = sample(src, sx, sy);
    });
    let rotated = ifft_shift(&ComplexPlane::from_array(out)?);
    Ok(translate_spectrum(&rotated, cx, cy))
}

/// Copy the nearest source bin.
pub fn rotate_nearest_neighbor(plane: &ComplexPlane, degrees: f64) -> Result<ComplexPlane> {
    resample(plane, degrees, |src, sx, sy| {
        let (h, w) = src.dim();
        src[[
            fit_to_cycle(sy.round() as isize, h),
            fit_to_cycle(sx.round() as isize, w),
        ]]
    })
}

/// Polar bilinear interpolation of the four neighboring bins.
pub fn rotate_bilinear(plane: &ComplexPlane, degrees: f64) -> Result<ComplexPlane> {
    resample(plane, degrees, |src, sx, sy| {
        let (h, w) = src.dim();
        let (x0, y0) = (sx.floor(), sy.floor());
        let (fx, fy) = (sx - x0, sy - y0);
        let (x0, y0) = (x0 as isize, y0 as isize);
        let at = |x: isize, y: isize| src[[fit_to_cycle(y, h), fit_to_cycle(x, w)]];
        polar_bilinear(
            at(x0, y0),
            at(x0 + 1, y0),
            at(x0, y0 + 1),
            at(x0 + 1, y0 + 1),
            fx,
            fy,
        )
    })
}

fn sinc(t: f64) -> f64 {
    if t.abs() < 1e-12 {
        1.0
    } else {
        let p = PI * t;
        p.sin() / p
    }
}

/// Windowed sinc weights of every bin along an axis of length `n` for a
/// sample at position `s`. Offsets are taken on the cycle.
fn kernel(s: f64, n: usize) -> Vec<f64> {
    let len = n as f64;
    let half = len / 2.0;
    (0..n)
        .map(|i| {
            let d = s - i as f64;
            let d = d - len * (d / len).round();
            sinc(d) * hamming_centered(d, half)
        })
        .collect()
}

/// Separable Hamming-windowed sinc interpolation over the whole plane,
/// normalized by the kernel weight sum.
pub fn rotate_sinc(plane: &ComplexPlane, degrees: f64) -> Result<ComplexPlane> {
    resample(plane, degrees, |src, sx, sy| {
        let (h, w) = src.dim();
        let kx = kernel(sx, w);
        let ky = kernel(sy, h);
        let mut acc = Complex64::new(0.0, 0.0);
        for (row, &wy) in src.rows().into_iter().zip(ky.iter()) {
            if wy == 0.0 {
                continue;
            }
            let along: Complex64 = row.iter().zip(kx.iter()).map(|(v, &wx)| *v * wx).sum();
            acc += along * wy;
        }
        let norm = kx.iter().sum::<f64>() * ky.iter().sum::<f64>();
        if norm.abs() > 1e-12 {
            acc / norm
        } else {
            acc
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::fft2;
    use approx::assert_abs_diff_eq;

    fn spectrum(width: usize, height: usize) -> ComplexPlane {
        fft2(
            &ComplexPlane::from_fn(width, height, |x, y| {
                Complex64::new(((x * 7 + y * 13) % 11) as f64 + (x as f64 * 0.3).sin(), 0.0)
            })
            .unwrap(),
        )
    }

    fn assert_close(a: &ComplexPlane, b: &ComplexPlane, eps: f64) {
        assert_eq!(a.dims(), b.dims());
        for (p, q) in a.view().iter().zip(b.view().iter()) {
            assert_abs_diff_eq!(p.re, q.re, epsilon = eps);
            assert_abs_diff_eq!(p.im, q.im, epsilon = eps);
        }
    }

    #[test]
    fn test_fit_to_cycle() {
        assert_eq!(fit_to_cycle(-1, 8), 7);
        assert_eq!(fit_to_cycle(8, 8), 0);
        assert_eq!(fit_to_cycle(3, 8), 3);
        assert_eq!(fit_to_cycle(-17, 8), 7);
    }

    #[test]
    fn test_nearest_four_quarter_turns_is_identity() {
        let s = spectrum(8, 8);
        let mut r = s.clone();
        for _ in 0..4 {
            r = rotate_nearest_neighbor(&r, 90.0).unwrap();
        }
        assert_close(&r, &s, 1e-12);
    }

    #[test]
    fn test_nearest_quarter_turn_moves_bins() {
        let mut s = ComplexPlane::new(8, 8).unwrap();
        // frequency (u, v) = (2, 0)
        s[(2, 0)] = Complex64::new(1.0, 0.5);
        let r = rotate_nearest_neighbor(&s, 90.0).unwrap();
        // R(90) (2, 0) = (0, 2)
        assert_abs_diff_eq!(r[(0, 2)].re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r[(0, 2)].im, 0.5, epsilon = 1e-12);
        assert_eq!(r[(2, 0)], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_half_turn_conjugates_real_image_spectrum() {
        let s = spectrum(8, 6);
        let r = rotate_nearest_neighbor(&s, 180.0).unwrap();
        assert_close(&r, &s.conjugate(), 1e-12);
    }

    #[test]
    fn test_bilinear_and_sinc_agree_with_nearest_on_grid() {
        let s = spectrum(8, 8);
        let nearest = rotate_nearest_neighbor(&s, 90.0).unwrap();
        assert_close(&rotate_bilinear(&s, 90.0).unwrap(), &nearest, 1e-9);
        assert_close(&rotate_sinc(&s, -270.0).unwrap(), &nearest, 1e-9);
    }

    #[test]
    fn test_rotation_is_periodic() {
        let s = spectrum(6, 6);
        assert_close(
            &rotate_bilinear(&s, 33.0).unwrap(),
            &rotate_bilinear(&s, 393.0).unwrap(),
            1e-12,
        );
        assert_close(
            &rotate_sinc(&s, -20.0).unwrap(),
            &rotate_sinc(&s, 340.0).unwrap(),
            1e-12,
        );
    }

    #[test]
    fn test_bilinear_preserves_dc() {
        let s = spectrum(8, 8);
        let r = rotate_bilinear(&s, 37.0).unwrap();
        assert_abs_diff_eq!(r[(0, 0)].re, s[(0, 0)].re, epsilon = 1e-12);
        assert_abs_diff_eq!(r[(0, 0)].im, s[(0, 0)].im, epsilon = 1e-12);
    }

    #[test]
    fn test_sinc_kernel_is_interpolating() {
        let k = kernel(3.0, 8);
        assert_abs_diff_eq!(k[3], 1.0, epsilon = 1e-12);
        for (i, &w) in k.iter().enumerate().filter(|&(i, _)| i != 3) {
            assert!(w.abs() < 1e-12, "bin {i}: {w}");
        }
    }
}
