//! Resizing unshifted spectra.
//!
//! Zero-padding a spectrum around its Nyquist frequency interpolates the
//! spatial image; cropping the central frequencies band-limits and decimates
//! it. With the forward transform normalized by `1 / (width * height)` both
//! operations preserve sample amplitudes.
//!
//! An even-length axis has a Nyquist bin shared by the positive and negative
//! halves. Padding splits it equally between the two, cropping sums them back,
//! so `crop_spectrum(pad_spectrum(p))` returns `p` unchanged.

use std::f64::consts::TAU;

use ndarray::{Array2, Axis, Zip};
use num_complex::Complex64;
use tracing::trace;

use crate::complex::ComplexPlane;
use crate::error::{Result, SpectralError};

/// Signed frequency of bin `k` in a transform of length `n`, in `(-n/2, n/2]`
/// for odd `n` and `[-n/2, n/2)` for even `n`.
pub fn signed_frequency(k: usize, n: usize) -> isize {
    if k <= (n - 1) / 2 {
        k as isize
    } else {
        k as isize - n as isize
    }
}

/// Bin index holding signed frequency `s` in a transform of length `n`.
fn bin_of(s: isize, n: usize) -> usize {
    if s >= 0 {
        s as usize
    } else {
        (n as isize + s) as usize
    }
}

/// `(old_bin, new_bin, weight)` contributions when resizing an axis `n -> m`.
fn axis_plan(n: usize, m: usize) -> Vec<(usize, usize, f64)> {
    if m >= n {
        (0..n)
            .flat_map(|k| {
                if n % 2 == 0 && k == n / 2 && m > n {
                    vec![(k, n / 2, 0.5), (k, m - n / 2, 0.5)]
                } else {
                    vec![(k, bin_of(signed_frequency(k, n), m), 1.0)]
                }
            })
            .collect()
    } else {
        (0..m)
            .flat_map(|j| {
                if m % 2 == 0 && j == m / 2 {
                    vec![(m / 2, j, 1.0), (n - m / 2, j, 1.0)]
                } else {
                    vec![(bin_of(signed_frequency(j, m), n), j, 1.0)]
                }
            })
            .collect()
    }
}

fn resize_axis(src: &Array2<Complex64>, along: Axis, m: usize) -> Array2<Complex64> {
    let n = src.len_of(along);
    let mut shape = src.raw_dim();
    shape[along.index()] = m;
    let mut dst = Array2::zeros(shape);
    for (old, new, weight) in axis_plan(n, m) {
        let lane = src.index_axis(along, old);
        let mut target = dst.index_axis_mut(along, new);
        Zip::from(&mut target)
            .and(&lane)
            .for_each(|d, &s| *d += s * weight);
    }
    dst
}

/// Resize an unshifted spectrum to `width x height`, padding or cropping each
/// axis around its Nyquist frequency as needed.
pub fn resize_spectrum(plane: &ComplexPlane, width: usize, height: usize) -> Result<ComplexPlane> {
    if width == 0 || height == 0 {
        return Err(SpectralError::invalid(format!(
            "spectrum size must be positive, got {width}x{height}"
        )));
    }
    trace!(from = ?plane.dims(), to = ?(width, height), "resize spectrum");
    let columns = resize_axis(plane.array(), Axis(1), width);
    let both = resize_axis(&columns, Axis(0), height);
    ComplexPlane::from_array(both)
}

/// Centered zero-insertion up to `width x height`.
///
/// # Errors
/// `InvalidArgument` if the target is smaller than the plane on either axis.
pub fn pad_spectrum(plane: &ComplexPlane, width: usize, height: usize) -> Result<ComplexPlane> {
    let (w, h) = plane.dims();
    if width < w || height < h {
        return Err(SpectralError::invalid(format!(
            "cannot pad {w}x{h} spectrum down to {width}x{height}"
        )));
    }
    resize_spectrum(plane, width, height)
}

/// Keep only the central `width x height` frequencies.
pub fn crop_spectrum(plane: &ComplexPlane, width: usize, height: usize) -> Result<ComplexPlane> {
    let (w, h) = plane.dims();
    if width > w || height > h {
        return Err(SpectralError::invalid(format!(
            "cannot crop {w}x{h} spectrum up to {width}x{height}"
        )));
    }
    resize_spectrum(plane, width, height)
}

/// Spectrum of the spatial image moved by `(dx, dy)` samples, wrapping
/// around the edges: bin `(u, v)` turns by `-2 pi (u dx / w + v dy / h)`.
/// Shifts that are whole multiples of the plane size return an exact copy.
pub fn translate_spectrum(plane: &ComplexPlane, dx: f64, dy: f64) -> ComplexPlane {
    let (w, h) = plane.dims();
    let fx = dx.rem_euclid(w as f64) / w as f64;
    let fy = dy.rem_euclid(h as f64) / h as f64;
    let mut out = plane.clone();
    if fx == 0.0 && fy == 0.0 {
        return out;
    }
    trace!(dx, dy, "translate spectrum");
    out.for_each_pixel(|k, j, c| {
        let turns = signed_frequency(k, w) as f64 * fx + signed_frequency(j, h) as f64 * fy;
        let turns = turns.rem_euclid(1.0);
        if turns != 0.0 {
            *c *= Complex64::from_polar(1.0, -TAU * turns);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::fft::{fft2, inverse_fft2};
    use approx::assert_abs_diff_eq;

    fn smooth(width: usize, height: usize) -> ComplexPlane {
        ComplexPlane::from_fn(width, height, |x, y| {
            let fx = std::f64::consts::TAU * x as f64 / width as f64;
            let fy = std::f64::consts::TAU * y as f64 / height as f64;
            Complex64::new(10.0 + fx.cos() + 0.5 * (2.0 * fy).sin(), 0.0)
        })
        .unwrap()
    }

    #[test]
    fn test_signed_frequency() {
        assert_eq!(signed_frequency(0, 8), 0);
        assert_eq!(signed_frequency(3, 8), 3);
        assert_eq!(signed_frequency(4, 8), -4);
        assert_eq!(signed_frequency(7, 8), -1);
        assert_eq!(signed_frequency(2, 5), 2);
        assert_eq!(signed_frequency(3, 5), -2);
    }

    #[test]
    fn test_pad_then_crop_is_identity() {
        for &(w, h) in &[(8, 4), (5, 7), (6, 3)] {
            let s = fft2(&smooth(w, h));
            let padded = pad_spectrum(&s, 2 * w + 1, 2 * h).unwrap();
            let back = crop_spectrum(&padded, w, h).unwrap();
            for (a, b) in back.view().iter().zip(s.view().iter()) {
                assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
                assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_padding_interpolates_spatially() {
        let p = smooth(8, 8);
        let up = inverse_fft2(&pad_spectrum(&fft2(&p), 16, 16).unwrap());
        // every other sample of the upsampled image is an original sample
        for y in 0..8 {
            for x in 0..8 {
                assert_abs_diff_eq!(up[(2 * x, 2 * y)].re, p[(x, y)].re, epsilon = 1e-9);
                assert_abs_diff_eq!(up[(2 * x, 2 * y)].im, 0.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_wrong_direction_rejected() {
        let s = ComplexPlane::new(4, 4).unwrap();
        assert!(pad_spectrum(&s, 2, 4).is_err());
        assert!(crop_spectrum(&s, 8, 4).is_err());
        assert!(resize_spectrum(&s, 0, 4).is_err());
    }

    #[test]
    fn test_translate_moves_samples() {
        let mut p = ComplexPlane::new(8, 5).unwrap();
        p[(1, 2)] = Complex64::new(4.0, 0.0);
        let moved = inverse_fft2(&translate_spectrum(&fft2(&p), 3.0, -3.0));
        for y in 0..5 {
            for x in 0..8 {
                let expected = if (x, y) == (4, 4) { 4.0 } else { 0.0 };
                assert_abs_diff_eq!(moved[(x, y)].re, expected, epsilon = 1e-9);
                assert_abs_diff_eq!(moved[(x, y)].im, 0.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_translate_by_whole_periods_is_exact_copy() {
        let s = fft2(&smooth(6, 5));
        assert_eq!(translate_spectrum(&s, 6.0, -10.0), s);
        assert_eq!(translate_spectrum(&s, 0.0, 0.0), s);
    }
}
