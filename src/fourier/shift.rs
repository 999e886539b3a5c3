//! Spectrum centering and flipping.
//!
//! ## Quadrant swap
//!
//! `fft_shift` moves the DC bin from `(0, 0)` to `(width / 2, height / 2)`.
//! The top-left block of size `(width - width/2) x (height - height/2)` moves
//! to the bottom-right, so odd dimensions are handled: one half is one sample
//! larger. For odd sizes `ifft_shift` is the exact inverse; for even sizes the
//! two coincide and `fft_shift` is an involution.
//!
//! ## Parity shift
//!
//! `fft_shift_freqz` multiplies bin `(u, v)` by `(-1)^(u+v)`. For even sizes
//! this is the frequency-domain image of a quadrant swap in the spatial domain,
//! without moving any data.

use std::f64::consts::TAU;

use ndarray::{s, Array2};
use num_complex::Complex64;

use crate::complex::ComplexPlane;
use crate::error::{ensure_same_dims, Result};

/// Circularly shift `src` by `(dy, dx)` into `dst`: `dst[(y+dy)%h][(x+dx)%w] = src[y][x]`.
fn roll_into(src: &Array2<Complex64>, dst: &mut Array2<Complex64>, dy: usize, dx: usize) {
    let (h, w) = src.dim();
    dst.slice_mut(s![dy.., dx..])
        .assign(&src.slice(s![..h - dy, ..w - dx]));
    dst.slice_mut(s![dy.., ..dx])
        .assign(&src.slice(s![..h - dy, w - dx..]));
    dst.slice_mut(s![..dy, dx..])
        .assign(&src.slice(s![h - dy.., ..w - dx]));
    dst.slice_mut(s![..dy, ..dx])
        .assign(&src.slice(s![h - dy.., w - dx..]));
}

fn rolled(plane: &ComplexPlane, dy: usize, dx: usize) -> ComplexPlane {
    let mut out = plane.clone();
    roll_into(plane.array(), out.array_mut(), dy, dx);
    out
}

/// Swap quadrants so the DC bin lands at the center.
pub fn fft_shift(plane: &ComplexPlane) -> ComplexPlane {
    let (w, h) = plane.dims();
    rolled(plane, h / 2, w / 2)
}

/// Quadrant swap of `src` written into `dst`.
///
/// # Errors
/// `DimensionMismatch` when the planes differ in size.
pub fn fft_shift_into(src: &ComplexPlane, dst: &mut ComplexPlane) -> Result<()> {
    ensure_same_dims(src.dims(), dst.dims())?;
    let (w, h) = src.dims();
    roll_into(src.array(), dst.array_mut(), h / 2, w / 2);
    Ok(())
}

pub fn fft_shift_in_place(plane: &mut ComplexPlane) {
    *plane = fft_shift(plane);
}

/// Inverse of [`fft_shift`]: moves the centered DC bin back to `(0, 0)`.
pub fn ifft_shift(plane: &ComplexPlane) -> ComplexPlane {
    let (w, h) = plane.dims();
    rolled(plane, h - h / 2, w - w / 2)
}

pub fn ifft_shift_in_place(plane: &mut ComplexPlane) {
    *plane = ifft_shift(plane);
}

/// Negate every bin whose `u + v` is odd.
pub fn fft_shift_freqz_in_place(plane: &mut ComplexPlane) {
    plane.for_each_pixel(|x, y, v| {
        if (x + y) % 2 == 1 {
            *v = -*v;
        }
    });
}

pub fn fft_shift_freqz(plane: &ComplexPlane) -> ComplexPlane {
    let mut out = plane.clone();
    fft_shift_freqz_in_place(&mut out);
    out
}

/// Reverse the row order of a plane (row `y` becomes row `height - 1 - y`).
pub fn flip_ud_in_place(plane: &mut ComplexPlane) {
    let (w, h) = plane.dims();
    let data = plane.array_mut();
    for y in 0..h / 2 {
        for x in 0..w {
            data.swap([y, x], [h - 1 - y, x]);
        }
    }
}

pub fn flip_ud(plane: &ComplexPlane) -> ComplexPlane {
    let mut out = plane.clone();
    flip_ud_in_place(&mut out);
    out
}

/// Spectral counterpart of [`flip_ud`].
///
/// If `F` is the spectrum of `f`, the result is the spectrum of `f` with its
/// rows reversed: `G(u, v) = F(u, -v) * exp(2*pi*i*v / height)`. Rows `v` and
/// `height - v` are swapped pairwise, then each row gets its phase correction.
pub fn flip_ud_phase_in_place(plane: &mut ComplexPlane) {
    let (w, h) = plane.dims();
    {
        let data = plane.array_mut();
        for v in 1..(h + 1) / 2 {
            for u in 0..w {
                data.swap([v, u], [h - v, u]);
            }
        }
    }
    plane.for_each_row(|v, row| {
        let correction = Complex64::from_polar(1.0, TAU * v as f64 / h as f64);
        for c in row.iter_mut() {
            *c *= correction;
        }
    });
}

pub fn flip_ud_phase(plane: &ComplexPlane) -> ComplexPlane {
    let mut out = plane.clone();
    flip_ud_phase_in_place(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::fft::{fft2, inverse_fft2};
    use approx::assert_abs_diff_eq;

    fn indexed(width: usize, height: usize) -> ComplexPlane {
        ComplexPlane::from_fn(width, height, |x, y| Complex64::new((y * width + x) as f64, 0.0)).unwrap()
    }

    fn assert_close(a: &ComplexPlane, b: &ComplexPlane) {
        for (p, q) in a.view().iter().zip(b.view().iter()) {
            assert_abs_diff_eq!(p.re, q.re, epsilon = 1e-9);
            assert_abs_diff_eq!(p.im, q.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_shift_moves_dc_to_center() {
        let p = indexed(4, 4);
        let shifted = fft_shift(&p);
        assert_eq!(shifted[(2, 2)], p[(0, 0)]);
        assert_eq!(shifted[(0, 0)], p[(2, 2)]);
        assert_eq!(shifted[(3, 0)], p[(1, 2)]);
    }

    #[test]
    fn test_shift_is_involution_for_even_sizes() {
        let p = indexed(8, 6);
        assert_eq!(fft_shift(&fft_shift(&p)), p);
        assert_eq!(ifft_shift(&p), fft_shift(&p));
    }

    #[test]
    fn test_odd_sizes_use_larger_first_half() {
        let p = indexed(5, 3);
        let shifted = fft_shift(&p);
        // DC lands at (5/2, 3/2)
        assert_eq!(shifted[(2, 1)], p[(0, 0)]);
        // the 3x2 top-left block moved to the bottom-right
        assert_eq!(shifted[(4, 2)], p[(2, 1)]);
        assert_eq!(ifft_shift(&shifted), p);
        assert_ne!(fft_shift(&shifted), p);
    }

    #[test]
    fn test_shift_into_checks_dimensions() {
        let p = indexed(4, 4);
        let mut wrong = ComplexPlane::new(4, 3).unwrap();
        assert!(fft_shift_into(&p, &mut wrong).is_err());
        let mut dst = ComplexPlane::new(4, 4).unwrap();
        fft_shift_into(&p, &mut dst).unwrap();
        assert_eq!(dst, fft_shift(&p));
    }

    #[test]
    fn test_freqz_shifts_other_domain() {
        let p = indexed(8, 4);
        let shifted_spatial = inverse_fft2(&fft_shift_freqz(&fft2(&p)));
        assert_close(&shifted_spatial, &fft_shift(&p));
    }

    #[test]
    fn test_flip_ud() {
        let p = indexed(3, 5);
        let f = flip_ud(&p);
        assert_eq!(f[(1, 0)], p[(1, 4)]);
        assert_eq!(f[(1, 2)], p[(1, 2)]);
        assert_eq!(flip_ud(&f), p);
    }

    #[test]
    fn test_flip_ud_phase_matches_spatial_flip() {
        for &(w, h) in &[(4, 8), (3, 5)] {
            let p = indexed(w, h);
            let flipped = inverse_fft2(&flip_ud_phase(&fft2(&p)));
            assert_close(&flipped, &flip_ud(&p));
        }
    }
}
