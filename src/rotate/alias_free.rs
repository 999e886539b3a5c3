//! Alias-free rotation by three FFT-domain shears.
//!
//! A rotation factors into shears `R(t) = Sx(a) * Sy(b) * Sx(a)` with
//! `a = -tan(t/2)` and `b = sin(t)`. A shear along one axis is a phase ramp
//! in the frequency domain of that axis, exact for band-limited data as long
//! as the sheared band still fits the canvas. The canvas is therefore widened
//! before the shears and cropped back after them (Owen & Makedon, "High
//! Quality Alias Free Image Rotation", 1996):
//!
//! 1. Pad the spectrum horizontally to `w * (1 + |sin t|)`.
//! 2. Rows shear along `x` (phase ramp over `u`, one ramp per row `y`).
//! 3. Double the vertical frequency extent; each column keeps the single
//!    spectral replica lying on the sheared band.
//! 4. Columns shear along `y` (phase ramp over `v`, one ramp per column `x`).
//! 5. Zero everything outside the band the final shear maps back onto the
//!    original frequency rectangle (the corner replicas).
//! 6. Rows shear along `x` again, now at twice the row density.
//! 7. Crop the central `w x h` frequencies.
//!
//! Angles are first folded into `(-90, 90]`. A 180 deg fold is a conjugation,
//! which reflects about pixel `(0, 0)`; on odd axes it is followed by a one
//! pixel translation so the half turn shares the center `(w/2, h/2)`.

use std::f64::consts::TAU;

use num_complex::Complex64;
use tracing::debug;

use super::{check_angle, is_negligible, reduce_degrees};
use crate::complex::ComplexPlane;
use crate::error::Result;
use crate::fourier::{
    crop_spectrum, fft_columns, fft_rows, inverse_fft_columns, inverse_fft_rows, pad_spectrum,
    signed_frequency, translate_spectrum,
};

/// Rotate an unshifted spectrum by `degrees`.
pub fn rotate_alias_free(plane: &ComplexPlane, degrees: f64) -> Result<ComplexPlane> {
    check_angle(degrees)?;
    let mut theta = reduce_degrees(degrees);
    if is_negligible(theta) {
        debug!(degrees, "rotation below threshold, copying");
        return Ok(plane.clone());
    }

    let folded = if theta > 90.0 {
        theta -= 180.0;
        true
    } else if theta <= -90.0 {
        theta += 180.0;
        true
    } else {
        false
    };
    let source = if folded { half_turn(plane) } else { plane.clone() };
    if is_negligible(theta) {
        debug!(degrees, "half turn, conjugating");
        return Ok(source);
    }

    shear_rotate(&source, theta.to_radians())
}

/// Half turn about `(w/2, h/2)`: conjugation reflects about the origin, the
/// translation by `2 * (w/2, h/2)` moves that onto the center.
fn half_turn(plane: &ComplexPlane) -> ComplexPlane {
    let (w, h) = plane.dims();
    translate_spectrum(&plane.conjugate(), (2 * (w / 2)) as f64, (2 * (h / 2)) as f64)
}

/// Even canvas width able to hold the band after the vertical shear.
fn widened_width(width: usize, sin: f64) -> usize {
    let raw = (width as f64 * (1.0 + sin.abs())).ceil() as usize;
    let raw = raw.max(width + 1);
    raw + raw % 2
}

fn phase_ramp(frequency: isize, shift: f64, extent: usize) -> Complex64 {
    Complex64::from_polar(1.0, -TAU * frequency as f64 * shift / extent as f64)
}

/// Shift every row by `shift_of(row)` samples of an axis of `extent` samples.
/// The plane holds rows in space and columns in frequency.
fn shear_rows<F>(plane: &mut ComplexPlane, extent: usize, shift_of: F)
where
    F: Fn(usize) -> f64,
{
    plane.for_each_row(|y, row| {
        let shift = shift_of(y);
        let n = row.len();
        for (k, c) in row.iter_mut().enumerate() {
            *c *= phase_ramp(signed_frequency(k, n), shift, extent);
        }
    });
}

/// Column counterpart of [`shear_rows`].
fn shear_columns<F>(plane: &mut ComplexPlane, extent: usize, shift_of: F)
where
    F: Fn(usize) -> f64,
{
    plane.for_each_column(|x, column| {
        let shift = shift_of(x);
        let n = column.len();
        for (k, c) in column.iter_mut().enumerate() {
            *c *= phase_ramp(signed_frequency(k, n), shift, extent);
        }
    });
}

/// Vertical offset, in bins, of the band in column `u` after a row shear `alpha`.
fn band_offset(u: isize, alpha: f64, width: usize, height: usize) -> f64 {
    u as f64 * alpha * height as f64 / width as f64
}

/// Spread an `h`-row spectrum over `2h` rows. Every `v` in the doubled range
/// aliases some `v mod h`; only the one on the sheared band is kept.
fn double_rows(sheared: &ComplexPlane, width: usize, height: usize, alpha: f64) -> Result<ComplexPlane> {
    let wide = sheared.width();
    let tall = 2 * height;
    let half = height as f64 / 2.0;
    ComplexPlane::from_fn(wide, tall, |k, j| {
        let v = signed_frequency(j, tall);
        let centered = v as f64 + band_offset(signed_frequency(k, wide), alpha, width, height);
        if centered >= -half && centered < half {
            sheared[(k, v.rem_euclid(height as isize) as usize)]
        } else {
            Complex64::new(0.0, 0.0)
        }
    })
}

/// Keep only bins the final row shear maps into the `width x height` band.
fn mask_corners(plane: &mut ComplexPlane, width: usize, height: usize, alpha: f64) {
    let (wide, tall) = plane.dims();
    let half_u = (width / 2) as isize;
    let half_v = height as f64 / 2.0;
    plane.for_each_pixel(|k, j, c| {
        let u = signed_frequency(k, wide);
        let v = signed_frequency(j, tall) as f64 - band_offset(u, alpha, width, height);
        if u.abs() > half_u || v < -half_v || v > half_v {
            *c = Complex64::new(0.0, 0.0);
        }
    });
}

fn shear_rotate(spectrum: &ComplexPlane, radians: f64) -> Result<ComplexPlane> {
    let (w, h) = spectrum.dims();
    let alpha = -(radians / 2.0).tan();
    let beta = radians.sin();
    let wide = widened_width(w, beta);
    let cx = (w / 2) as f64;
    let cy = (h / 2) as f64;
    debug!(width = w, height = h, wide, tall = 2 * h, degrees = radians.to_degrees(), "alias-free rotation");

    let mut stage = pad_spectrum(spectrum, wide, h)?;
    inverse_fft_columns(&mut stage);
    shear_rows(&mut stage, w, |y| alpha * (y as f64 - cy));
    fft_columns(&mut stage);

    let mut stage = double_rows(&stage, w, h, alpha)?;
    inverse_fft_rows(&mut stage);
    let step = w as f64 / wide as f64;
    shear_columns(&mut stage, h, |x| beta * (x as f64 * step - cx));
    fft_rows(&mut stage);

    mask_corners(&mut stage, w, h, alpha);
    inverse_fft_columns(&mut stage);
    shear_rows(&mut stage, w, |y| alpha * (y as f64 / 2.0 - cy));
    fft_columns(&mut stage);

    crop_spectrum(&stage, w, h)
}
