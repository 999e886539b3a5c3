//! Separable 2D FFT over complex planes.
//!
//! The 2D transform is a row pass followed by a column pass. Each pass runs
//! its independent 1D transforms in parallel (rayon via ndarray's parallel
//! lane iterators), gathering every lane into a contiguous buffer for rustfft.
//!
//! ## Normalization
//!
//! | Pass | Forward | Inverse |
//! |------|---------|---------|
//! | rows | `1 / width` | 1 |
//! | columns | `1 / height` | 1 |
//!
//! The forward transform is therefore normalized by `1 / (width * height)`:
//! the DC coefficient equals the mean of the spatial samples, and
//! `inverse_fft2(fft2(p))` reproduces `p` up to rounding.

use std::sync::Arc;

use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis};
use num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};
use tracing::trace;

use crate::complex::{ComplexImage, ComplexPlane};
use crate::error::{ensure_same_dims, Result};

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Inverse,
}

impl Direction {
    fn rustfft(self) -> FftDirection {
        match self {
            Direction::Forward => FftDirection::Forward,
            Direction::Inverse => FftDirection::Inverse,
        }
    }

    /// Scale applied to every output of a pass over lanes of length `len`.
    fn scale(self, len: usize) -> f64 {
        match self {
            Direction::Forward => 1.0 / len as f64,
            Direction::Inverse => 1.0,
        }
    }
}

/// Run a 1D transform over every lane of `data` running along `along`.
///
/// `along = Axis(1)` transforms rows, `along = Axis(0)` transforms columns.
fn transform_lanes(data: &mut Array2<Complex64>, along: Axis, direction: Direction) {
    let len = data.len_of(along);
    let outer = Axis(1 - along.index());
    let fft: Arc<dyn Fft<f64>> = FftPlanner::new().plan_fft(len, direction.rustfft());
    let scale = direction.scale(len);
    let scratch_len = fft.get_inplace_scratch_len();

    trace!(len, lanes = data.len_of(outer), ?direction, "fft pass");

    data.axis_iter_mut(outer).into_par_iter().for_each_init(
        || {
            (
                vec![Complex64::new(0.0, 0.0); len],
                vec![Complex64::new(0.0, 0.0); scratch_len],
            )
        },
        |(buf, scratch), mut lane| {
            for (b, v) in buf.iter_mut().zip(lane.iter()) {
                *b = *v;
            }
            fft.process_with_scratch(buf, scratch);
            for (v, b) in lane.iter_mut().zip(buf.iter()) {
                *v = *b * scale;
            }
        },
    );
}

/// Forward 1D FFT of every row, weighted by `1 / width`.
pub fn fft_rows(plane: &mut ComplexPlane) {
    transform_lanes(plane.array_mut(), Axis(1), Direction::Forward);
}

/// Inverse 1D FFT of every row (unweighted).
pub fn inverse_fft_rows(plane: &mut ComplexPlane) {
    transform_lanes(plane.array_mut(), Axis(1), Direction::Inverse);
}

/// Forward 1D FFT of every column, weighted by `1 / height`.
pub fn fft_columns(plane: &mut ComplexPlane) {
    transform_lanes(plane.array_mut(), Axis(0), Direction::Forward);
}

/// Inverse 1D FFT of every column (unweighted).
pub fn inverse_fft_columns(plane: &mut ComplexPlane) {
    transform_lanes(plane.array_mut(), Axis(0), Direction::Inverse);
}

/// 2D transform in place, rows then columns.
pub fn transform2_in_place(plane: &mut ComplexPlane, direction: Direction) {
    trace!(width = plane.width(), height = plane.height(), ?direction, "fft2");
    transform_lanes(plane.array_mut(), Axis(1), direction);
    transform_lanes(plane.array_mut(), Axis(0), direction);
}

/// Forward 2D FFT in place.
pub fn fft2_in_place(plane: &mut ComplexPlane) {
    transform2_in_place(plane, Direction::Forward);
}

/// Inverse 2D FFT in place.
pub fn inverse_fft2_in_place(plane: &mut ComplexPlane) {
    transform2_in_place(plane, Direction::Inverse);
}

/// Forward 2D FFT into a new plane.
pub fn fft2(plane: &ComplexPlane) -> ComplexPlane {
    let mut out = plane.clone();
    fft2_in_place(&mut out);
    out
}

/// Inverse 2D FFT into a new plane.
pub fn inverse_fft2(plane: &ComplexPlane) -> ComplexPlane {
    let mut out = plane.clone();
    inverse_fft2_in_place(&mut out);
    out
}

/// Forward 2D FFT of `src` written into `dst`.
///
/// # Errors
/// `DimensionMismatch` when `dst` differs in size from `src`.
pub fn fft2_into(src: &ComplexPlane, dst: &mut ComplexPlane) -> Result<()> {
    ensure_same_dims(src.dims(), dst.dims())?;
    dst.view_mut().assign(&src.view());
    fft2_in_place(dst);
    Ok(())
}

/// Inverse 2D FFT of `src` written into `dst`.
pub fn inverse_fft2_into(src: &ComplexPlane, dst: &mut ComplexPlane) -> Result<()> {
    ensure_same_dims(src.dims(), dst.dims())?;
    dst.view_mut().assign(&src.view());
    inverse_fft2_in_place(dst);
    Ok(())
}

/// Forward 2D FFT of every channel, channels in parallel.
pub fn fft2_image(image: &mut ComplexImage) {
    image.par_for_each_channel(fft2_in_place);
}

/// Inverse 2D FFT of every channel, channels in parallel.
pub fn inverse_fft2_image(image: &mut ComplexImage) {
    image.par_for_each_channel(inverse_fft2_in_place);
}
