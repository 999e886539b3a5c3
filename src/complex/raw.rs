//! Flat numeric ("raw") serialization of a plane.
//!
//! Layout: `[width, re0, im0, re1, im1, ...]`, length `2 * width * height + 1`.
//! Height is recovered as `(len - 1) / 2 / width`. The format carries no
//! channel count; images are serialized per channel.

use num_complex::Complex64;

use super::plane::ComplexPlane;
use crate::error::{Result, SpectralError};

impl ComplexPlane {
    /// Encode as `[width, re0, im0, ...]` in row-major order.
    pub fn to_raw(&self) -> Vec<f64> {
        let mut raw = Vec::with_capacity(2 * self.len() + 1);
        raw.push(self.width() as f64);
        for c in self.array().iter() {
            raw.push(c.re);
            raw.push(c.im);
        }
        raw
    }

    /// Decode a raw buffer produced by [`ComplexPlane::to_raw`].
    ///
    /// # Errors
    /// `InvalidRawData` when the width header is not a positive integer or the
    /// payload does not hold a whole number of rows.
    pub fn from_raw(raw: &[f64]) -> Result<ComplexPlane> {
        let (&header, payload) = raw
            .split_first()
            .ok_or_else(|| SpectralError::InvalidRawData("empty buffer".into()))?;
        if !(header.is_finite() && header >= 1.0 && header.fract() == 0.0) {
            return Err(SpectralError::InvalidRawData(format!(
                "width header {header} is not a positive integer"
            )));
        }
        let width = header as usize;
        if payload.len() % 2 != 0 {
            return Err(SpectralError::InvalidRawData(format!(
                "odd payload length {}",
                payload.len()
            )));
        }
        let samples = payload.len() / 2;
        if samples == 0 || samples % width != 0 {
            return Err(SpectralError::InvalidRawData(format!(
                "{samples} samples do not fill rows of width {width}"
            )));
        }
        let height = samples / width;
        let data: Vec<Complex64> = payload
            .chunks_exact(2)
            .map(|pair| Complex64::new(pair[0], pair[1]))
            .collect();
        ComplexPlane::from_vec(width, height, data)
    }
}
