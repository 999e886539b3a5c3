//! Three-channel complex image.
//!
//! A `ComplexImage` owns three [`ComplexPlane`]s of identical dimensions,
//! interpreted as the color channels of a spatial image or of its spectrum.
//! Channel-wise operations run the channels in parallel with rayon.

use num_complex::Complex64;
use rayon::prelude::*;

use super::plane::ComplexPlane;
use crate::error::{ensure_same_dims, Result, SpectralError};

/// Number of color channels carried by a [`ComplexImage`].
pub const CHANNELS: usize = 3;

/// Three equally sized complex planes.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexImage {
    channels: [ComplexPlane; CHANNELS],
}

impl ComplexImage {
    /// Allocate a zero-filled image.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let plane = ComplexPlane::new(width, height)?;
        Ok(Self {
            channels: [plane.clone(), plane.clone(), plane],
        })
    }

    /// Take ownership of three planes.
    ///
    /// # Errors
    /// `DimensionMismatch` unless all three planes share width and height.
    pub fn from_channels(c0: ComplexPlane, c1: ComplexPlane, c2: ComplexPlane) -> Result<Self> {
        ensure_same_dims(c0.dims(), c1.dims())?;
        ensure_same_dims(c0.dims(), c2.dims())?;
        Ok(Self {
            channels: [c0, c1, c2],
        })
    }

    /// Copy three borrowed planes into a new image.
    pub fn from_channel_refs(c0: &ComplexPlane, c1: &ComplexPlane, c2: &ComplexPlane) -> Result<Self> {
        Self::from_channels(c0.clone(), c1.clone(), c2.clone())
    }

    pub fn width(&self) -> usize {
        self.channels[0].width()
    }

    pub fn height(&self) -> usize {
        self.channels[0].height()
    }

    /// `(width, height)` shared by all channels.
    pub fn dims(&self) -> (usize, usize) {
        self.channels[0].dims()
    }

    /// Borrow channel `index`.
    ///
    /// # Errors
    /// `InvalidArgument` when `index >= 3`.
    pub fn channel(&self, index: usize) -> Result<&ComplexPlane> {
        self.channels.get(index).ok_or_else(|| channel_out_of_range(index))
    }

    /// Mutable access to channel `index`. The plane's shape is fixed, so the
    /// equal-dimension invariant holds.
    pub fn channel_mut(&mut self, index: usize) -> Result<&mut ComplexPlane> {
        self.channels
            .get_mut(index)
            .ok_or_else(|| channel_out_of_range(index))
    }

    pub fn channels(&self) -> &[ComplexPlane; CHANNELS] {
        &self.channels
    }

    pub fn into_channels(self) -> [ComplexPlane; CHANNELS] {
        self.channels
    }

    /// Run `f` on each channel in parallel.
    pub fn par_for_each_channel<F>(&mut self, f: F)
    where
        F: Fn(&mut ComplexPlane) + Sync + Send,
    {
        self.channels.par_iter_mut().for_each(f);
    }

    /// Build a new image by mapping every channel in parallel.
    pub fn try_map_channels<F>(&self, f: F) -> Result<ComplexImage>
    where
        F: Fn(&ComplexPlane) -> Result<ComplexPlane> + Sync + Send,
    {
        let mapped: Vec<ComplexPlane> = self
            .channels
            .par_iter()
            .map(f)
            .collect::<Result<Vec<_>>>()?;
        let [c0, c1, c2]: [ComplexPlane; CHANNELS] = mapped
            .try_into()
            .map_err(|_| SpectralError::invalid("channel count changed during map"))?;
        ComplexImage::from_channels(c0, c1, c2)
    }

    /// Channel-wise product written into `self`.
    pub fn multiply_in_place(&mut self, other: &ComplexImage) -> Result<()> {
        ensure_same_dims(self.dims(), other.dims())?;
        self.channels
            .par_iter_mut()
            .zip(other.channels.par_iter())
            .try_for_each(|(a, b)| a.multiply_in_place(b))
    }

    /// Channel-wise product.
    pub fn multiply(&self, other: &ComplexImage) -> Result<ComplexImage> {
        let mut out = self.clone();
        out.multiply_in_place(other)?;
        Ok(out)
    }

    pub fn add(&self, other: &ComplexImage) -> Result<ComplexImage> {
        ensure_same_dims(self.dims(), other.dims())?;
        let [a0, a1, a2] = &self.channels;
        let [b0, b1, b2] = &other.channels;
        ComplexImage::from_channels(a0.add(b0)?, a1.add(b1)?, a2.add(b2)?)
    }

    pub fn sub(&self, other: &ComplexImage) -> Result<ComplexImage> {
        ensure_same_dims(self.dims(), other.dims())?;
        let [a0, a1, a2] = &self.channels;
        let [b0, b1, b2] = &other.channels;
        ComplexImage::from_channels(a0.sub(b0)?, a1.sub(b1)?, a2.sub(b2)?)
    }

    pub fn scale(&self, factor: Complex64) -> ComplexImage {
        let [c0, c1, c2] = &self.channels;
        ComplexImage {
            channels: [c0.scale(factor), c1.scale(factor), c2.scale(factor)],
        }
    }

    /// Channel-wise epsilon-clamped division `self / denominator`.
    pub fn divide_by(&self, denominator: &ComplexImage, epsilon: f64) -> Result<ComplexImage> {
        ensure_same_dims(self.dims(), denominator.dims())?;
        let [n0, n1, n2] = &self.channels;
        let [d0, d1, d2] = &denominator.channels;
        ComplexImage::from_channels(
            n0.divide_by(d0, epsilon)?,
            n1.divide_by(d1, epsilon)?,
            n2.divide_by(d2, epsilon)?,
        )
    }

    pub fn conjugate_in_place(&mut self) {
        self.par_for_each_channel(|c| c.conjugate_in_place());
    }

    /// Encode every channel in the flat raw format, channel order preserved.
    pub fn to_raw_channels(&self) -> [Vec<f64>; CHANNELS] {
        let [c0, c1, c2] = &self.channels;
        [c0.to_raw(), c1.to_raw(), c2.to_raw()]
    }

    /// Decode three raw channel buffers.
    pub fn from_raw_channels(raw: [&[f64]; CHANNELS]) -> Result<ComplexImage> {
        let [r0, r1, r2] = raw;
        ComplexImage::from_channels(
            ComplexPlane::from_raw(r0)?,
            ComplexPlane::from_raw(r1)?,
            ComplexPlane::from_raw(r2)?,
        )
    }
}

fn channel_out_of_range(index: usize) -> SpectralError {
    SpectralError::invalid(format!(
        "channel index {index} out of range 0..{CHANNELS}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(width: usize, height: usize, value: f64) -> ComplexPlane {
        ComplexPlane::from_generator(width, height, || Complex64::new(value, 0.0)).unwrap()
    }

    #[test]
    fn test_mismatched_channels_rejected() {
        let err = ComplexImage::from_channels(constant(4, 4, 1.0), constant(4, 4, 1.0), constant(2, 4, 1.0));
        assert_eq!(err, Err(SpectralError::mismatch((4, 4), (2, 4))));
    }

    #[test]
    fn test_channel_index_checked() {
        let img = ComplexImage::new(2, 2).unwrap();
        assert!(img.channel(2).is_ok());
        assert!(matches!(img.channel(3), Err(SpectralError::InvalidArgument(_))));
    }

    #[test]
    fn test_multiply_in_place() {
        let mut a = ComplexImage::from_channels(constant(2, 2, 1.0), constant(2, 2, 2.0), constant(2, 2, 3.0)).unwrap();
        let b = ComplexImage::from_channels(constant(2, 2, 4.0), constant(2, 2, 4.0), constant(2, 2, 4.0)).unwrap();
        a.multiply_in_place(&b).unwrap();
        assert_eq!(a.channel(2).unwrap()[(1, 1)], Complex64::new(12.0, 0.0));

        let small = ComplexImage::new(1, 2).unwrap();
        assert!(a.multiply_in_place(&small).is_err());
    }

    #[test]
    fn test_try_map_channels_preserves_order() {
        let img = ComplexImage::from_channels(constant(2, 1, 1.0), constant(2, 1, 2.0), constant(2, 1, 3.0)).unwrap();
        let doubled = img.try_map_channels(|c| Ok(c.scale(Complex64::new(2.0, 0.0)))).unwrap();
        for (i, expected) in [2.0, 4.0, 6.0].iter().enumerate() {
            assert_eq!(doubled.channel(i).unwrap()[(0, 0)].re, *expected);
        }
    }

    #[test]
    fn test_raw_channels_roundtrip() {
        let img = ComplexImage::from_channels(constant(3, 2, 1.0), constant(3, 2, -2.0), constant(3, 2, 0.5)).unwrap();
        let raw = img.to_raw_channels();
        let back = ComplexImage::from_raw_channels([&raw[0], &raw[1], &raw[2]]).unwrap();
        assert_eq!(back, img);
    }
}
