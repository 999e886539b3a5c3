//! Frequency-domain deconvolution filters.
//!
//! A filter holds, per color channel, the epsilon-clamped ratio
//! `reference / blurred` of two spectra. Multiplying the spectrum of an image
//! blurred the same way by the filter undoes the blur; the inverted filter
//! applies it.
//!
//! ## Sizes
//! Spectra of different sizes are zero-padded (centered, in the frequency
//! domain) to the largest width and height among them *before* dividing.
//! Frequency padding is spatial interpolation, so every operand describes the
//! same image content on a finer grid.
//!
//! ## Normalization
//! With [`DeblurSettings::normalize`] every channel gets DC exactly `1 + 0i`
//! and its non-DC magnitudes rescaled to sum to `N - 1`. A normalized filter
//! leaves mean brightness untouched.

use num_complex::Complex64;
use tracing::debug;

use crate::complex::{ComplexImage, ComplexPlane, CHANNELS};
use crate::error::{ensure_same_dims, Result};
use crate::fourier::{fft2_image, inverse_fft2_image, pad_spectrum};
use crate::raster::RasterImage;
use crate::rotate::rotate_image;
use crate::settings::{DeblurSettings, RotationMethod};

/// Per-channel spectral ratio filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DeblurFilter {
    filter: ComplexImage,
}

/// Largest width and height over all planes.
fn common_dims<'a>(planes: impl IntoIterator<Item = &'a ComplexPlane>) -> (usize, usize) {
    planes
        .into_iter()
        .fold((0, 0), |(w, h), p| (w.max(p.width()), h.max(p.height())))
}

/// Force DC to `1 + 0i` and rescale the other bins to a magnitude sum of `N - 1`.
fn normalize_channel(plane: &mut ComplexPlane) {
    let target = (plane.len() - 1) as f64;
    let dc = plane[(0, 0)];
    let rest = plane.sum_magnitude() - dc.norm();
    let scale = if rest > 0.0 { target / rest } else { 1.0 };
    plane.for_each_pixel(|x, y, c| {
        if x == 0 && y == 0 {
            *c = Complex64::new(1.0, 0.0);
        } else {
            *c *= scale;
        }
    });
}

impl DeblurFilter {
    /// Build from reference and blurred spectra, one plane per channel.
    ///
    /// # Errors
    /// `InvalidArgument` for a non-positive or non-finite epsilon.
    pub fn from_frequencies(
        reference: [&ComplexPlane; CHANNELS],
        blurred: [&ComplexPlane; CHANNELS],
        settings: &DeblurSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let (width, height) = common_dims(reference.iter().chain(blurred.iter()).copied());
        let padded = |p: &ComplexPlane| pad_spectrum(p, width, height);
        let needs_padding = reference
            .iter()
            .chain(blurred.iter())
            .any(|p| p.dims() != (width, height));
        debug!(width, height, needs_padding, normalize = settings.normalize, "building deblur filter");

        let numerator = ComplexImage::from_channels(
            padded(reference[0])?,
            padded(reference[1])?,
            padded(reference[2])?,
        )?;
        let denominator = ComplexImage::from_channels(
            padded(blurred[0])?,
            padded(blurred[1])?,
            padded(blurred[2])?,
        )?;
        let mut filter = numerator.divide_by(&denominator, settings.epsilon)?;
        if settings.normalize {
            filter.par_for_each_channel(normalize_channel);
        }
        Ok(Self { filter })
    }

    /// Wrap explicit filter channels, padding them to a common size.
    pub fn from_filter_channels(channels: [&ComplexPlane; CHANNELS], normalize: bool) -> Result<Self> {
        let (width, height) = common_dims(channels.iter().copied());
        let mut filter = ComplexImage::from_channels(
            pad_spectrum(channels[0], width, height)?,
            pad_spectrum(channels[1], width, height)?,
            pad_spectrum(channels[2], width, height)?,
        )?;
        if normalize {
            filter.par_for_each_channel(normalize_channel);
        }
        Ok(Self { filter })
    }

    /// Build from a reference / blurred pair of *spatial* images.
    pub fn from_images(reference: &ComplexImage, blurred: &ComplexImage, settings: &DeblurSettings) -> Result<Self> {
        let mut reference = reference.clone();
        let mut blurred = blurred.clone();
        fft2_image(&mut reference);
        fft2_image(&mut blurred);
        let [r0, r1, r2] = reference.channels();
        let [b0, b1, b2] = blurred.channels();
        Self::from_frequencies([r0, r1, r2], [b0, b1, b2], settings)
    }

    /// Build from a reference / blurred raster pair. Both are zero-padded to
    /// the power-of-two size covering the larger of the two.
    pub fn from_rasters(reference: &RasterImage, blurred: &RasterImage, settings: &DeblurSettings) -> Result<Self> {
        let width = reference.width().max(blurred.width()).next_power_of_two();
        let height = reference.height().max(blurred.height()).next_power_of_two();
        Self::from_images(
            &ComplexImage::from_raster_padded(reference, width, height)?,
            &ComplexImage::from_raster_padded(blurred, width, height)?,
            settings,
        )
    }

    pub fn width(&self) -> usize {
        self.filter.width()
    }

    pub fn height(&self) -> usize {
        self.filter.height()
    }

    pub fn dims(&self) -> (usize, usize) {
        self.filter.dims()
    }

    pub fn as_image(&self) -> &ComplexImage {
        &self.filter
    }

    pub fn channels(&self) -> &[ComplexPlane; CHANNELS] {
        self.filter.channels()
    }

    pub fn into_image(self) -> ComplexImage {
        self.filter
    }

    /// Multiply a spectral image by the filter in place.
    ///
    /// # Errors
    /// `DimensionMismatch` unless the image has the filter's size.
    pub fn apply(&self, spectrum: &mut ComplexImage) -> Result<()> {
        spectrum.multiply_in_place(&self.filter)
    }

    /// Filter a raster: pad to the filter size, transform, multiply, transform
    /// back and write the color channels into a copy of the raster. Alpha and
    /// stride padding are preserved.
    ///
    /// # Errors
    /// `InvalidArgument` if the raster is larger than the filter.
    pub fn apply_to_raster(&self, raster: &RasterImage) -> Result<RasterImage> {
        let (width, height) = self.dims();
        let mut image = ComplexImage::from_raster_padded(raster, width, height)?;
        fft2_image(&mut image);
        self.apply(&mut image)?;
        inverse_fft2_image(&mut image);
        let mut out = raster.clone();
        image.write_to_raster(&mut out);
        Ok(out)
    }

    /// Filter rotated with the alias-free rotator.
    pub fn rotate(&self, degrees: f64) -> Result<Self> {
        self.rotate_with(degrees, RotationMethod::AliasFree)
    }

    pub fn rotate_nearest_neighbor(&self, degrees: f64) -> Result<Self> {
        self.rotate_with(degrees, RotationMethod::NearestNeighbor)
    }

    pub fn rotate_with(&self, degrees: f64, method: RotationMethod) -> Result<Self> {
        debug!(degrees, %method, "rotating deblur filter");
        Ok(Self {
            filter: rotate_image(&self.filter, degrees, method)?,
        })
    }

    /// Sum of squared differences to another filter over all channels and
    /// bins. The real part accumulates squared real differences, the
    /// imaginary part squared imaginary differences.
    pub fn mse(&self, other: &DeblurFilter) -> Result<Complex64> {
        ensure_same_dims(self.dims(), other.dims())?;
        let mut re = 0.0;
        let mut im = 0.0;
        for (a, b) in self.channels().iter().zip(other.channels().iter()) {
            for (p, q) in a.view().iter().zip(b.view().iter()) {
                let d = p - q;
                re += d.re * d.re;
                im += d.im * d.im;
            }
        }
        Ok(Complex64::new(re, im))
    }

    /// The reciprocal filter (deblur to reblur and back), clamped with `epsilon`.
    pub fn inverted(&self, epsilon: f64) -> Result<Self> {
        let (width, height) = self.dims();
        let one = ComplexPlane::from_generator(width, height, || Complex64::new(1.0, 0.0))?;
        let ones = ComplexImage::from_channel_refs(&one, &one, &one)?;
        Ok(Self {
            filter: ones.divide_by(&self.filter, epsilon)?,
        })
    }
}

/// Deblur `image` with a filter learned from a reference / blurred raster
/// pair. All three are padded to one power-of-two size covering the largest.
pub fn deblur_raster(
    reference: &RasterImage,
    blurred: &RasterImage,
    image: &RasterImage,
    settings: &DeblurSettings,
) -> Result<RasterImage> {
    let rasters = [reference, blurred, image];
    let width = rasters.iter().map(|r| r.width()).max().unwrap_or(1).next_power_of_two();
    let height = rasters.iter().map(|r| r.height()).max().unwrap_or(1).next_power_of_two();
    let filter = DeblurFilter::from_images(
        &ComplexImage::from_raster_padded(reference, width, height)?,
        &ComplexImage::from_raster_padded(blurred, width, height)?,
        settings,
    )?;
    filter.apply_to_raster(image)
}
