//! 8-bit RGB / RGBA raster buffers and their conversion to complex images.
//!
//! ## Layout
//! A raster is an owned byte buffer described by `(width, height, stride,
//! format)`. Rows start every `stride` bytes; `stride` may exceed
//! `width * bytes_per_pixel` for alignment, the trailing bytes are ignored.
//! Pixels are R, G, B[, A].
//!
//! ## Conversion
//! Only the color channels are read and written. Bytes `[0, 255]` map to
//! complex magnitudes `[0, MAX_MAGNITUDE]` with zero imaginary part; on the way
//! back the real part is scaled, rounded and clamped to `[0, 255]`.

use ndarray::{Array3, ArrayView3};
use num_complex::Complex64;
use tracing::trace;

use crate::complex::{ComplexImage, ComplexPlane, MAX_MAGNITUDE};
use crate::error::{Result, SpectralError};

/// Supported pixel layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    /// # Errors
    /// `UnsupportedFormat` for anything but 3 or 4 bytes per pixel.
    pub fn from_bytes_per_pixel(bytes_per_pixel: usize) -> Result<Self> {
        match bytes_per_pixel {
            3 => Ok(PixelFormat::Rgb8),
            4 => Ok(PixelFormat::Rgba8),
            _ => Err(SpectralError::UnsupportedFormat { bytes_per_pixel }),
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, PixelFormat::Rgba8)
    }
}

/// Owned raster buffer with an explicit row pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl RasterImage {
    /// Tightly packed raster, color zero, alpha opaque.
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self> {
        let bpp = format.bytes_per_pixel();
        let mut data = vec![0u8; width * height * bpp];
        if format.has_alpha() {
            for px in data.chunks_exact_mut(bpp) {
                px[3] = 255;
            }
        }
        Self::from_bytes(width, height, width * bpp, bpp, data)
    }

    /// Wrap an existing buffer.
    ///
    /// # Errors
    /// - `UnsupportedFormat` for a pixel size other than 3 or 4 bytes
    /// - `InvalidArgument` for zero dimensions, a stride shorter than one row,
    ///   or a buffer too small for `height` rows
    pub fn from_bytes(
        width: usize,
        height: usize,
        stride: usize,
        bytes_per_pixel: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        let format = PixelFormat::from_bytes_per_pixel(bytes_per_pixel)?;
        if width == 0 || height == 0 {
            return Err(SpectralError::invalid(format!(
                "raster dimensions must be positive, got {width}x{height}"
            )));
        }
        let row_bytes = width
            .checked_mul(bytes_per_pixel)
            .ok_or_else(|| SpectralError::invalid("raster row size overflows"))?;
        if stride < row_bytes {
            return Err(SpectralError::invalid(format!(
                "stride {stride} shorter than a {row_bytes}-byte row"
            )));
        }
        let required = stride
            .checked_mul(height - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or_else(|| SpectralError::invalid("raster size overflows"))?;
        if data.len() < required {
            return Err(SpectralError::invalid(format!(
                "raster buffer holds {} bytes, {required} required",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    /// Wrap a tightly packed buffer (`stride == width * bytes_per_pixel`).
    pub fn from_packed(width: usize, height: usize, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let bpp = format.bytes_per_pixel();
        Self::from_bytes(width, height, width * bpp, bpp, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        y * self.stride + x * self.format.bytes_per_pixel()
    }

    /// Bytes of pixel `(x, y)`, `None` outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x, y);
        self.data.get(start..start + self.format.bytes_per_pixel())
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x, y);
        let bpp = self.format.bytes_per_pixel();
        self.data.get_mut(start..start + bpp)
    }

    /// Copy an `(height, width, channels)` array with 3 or 4 channels.
    pub fn from_array(pixels: ArrayView3<u8>) -> Result<Self> {
        let (height, width, channels) = pixels.dim();
        let format = PixelFormat::from_bytes_per_pixel(channels)?;
        Self::from_packed(width, height, format, pixels.iter().copied().collect())
    }

    /// Pixels as an `(height, width, channels)` array.
    pub fn to_array(&self) -> Result<Array3<u8>> {
        let shape = (self.height, self.width, self.format.bytes_per_pixel());
        Array3::from_shape_vec(shape, self.to_packed())
            .map_err(|e| SpectralError::invalid(format!("raster to array: {e}")))
    }

    /// Rows without stride padding, concatenated.
    pub fn to_packed(&self) -> Vec<u8> {
        let row_bytes = self.width * self.format.bytes_per_pixel();
        let mut out = Vec::with_capacity(row_bytes * self.height);
        for y in 0..self.height {
            let start = y * self.stride;
            out.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        out
    }
}

fn byte_to_sample(byte: u8) -> Complex64 {
    Complex64::new(byte as f64 * MAX_MAGNITUDE / 255.0, 0.0)
}

fn sample_to_byte(sample: Complex64) -> u8 {
    (sample.re * 255.0 / MAX_MAGNITUDE).round().clamp(0.0, 255.0) as u8
}

fn channel_from_raster(raster: &RasterImage, channel: usize, width: usize, height: usize) -> Result<ComplexPlane> {
    ComplexPlane::from_fn(width, height, |x, y| {
        raster
            .pixel(x, y)
            .map_or(Complex64::new(0.0, 0.0), |px| byte_to_sample(px[channel]))
    })
}

fn image_from_raster(raster: &RasterImage, width: usize, height: usize) -> Result<ComplexImage> {
    ComplexImage::from_channels(
        channel_from_raster(raster, 0, width, height)?,
        channel_from_raster(raster, 1, width, height)?,
        channel_from_raster(raster, 2, width, height)?,
    )
}

impl ComplexImage {
    /// Spatial complex image of the same size as the raster.
    pub fn from_raster(raster: &RasterImage) -> Result<ComplexImage> {
        image_from_raster(raster, raster.width(), raster.height())
    }

    /// Spatial complex image sized to the next power of two on each axis,
    /// raster content at the top-left, the rest zero.
    pub fn from_raster_zero_padded(raster: &RasterImage) -> Result<ComplexImage> {
        let width = raster.width().next_power_of_two();
        let height = raster.height().next_power_of_two();
        trace!(from = ?(raster.width(), raster.height()), to = ?(width, height), "zero-padded raster");
        image_from_raster(raster, width, height)
    }

    /// Spatial complex image of `width x height`, raster content at the
    /// top-left, the rest zero.
    ///
    /// # Errors
    /// `InvalidArgument` if the raster does not fit.
    pub fn from_raster_padded(raster: &RasterImage, width: usize, height: usize) -> Result<ComplexImage> {
        if width < raster.width() || height < raster.height() {
            return Err(SpectralError::invalid(format!(
                "{}x{} raster does not fit a {width}x{height} image",
                raster.width(),
                raster.height()
            )));
        }
        image_from_raster(raster, width, height)
    }

    /// Write the color channels into the raster, leaving alpha and stride
    /// padding untouched. Only the overlapping top-left region is written.
    pub fn write_to_raster(&self, raster: &mut RasterImage) {
        let width = self.width().min(raster.width());
        let height = self.height().min(raster.height());
        let channels = self.channels();
        for y in 0..height {
            for x in 0..width {
                if let Some(px) = raster.pixel_mut(x, y) {
                    for (byte, plane) in px.iter_mut().zip(channels.iter()) {
                        *byte = sample_to_byte(plane[(x, y)]);
                    }
                }
            }
        }
    }

    /// New `width x height` raster from the top-left region of this image.
    ///
    /// # Errors
    /// `InvalidArgument` if the region exceeds the image.
    pub fn to_raster(&self, format: PixelFormat, width: usize, height: usize) -> Result<RasterImage> {
        if width > self.width() || height > self.height() {
            return Err(SpectralError::invalid(format!(
                "cannot read {width}x{height} raster from {}x{} image",
                self.width(),
                self.height()
            )));
        }
        let mut raster = RasterImage::new(width, height, format)?;
        self.write_to_raster(&mut raster);
        Ok(raster)
    }
}
