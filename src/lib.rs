//! Spectral Deblur
//!
//! Frequency-domain processing of color images: complex planes, separable
//! 2D FFT, spectrum shifts, spectrum rotation and deconvolution filters, with
//! Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Data Flow
//! ```text
//! raster -> ComplexImage (zero-padded) -> fft2 -> spectrum
//!        -> { rotate | DeblurFilter::apply } -> inverse_fft2 -> raster
//! ```
//!
//! ## Image Format
//! Bindings accept 8-bit images with 3 or 4 channels:
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4) - alpha passes through untouched
//!
//! Only the color channels are transformed. Each becomes one
//! [`ComplexPlane`]; three of them form a [`ComplexImage`].
//!
//! ## Normalization
//! The forward FFT scales by `1 / (width * height)` so the DC bin is the mean
//! sample value; the inverse is unscaled.

pub mod complex;
pub mod deblur;
pub mod error;
pub mod fourier;
pub mod raster;
pub mod rotate;
pub mod settings;
pub mod window;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use complex::{ComplexImage, ComplexPlane, CHANNELS, MAX_MAGNITUDE};
pub use deblur::{deblur_raster, DeblurFilter};
pub use error::{Result, SpectralError};
pub use raster::{PixelFormat, RasterImage};
pub use rotate::{rotate_image, rotate_raster, rotate_spectrum};
pub use settings::{DeblurSettings, RotationMethod};
pub use window::WindowCache;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::deblur::deblur_raster;
    use crate::error::SpectralError;
    use crate::raster::RasterImage;
    use crate::rotate::rotate_raster;
    use crate::settings::{DeblurSettings, RotationMethod};

    impl From<SpectralError> for PyErr {
        fn from(err: SpectralError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    fn to_raster(image: &PyReadonlyArray3<'_, u8>) -> PyResult<RasterImage> {
        Ok(RasterImage::from_array(image.as_array())?)
    }

    // ========================================================================
    // Deblur
    // ========================================================================

    /// Deblur an image with a filter learned from a sharp / blurred pair.
    ///
    /// All three images are zero-padded to a shared power-of-two size; the
    /// output has the size and channel count of `image`.
    ///
    /// # Arguments
    /// * `reference` - Sharp image (3 or 4 channels)
    /// * `blurred` - The same scene, blurred
    /// * `image` - Image to deblur
    /// * `epsilon` - Clamp threshold for near-zero spectral bins (default: 1e-3)
    /// * `normalize` - Force unit DC gain on the filter (default: false)
    #[pyfunction]
    #[pyo3(signature = (reference, blurred, image, epsilon=1e-3, normalize=false))]
    pub fn deblur_rgb<'py>(
        py: Python<'py>,
        reference: PyReadonlyArray3<'py, u8>,
        blurred: PyReadonlyArray3<'py, u8>,
        image: PyReadonlyArray3<'py, u8>,
        epsilon: f64,
        normalize: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let settings = DeblurSettings::default()
            .with_epsilon(epsilon)
            .with_normalize(normalize);
        let result = deblur_raster(
            &to_raster(&reference)?,
            &to_raster(&blurred)?,
            &to_raster(&image)?,
            &settings,
        )?;
        Ok(result.to_array()?.into_pyarray(py))
    }

    // ========================================================================
    // Rotation
    // ========================================================================

    /// Rotate an image counter-clockwise by rotating its spectrum.
    ///
    /// # Arguments
    /// * `image` - Input image (3 or 4 channels)
    /// * `degrees` - Rotation angle
    /// * `method` - "nearest", "bilinear", "sinc" or "alias_free" (default)
    #[pyfunction]
    #[pyo3(signature = (image, degrees, method="alias_free"))]
    pub fn rotate_image_spectrum<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        degrees: f64,
        method: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let method: RotationMethod = method.parse()?;
        let result = rotate_raster(&to_raster(&image)?, degrees, method)?;
        Ok(result.to_array()?.into_pyarray(py))
    }

    #[pymodule]
    pub fn spectral_deblur(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(deblur_rgb, m)?)?;
        m.add_function(wrap_pyfunction!(rotate_image_spectrum, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::spectral_deblur;
