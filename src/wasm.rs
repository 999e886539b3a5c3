//! WebAssembly exports.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images are
//! flat RGBA byte arrays (length = width * height * 4); alpha is passed
//! through. Errors surface as JavaScript exceptions carrying the message.

use wasm_bindgen::prelude::*;

use crate::deblur::deblur_raster;
use crate::error::SpectralError;
use crate::raster::{PixelFormat, RasterImage};
use crate::rotate::rotate_raster;
use crate::settings::{DeblurSettings, RotationMethod};

fn to_js(err: SpectralError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn rgba(data: &[u8], width: usize, height: usize) -> Result<RasterImage, JsValue> {
    RasterImage::from_packed(width, height, PixelFormat::Rgba8, data.to_vec()).map_err(to_js)
}

// ============================================================================
// Deblur
// ============================================================================

/// Deblur an RGBA image with a filter learned from a sharp / blurred pair.
///
/// # Arguments
/// * `reference` - Flat RGBA bytes of the sharp image
/// * `blurred` - Flat RGBA bytes of the blurred image, same size as `reference`
/// * `pair_width` - Width of the reference / blurred pair
/// * `pair_height` - Height of the reference / blurred pair
/// * `image` - Flat RGBA bytes of the image to deblur
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `epsilon` - Clamp threshold for near-zero spectral bins
/// * `normalize` - Force unit DC gain on the filter
///
/// # Returns
/// Flat RGBA bytes of the deblurred image
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn deblur_rgba_wasm(
    reference: &[u8],
    blurred: &[u8],
    pair_width: usize,
    pair_height: usize,
    image: &[u8],
    width: usize,
    height: usize,
    epsilon: f64,
    normalize: bool,
) -> Result<Vec<u8>, JsValue> {
    let settings = DeblurSettings::default()
        .with_epsilon(epsilon)
        .with_normalize(normalize);
    let result = deblur_raster(
        &rgba(reference, pair_width, pair_height)?,
        &rgba(blurred, pair_width, pair_height)?,
        &rgba(image, width, height)?,
        &settings,
    )
    .map_err(to_js)?;
    Ok(result.into_bytes())
}

// ============================================================================
// Rotation
// ============================================================================

/// Rotate an RGBA image counter-clockwise by rotating its spectrum.
///
/// # Arguments
/// * `data` - Flat RGBA bytes
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `degrees` - Rotation angle
/// * `method` - "nearest", "bilinear", "sinc" or "alias_free"
///
/// # Returns
/// Flat RGBA bytes of the rotated image
#[wasm_bindgen]
pub fn rotate_spectrum_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    degrees: f64,
    method: &str,
) -> Result<Vec<u8>, JsValue> {
    let method: RotationMethod = method.parse().map_err(to_js)?;
    let result = rotate_raster(&rgba(data, width, height)?, degrees, method).map_err(to_js)?;
    Ok(result.into_bytes())
}
