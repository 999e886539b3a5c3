//! Rotation of 2D spectra.
//!
//! Every rotator takes an *unshifted* spectrum (DC at `(0, 0)`) and returns an
//! unshifted spectrum of the same size, representing the spectrum of the
//! spatially rotated image. Angles are in degrees, counter-clockwise in the
//! `(x, y)` index frame: a feature at offset `q` from the center moves to `R q`.
//!
//! | Method | Cost per output bin | Notes |
//! |--------|---------------------|-------|
//! | [`rotate_nearest_neighbor`] | O(1) | exact for multiples of 90 deg |
//! | [`rotate_bilinear`] | O(1) | polar interpolation of 4 bins |
//! | [`rotate_sinc`] | O(w*h) | Hamming-windowed sinc kernel |
//! | [`rotate_alias_free`] | O(log(w*h)) | three FFT-domain shears |
//!
//! All of them reduce the angle modulo 360 deg first and return an exact copy
//! when what remains is below 0.01 deg.

pub mod alias_free;
pub mod interpolate;
pub mod resample;

pub use alias_free::rotate_alias_free;
pub use interpolate::{interpolate_phase, polar_bilinear, polar_lerp};
pub use resample::{rotate_bilinear, rotate_nearest_neighbor, rotate_sinc};

use crate::complex::{ComplexImage, ComplexPlane};
use crate::error::{Result, SpectralError};
use crate::fourier::{fft2_image, inverse_fft2_image};
use crate::raster::RasterImage;
use crate::settings::RotationMethod;

/// Rotations smaller than this (after reduction) return the input unchanged.
pub const NEGLIGIBLE_DEGREES: f64 = 0.01;

/// Rotate a spectrum with the selected method.
pub fn rotate_spectrum(plane: &ComplexPlane, degrees: f64, method: RotationMethod) -> Result<ComplexPlane> {
    match method {
        RotationMethod::NearestNeighbor => rotate_nearest_neighbor(plane, degrees),
        RotationMethod::Bilinear => rotate_bilinear(plane, degrees),
        RotationMethod::Sinc => rotate_sinc(plane, degrees),
        RotationMethod::AliasFree => rotate_alias_free(plane, degrees),
    }
}

/// Rotate the three channels of a spectral image in parallel.
pub fn rotate_image(image: &ComplexImage, degrees: f64, method: RotationMethod) -> Result<ComplexImage> {
    image.try_map_channels(|channel| rotate_spectrum(channel, degrees, method))
}

/// Rotate a raster about the center of its power-of-two padded canvas by
/// rotating its spectrum. Alpha is left as it was.
pub fn rotate_raster(raster: &RasterImage, degrees: f64, method: RotationMethod) -> Result<RasterImage> {
    let mut image = ComplexImage::from_raster_zero_padded(raster)?;
    fft2_image(&mut image);
    let mut rotated = rotate_image(&image, degrees, method)?;
    inverse_fft2_image(&mut rotated);
    let mut out = raster.clone();
    rotated.write_to_raster(&mut out);
    Ok(out)
}

/// Map an angle into `(-180, 180]`.
pub(crate) fn reduce_degrees(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

pub(crate) fn is_negligible(reduced: f64) -> bool {
    reduced.abs() < NEGLIGIBLE_DEGREES
}

pub(crate) fn check_angle(degrees: f64) -> Result<()> {
    if !degrees.is_finite() {
        return Err(SpectralError::invalid(format!(
            "rotation angle must be finite, got {degrees}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::{fft2, inverse_fft2};
    use crate::raster::PixelFormat;
    use num_complex::Complex64;

    #[test]
    fn test_reduce_degrees() {
        assert_eq!(reduce_degrees(0.0), 0.0);
        assert_eq!(reduce_degrees(360.0), 0.0);
        assert_eq!(reduce_degrees(180.0), 180.0);
        assert_eq!(reduce_degrees(-180.0), 180.0);
        assert_eq!(reduce_degrees(270.0), -90.0);
        assert_eq!(reduce_degrees(-30.0), -30.0);
        assert_eq!(reduce_degrees(750.0), 30.0);
    }

    #[test]
    fn test_every_method_is_identity_at_full_turns() {
        let spectrum = fft2(
            &ComplexPlane::from_fn(6, 5, |x, y| Complex64::new((x * 3 + y * 7 % 5) as f64, 0.0)).unwrap(),
        );
        for method in [
            RotationMethod::NearestNeighbor,
            RotationMethod::Bilinear,
            RotationMethod::Sinc,
            RotationMethod::AliasFree,
        ] {
            assert_eq!(rotate_spectrum(&spectrum, 0.0, method).unwrap(), spectrum);
            assert_eq!(rotate_spectrum(&spectrum, 360.0, method).unwrap(), spectrum);
            assert_eq!(rotate_spectrum(&spectrum, -720.005, method).unwrap(), spectrum);
        }
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let spectrum = ComplexPlane::new(4, 4).unwrap();
        for method in [RotationMethod::NearestNeighbor, RotationMethod::AliasFree] {
            assert!(rotate_spectrum(&spectrum, f64::NAN, method).is_err());
            assert!(rotate_spectrum(&spectrum, f64::INFINITY, method).is_err());
        }
    }

    #[test]
    fn test_rotate_image_keeps_channels_separate() {
        let a = ComplexPlane::from_generator(8, 8, || Complex64::new(1.0, 0.0)).unwrap();
        let b = a.scale(Complex64::new(2.0, 0.0));
        let c = a.scale(Complex64::new(3.0, 0.0));
        let image = ComplexImage::from_channels(fft2(&a), fft2(&b), fft2(&c)).unwrap();
        let rotated = rotate_image(&image, 90.0, RotationMethod::NearestNeighbor).unwrap();
        for (i, expected) in [1.0, 2.0, 3.0].into_iter().enumerate() {
            let dc = rotated.channel(i).unwrap()[(0, 0)];
            assert!((dc.re - expected).abs() < 1e-12);
        }
    }

    fn peak(plane: &ComplexPlane) -> (f64, f64) {
        let ((y, x), _) = plane
            .view()
            .indexed_iter()
            .max_by(|a, b| a.1.re.total_cmp(&b.1.re))
            .unwrap();
        (x as f64, y as f64)
    }

    #[test]
    fn test_every_method_rotates_about_center() {
        // offset (5, 2) from (16, 16), turned by 30 deg
        let (sin, cos) = 30f64.to_radians().sin_cos();
        let expected = (16.0 + 5.0 * cos - 2.0 * sin, 16.0 + 5.0 * sin + 2.0 * cos);
        let image = ComplexPlane::from_fn(32, 32, |x, y| {
            let dx = x as f64 - 21.0;
            let dy = y as f64 - 18.0;
            Complex64::new((-(dx * dx + dy * dy) / 8.0).exp(), 0.0)
        })
        .unwrap();
        let spectrum = fft2(&image);
        for method in [
            RotationMethod::NearestNeighbor,
            RotationMethod::Bilinear,
            RotationMethod::Sinc,
            RotationMethod::AliasFree,
        ] {
            let rotated = inverse_fft2(&rotate_spectrum(&spectrum, 30.0, method).unwrap());
            let (x, y) = peak(&rotated);
            let distance = ((x - expected.0).powi(2) + (y - expected.1).powi(2)).sqrt();
            assert!(distance < 1.5, "{method}: peak at ({x}, {y}), expected {expected:?}");
        }
    }

    #[test]
    fn test_rotate_raster_half_turn() {
        let mut raster = RasterImage::new(8, 8, PixelFormat::Rgb8).unwrap();
        raster.pixel_mut(3, 2).unwrap().copy_from_slice(&[200, 100, 50]);
        let unchanged = rotate_raster(&raster, 0.0, RotationMethod::AliasFree).unwrap();
        assert_eq!(unchanged, raster);

        // half turn about (4, 4): (3, 2) -> (5, 6)
        let rotated = rotate_raster(&raster, 180.0, RotationMethod::NearestNeighbor).unwrap();
        assert_eq!(rotated.pixel(5, 6), Some(&[200u8, 100, 50][..]));
        assert_eq!(rotated.pixel(3, 2), Some(&[0u8, 0, 0][..]));
    }
}
