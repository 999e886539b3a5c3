//! A single 2D grid of complex samples.
//!
//! A plane holds either one spatial channel (real content, zero imaginary
//! part) or one frequency-domain spectrum. Storage is an `Array2` of shape
//! `(height, width)`, so the logical order is row-major: sample `(x, y)` is
//! element `y * width + x`.
//!
//! ## Arithmetic
//!
//! Binary operations come in two forms:
//! - **Copying** (`add`, `multiply`, `divide_by`, ...) returning a new plane
//! - **In place** (`multiply_in_place`, `divide_by_in_place`, ...) mutating `self`
//!
//! Both forms check that the operands share width and height and fail with
//! [`SpectralError::DimensionMismatch`] otherwise. Nothing is broadcast.

use std::ops::{Index, IndexMut};

use ndarray::{s, Array2, ArrayView2, ArrayViewMut2, Axis, Zip};
use num_complex::Complex64;

use crate::error::{ensure_same_dims, Result, SpectralError};

/// Largest magnitude a spatial sample takes after raster conversion.
pub const MAX_MAGNITUDE: f64 = 255.0;

/// 2D array of complex numbers with fixed dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexPlane {
    data: Array2<Complex64>,
}

impl ComplexPlane {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a zero-filled plane.
    ///
    /// # Errors
    /// `InvalidArgument` if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        check_dims(width, height)?;
        Ok(Self {
            data: Array2::zeros((height, width)),
        })
    }

    /// Create a plane by evaluating `f(x, y)` for every sample.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> Complex64,
    {
        check_dims(width, height)?;
        Ok(Self {
            data: Array2::from_shape_fn((height, width), |(y, x)| f(x, y)),
        })
    }

    /// Create a plane by drawing samples from a generator in row-major order.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Result<Self>
    where
        F: FnMut() -> Complex64,
    {
        Self::from_fn(width, height, |_, _| f())
    }

    /// Wrap a row-major sample vector of length `width * height`.
    pub fn from_vec(width: usize, height: usize, samples: Vec<Complex64>) -> Result<Self> {
        check_dims(width, height)?;
        if samples.len() != width * height {
            return Err(SpectralError::invalid(format!(
                "expected {} samples for {}x{}, got {}",
                width * height,
                width,
                height,
                samples.len()
            )));
        }
        let data = Array2::from_shape_vec((height, width), samples)
            .map_err(|e| SpectralError::invalid(e.to_string()))?;
        Ok(Self { data })
    }

    /// Build a spatial plane from real values (imaginary parts zero).
    pub fn from_real(values: ArrayView2<f64>) -> Result<Self> {
        let (height, width) = values.dim();
        check_dims(width, height)?;
        Ok(Self {
            data: values.mapv(|v| Complex64::new(v, 0.0)),
        })
    }

    /// Wrap an existing array of shape `(height, width)`.
    pub fn from_array(data: Array2<Complex64>) -> Result<Self> {
        let (height, width) = data.dim();
        check_dims(width, height)?;
        Ok(Self { data })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Number of samples, `width * height`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; planes have at least one sample.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Complex64> {
        self.data.get((y, x)).copied()
    }

    /// Overwrite the sample at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, value: Complex64) -> Result<()> {
        let (width, height) = self.dims();
        match self.data.get_mut((y, x)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SpectralError::invalid(format!(
                "pixel ({x}, {y}) outside {width}x{height} plane"
            ))),
        }
    }

    /// Read-only view with shape `(height, width)`.
    pub fn view(&self) -> ArrayView2<'_, Complex64> {
        self.data.view()
    }

    /// Mutable view with shape `(height, width)`. The shape cannot change.
    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, Complex64> {
        self.data.view_mut()
    }

    pub(crate) fn array(&self) -> &Array2<Complex64> {
        &self.data
    }

    pub(crate) fn array_mut(&mut self) -> &mut Array2<Complex64> {
        &mut self.data
    }

    /// Samples in row-major order.
    pub fn to_vec(&self) -> Vec<Complex64> {
        self.data.iter().copied().collect()
    }

    pub fn into_array(self) -> Array2<Complex64> {
        self.data
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    pub fn magnitudes(&self) -> Array2<f64> {
        self.data.mapv(|c| c.norm())
    }

    pub fn phases(&self) -> Array2<f64> {
        self.data.mapv(|c| c.arg())
    }

    pub fn reals(&self) -> Array2<f64> {
        self.data.mapv(|c| c.re)
    }

    pub fn imaginaries(&self) -> Array2<f64> {
        self.data.mapv(|c| c.im)
    }

    pub fn min_magnitude(&self) -> f64 {
        self.data.iter().map(|c| c.norm()).fold(f64::INFINITY, f64::min)
    }

    pub fn max_magnitude(&self) -> f64 {
        self.data.iter().map(|c| c.norm()).fold(0.0, f64::max)
    }

    pub fn sum_magnitude(&self) -> f64 {
        self.data.iter().map(|c| c.norm()).sum()
    }

    pub fn average_magnitude(&self) -> f64 {
        self.sum_magnitude() / self.len() as f64
    }

    // ========================================================================
    // Elementwise arithmetic
    // ========================================================================

    /// Elementwise sum of two planes.
    pub fn add(&self, other: &ComplexPlane) -> Result<ComplexPlane> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise difference `self - other`.
    pub fn sub(&self, other: &ComplexPlane) -> Result<ComplexPlane> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Elementwise product.
    pub fn multiply(&self, other: &ComplexPlane) -> Result<ComplexPlane> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Elementwise product written into `self`.
    pub fn multiply_in_place(&mut self, other: &ComplexPlane) -> Result<()> {
        ensure_same_dims(self.dims(), other.dims())?;
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|a, &b| *a *= b);
        Ok(())
    }

    pub fn add_in_place(&mut self, other: &ComplexPlane) -> Result<()> {
        ensure_same_dims(self.dims(), other.dims())?;
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|a, &b| *a += b);
        Ok(())
    }

    pub fn add_scalar(&self, value: Complex64) -> ComplexPlane {
        self.map(|c| c + value)
    }

    pub fn sub_scalar(&self, value: Complex64) -> ComplexPlane {
        self.map(|c| c - value)
    }

    /// Multiply every sample by a complex factor.
    pub fn scale(&self, factor: Complex64) -> ComplexPlane {
        self.map(|c| c * factor)
    }

    pub fn scale_in_place(&mut self, factor: Complex64) {
        self.data.mapv_inplace(|c| c * factor);
    }

    /// Divide every sample by a complex scalar.
    ///
    /// # Errors
    /// `InvalidArgument` when `divisor` is exactly zero.
    pub fn divide_scalar(&self, divisor: Complex64) -> Result<ComplexPlane> {
        if divisor == Complex64::new(0.0, 0.0) {
            return Err(SpectralError::invalid("division of plane by zero scalar"));
        }
        Ok(self.map(|c| c / divisor))
    }

    /// Epsilon-clamped elementwise division `self / denominator`.
    ///
    /// Where `|denominator| >= epsilon` the plain quotient is taken. Below the
    /// threshold the numerator is multiplied by `polar(1/epsilon, -phase(d))`,
    /// which keeps the phase of a true division while bounding the result
    /// magnitude by `|numerator| / epsilon`.
    pub fn divide_by(&self, denominator: &ComplexPlane, epsilon: f64) -> Result<ComplexPlane> {
        let mut out = self.clone();
        out.divide_by_in_place(denominator, epsilon)?;
        Ok(out)
    }

    pub fn divide_by_in_place(&mut self, denominator: &ComplexPlane, epsilon: f64) -> Result<()> {
        ensure_same_dims(self.dims(), denominator.dims())?;
        check_epsilon(epsilon)?;
        Zip::from(&mut self.data)
            .and(&denominator.data)
            .for_each(|n, &d| *n = clamped_div(*n, d, epsilon));
        Ok(())
    }

    pub fn conjugate(&self) -> ComplexPlane {
        self.map(|c| c.conj())
    }

    pub fn conjugate_in_place(&mut self) {
        self.data.mapv_inplace(|c| c.conj());
    }

    /// Rescale so the magnitude sum equals that of `reference`.
    ///
    /// No-op when the scale is already within `f64::EPSILON` of 1 or when this
    /// plane has no energy to rescale.
    pub fn norm(&mut self, reference: &ComplexPlane) -> Result<()> {
        ensure_same_dims(self.dims(), reference.dims())?;
        let own = self.sum_magnitude();
        if own == 0.0 {
            return Ok(());
        }
        let scale = reference.sum_magnitude() / own;
        if (scale - 1.0).abs() < f64::EPSILON {
            return Ok(());
        }
        self.data.mapv_inplace(|c| c * scale);
        Ok(())
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Apply `f` to a copy of every row; the modified copy is written back.
    pub fn for_each_row<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &mut [Complex64]),
    {
        self.for_each_lane(Axis(0), |y, lane| f(y, lane));
    }

    /// Apply `f` to a copy of every column; the modified copy is written back.
    pub fn for_each_column<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &mut [Complex64]),
    {
        self.for_each_lane(Axis(1), |x, lane| f(x, lane));
    }

    /// Mutate every sample through `f(x, y, &mut sample)`.
    pub fn for_each_pixel<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, usize, &mut Complex64),
    {
        for ((y, x), v) in self.data.indexed_iter_mut() {
            f(x, y, v);
        }
    }

    /// Gather each lane of `outer` into a scratch buffer, run `f`, scatter back.
    fn for_each_lane<F>(&mut self, outer: Axis, mut f: F)
    where
        F: FnMut(usize, &mut [Complex64]),
    {
        let lane_len = self.data.len_of(Axis(1 - outer.index()));
        let mut buf = vec![Complex64::new(0.0, 0.0); lane_len];
        for (i, mut lane) in self.data.axis_iter_mut(outer).enumerate() {
            for (b, v) in buf.iter_mut().zip(lane.iter()) {
                *b = *v;
            }
            f(i, &mut buf);
            for (v, b) in lane.iter_mut().zip(buf.iter()) {
                *v = *b;
            }
        }
    }

    /// New plane with `f` applied to every sample.
    pub fn map<F>(&self, f: F) -> ComplexPlane
    where
        F: Fn(Complex64) -> Complex64,
    {
        ComplexPlane {
            data: self.data.mapv(f),
        }
    }

    fn zip_with<F>(&self, other: &ComplexPlane, f: F) -> Result<ComplexPlane>
    where
        F: Fn(Complex64, Complex64) -> Complex64,
    {
        ensure_same_dims(self.dims(), other.dims())?;
        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|&a, &b| f(a, b));
        Ok(ComplexPlane { data })
    }

    // ========================================================================
    // Spatial padding
    // ========================================================================

    /// Copy into a larger zero plane, content anchored at the top-left.
    pub fn zero_padded(&self, width: usize, height: usize) -> Result<ComplexPlane> {
        let (w, h) = self.dims();
        if width < w || height < h {
            return Err(SpectralError::invalid(format!(
                "cannot pad {w}x{h} plane down to {width}x{height}"
            )));
        }
        let mut out = ComplexPlane::new(width, height)?;
        out.data.slice_mut(s![..h, ..w]).assign(&self.data);
        Ok(out)
    }

    /// Top-left `width x height` window of this plane.
    pub fn cropped(&self, width: usize, height: usize) -> Result<ComplexPlane> {
        let (w, h) = self.dims();
        check_dims(width, height)?;
        if width > w || height > h {
            return Err(SpectralError::invalid(format!(
                "cannot crop {w}x{h} plane to {width}x{height}"
            )));
        }
        Ok(ComplexPlane {
            data: self.data.slice(s![..height, ..width]).to_owned(),
        })
    }
}

impl Index<(usize, usize)> for ComplexPlane {
    type Output = Complex64;

    /// Index by `(x, y)`.
    fn index(&self, (x, y): (usize, usize)) -> &Complex64 {
        &self.data[[y, x]]
    }
}

impl IndexMut<(usize, usize)> for ComplexPlane {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Complex64 {
        &mut self.data[[y, x]]
    }
}

/// Epsilon-clamped quotient of two samples.
#[inline]
pub fn clamped_div(numerator: Complex64, denominator: Complex64, epsilon: f64) -> Complex64 {
    if denominator.norm() >= epsilon {
        numerator / denominator
    } else {
        numerator * Complex64::from_polar(1.0 / epsilon, -denominator.arg())
    }
}

pub(crate) fn check_dims(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SpectralError::invalid(format!(
            "plane dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

pub(crate) fn check_epsilon(epsilon: f64) -> Result<()> {
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(SpectralError::invalid(format!(
            "epsilon must be finite and positive, got {epsilon}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn ramp(width: usize, height: usize) -> ComplexPlane {
        ComplexPlane::from_fn(width, height, |x, y| c(x as f64, y as f64)).unwrap()
    }

    #[test]
    fn test_new_is_zero_filled() {
        let p = ComplexPlane::new(3, 2).unwrap();
        assert_eq!(p.dims(), (3, 2));
        assert_eq!(p.len(), 6);
        assert!(p.view().iter().all(|v| *v == c(0.0, 0.0)));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            ComplexPlane::new(0, 4),
            Err(SpectralError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_row_major_layout() {
        let p = ramp(4, 3);
        let flat = p.to_vec();
        // index = y * width + x
        assert_eq!(flat[2 * 4 + 1], c(1.0, 2.0));
        assert_eq!(p[(1, 2)], c(1.0, 2.0));
    }

    #[test]
    fn test_from_vec_length_checked() {
        let err = ComplexPlane::from_vec(2, 2, vec![c(1.0, 0.0); 3]);
        assert!(err.is_err());
    }

    #[test]
    fn test_binary_ops_reject_mismatch() {
        let a = ComplexPlane::new(4, 4).unwrap();
        let b = ComplexPlane::new(4, 2).unwrap();
        let expected = Err(SpectralError::mismatch((4, 4), (4, 2)));
        assert_eq!(a.add(&b), expected);
        assert_eq!(a.multiply(&b), expected);
        assert_eq!(a.divide_by(&b, 1e-3), expected);
    }

    #[test]
    fn test_arithmetic() {
        let a = ramp(2, 2);
        let b = a.add_scalar(c(1.0, 1.0));
        assert_eq!(b.sub(&a).unwrap().to_vec(), vec![c(1.0, 1.0); 4]);

        let mut m = a.clone();
        m.multiply_in_place(&b).unwrap();
        // (1 + 1i) * (2 + 2i) = 0 + 4i
        assert_eq!(m[(1, 1)], c(0.0, 4.0));

        let half = a.divide_scalar(c(2.0, 0.0)).unwrap();
        assert_eq!(half[(1, 0)], c(0.5, 0.0));
        assert!(a.divide_scalar(c(0.0, 0.0)).is_err());
    }

    #[test]
    fn test_divide_by_regular_quotient() {
        let n = ComplexPlane::from_generator(2, 2, || c(3.0, 4.0)).unwrap();
        let d = ComplexPlane::from_generator(2, 2, || c(0.0, 2.0)).unwrap();
        let q = n.divide_by(&d, 1e-3).unwrap();
        assert_abs_diff_eq!(q[(0, 0)].re, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q[(0, 0)].im, -1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_divide_by_clamp_bound() {
        let eps = 1e-2;
        let n = ComplexPlane::from_fn(4, 4, |x, y| c(x as f64 + 1.0, -(y as f64))).unwrap();
        let d = ComplexPlane::from_fn(4, 4, |x, y| {
            Complex64::from_polar(eps * 0.25 * (x as f64) / 4.0, y as f64)
        })
        .unwrap();
        let q = n.divide_by(&d, eps).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let bound = n[(x, y)].norm() / eps;
                assert!(q[(x, y)].norm() <= bound * (1.0 + 1e-12));
            }
        }
    }

    #[test]
    fn test_divide_by_clamp_keeps_quotient_phase() {
        let eps = 0.1;
        let n = ComplexPlane::from_generator(1, 1, || c(1.0, 0.0)).unwrap();
        let d = ComplexPlane::from_generator(1, 1, || Complex64::from_polar(0.01, 0.7)).unwrap();
        let q = n.divide_by(&d, eps).unwrap();
        assert_abs_diff_eq!(q[(0, 0)].arg(), -0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(q[(0, 0)].norm(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_divide_by_rejects_bad_epsilon() {
        let p = ComplexPlane::new(2, 2).unwrap();
        assert!(p.divide_by(&p, 0.0).is_err());
        assert!(p.divide_by(&p, f64::NAN).is_err());
    }

    #[test]
    fn test_magnitude_statistics() {
        let p = ComplexPlane::from_vec(2, 1, vec![c(3.0, 4.0), c(0.0, 1.0)]).unwrap();
        assert_eq!(p.max_magnitude(), 5.0);
        assert_eq!(p.min_magnitude(), 1.0);
        assert_eq!(p.sum_magnitude(), 6.0);
        assert_eq!(p.average_magnitude(), 3.0);
        assert_eq!(p.reals()[[0, 0]], 3.0);
        assert_eq!(p.imaginaries()[[0, 1]], 1.0);
    }

    #[test]
    fn test_norm_matches_reference_sum() {
        let mut p = ramp(3, 3);
        let reference = p.scale(c(2.5, 0.0));
        p.norm(&reference).unwrap();
        assert_abs_diff_eq!(p.sum_magnitude(), reference.sum_magnitude(), epsilon = 1e-9);
    }

    #[test]
    fn test_row_and_column_traversal() {
        let mut p = ramp(3, 2);
        p.for_each_row(|y, row| {
            assert_eq!(row.len(), 3);
            row.reverse();
            row[0] += c(0.0, 10.0 * y as f64);
        });
        assert_eq!(p[(0, 1)], c(2.0, 11.0));

        let mut q = ramp(3, 2);
        q.for_each_column(|x, col| {
            assert_eq!(col.len(), 2);
            col[1] = c(x as f64 * 100.0, 0.0);
        });
        assert_eq!(q[(2, 1)], c(200.0, 0.0));
        assert_eq!(q[(2, 0)], c(2.0, 0.0));
    }

    #[test]
    fn test_pad_and_crop() {
        let p = ramp(3, 2);
        let padded = p.zero_padded(4, 4).unwrap();
        assert_eq!(padded[(2, 1)], c(2.0, 1.0));
        assert_eq!(padded[(3, 3)], c(0.0, 0.0));
        assert_eq!(padded.cropped(3, 2).unwrap(), p);
        assert!(p.zero_padded(2, 2).is_err());
    }
}
