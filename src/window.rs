//! Hamming windows and a bounded LRU cache of precomputed 2D windows.
//!
//! Windowing (apodizing) a spatial plane before the forward FFT tapers its
//! borders and reduces the leakage a hard image edge produces in the spectrum.
//! The cache is an ordinary value owned by the caller; there is no global
//! state. Entries are keyed by `(width, height)`, eviction is strict LRU.

use std::collections::VecDeque;
use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::complex::ComplexPlane;
use crate::error::{Result, SpectralError};

const ALPHA: f64 = 0.54;
const BETA: f64 = 0.46;

/// Coefficient `n` of a Hamming window of length `len`.
pub fn hamming(n: usize, len: usize) -> f64 {
    if len <= 1 {
        return 1.0;
    }
    ALPHA - BETA * (TAU * n as f64 / (len - 1) as f64).cos()
}

/// Continuous Hamming taper centered on zero, reaching `ALPHA - BETA` at
/// `|offset| == half_width` and zero beyond.
pub fn hamming_centered(offset: f64, half_width: f64) -> f64 {
    if offset.abs() > half_width {
        return 0.0;
    }
    ALPHA + BETA * (PI * offset / half_width).cos()
}

/// Separable 2D Hamming window of shape `(height, width)`.
pub fn hamming_2d(width: usize, height: usize) -> Array2<f64> {
    let wx: Vec<f64> = (0..width).map(|x| hamming(x, width)).collect();
    let wy: Vec<f64> = (0..height).map(|y| hamming(y, height)).collect();
    Array2::from_shape_fn((height, width), |(y, x)| wy[y] * wx[x])
}

/// LRU cache of 2D Hamming windows.
#[derive(Debug)]
pub struct WindowCache {
    capacity: usize,
    // most recently used at the front
    entries: VecDeque<((usize, usize), Arc<Array2<f64>>)>,
}

impl WindowCache {
    /// # Errors
    /// `InvalidArgument` for a zero capacity.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SpectralError::invalid("window cache capacity must be positive"));
        }
        Ok(Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a window for `(width, height)` is cached. Does not touch recency.
    pub fn contains(&self, width: usize, height: usize) -> bool {
        self.entries.iter().any(|(key, _)| *key == (width, height))
    }

    /// Window for `(width, height)`, computed on a miss.
    pub fn window(&mut self, width: usize, height: usize) -> Result<Arc<Array2<f64>>> {
        if width == 0 || height == 0 {
            return Err(SpectralError::invalid(format!(
                "window dimensions must be positive, got {width}x{height}"
            )));
        }
        let key = (width, height);
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            if let Some(entry) = self.entries.remove(pos) {
                let window = Arc::clone(&entry.1);
                self.entries.push_front(entry);
                return Ok(window);
            }
        }

        let window = Arc::new(hamming_2d(width, height));
        self.entries.push_front((key, Arc::clone(&window)));
        while self.entries.len() > self.capacity {
            if let Some((evicted, _)) = self.entries.pop_back() {
                debug!(?evicted, "window cache eviction");
            }
        }
        Ok(window)
    }

    /// Multiply a spatial plane by the window matching its size.
    pub fn apply(&mut self, plane: &mut ComplexPlane) -> Result<()> {
        let (width, height) = plane.dims();
        let window = self.window(width, height)?;
        Zip::from(plane.array_mut())
            .and(window.as_ref())
            .for_each(|c, &w| *c *= w);
        Ok(())
    }
}
