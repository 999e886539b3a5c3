//! Tunable parameters for filter construction and spectrum rotation.

use std::fmt;
use std::str::FromStr;

use crate::complex::plane::check_epsilon;
use crate::error::{Result, SpectralError};

/// Default magnitude below which a denominator is clamped.
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// Parameters of a [`DeblurFilter`](crate::DeblurFilter).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeblurSettings {
    /// Clamp threshold of the reference / blurred division.
    ///
    /// Spectra are scaled by `1 / (width * height)`, so an ordinary image has
    /// many bins below the default threshold. Those bins come out as
    /// `|n| / epsilon` instead of `n / d`; even an identical pair then yields a
    /// filter that is not all `1 + 0i`, though the affected bins carry less
    /// than `epsilon` of amplitude each.
    pub epsilon: f64,
    /// Rescale every channel to unit DC and `N - 1` total non-DC magnitude.
    pub normalize: bool,
}

impl Default for DeblurSettings {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            normalize: false,
        }
    }
}

impl DeblurSettings {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// # Errors
    /// `InvalidArgument` unless epsilon is finite and positive.
    pub fn validate(&self) -> Result<()> {
        check_epsilon(self.epsilon)
    }
}

/// Spectrum rotation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotationMethod {
    /// Nearest source bin.
    NearestNeighbor,
    /// Polar bilinear interpolation.
    Bilinear,
    /// Windowed sinc kernel over the whole plane.
    Sinc,
    /// Three-shear rotation on an upsampled canvas.
    #[default]
    AliasFree,
}

impl RotationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            RotationMethod::NearestNeighbor => "nearest",
            RotationMethod::Bilinear => "bilinear",
            RotationMethod::Sinc => "sinc",
            RotationMethod::AliasFree => "alias_free",
        }
    }
}

impl fmt::Display for RotationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RotationMethod {
    type Err = SpectralError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "nearest_neighbor" => Ok(RotationMethod::NearestNeighbor),
            "bilinear" => Ok(RotationMethod::Bilinear),
            "sinc" => Ok(RotationMethod::Sinc),
            "alias_free" | "aliasfree" => Ok(RotationMethod::AliasFree),
            other => Err(SpectralError::invalid(format!("unknown rotation method '{other}'"))),
        }
    }
}
