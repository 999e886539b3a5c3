//! Complex-valued planes and images.
//!
//! | Type | Contents |
//! |------|----------|
//! | [`ComplexPlane`] | one (height, width) grid of `Complex64` |
//! | [`ComplexImage`] | three planes of identical size (color channels) |
//!
//! The raw `[width, re, im, ...]` encoding lives in [`raw`].

pub mod image;
pub mod plane;
pub mod raw;

pub use image::{ComplexImage, CHANNELS};
pub use plane::{clamped_div, ComplexPlane, MAX_MAGNITUDE};
