//! Frequency-domain transforms.
//!
//! - [`fft`] - separable forward/inverse 2D FFT and the 1D axis passes
//! - [`shift`] - quadrant swap, parity shift, up/down flips
//! - [`spectrum`] - centered zero-insertion and cropping of unshifted spectra
//!
//! All functions are stateless; they own no data beyond the planes passed in.

pub mod fft;
pub mod shift;
pub mod spectrum;

pub use fft::{
    fft2, fft2_image, fft2_in_place, fft2_into, fft_columns, fft_rows, inverse_fft2,
    inverse_fft2_image, inverse_fft2_in_place, inverse_fft2_into, inverse_fft_columns,
    inverse_fft_rows, Direction,
};
pub use shift::{
    fft_shift, fft_shift_freqz, fft_shift_freqz_in_place, fft_shift_in_place, fft_shift_into,
    flip_ud, flip_ud_in_place, flip_ud_phase, flip_ud_phase_in_place, ifft_shift,
    ifft_shift_in_place,
};
pub use spectrum::{
    crop_spectrum, pad_spectrum, resize_spectrum, signed_frequency, translate_spectrum,
};
