//! Fourier-family kernels used by the structured and tensor sketches
//!
//! - [`fft`]: complex FFT of any length (Stockham radix-2, Bluestein otherwise)
//! - [`dct`]: orthonormal type-II discrete cosine transform

pub mod dct;
pub mod fft;
