//! Value types shared by the Fourier kernels

pub mod complex;

pub use complex::Complex128;
