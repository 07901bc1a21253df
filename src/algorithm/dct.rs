//! Orthonormal type-II discrete cosine transform
//!
//! Matches `scipy.fftpack.dct(x, type=2, norm='ortho')`:
//!
//! ```text
//! y[k] = f(k) * 2 * Σ_n x[n] cos(π k (2n + 1) / (2N))
//! f(0) = sqrt(1 / (4N)),  f(k) = sqrt(1 / (2N))
//! ```
//!
//! Computed through a 2N-point FFT of the even extension `[x, reverse(x)]`:
//! `y[k] = f(k) * Re(exp(-πik / 2N) * FFT(ext)[k])`.

use super::fft::{FftDirection, FftNormalization, fft_real};
use crate::dtype::Complex128;
use crate::error::Result;
use std::f64::consts::PI;

/// Orthonormal DCT-II of a real vector
pub fn dct2_ortho(input: &[f64]) -> Result<Vec<f64>> {
    let n = input.len();
    let mut extended = Vec::with_capacity(2 * n);
    extended.extend_from_slice(input);
    extended.extend(input.iter().rev());

    let spectrum = fft_real(&extended, FftDirection::Forward, FftNormalization::None)?;

    let n_f = n as f64;
    let head = (1.0 / (4.0 * n_f)).sqrt();
    let tail = (1.0 / (2.0 * n_f)).sqrt();

    Ok((0..n)
        .map(|k| {
            let shift = Complex128::cis(-PI * k as f64 / (2.0 * n_f));
            let y = (spectrum[k] * shift).re;
            if k == 0 { y * head } else { y * tail }
        })
        .collect())
}
