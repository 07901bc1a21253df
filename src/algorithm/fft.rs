//! FFT kernels for the tensor sketch and the DCT
//!
//! Power-of-two lengths use the Stockham autosort algorithm. Every other
//! length goes through Bluestein's chirp-z reformulation, which turns an
//! N-point DFT into a circular convolution of power-of-two length M >= 2N-1
//! evaluated with the same Stockham kernel.
//!
//! # Algorithm: Stockham Radix-2 FFT
//!
//! ```text
//! For each stage s = 0..log2(N):
//!     half_m = 2^s
//!     m = 2^(s+1)
//!     For each group g = 0..(N/m):
//!         For each butterfly b = 0..half_m:
//!             twiddle = exp(sign * 2πi * b / m)
//!             even = src[g * half_m + b]
//!             odd = src[N/2 + g * half_m + b] * twiddle
//!             dst[g * m + b] = even + odd
//!             dst[g * m + b + half_m] = even - odd
//!     swap(src, dst)
//! ```
//!
//! # Algorithm: Bluestein
//!
//! ```text
//! w[k]  = exp(sign * πi * k² / N)
//! a[k]  = x[k] * w[k]                      (zero padded to M)
//! b[k]  = conj(w[k]), b[M-k] = conj(w[k])  (for 0 < k < N)
//! X[k]  = w[k] * IFFT(FFT(a) * FFT(b))[k]
//! ```

use crate::dtype::Complex128;
use crate::error::{Error, Result};
use std::f64::consts::PI;

/// Direction of FFT computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftDirection {
    /// Forward FFT: time domain → frequency domain
    /// Uses twiddle factor: e^(-2πi * k / N)
    Forward,
    /// Inverse FFT: frequency domain → time domain
    /// Uses twiddle factor: e^(+2πi * k / N)
    Inverse,
}

impl FftDirection {
    #[inline]
    fn sign(self) -> f64 {
        match self {
            FftDirection::Forward => -1.0,
            FftDirection::Inverse => 1.0,
        }
    }
}

/// Normalization mode for FFT
///
/// | Mode     | Forward Factor | Inverse Factor | Roundtrip          |
/// |----------|----------------|----------------|--------------------|
/// | None     | 1              | 1              | ifft(fft(x)) = N*x |
/// | Backward | 1              | 1/N            | ifft(fft(x)) = x   |
/// | Ortho    | 1/√N           | 1/√N           | ifft(fft(x)) = x   |
/// | Forward  | 1/N            | 1              | ifft(fft(x)) = x   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FftNormalization {
    /// No normalization (forward: 1, inverse: 1)
    None,
    /// Normalize inverse by 1/N (forward: 1, inverse: 1/N). Matches `numpy.fft`.
    #[default]
    Backward,
    /// Normalize both by 1/sqrt(N)
    Ortho,
    /// Normalize forward by 1/N (forward: 1/N, inverse: 1)
    Forward,
}

impl FftNormalization {
    /// Get the normalization factor for a given direction and size
    #[inline]
    pub fn factor(self, direction: FftDirection, n: usize) -> f64 {
        let n_f = n as f64;
        match (self, direction) {
            (Self::None, _) => 1.0,
            (Self::Backward, FftDirection::Forward) => 1.0,
            (Self::Backward, FftDirection::Inverse) => 1.0 / n_f,
            (Self::Ortho, _) => 1.0 / n_f.sqrt(),
            (Self::Forward, FftDirection::Forward) => 1.0 / n_f,
            (Self::Forward, FftDirection::Inverse) => 1.0,
        }
    }
}

/// Check if n is a power of 2
#[inline]
pub fn is_power_of_two(n: usize) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

/// Stockham FFT for power-of-two lengths
///
/// `output` receives the transform of `input` multiplied by `normalize_factor`.
/// Both slices must have the same power-of-two length.
pub fn stockham_fft(
    input: &[Complex128],
    output: &mut [Complex128],
    direction: FftDirection,
    normalize_factor: f64,
) {
    let n = input.len();
    debug_assert!(is_power_of_two(n), "N must be power of 2");
    debug_assert_eq!(input.len(), output.len());

    if n == 1 {
        output[0] = input[0].scale(normalize_factor);
        return;
    }

    let log_n = n.trailing_zeros() as usize;
    let sign = direction.sign();

    // Double buffering
    let mut buf_a: Vec<Complex128> = input.to_vec();
    let mut buf_b: Vec<Complex128> = vec![Complex128::ZERO; n];

    let mut src = &mut buf_a;
    let mut dst = &mut buf_b;

    for stage in 0..log_n {
        let m = 1 << (stage + 1);
        let half_m = 1 << stage;
        let groups = n / m;

        for g in 0..groups {
            for b in 0..half_m {
                let theta = sign * 2.0 * PI * (b as f64) / (m as f64);
                let twiddle = Complex128::cis(theta);

                let even = src[g * half_m + b];
                let odd = src[n / 2 + g * half_m + b] * twiddle;

                dst[g * m + b] = even + odd;
                dst[g * m + b + half_m] = even - odd;
            }
        }

        std::mem::swap(&mut src, &mut dst);
    }

    for (out, v) in output.iter_mut().zip(src.iter()) {
        *out = v.scale(normalize_factor);
    }
}

/// Bluestein chirp-z FFT for arbitrary lengths
fn bluestein_fft(
    input: &[Complex128],
    output: &mut [Complex128],
    direction: FftDirection,
    normalize_factor: f64,
) {
    let n = input.len();
    let m = (2 * n - 1).next_power_of_two();
    let sign = direction.sign();

    // k² mod 2N keeps the chirp angle small for large k
    let chirp: Vec<Complex128> = (0..n)
        .map(|k| {
            let k2 = (k as u128 * k as u128 % (2 * n as u128)) as f64;
            Complex128::cis(sign * PI * k2 / n as f64)
        })
        .collect();

    let mut a = vec![Complex128::ZERO; m];
    for (k, (x, w)) in input.iter().zip(chirp.iter()).enumerate() {
        a[k] = *x * *w;
    }

    let mut b = vec![Complex128::ZERO; m];
    b[0] = chirp[0].conj();
    for k in 1..n {
        b[k] = chirp[k].conj();
        b[m - k] = chirp[k].conj();
    }

    let mut fa = vec![Complex128::ZERO; m];
    let mut fb = vec![Complex128::ZERO; m];
    stockham_fft(&a, &mut fa, FftDirection::Forward, 1.0);
    stockham_fft(&b, &mut fb, FftDirection::Forward, 1.0);
    for (x, y) in fa.iter_mut().zip(fb.iter()) {
        *x *= *y;
    }
    stockham_fft(&fa, &mut a, FftDirection::Inverse, 1.0 / m as f64);

    for k in 0..n {
        output[k] = (a[k] * chirp[k]).scale(normalize_factor);
    }
}

/// 1D FFT of any positive length
///
/// # Errors
///
/// - `InvalidArgument` if `input` is empty
pub fn fft(
    input: &[Complex128],
    direction: FftDirection,
    norm: FftNormalization,
) -> Result<Vec<Complex128>> {
    let n = input.len();
    if n == 0 {
        return Err(Error::invalid_argument(
            "input",
            "FFT requires a non-empty input",
        ));
    }

    let factor = norm.factor(direction, n);
    let mut output = vec![Complex128::ZERO; n];
    if is_power_of_two(n) {
        stockham_fft(input, &mut output, direction, factor);
    } else {
        bluestein_fft(input, &mut output, direction, factor);
    }
    Ok(output)
}

/// Full-length FFT of a real signal (all N bins, not the N/2+1 half spectrum)
pub fn fft_real(
    input: &[f64],
    direction: FftDirection,
    norm: FftNormalization,
) -> Result<Vec<Complex128>> {
    let complex: Vec<Complex128> = input.iter().map(|&x| Complex128::from(x)).collect();
    fft(&complex, direction, norm)
}
