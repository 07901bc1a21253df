//! Quasi-random sequences and inverse CDFs for quasi-Monte Carlo features
//!
//! Quasi-random feature maps replace i.i.d. draws with a low-discrepancy
//! Halton sequence pushed through the inverse CDF of the target distribution.
//! Everything here is deterministic.

use std::f64::consts::PI;

// ============================================================================
// Halton Sequence
// ============================================================================

/// The first `count` primes
pub fn first_primes(count: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(count);
    let mut candidate = 2u64;
    while primes.len() < count {
        let is_prime = primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0);
        if is_prime {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Radical inverse of `index` in `base` (van der Corput)
#[inline]
pub fn radical_inverse(mut index: u64, base: u64) -> f64 {
    let base_f = base as f64;
    let mut result = 0.0f64;
    let mut f = 1.0 / base_f;

    while index > 0 {
        result += f * (index % base) as f64;
        index /= base;
        f /= base_f;
    }

    result
}

/// Halton points `skip..skip + n_points` in `dimension` dimensions
///
/// Returned point-major: coordinate `d` of point `i` is at `i * dimension + d`.
/// Dimension `d` uses the `d`-th prime as its base. Indices past `u64::MAX`
/// are clamped there; callers bound `skip` so the range fits.
pub fn halton(n_points: usize, dimension: usize, skip: u64) -> Vec<f64> {
    let primes = first_primes(dimension);
    let mut out = vec![0.0; n_points * dimension];
    for (d, &base) in primes.iter().enumerate() {
        for i in 0..n_points {
            out[i * dimension + d] = radical_inverse(skip.saturating_add(i as u64), base);
        }
    }
    out
}

// ============================================================================
// Error Function
// ============================================================================

const TWO_OVER_SQRT_PI: f64 = 1.128_379_167_095_512_6;

/// erf(x) by Abramowitz and Stegun 7.1.26 (about 1e-7 absolute error)
pub fn erf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    if x.is_nan() {
        return f64::NAN;
    }
    if x.is_infinite() {
        return x.signum();
    }

    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = x.signum();
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}

/// Inverse error function: rational first guess, then Newton steps on [`erf`]
pub fn erfinv(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= -1.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if p == 0.0 {
        return 0.0;
    }

    let a = p.abs();
    let mut x = if a <= 0.7 {
        let y = a * a;
        a * (((-0.140543331 * y + 0.914624893) * y - 1.645349621) * y + 0.886226899)
    } else {
        // Tail: Giles' single-precision form in w = -ln(1 - a²)
        let w = -((1.0 - a) * (1.0 + a)).ln();
        let z = if w < 5.0 {
            let w = w - 2.5;
            let mut r = 2.810_226_36e-08;
            r = 3.432_739_39e-07 + r * w;
            r = -3.523_387_7e-06 + r * w;
            r = -4.391_506_54e-06 + r * w;
            r = 0.000_218_580_87 + r * w;
            r = -0.001_253_725_03 + r * w;
            r = -0.004_177_681_64 + r * w;
            r = 0.246_640_727 + r * w;
            1.501_409_41 + r * w
        } else {
            let w = w.sqrt() - 3.0;
            let mut r = -0.000_200_214_257;
            r = 0.000_100_950_558 + r * w;
            r = 0.001_349_343_22 + r * w;
            r = -0.003_673_428_44 + r * w;
            r = 0.005_739_507_73 + r * w;
            r = -0.007_622_461_3 + r * w;
            r = 0.009_438_870_47 + r * w;
            r = 1.001_674_06 + r * w;
            2.832_976_82 + r * w
        };
        z * a
    };

    for _ in 0..2 {
        let err = erf(x) - a;
        x -= err / (TWO_OVER_SQRT_PI * (-x * x).exp());
    }

    if p < 0.0 {
        -x
    } else {
        x
    }
}

// ============================================================================
// Inverse CDFs
// ============================================================================

/// Standard normal quantile Φ⁻¹(u)
#[inline]
pub fn probit(u: f64) -> f64 {
    std::f64::consts::SQRT_2 * erfinv(2.0 * u - 1.0)
}

/// Standard Cauchy quantile
#[inline]
pub fn cauchy_quantile(u: f64) -> f64 {
    (PI * (u - 0.5)).tan()
}

/// Quantile of the Lévy distribution with location 0 and `scale`
#[inline]
pub fn levy_quantile(u: f64, scale: f64) -> f64 {
    let z = probit(1.0 - u / 2.0);
    scale / (z * z)
}
