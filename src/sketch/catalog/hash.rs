//! Hashed CountSketch-style projections (CWT, MMT, WZT)
//!
//! A random hash `h: [n] -> [s]` puts exactly one nonzero in every column of
//! the s × n sketch matrix; the variants differ only in the nonzero values.

use super::SparseProjection;
use crate::error::Result;
use crate::matrix::CsrMatrix;
use crate::random::{self, SketchRng};

/// Sketch matrix with `values[j]` at row `h(j)` of column `j`
///
/// Values are drawn before buckets.
pub(crate) fn hash_map(s: usize, values: Vec<f64>, rng: &mut SketchRng) -> Result<SparseProjection> {
    let n = values.len();
    let buckets = random::uniform_index(rng, s, n);
    from_buckets(s, &buckets, &values)
}

pub(crate) fn from_buckets(s: usize, buckets: &[usize], values: &[f64]) -> Result<SparseProjection> {
    let triplets: Vec<(usize, usize, f64)> = buckets
        .iter()
        .zip(values.iter())
        .enumerate()
        .map(|(j, (&row, &v))| (row, j, v))
        .collect();
    Ok(SparseProjection::from_csr(CsrMatrix::from_triplets(
        [s, buckets.len()],
        &triplets,
    )?))
}

/// Clarkson-Woodruff: Rademacher values
pub(crate) fn count_sketch(n: usize, s: usize, rng: &mut SketchRng) -> Result<SparseProjection> {
    let values = random::rademacher(rng, n);
    hash_map(s, values, rng)
}

/// Meng-Mahoney: standard Cauchy values
pub(crate) fn meng_mahoney(n: usize, s: usize, rng: &mut SketchRng) -> Result<SparseProjection> {
    let values = random::standard_cauchy(rng, n)?;
    hash_map(s, values, rng)
}

/// Woodruff-Zhang: values ±E^(1/p) with E ~ Exp(1)
pub(crate) fn woodruff_zhang(
    n: usize,
    s: usize,
    p: f64,
    rng: &mut SketchRng,
) -> Result<SparseProjection> {
    let values = random::signed_exponential_power(rng, p, n);
    hash_map(s, values, rng)
}
