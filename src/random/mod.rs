//! Seeded sampling kernels for sketch parameters
//!
//! Every random quantity a self-contained sketch holds is drawn from a
//! [`SketchRng`] seeded with a single `u64`. ChaCha8 output is stable across
//! platforms and crate releases, so a stored seed reproduces the sampled
//! parameters bit for bit. Composite sketches draw one child seed per
//! sub-transform from the parent generator.

pub mod quasi;

use crate::error::{Error, Result};
use rand::distr::weighted::WeightedIndex;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Cauchy, ChiSquared, Distribution, Exp1, StandardNormal};

/// Generator used for all sketch sampling
pub type SketchRng = ChaCha8Rng;

/// Generator seeded with `seed`
pub fn rng_from_seed(seed: u64) -> SketchRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Fresh seed from the thread-local entropy source
pub fn fresh_seed() -> u64 {
    rand::rng().random()
}

/// Seed for a sub-transform, drawn from the parent generator
pub fn child_seed(rng: &mut SketchRng) -> u64 {
    rng.random()
}

/// Sample `len` values from N(0, 1)
pub fn standard_normal(rng: &mut SketchRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| StandardNormal.sample(rng)).collect()
}

/// Sample `len` values from the standard Cauchy distribution
pub fn standard_cauchy(rng: &mut SketchRng, len: usize) -> Result<Vec<f64>> {
    let dist = Cauchy::new(0.0, 1.0)
        .map_err(|e| Error::invalid_argument("scale", format!("invalid cauchy: {}", e)))?;
    Ok((0..len).map(|_| dist.sample(rng)).collect())
}

/// Sample `len` values uniformly from {-1, +1}
pub fn rademacher(rng: &mut SketchRng, len: usize) -> Vec<f64> {
    (0..len)
        .map(|_| if rng.random_bool(0.5) { 1.0 } else { -1.0 })
        .collect()
}

/// Sample `len` values of `±E^(1/p)` with `E ~ Exp(1)` and a fair sign
pub fn signed_exponential_power(rng: &mut SketchRng, p: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|_| {
            let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let e: f64 = Exp1.sample(rng);
            sign * e.powf(1.0 / p)
        })
        .collect()
}

/// Sample `len` values uniformly from `[low, high)`
pub fn uniform(rng: &mut SketchRng, low: f64, high: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|_| low + (high - low) * rng.random::<f64>())
        .collect()
}

/// Sample `len` values uniformly from `{0, .., bins - 1}`
pub fn uniform_index(rng: &mut SketchRng, bins: usize, len: usize) -> Vec<usize> {
    (0..len).map(|_| rng.random_range(0..bins)).collect()
}

/// Sample `len` values from a chi-squared distribution with `k` degrees of freedom
pub fn chi_squared(rng: &mut SketchRng, k: f64, len: usize) -> Result<Vec<f64>> {
    let dist = ChiSquared::new(k)
        .map_err(|e| Error::invalid_argument("k", format!("invalid chi-squared: {}", e)))?;
    Ok((0..len).map(|_| dist.sample(rng)).collect())
}

/// Sample `len` values from a Lévy distribution with location 0 and `scale`
///
/// Uses `scale / Z²` with `Z ~ N(0, 1)`.
pub fn levy(rng: &mut SketchRng, scale: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|_| {
            let z: f64 = StandardNormal.sample(rng);
            scale / (z * z)
        })
        .collect()
}

/// Uniformly random permutation of `0..n`
pub fn permutation(rng: &mut SketchRng, n: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(rng);
    idx
}

/// `amount` distinct indices from `0..n`, in the order they were drawn
///
/// # Errors
///
/// `InvalidArgument` if `amount > n`
pub fn sample_without_replacement(
    rng: &mut SketchRng,
    n: usize,
    amount: usize,
) -> Result<Vec<usize>> {
    if amount > n {
        return Err(Error::invalid_argument(
            "s",
            format!(
                "cannot draw {} distinct indices from {} without replacement",
                amount, n
            ),
        ));
    }
    let mut idx: Vec<usize> = (0..n).collect();
    let (chosen, _) = idx.partial_shuffle(rng, amount);
    Ok(chosen.to_vec())
}

/// `amount` indices drawn with replacement from the categorical distribution `weights`
pub fn categorical(rng: &mut SketchRng, weights: &[f64], amount: usize) -> Result<Vec<usize>> {
    let dist = WeightedIndex::new(weights)
        .map_err(|e| Error::invalid_argument("p", format!("invalid probabilities: {}", e)))?;
    Ok((0..amount).map(|_| dist.sample(rng)).collect())
}
