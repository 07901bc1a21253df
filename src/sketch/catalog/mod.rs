//! In-process implementations of every sketch type
//!
//! Each family samples its state from a seeded [`SketchRng`] and implements
//! the columnwise rule `A (n × m) -> S·A (s × m)`. Rowwise application is the
//! columnwise rule applied to `Aᵗ`, transposed back by the framework, so no
//! family carries a second code path.

mod dense;
mod fastfood;
mod fjlt;
mod hash;
mod ppt;
mod rft;
mod sampling;
mod sparse;

pub(crate) use dense::DenseProjection;
pub(crate) use fastfood::Fastfood;
pub(crate) use fjlt::Fjlt;
pub(crate) use ppt::TensorSketch;
pub(crate) use rft::RandomFeatures;
pub(crate) use sampling::Sampler;
pub(crate) use sparse::SparseProjection;

use super::record::SerializedTransform;
use super::{SketchParams, SketchType};
use crate::error::Result;
use crate::matrix::{DenseMatrix, Matrix};
use crate::random::{child_seed, rng_from_seed, SketchRng};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Field holding the embedded sample indices of URST and NURST
pub(crate) const INDICES: &str = "idxs";

/// Sampled state of a self-contained sketch
#[derive(Debug, Clone)]
pub(crate) enum SampledSketch {
    /// JLT, CT
    Dense(DenseProjection),
    /// SJLT, CWT, MMT, WZT
    Sparse(SparseProjection),
    /// FJLT
    Fjlt(Fjlt),
    /// Random and quasi-random Fourier and Laplace feature maps
    Features(RandomFeatures),
    /// Fastfood feature maps
    Fastfood(Fastfood),
    /// PPT
    Tensor(TensorSketch),
    /// URST, NURST
    Sampling(Sampler),
}

impl SampledSketch {
    /// Sample the state for `params` mapping `n` to `s` from `seed`
    pub(crate) fn sample(params: &SketchParams, n: usize, s: usize, seed: u64) -> Result<Self> {
        let mut rng = rng_from_seed(seed);
        let rng = &mut rng;
        let sampled = match params {
            SketchParams::Jlt => SampledSketch::Dense(DenseProjection::gaussian(n, s, rng)),
            SketchParams::Ct { c } => SampledSketch::Dense(DenseProjection::cauchy(n, s, *c, rng)?),
            SketchParams::Sjlt { density } => {
                SampledSketch::Sparse(SparseProjection::random_sign(n, s, *density, rng)?)
            }
            SketchParams::Cwt => SampledSketch::Sparse(hash::count_sketch(n, s, rng)?),
            SketchParams::Mmt => SampledSketch::Sparse(hash::meng_mahoney(n, s, rng)?),
            SketchParams::Wzt { p } => SampledSketch::Sparse(hash::woodruff_zhang(n, s, *p, rng)?),
            SketchParams::Fjlt => SampledSketch::Fjlt(Fjlt::sample(n, s, rng)?),
            SketchParams::GaussianRft { sigma } => {
                SampledSketch::Features(RandomFeatures::gaussian(n, s, *sigma, rng))
            }
            SketchParams::LaplacianRft { sigma } => {
                SampledSketch::Features(RandomFeatures::laplacian(n, s, *sigma, rng)?)
            }
            SketchParams::MaternRft { nu, l } => {
                SampledSketch::Features(RandomFeatures::matern(n, s, *nu, *l, rng)?)
            }
            SketchParams::GaussianQrft { sigma, skip } => {
                SampledSketch::Features(RandomFeatures::gaussian_quasi(n, s, *sigma, *skip))
            }
            SketchParams::LaplacianQrft { sigma, skip } => {
                SampledSketch::Features(RandomFeatures::laplacian_quasi(n, s, *sigma, *skip))
            }
            SketchParams::ExpSemigroupRlt { beta } => {
                SampledSketch::Features(RandomFeatures::exp_semigroup(n, s, *beta, rng))
            }
            SketchParams::ExpSemigroupQrlt { beta, skip } => {
                SampledSketch::Features(RandomFeatures::exp_semigroup_quasi(n, s, *beta, *skip))
            }
            SketchParams::FastGaussianRft { sigma } => {
                SampledSketch::Fastfood(Fastfood::gaussian(n, s, *sigma, rng))
            }
            SketchParams::FastMaternRft { nu, l } => {
                SampledSketch::Fastfood(Fastfood::matern(n, s, *nu, *l, rng)?)
            }
            SketchParams::Ppt { q, c, gamma } => {
                SampledSketch::Tensor(TensorSketch::sample(n, s, *q, *c, *gamma, rng)?)
            }
            SketchParams::Urst => SampledSketch::Sampling(Sampler::uniform(n, s, rng)?),
            SketchParams::Nurst { probabilities } => {
                SampledSketch::Sampling(Sampler::weighted(probabilities, s, rng)?)
            }
        };
        Ok(sampled)
    }

    /// Rebuild the state stored in `record`
    ///
    /// Sampling sketches prefer their embedded indices; everything else is
    /// resampled from `seed`.
    pub(crate) fn restore(
        params: &SketchParams,
        n: usize,
        s: usize,
        seed: u64,
        record: &SerializedTransform,
    ) -> Result<Self> {
        if params.sketch_type().is_sampling() && record.contains(INDICES) {
            let idxs = record.usize_vec_field(INDICES)?;
            let distinct = params.sketch_type() == SketchType::Urst;
            return Ok(SampledSketch::Sampling(Sampler::from_indices(idxs, n, s, distinct)?));
        }
        Self::sample(params, n, s, seed)
    }

    /// Add state that cannot be recovered from the seed alone
    pub(crate) fn write_state(&self, record: &mut SerializedTransform) {
        if let SampledSketch::Sampling(sampler) = self {
            record.insert(INDICES, sampler.indices().to_vec());
        }
    }

    /// Columnwise rule: `input` is n × m, the result s × m
    pub(crate) fn apply_columnwise(&self, input: &Matrix) -> Result<DenseMatrix> {
        match self {
            SampledSketch::Dense(p) => p.apply_columnwise(input),
            SampledSketch::Sparse(p) => p.apply_columnwise(input),
            SampledSketch::Fjlt(f) => f.apply_columnwise(input),
            SampledSketch::Features(f) => f.apply_columnwise(input),
            SampledSketch::Fastfood(f) => f.apply_columnwise(input),
            SampledSketch::Tensor(t) => t.apply_columnwise(input),
            SampledSketch::Sampling(p) => p.apply_columnwise(input),
        }
    }
}

/// Generator for a sub-transform, seeded from the parent generator
pub(crate) fn child_rng(rng: &mut SketchRng) -> SketchRng {
    rng_from_seed(child_seed(rng))
}

/// Map every column of `input` through `f`, producing `out_rows`-long columns
pub(crate) fn map_columns<F>(input: &DenseMatrix, out_rows: usize, f: F) -> Result<DenseMatrix>
where
    F: Fn(&[f64]) -> Result<Vec<f64>> + Send + Sync,
{
    let columns: Vec<Vec<f64>> = (0..input.cols()).map(|j| input.column(j)).collect();

    #[cfg(feature = "rayon")]
    let mapped: Result<Vec<Vec<f64>>> = if columns.len() > 1 {
        columns.par_iter().map(|c| f(c)).collect()
    } else {
        columns.iter().map(|c| f(c)).collect()
    };

    #[cfg(not(feature = "rayon"))]
    let mapped: Result<Vec<Vec<f64>>> = columns.iter().map(|c| f(c)).collect();

    Ok(DenseMatrix::from_columns(out_rows, &mapped?))
}
