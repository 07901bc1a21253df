//! Row and column sampling (URST, NURST)

use crate::error::{Error, Result};
use crate::matrix::{DenseMatrix, Matrix};
use crate::random::{self, SketchRng};

/// Selected input coordinates, in sampled order
#[derive(Debug, Clone)]
pub(crate) struct Sampler {
    idxs: Vec<usize>,
}

impl Sampler {
    /// `s` distinct coordinates of `0..n`
    pub(crate) fn uniform(n: usize, s: usize, rng: &mut SketchRng) -> Result<Self> {
        Ok(Self {
            idxs: random::sample_without_replacement(rng, n, s)?,
        })
    }

    /// `s` coordinates drawn with replacement according to `probabilities`
    pub(crate) fn weighted(probabilities: &[f64], s: usize, rng: &mut SketchRng) -> Result<Self> {
        Ok(Self {
            idxs: random::categorical(rng, probabilities, s)?,
        })
    }

    /// Sampler over explicit indices, as stored in a serialized record
    ///
    /// With `distinct` set every index may appear at most once.
    pub(crate) fn from_indices(idxs: Vec<usize>, n: usize, s: usize, distinct: bool) -> Result<Self> {
        if idxs.len() != s {
            return Err(Error::malformed(
                super::INDICES,
                format!("expected {} indices, got {}", s, idxs.len()),
            ));
        }
        if let Some(&bad) = idxs.iter().find(|&&i| i >= n) {
            return Err(Error::malformed(
                super::INDICES,
                format!("index {} out of range for N = {}", bad, n),
            ));
        }
        if distinct {
            let mut seen = vec![false; n];
            if let Some(&dup) = idxs.iter().find(|&&i| std::mem::replace(&mut seen[i], true)) {
                return Err(Error::malformed(
                    super::INDICES,
                    format!("index {} repeats in a sample drawn without replacement", dup),
                ));
            }
        }
        Ok(Self { idxs })
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.idxs
    }

    /// Copy the selected rows of a dense matrix
    pub(crate) fn select(&self, input: &DenseMatrix) -> DenseMatrix {
        input.select_rows(&self.idxs)
    }

    pub(crate) fn apply_columnwise(&self, input: &Matrix) -> Result<DenseMatrix> {
        Ok(match input {
            Matrix::Dense(a) => self.select(a),
            Matrix::Sparse(a) => a.select_rows(&self.idxs).to_dense(),
        })
    }
}
