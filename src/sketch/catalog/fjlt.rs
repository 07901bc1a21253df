//! Fast Johnson-Lindenstrauss transform
//!
//! `S = R · F · D`: random signs `D`, orthonormal DCT-II `F` along the
//! sketched dimension, then uniform sampling `R` of s coordinates.

use super::{child_rng, map_columns, Sampler};
use crate::algorithm::dct::dct2_ortho;
use crate::error::Result;
use crate::matrix::{DenseMatrix, Matrix};
use crate::random::{self, SketchRng};

#[derive(Debug, Clone)]
pub(crate) struct Fjlt {
    signs: Vec<f64>,
    sampler: Sampler,
}

impl Fjlt {
    pub(crate) fn sample(n: usize, s: usize, rng: &mut SketchRng) -> Result<Self> {
        let signs = random::rademacher(rng, n);
        let sampler = Sampler::uniform(n, s, &mut child_rng(rng))?;
        Ok(Self { signs, sampler })
    }

    pub(crate) fn apply_columnwise(&self, input: &Matrix) -> Result<DenseMatrix> {
        let dense = input.to_dense();
        let mixed = map_columns(&dense, self.signs.len(), |col| {
            let flipped: Vec<f64> = col.iter().zip(&self.signs).map(|(x, d)| x * d).collect();
            dct2_ortho(&flipped)
        })?;
        Ok(self.sampler.select(&mixed))
    }
}
