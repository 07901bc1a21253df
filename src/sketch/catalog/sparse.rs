//! Sparse random projections stored as CSR (SJLT and the hashed family)

use crate::error::{Error, Result};
use crate::matrix::{CsrMatrix, DenseMatrix, Matrix};
use crate::random::SketchRng;
use rand::Rng;

/// s × n projection held in CSR form
#[derive(Debug, Clone)]
pub(crate) struct SparseProjection {
    matrix: CsrMatrix,
}

impl SparseProjection {
    pub(crate) fn from_csr(matrix: CsrMatrix) -> Self {
        Self { matrix }
    }

    /// Each entry is nonzero with probability `density`, valued ±√(1/density)
    pub(crate) fn random_sign(n: usize, s: usize, density: f64, rng: &mut SketchRng) -> Result<Self> {
        if !(density > 0.0 && density <= 1.0) {
            return Err(Error::invalid_argument(
                "density",
                format!("must lie in (0, 1], got {}", density),
            ));
        }
        let magnitude = (1.0 / density).sqrt();
        let mut triplets = Vec::new();
        for i in 0..s {
            for j in 0..n {
                if rng.random_bool(density) {
                    let v = if rng.random_bool(0.5) { magnitude } else { -magnitude };
                    triplets.push((i, j, v));
                }
            }
        }
        Ok(Self::from_csr(CsrMatrix::from_triplets([s, n], &triplets)?))
    }

    pub(crate) fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }

    /// `S·x` for a single length-n vector
    pub(crate) fn apply_vector(&self, x: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.matrix.nrows()];
        for (i, j, v) in self.matrix.iter() {
            out[i] += v * x[j];
        }
        out
    }

    pub(crate) fn apply_columnwise(&self, input: &Matrix) -> Result<DenseMatrix> {
        match input {
            Matrix::Dense(a) => self.matrix.spmm(a),
            Matrix::Sparse(a) => self.matrix.spgemm_dense(a),
        }
    }
}
