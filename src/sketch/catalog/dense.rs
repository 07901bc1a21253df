//! Dense random projections (JLT, CT)

use crate::error::Result;
use crate::matrix::{DenseMatrix, Matrix};
use crate::random::{self, SketchRng};

/// Explicit s × n projection matrix
#[derive(Debug, Clone)]
pub(crate) struct DenseProjection {
    matrix: DenseMatrix,
}

impl DenseProjection {
    pub(crate) fn from_matrix(matrix: DenseMatrix) -> Self {
        Self { matrix }
    }

    /// i.i.d. N(0, 1) entries scaled by 1/√s
    pub(crate) fn gaussian(n: usize, s: usize, rng: &mut SketchRng) -> Self {
        let scale = 1.0 / (s as f64).sqrt();
        let data = random::standard_normal(rng, s * n)
            .into_iter()
            .map(|v| v * scale)
            .collect();
        Self::from_matrix(row_major(s, n, data))
    }

    /// i.i.d. standard Cauchy entries scaled by c/s
    pub(crate) fn cauchy(n: usize, s: usize, c: f64, rng: &mut SketchRng) -> Result<Self> {
        let scale = c / s as f64;
        let data = random::standard_cauchy(rng, s * n)?
            .into_iter()
            .map(|v| v * scale)
            .collect();
        Ok(Self::from_matrix(row_major(s, n, data)))
    }

    pub(crate) fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }

    /// Scale row `i` by `factors[i]`
    pub(crate) fn scale_rows(&mut self, factors: &[f64]) {
        for (i, &f) in factors.iter().enumerate() {
            for j in 0..self.matrix.cols() {
                let v = self.matrix.get(i, j);
                self.matrix.set(i, j, v * f);
            }
        }
    }

    pub(crate) fn scale(&mut self, factor: f64) {
        self.matrix.scale(factor);
    }

    pub(crate) fn apply_columnwise(&self, input: &Matrix) -> Result<DenseMatrix> {
        match input {
            Matrix::Dense(a) => self.matrix.matmul(a),
            // S·A = (Aᵗ·Sᵗ)ᵗ keeps the sparse operand on the left
            Matrix::Sparse(a) => Ok(a.transpose().spmm(&self.matrix.transpose())?.into_transpose()),
        }
    }
}

/// `data` holds exactly `rows * cols` values
fn row_major(rows: usize, cols: usize, data: Vec<f64>) -> DenseMatrix {
    let mut m = DenseMatrix::zeros(rows, cols);
    m.as_mut_slice().copy_from_slice(&data);
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;
    use crate::random::rng_from_seed;

    #[test]
    fn test_gaussian_scale() {
        let p = DenseProjection::gaussian(200, 50, &mut rng_from_seed(1));
        let m = p.matrix();
        assert_eq!(m.shape(), [50, 200]);
        let var = m.as_slice().iter().map(|v| v * v).sum::<f64>() / (50.0 * 200.0);
        assert!((var * 50.0 - 1.0).abs() < 0.1, "variance {}", var);
    }

    #[test]
    fn test_sparse_input_matches_dense() {
        let p = DenseProjection::gaussian(4, 2, &mut rng_from_seed(3));
        let a = DenseMatrix::from_rows(&[
            vec![1.0, 0.0],
            vec![0.0, 2.0],
            vec![0.0, 0.0],
            vec![3.0, 0.0],
        ])
        .unwrap();
        let dense = p.apply_columnwise(&Matrix::Dense(a.clone())).unwrap();
        let sparse = p
            .apply_columnwise(&Matrix::Sparse(CsrMatrix::from_dense(&a)))
            .unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert!((dense.get(i, j) - sparse.get(i, j)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_cauchy_scale_applied() {
        let a = DenseProjection::cauchy(3, 2, 1.0, &mut rng_from_seed(4)).unwrap();
        let b = DenseProjection::cauchy(3, 2, 4.0, &mut rng_from_seed(4)).unwrap();
        for (x, y) in a.matrix().as_slice().iter().zip(b.matrix().as_slice()) {
            assert!((4.0 * x - y).abs() < 1e-12);
        }
    }
}
