//! Pham-Pagh tensor sketch for the polynomial kernel `(γ⟨x, y⟩ + c)^q`
//!
//! The q-fold tensor power of `√γ·[x; √(c/γ)]` is sketched without forming it:
//! each factor goes through an independent CountSketch, and the circular
//! convolution of the q sketches is computed as a product of their DFTs.

use super::{child_rng, hash, map_columns, SparseProjection};
use crate::algorithm::fft::{fft, fft_real, FftDirection, FftNormalization};
use crate::dtype::Complex128;
use crate::error::Result;
use crate::matrix::{DenseMatrix, Matrix};
use crate::random::SketchRng;

#[derive(Debug, Clone)]
pub(crate) struct TensorSketch {
    s: usize,
    c: f64,
    gamma: f64,
    sketches: Vec<SparseProjection>,
}

impl TensorSketch {
    pub(crate) fn sample(
        n: usize,
        s: usize,
        q: usize,
        c: f64,
        gamma: f64,
        rng: &mut SketchRng,
    ) -> Result<Self> {
        let rows = if c > 0.0 { n + 1 } else { n };
        let sketches = (0..q)
            .map(|_| hash::count_sketch(rows, s, &mut child_rng(rng)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(s, c, gamma, sketches))
    }

    pub(crate) fn from_parts(s: usize, c: f64, gamma: f64, sketches: Vec<SparseProjection>) -> Self {
        Self {
            s,
            c,
            gamma,
            sketches,
        }
    }

    fn apply_vector(&self, x: &[f64]) -> Result<Vec<f64>> {
        let sg = self.gamma.sqrt();
        let mut augmented: Vec<f64> = x.iter().map(|v| v * sg).collect();
        if self.c > 0.0 {
            augmented.push(self.c.sqrt());
        }

        let mut product = vec![Complex128::ONE; self.s];
        for sketch in &self.sketches {
            let spectrum = fft_real(
                &sketch.apply_vector(&augmented),
                FftDirection::Forward,
                FftNormalization::Backward,
            )?;
            for (p, f) in product.iter_mut().zip(spectrum) {
                *p *= f;
            }
        }

        let convolved = fft(&product, FftDirection::Inverse, FftNormalization::Backward)?;
        Ok(convolved.into_iter().map(|z| z.re).collect())
    }

    pub(crate) fn apply_columnwise(&self, input: &Matrix) -> Result<DenseMatrix> {
        let dense = input.to_dense();
        map_columns(&dense, self.s, |col| self.apply_vector(col))
    }
}
