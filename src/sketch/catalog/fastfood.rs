//! Fastfood feature maps (FastGaussianRFT, FastMaternRFT)
//!
//! The dense Gaussian weight matrix of a random Fourier feature map is replaced
//! by ⌈s/n⌉ stacked n × n blocks, each applied as
//!
//! ```text
//! V·x = √n · F(G ∘ P(√n · F(B ∘ x)))
//! ```
//!
//! with `B` random signs, `F` the orthonormal DCT-II, `P` a random permutation
//! and `G` a Gaussian diagonal. The stacked outputs are truncated to s
//! coordinates and passed through `√(2/s)·cos(cᵢ·v + bᵢ)`.
//!
//! Both application axes run the same block order: rowwise application is the
//! columnwise rule on the transpose.

use super::map_columns;
use crate::algorithm::dct::dct2_ortho;
use crate::error::Result;
use crate::matrix::{DenseMatrix, Matrix};
use crate::random::{self, SketchRng};
use std::f64::consts::PI;

#[derive(Debug, Clone)]
struct Block {
    signs: Vec<f64>,
    gaussian: Vec<f64>,
    permutation: Vec<usize>,
}

impl Block {
    fn sample(n: usize, rng: &mut SketchRng) -> Self {
        Self {
            signs: random::rademacher(rng, n),
            gaussian: random::standard_normal(rng, n),
            permutation: random::permutation(rng, n),
        }
    }

    /// `√n · F(G ∘ P(√n · F(B ∘ x)))`
    fn apply(&self, x: &[f64]) -> Result<Vec<f64>> {
        let root_n = (x.len() as f64).sqrt();
        let flipped: Vec<f64> = x.iter().zip(&self.signs).map(|(v, b)| v * b).collect();
        let mixed = dct2_ortho(&flipped)?;
        let permuted: Vec<f64> = self
            .permutation
            .iter()
            .zip(&self.gaussian)
            .map(|(&p, g)| g * root_n * mixed[p])
            .collect();
        Ok(dct2_ortho(&permuted)?.into_iter().map(|v| v * root_n).collect())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Fastfood {
    s: usize,
    blocks: Vec<Block>,
    phases: Vec<f64>,
    /// Multiplier applied to output coordinate `i` before the cosine
    frequency_scale: Vec<f64>,
}

impl Fastfood {
    pub(crate) fn gaussian(n: usize, s: usize, sigma: f64, rng: &mut SketchRng) -> Self {
        let blocks = Self::sample_blocks(n, s, rng);
        let phases = random::uniform(rng, 0.0, 2.0 * PI, s);
        let scale = 1.0 / (sigma * (n as f64).sqrt());
        Self {
            s,
            blocks,
            phases,
            frequency_scale: vec![scale; s],
        }
    }

    pub(crate) fn matern(n: usize, s: usize, nu: f64, l: f64, rng: &mut SketchRng) -> Result<Self> {
        let blocks = Self::sample_blocks(n, s, rng);
        let phases = random::uniform(rng, 0.0, 2.0 * PI, s);
        let base = 1.0 / (l * (n as f64).sqrt());
        let frequency_scale = random::chi_squared(rng, 2.0 * nu, s)?
            .into_iter()
            .map(|chi| base * (2.0 * nu / chi).sqrt())
            .collect();
        Ok(Self {
            s,
            blocks,
            phases,
            frequency_scale,
        })
    }

    fn sample_blocks(n: usize, s: usize, rng: &mut SketchRng) -> Vec<Block> {
        (0..s.div_ceil(n)).map(|_| Block::sample(n, rng)).collect()
    }

    fn apply_vector(&self, x: &[f64]) -> Result<Vec<f64>> {
        let mut stacked = Vec::with_capacity(self.blocks.len() * x.len());
        for block in &self.blocks {
            stacked.extend(block.apply(x)?);
        }
        stacked.truncate(self.s);

        let amplitude = (2.0 / self.s as f64).sqrt();
        Ok(stacked
            .iter()
            .zip(self.frequency_scale.iter().zip(&self.phases))
            .map(|(v, (c, b))| amplitude * (c * v + b).cos())
            .collect())
    }

    pub(crate) fn apply_columnwise(&self, input: &Matrix) -> Result<DenseMatrix> {
        let dense = input.to_dense();
        map_columns(&dense, self.s, |col| self.apply_vector(col))
    }
}
