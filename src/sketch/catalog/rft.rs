//! Kernel random-feature maps
//!
//! Every map here is `φ(A) = g(W·A)` for an s × n weight matrix `W`:
//!
//! | Map | W | g(z)ᵢ |
//! |-----|---|-------|
//! | Gaussian RFT | N(0, 1/σ²) | √(2/s)·cos(zᵢ + bᵢ) |
//! | Laplacian RFT | Cauchy(0, 1/σ) | √(2/s)·cos(zᵢ + bᵢ) |
//! | Matérn RFT | N(0, 1/l²) · √(2ν/χ²₂ᵥ) per row | √(2/s)·cos(zᵢ + bᵢ) |
//! | Quasi-random RFT | Halton points pushed through the inverse CDF | √(2/s)·cos(zᵢ + bᵢ) |
//! | Exp-semigroup RLT | Lévy(β²/2) | √(1/s)·exp(−zᵢ) |
//!
//! Random weights come from an inner JLT or CT sub-transform seeded from the
//! parent generator; the phases `b` are uniform on [0, 2π).

use super::{child_rng, DenseProjection};
use crate::error::Result;
use crate::matrix::{DenseMatrix, Matrix};
use crate::random::quasi::{cauchy_quantile, halton, levy_quantile, probit};
use crate::random::{self, SketchRng};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nonlinearity {
    /// √(2/s)·cos(z + b)
    Cosine,
    /// √(1/s)·exp(−z)
    NegativeExp,
}

#[derive(Debug, Clone)]
pub(crate) struct RandomFeatures {
    weights: DenseProjection,
    phases: Vec<f64>,
    nonlinearity: Nonlinearity,
}

impl RandomFeatures {
    pub(crate) fn gaussian(n: usize, s: usize, sigma: f64, rng: &mut SketchRng) -> Self {
        let mut weights = DenseProjection::gaussian(n, s, &mut child_rng(rng));
        weights.scale((s as f64).sqrt() / sigma);
        Self::cosine(weights, rng)
    }

    pub(crate) fn laplacian(n: usize, s: usize, sigma: f64, rng: &mut SketchRng) -> Result<Self> {
        let mut weights = DenseProjection::cauchy(n, s, 1.0, &mut child_rng(rng))?;
        weights.scale(s as f64 / sigma);
        Ok(Self::cosine(weights, rng))
    }

    pub(crate) fn matern(n: usize, s: usize, nu: f64, l: f64, rng: &mut SketchRng) -> Result<Self> {
        let mut weights = DenseProjection::gaussian(n, s, &mut child_rng(rng));
        let correction: Vec<f64> = random::chi_squared(rng, 2.0 * nu, s)?
            .into_iter()
            .map(|chi| (2.0 * nu / chi).sqrt())
            .collect();
        weights.scale_rows(&correction);
        weights.scale((s as f64).sqrt() / l);
        Ok(Self::cosine(weights, rng))
    }

    pub(crate) fn gaussian_quasi(n: usize, s: usize, sigma: f64, skip: u64) -> Self {
        Self::quasi_cosine(n, s, skip, |u| probit(u) / sigma)
    }

    pub(crate) fn laplacian_quasi(n: usize, s: usize, sigma: f64, skip: u64) -> Self {
        Self::quasi_cosine(n, s, skip, |u| cauchy_quantile(u) / sigma)
    }

    pub(crate) fn exp_semigroup(n: usize, s: usize, beta: f64, rng: &mut SketchRng) -> Self {
        let data = random::levy(rng, beta * beta / 2.0, s * n);
        Self {
            weights: DenseProjection::from_matrix(from_row_major(s, n, &data)),
            phases: Vec::new(),
            nonlinearity: Nonlinearity::NegativeExp,
        }
    }

    pub(crate) fn exp_semigroup_quasi(n: usize, s: usize, beta: f64, skip: u64) -> Self {
        let scale = beta * beta / 2.0;
        let points = halton(s, n, first_point(skip));
        let data: Vec<f64> = points.iter().map(|&u| levy_quantile(u, scale)).collect();
        Self {
            weights: DenseProjection::from_matrix(from_row_major(s, n, &data)),
            phases: Vec::new(),
            nonlinearity: Nonlinearity::NegativeExp,
        }
    }

    fn cosine(weights: DenseProjection, rng: &mut SketchRng) -> Self {
        let s = weights.matrix().rows();
        Self {
            weights,
            phases: random::uniform(rng, 0.0, 2.0 * PI, s),
            nonlinearity: Nonlinearity::Cosine,
        }
    }

    /// Feature `i` uses Halton point `i` in n + 1 dimensions: the first n
    /// coordinates give its frequency, the last its phase
    fn quasi_cosine(n: usize, s: usize, skip: u64, quantile: impl Fn(f64) -> f64) -> Self {
        let dim = n + 1;
        let points = halton(s, dim, first_point(skip));
        let mut weights = DenseMatrix::zeros(s, n);
        let mut phases = Vec::with_capacity(s);
        for i in 0..s {
            let point = &points[i * dim..(i + 1) * dim];
            for (j, &u) in point[..n].iter().enumerate() {
                weights.set(i, j, quantile(u));
            }
            phases.push(2.0 * PI * point[n]);
        }
        Self {
            weights: DenseProjection::from_matrix(weights),
            phases,
            nonlinearity: Nonlinearity::Cosine,
        }
    }

    pub(crate) fn apply_columnwise(&self, input: &Matrix) -> Result<DenseMatrix> {
        let mut z = self.weights.apply_columnwise(input)?;
        let s = z.rows();
        match self.nonlinearity {
            Nonlinearity::Cosine => {
                let amplitude = (2.0 / s as f64).sqrt();
                for i in 0..s {
                    for j in 0..z.cols() {
                        let v = z.get(i, j);
                        z.set(i, j, amplitude * (v + self.phases[i]).cos());
                    }
                }
            }
            Nonlinearity::NegativeExp => {
                let amplitude = (1.0 / s as f64).sqrt();
                z.map_inplace(|v| amplitude * (-v).exp());
            }
        }
        Ok(z)
    }
}

/// Index of the first Halton point used
///
/// Point 0 is the origin, where the inverse CDFs diverge, so the sequence
/// starts at index 1 + skip.
fn first_point(skip: u64) -> u64 {
    skip.saturating_add(1)
}

fn from_row_major(rows: usize, cols: usize, data: &[f64]) -> DenseMatrix {
    DenseMatrix::from_fn(rows, cols, |i, j| data[i * cols + j])
}
