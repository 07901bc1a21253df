//! Typed distribution parameters of each sketch type

use super::record::SerializedTransform;
use super::SketchType;
use crate::error::{Error, Result};
use tracing::warn;

/// Relative drift from 1 tolerated before NURST probabilities count as unnormalized
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-12;

/// Parameters of a sketch, one variant per [`SketchType`]
///
/// Serialized field names are given in brackets.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchParams {
    /// Dense Gaussian projection
    Jlt,
    /// Sparse projection with nonzero density in (0, 1] [`density`]
    Sjlt {
        /// Probability that an entry is nonzero
        density: f64,
    },
    /// Cauchy projection with scale `c` [`C`]
    Ct {
        /// Scale trading embedding size against distortion
        c: f64,
    },
    /// Fast Johnson-Lindenstrauss transform
    Fjlt,
    /// CountSketch
    Cwt,
    /// Meng-Mahoney transform
    Mmt,
    /// Woodruff-Zhang transform for the Lp norm [`P`]
    Wzt {
        /// Norm exponent
        p: f64,
    },
    /// Gaussian random features [`sigma`]
    GaussianRft {
        /// Kernel bandwidth
        sigma: f64,
    },
    /// Laplacian random features [`sigma`]
    LaplacianRft {
        /// Kernel bandwidth
        sigma: f64,
    },
    /// Matérn random features [`nu`, `l`]
    MaternRft {
        /// Smoothness
        nu: f64,
        /// Length scale
        l: f64,
    },
    /// Gaussian quasi-random features [`sigma`, `skip`]
    GaussianQrft {
        /// Kernel bandwidth
        sigma: f64,
        /// Leading Halton points to skip
        skip: u64,
    },
    /// Laplacian quasi-random features [`sigma`, `skip`]
    LaplacianQrft {
        /// Kernel bandwidth
        sigma: f64,
        /// Leading Halton points to skip
        skip: u64,
    },
    /// Exponential semigroup random Laplace features [`beta`]
    ExpSemigroupRlt {
        /// Kernel parameter
        beta: f64,
    },
    /// Exponential semigroup quasi-random Laplace features [`beta`, `skip`]
    ExpSemigroupQrlt {
        /// Kernel parameter
        beta: f64,
        /// Leading Halton points to skip
        skip: u64,
    },
    /// Fastfood Gaussian features [`sigma`]
    FastGaussianRft {
        /// Kernel bandwidth
        sigma: f64,
    },
    /// Fastfood Matérn features [`nu`, `l`]
    FastMaternRft {
        /// Smoothness
        nu: f64,
        /// Length scale
        l: f64,
    },
    /// Polynomial kernel tensor sketch [`q`, `c`, `gamma`]
    Ppt {
        /// Kernel degree
        q: usize,
        /// Kernel bias, non-negative
        c: f64,
        /// Normalization coefficient
        gamma: f64,
    },
    /// Uniform sampling
    Urst,
    /// Non-uniform sampling over the n input coordinates [`probabilities`]
    Nurst {
        /// Sampling distribution, one entry per input coordinate
        probabilities: Vec<f64>,
    },
}

impl SketchParams {
    /// Parameters used when a sketch is requested by name only
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for types without usable defaults (CT, WZT, the
    /// Matérn maps and NURST)
    pub fn defaults(sketch_type: SketchType) -> Result<Self> {
        let params = match sketch_type {
            SketchType::Jlt => SketchParams::Jlt,
            SketchType::Sjlt => SketchParams::Sjlt { density: 1.0 / 3.0 },
            SketchType::Fjlt => SketchParams::Fjlt,
            SketchType::Cwt => SketchParams::Cwt,
            SketchType::Mmt => SketchParams::Mmt,
            SketchType::GaussianRft => SketchParams::GaussianRft { sigma: 1.0 },
            SketchType::LaplacianRft => SketchParams::LaplacianRft { sigma: 1.0 },
            SketchType::GaussianQrft => SketchParams::GaussianQrft { sigma: 1.0, skip: 0 },
            SketchType::LaplacianQrft => SketchParams::LaplacianQrft { sigma: 1.0, skip: 0 },
            SketchType::ExpSemigroupRlt => SketchParams::ExpSemigroupRlt { beta: 1.0 },
            SketchType::ExpSemigroupQrlt => SketchParams::ExpSemigroupQrlt { beta: 1.0, skip: 0 },
            SketchType::FastGaussianRft => SketchParams::FastGaussianRft { sigma: 1.0 },
            SketchType::Ppt => SketchParams::Ppt {
                q: 3,
                c: 0.0,
                gamma: 1.0,
            },
            SketchType::Urst => SketchParams::Urst,
            SketchType::Ct
            | SketchType::Wzt
            | SketchType::MaternRft
            | SketchType::FastMaternRft
            | SketchType::Nurst => {
                return Err(Error::invalid_argument(
                    "params",
                    format!("{} has required parameters", sketch_type),
                ))
            }
        };
        Ok(params)
    }

    /// Type these parameters belong to
    pub fn sketch_type(&self) -> SketchType {
        match self {
            SketchParams::Jlt => SketchType::Jlt,
            SketchParams::Sjlt { .. } => SketchType::Sjlt,
            SketchParams::Ct { .. } => SketchType::Ct,
            SketchParams::Fjlt => SketchType::Fjlt,
            SketchParams::Cwt => SketchType::Cwt,
            SketchParams::Mmt => SketchType::Mmt,
            SketchParams::Wzt { .. } => SketchType::Wzt,
            SketchParams::GaussianRft { .. } => SketchType::GaussianRft,
            SketchParams::LaplacianRft { .. } => SketchType::LaplacianRft,
            SketchParams::MaternRft { .. } => SketchType::MaternRft,
            SketchParams::GaussianQrft { .. } => SketchType::GaussianQrft,
            SketchParams::LaplacianQrft { .. } => SketchType::LaplacianQrft,
            SketchParams::ExpSemigroupRlt { .. } => SketchType::ExpSemigroupRlt,
            SketchParams::ExpSemigroupQrlt { .. } => SketchType::ExpSemigroupQrlt,
            SketchParams::FastGaussianRft { .. } => SketchType::FastGaussianRft,
            SketchParams::FastMaternRft { .. } => SketchType::FastMaternRft,
            SketchParams::Ppt { .. } => SketchType::Ppt,
            SketchParams::Urst => SketchType::Urst,
            SketchParams::Nurst { .. } => SketchType::Nurst,
        }
    }

    /// Check the parameters against the dimensions `n -> s`
    ///
    /// NURST probabilities are normalized to sum to one; negative, non-finite
    /// or all-zero weights are rejected.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` naming the offending parameter
    pub fn validated(self, n: usize, s: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::invalid_argument("n", "input dimension must be positive"));
        }
        if s == 0 {
            return Err(Error::invalid_argument("s", "output dimension must be positive"));
        }

        if let SketchParams::GaussianQrft { skip, .. }
        | SketchParams::LaplacianQrft { skip, .. }
        | SketchParams::ExpSemigroupQrlt { skip, .. } = &self
        {
            // Halton indices run from skip + 1 through skip + s
            if skip.checked_add(s as u64).is_none() {
                return Err(Error::invalid_argument(
                    "skip",
                    format!("{} leaves no room for {} Halton points", skip, s),
                ));
            }
        }

        match self {
            SketchParams::Sjlt { density } => {
                if !(density > 0.0 && density <= 1.0) {
                    return Err(Error::invalid_argument(
                        "density",
                        format!("must lie in (0, 1], got {}", density),
                    ));
                }
            }
            SketchParams::Ct { c } => positive("C", c)?,
            SketchParams::Wzt { p } => positive("P", p)?,
            SketchParams::GaussianRft { sigma }
            | SketchParams::LaplacianRft { sigma }
            | SketchParams::GaussianQrft { sigma, .. }
            | SketchParams::LaplacianQrft { sigma, .. }
            | SketchParams::FastGaussianRft { sigma } => positive("sigma", sigma)?,
            SketchParams::MaternRft { nu, l } | SketchParams::FastMaternRft { nu, l } => {
                positive("nu", nu)?;
                positive("l", l)?;
            }
            SketchParams::ExpSemigroupRlt { beta } | SketchParams::ExpSemigroupQrlt { beta, .. } => {
                positive("beta", beta)?
            }
            SketchParams::Ppt { q, c, gamma } => {
                if q == 0 {
                    return Err(Error::invalid_argument("q", "degree must be at least 1"));
                }
                if !(c >= 0.0 && c.is_finite()) {
                    return Err(Error::invalid_argument(
                        "c",
                        format!("must be >= 0, got {}", c),
                    ));
                }
                positive("gamma", gamma)?;
            }
            SketchParams::Urst | SketchParams::Fjlt => {
                if s > n {
                    return Err(Error::invalid_argument(
                        "s",
                        format!("cannot sample {} of {} coordinates without replacement", s, n),
                    ));
                }
            }
            SketchParams::Nurst { probabilities } => {
                return Ok(SketchParams::Nurst {
                    probabilities: normalize_probabilities(probabilities, n)?,
                })
            }
            SketchParams::Jlt | SketchParams::Cwt | SketchParams::Mmt => {}
        }
        Ok(self)
    }

    /// Write the variant's own fields into `record`
    pub fn write_fields(&self, record: &mut SerializedTransform) {
        match self {
            SketchParams::Sjlt { density } => record.insert("density", *density),
            SketchParams::Ct { c } => record.insert("C", *c),
            SketchParams::Wzt { p } => record.insert("P", *p),
            SketchParams::GaussianRft { sigma }
            | SketchParams::LaplacianRft { sigma }
            | SketchParams::FastGaussianRft { sigma } => record.insert("sigma", *sigma),
            SketchParams::MaternRft { nu, l } | SketchParams::FastMaternRft { nu, l } => {
                record.insert("nu", *nu);
                record.insert("l", *l);
            }
            SketchParams::GaussianQrft { sigma, skip } | SketchParams::LaplacianQrft { sigma, skip } => {
                record.insert("sigma", *sigma);
                record.insert("skip", *skip);
            }
            SketchParams::ExpSemigroupRlt { beta } => record.insert("beta", *beta),
            SketchParams::ExpSemigroupQrlt { beta, skip } => {
                record.insert("beta", *beta);
                record.insert("skip", *skip);
            }
            SketchParams::Ppt { q, c, gamma } => {
                record.insert("q", *q as u64);
                record.insert("c", *c);
                record.insert("gamma", *gamma);
            }
            SketchParams::Nurst { probabilities } => {
                record.insert("probabilities", probabilities.clone())
            }
            SketchParams::Jlt
            | SketchParams::Fjlt
            | SketchParams::Cwt
            | SketchParams::Mmt
            | SketchParams::Urst => {}
        }
    }
}

fn positive(arg: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid_argument(
            arg,
            format!("must be positive and finite, got {}", value),
        ))
    }
}

fn normalize_probabilities(mut p: Vec<f64>, n: usize) -> Result<Vec<f64>> {
    if p.len() != n {
        return Err(Error::invalid_argument(
            "probabilities",
            format!("size of probability array should be exactly n ({}), got {}", n, p.len()),
        ));
    }
    if let Some(bad) = p.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
        return Err(Error::invalid_argument(
            "probabilities",
            format!("entry {} is {}, expected a finite non-negative weight", bad, p[bad]),
        ));
    }
    let total: f64 = p.iter().sum();
    if total <= 0.0 {
        return Err(Error::invalid_argument(
            "probabilities",
            "weights sum to zero",
        ));
    }
    if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        warn!(total, "NURST probabilities do not sum to 1, normalizing");
        for v in p.iter_mut() {
            *v /= total;
        }
    }
    Ok(p)
}
