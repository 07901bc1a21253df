//! # sketchr
//!
//! **Randomized sketching transforms for dense and sparse matrices.**
//!
//! sketchr compresses the rows or columns of a matrix with a random map
//! `S: R^n -> R^s`, `s << n`, that approximately preserves the geometry
//! relevant to downstream numerical linear algebra or kernel methods.
//!
//! ## Sketch families
//!
//! - **Dense projections**: JLT (Gaussian), CT (Cauchy)
//! - **Sparse projections**: SJLT, CWT (CountSketch), MMT, WZT
//! - **Structured**: FJLT (signs, DCT, sampling)
//! - **Kernel features**: Gaussian/Laplacian/Matérn RFT, quasi-random QRFT,
//!   exponential-semigroup RLT/QRLT, Fastfood variants
//! - **Polynomial kernel**: PPT (TensorSketch)
//! - **Sampling**: URST, NURST
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sketchr::prelude::*;
//!
//! let opts = SketchOptions::new().with_seed(42);
//! let t = SketchTransform::new(1000, 100, SketchParams::Jlt, &opts)?;
//!
//! let a = Matrix::from(DenseMatrix::zeros(1000, 50));
//! let sa = (&t * &a)?;          // 100 × 50
//!
//! let record = t.serialize()?;
//! let again = deserialize_sketch(&record, &SketchOptions::new())?;
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): parallel per-column application of the FFT-based sketches

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithm;
pub mod backend;
pub mod dtype;
pub mod error;
pub mod matrix;
pub mod random;
pub mod sketch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{install_backend, uninstall_backend, SketchBackend};
    pub use crate::error::{Error, Result};
    pub use crate::matrix::{CsrMatrix, DenseMatrix, Layout, Matrix, MatrixKind};
    pub use crate::sketch::{
        deserialize_sketch, Axis, ExecutionMode, ExecutionPreference, SerializedTransform,
        SketchOptions, SketchParams, SketchTransform, SketchType,
    };
}
