//! Sketch transforms
//!
//! A sketch transform is a randomized linear or nonlinear map from R^n to R^s
//! applied to the columns (columnwise) or rows (rowwise) of a matrix.
//!
//! # Layout
//!
//! - [`SketchType`] and [`SketchParams`]: what to sample
//! - [`SketchOptions`]: how to run it (seed, execution preference, backend)
//! - [`SketchTransform`]: the constructed transform
//! - [`SerializedTransform`] and [`deserialize_sketch`]: persistence
//!
//! # Execution modes
//!
//! Every transform runs either through an accelerated backend (see
//! [`crate::backend`]) or self-contained, sampling its state in-process from a
//! seed. The mode is chosen once at construction.

mod axis;
mod catalog;
mod kind;
mod options;
mod params;
mod record;
mod registry;
mod supported;
mod transform;

pub use axis::{Axis, AxisToken};
pub use kind::{SketchType, ALIASES};
pub use options::{ExecutionMode, ExecutionPreference, SketchOptions};
pub use params::SketchParams;
pub use record::{SerializedTransform, INPUT_DIM, OUTPUT_DIM, SEED, SKETCH_TYPE};
pub use registry::deserialize_sketch;
pub use supported::{self_contained_combinations, self_contained_supports, Combination};
pub use transform::SketchTransform;
