//! The sketch transform: construction, mode dispatch, apply and serialize

use super::catalog::SampledSketch;
use super::record::{SerializedTransform, INPUT_DIM, OUTPUT_DIM, SEED, SKETCH_TYPE};
use super::supported::{self, Combination};
use super::{
    Axis, AxisToken, ExecutionMode, ExecutionPreference, SketchOptions, SketchParams, SketchType,
};
use crate::backend::{BackendHandle, SketchBackend};
use crate::error::{DimensionSide, Error, Result};
use crate::matrix::{Matrix, MatrixKind};
use crate::random::fresh_seed;
use std::ops::{Div, Mul};
use std::sync::Arc;
use tracing::{debug, warn};

/// State behind a transform, fixed at construction
#[derive(Debug)]
enum SketchState {
    Accelerated(BackendHandle),
    SelfContained { seed: u64, sampled: SampledSketch },
}

/// A randomized dimensionality-reducing map from R^n to R^s
///
/// The execution mode is resolved once, at construction, and never changes.
/// A transform owning a backend handle frees it exactly once when dropped;
/// transforms are therefore moved, never cloned.
///
/// # Example
///
/// ```ignore
/// let t = SketchTransform::new(1000, 100, SketchParams::Jlt, &SketchOptions::new().with_seed(7))?;
/// let sa = t.columnwise(&a)?;             // 100 × m
/// let as_t = t.apply(&b, None, "right")?; // m × 100
/// ```
#[derive(Debug)]
pub struct SketchTransform {
    sketch_type: SketchType,
    n: usize,
    s: usize,
    default_output: Option<MatrixKind>,
    params: SketchParams,
    state: SketchState,
}

impl SketchTransform {
    /// Build a transform mapping `n` to `s` with `params`
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for zero dimensions or invalid parameters
    /// - `BackendUnavailable` if accelerated execution is required but no
    ///   backend supports the type
    /// - any error the backend reports while creating its handle
    pub fn new(n: usize, s: usize, params: SketchParams, options: &SketchOptions) -> Result<Self> {
        let params = params.validated(n, s)?;
        let sketch_type = params.sketch_type();

        let state = match resolve_backend(sketch_type, options)? {
            Some(backend) => {
                let mut record = SerializedTransform::new(sketch_type, n, s);
                params.write_fields(&mut record);
                SketchState::Accelerated(BackendHandle::create(backend, sketch_type, n, s, &record)?)
            }
            None => {
                let seed = options.seed.unwrap_or_else(fresh_seed);
                SketchState::SelfContained {
                    seed,
                    sampled: SampledSketch::sample(&params, n, s, seed)?,
                }
            }
        };

        let transform = Self {
            sketch_type,
            n,
            s,
            default_output: options.default_output,
            params,
            state,
        };
        debug!(
            sketch_type = %transform.sketch_type,
            n,
            s,
            mode = %transform.mode(),
            "constructed sketch transform"
        );
        Ok(transform)
    }

    /// Build a transform by canonical name or alias, with default parameters
    ///
    /// # Errors
    ///
    /// `UnsupportedConfiguration` for unknown names, `InvalidArgument` for
    /// types that have required parameters
    pub fn by_name(name: &str, n: usize, s: usize, options: &SketchOptions) -> Result<Self> {
        let sketch_type: SketchType = name.parse()?;
        Self::new(n, s, SketchParams::defaults(sketch_type)?, options)
    }

    /// Wrap an existing backend handle
    pub(crate) fn from_handle(
        n: usize,
        s: usize,
        params: SketchParams,
        handle: BackendHandle,
        options: &SketchOptions,
    ) -> Self {
        Self {
            sketch_type: params.sketch_type(),
            n,
            s,
            default_output: options.default_output,
            params,
            state: SketchState::Accelerated(handle),
        }
    }

    /// Rebuild self-contained state from a record
    pub(crate) fn from_seed(
        n: usize,
        s: usize,
        params: SketchParams,
        seed: u64,
        record: &SerializedTransform,
        options: &SketchOptions,
    ) -> Result<Self> {
        let sampled = SampledSketch::restore(&params, n, s, seed, record)?;
        Ok(Self {
            sketch_type: params.sketch_type(),
            n,
            s,
            default_output: options.default_output,
            params,
            state: SketchState::SelfContained { seed, sampled },
        })
    }

    /// Canonical type
    pub fn sketch_type(&self) -> SketchType {
        self.sketch_type
    }

    /// Input dimension n
    pub fn input_dim(&self) -> usize {
        self.n
    }

    /// Output (sketch) dimension s
    pub fn output_dim(&self) -> usize {
        self.s
    }

    /// Distribution parameters
    pub fn params(&self) -> &SketchParams {
        &self.params
    }

    /// Kind allocated when `apply` receives no output
    pub fn default_output(&self) -> Option<MatrixKind> {
        self.default_output
    }

    /// Execution mode chosen at construction
    pub fn mode(&self) -> ExecutionMode {
        match self.state {
            SketchState::Accelerated(_) => ExecutionMode::Accelerated,
            SketchState::SelfContained { .. } => ExecutionMode::SelfContained,
        }
    }

    /// Sampling seed of a self-contained transform
    pub fn seed(&self) -> Option<u64> {
        match self.state {
            SketchState::SelfContained { seed, .. } => Some(seed),
            SketchState::Accelerated(_) => None,
        }
    }

    /// Whether `(input, output)` can be used with this transform
    pub fn supports(&self, input: MatrixKind, output: MatrixKind) -> bool {
        match &self.state {
            SketchState::Accelerated(handle) => handle
                .backend()
                .supported_combinations()
                .contains(&(self.sketch_type, input, output)),
            SketchState::SelfContained { .. } => {
                supported::self_contained_supports(self.sketch_type, input, output)
            }
        }
    }

    /// Every combination this transform accepts
    pub fn supported_combinations(&self) -> Vec<Combination> {
        match &self.state {
            SketchState::Accelerated(handle) => handle
                .backend()
                .supported_combinations()
                .into_iter()
                .filter(|(t, _, _)| *t == self.sketch_type)
                .collect(),
            SketchState::SelfContained { .. } => supported::self_contained_combinations()
                .into_iter()
                .filter(|(t, _, _)| *t == self.sketch_type)
                .collect(),
        }
    }

    /// Apply along `axis`, allocating the output when `output` is `None`
    ///
    /// A freshly allocated output is `(s, input.cols)` for columnwise and
    /// `(input.rows, s)` for rowwise application, of the default output kind
    /// if one was configured and of the input's kind otherwise.
    pub fn apply(&self, input: &Matrix, output: Option<Matrix>, axis: impl AxisToken) -> Result<Matrix> {
        let axis = axis.to_axis()?;
        let mut output = match output {
            Some(out) => out,
            None => {
                let kind = self.default_output.unwrap_or_else(|| input.kind());
                let (rows, cols) = match axis {
                    Axis::Columnwise => (self.s, input.cols()),
                    Axis::Rowwise => (input.rows(), self.s),
                };
                input.construct_like(kind, rows, cols)
            }
        };
        self.apply_into(input, &mut output, axis)?;
        Ok(output)
    }

    /// Apply along `axis`, writing into `output`
    ///
    /// `output` is either fully overwritten or left untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an unknown axis token
    /// - `UnsupportedCombination` if the (type, input, output) kinds are not supported
    /// - `Incompatible` if input and output disagree on orientation
    /// - `DimensionMismatch` naming the offending side
    pub fn apply_into(&self, input: &Matrix, output: &mut Matrix, axis: impl AxisToken) -> Result<()> {
        let axis = axis.to_axis()?;

        if !self.supports(input.kind(), output.kind()) {
            return Err(Error::UnsupportedCombination {
                sketch: self.sketch_type.name(),
                input: input.kind().name(),
                output: output.kind().name(),
            });
        }

        let compat = input.check_compatible(output)?;

        if input.dim(axis) != self.n {
            return Err(Error::dimension_mismatch(DimensionSide::Input, self.n, input.dim(axis)));
        }
        if output.dim(axis) != self.s {
            return Err(Error::dimension_mismatch(DimensionSide::Output, self.s, output.dim(axis)));
        }
        let other = axis.flipped();
        if input.dim(other) != output.dim(other) {
            return Err(Error::dimension_mismatch(
                DimensionSide::InputOutput,
                input.dim(other),
                output.dim(other),
            ));
        }

        match &self.state {
            SketchState::Accelerated(handle) => {
                let physical = if compat.transposed { axis.flipped() } else { axis };
                debug!(
                    sketch_type = %self.sketch_type,
                    %axis,
                    %physical,
                    input = %input.kind(),
                    output = %output.kind(),
                    "dispatching to accelerated backend"
                );
                let mut scratch = output.clone();
                handle.apply(input, &mut scratch, physical)?;
                *output = scratch;
            }
            SketchState::SelfContained { sampled, .. } => {
                debug!(
                    sketch_type = %self.sketch_type,
                    %axis,
                    input = %input.kind(),
                    output = %output.kind(),
                    "applying self-contained sketch"
                );
                let result = match axis {
                    Axis::Columnwise => sampled.apply_columnwise(input)?,
                    Axis::Rowwise => sampled.apply_columnwise(&input.transpose())?.into_transpose(),
                };
                output.store(&result)?;
            }
        }
        Ok(())
    }

    /// Columnwise application into a freshly allocated output
    pub fn columnwise(&self, input: &Matrix) -> Result<Matrix> {
        self.apply(input, None, Axis::Columnwise)
    }

    /// Rowwise application into a freshly allocated output
    pub fn rowwise(&self, input: &Matrix) -> Result<Matrix> {
        self.apply(input, None, Axis::Rowwise)
    }

    /// Record from which [`deserialize_sketch`](super::deserialize_sketch)
    /// rebuilds an identical transform
    ///
    /// Self-contained records carry the sampling seed; accelerated records
    /// carry whatever the backend exports, plus any parameter field the
    /// backend left out.
    ///
    /// # Errors
    ///
    /// `SerializationUnsupported` or a backend error if the backend cannot
    /// export its handle
    pub fn serialize(&self) -> Result<SerializedTransform> {
        match &self.state {
            SketchState::Accelerated(handle) => {
                let mut record = handle.serialize()?;
                if record.contains(SEED) {
                    return Err(Error::Backend(format!(
                        "backend '{}' exported a reserved '{}' field",
                        handle.backend().name(),
                        SEED
                    )));
                }
                let mut fields = SerializedTransform::default();
                self.params.write_fields(&mut fields);
                for (key, value) in fields.into_map() {
                    if !record.contains(&key) {
                        record.insert(&key, value);
                    }
                }
                record.insert(SKETCH_TYPE, self.sketch_type.name());
                record.insert(INPUT_DIM, self.n as u64);
                record.insert(OUTPUT_DIM, self.s as u64);
                Ok(record)
            }
            SketchState::SelfContained { seed, sampled } => {
                let mut record = SerializedTransform::new(self.sketch_type, self.n, self.s);
                self.params.write_fields(&mut record);
                record.insert(SEED, *seed);
                sampled.write_state(&mut record);
                Ok(record)
            }
        }
    }
}

/// Pick the backend for a new transform, or `None` for self-contained
fn resolve_backend(
    sketch_type: SketchType,
    options: &SketchOptions,
) -> Result<Option<Arc<dyn SketchBackend>>> {
    match options.preference {
        ExecutionPreference::SelfContained => Ok(None),
        ExecutionPreference::Auto => match options.resolve_backend() {
            Some(backend) if backend.supports_type(sketch_type) => Ok(Some(backend)),
            Some(backend) => {
                warn!(
                    backend = backend.name(),
                    %sketch_type,
                    "backend does not support sketch type, falling back to self-contained"
                );
                Ok(None)
            }
            None => Ok(None),
        },
        ExecutionPreference::Accelerated => match options.resolve_backend() {
            Some(backend) if backend.supports_type(sketch_type) => Ok(Some(backend)),
            Some(backend) => Err(Error::BackendUnavailable(format!(
                "backend '{}' does not support {}",
                backend.name(),
                sketch_type
            ))),
            None => Err(Error::BackendUnavailable(
                "no accelerated backend installed".to_string(),
            )),
        },
    }
}

impl Mul<&Matrix> for &SketchTransform {
    type Output = Result<Matrix>;

    /// `&t * &a`: columnwise application
    fn mul(self, rhs: &Matrix) -> Result<Matrix> {
        self.columnwise(rhs)
    }
}

impl Div<&Matrix> for &SketchTransform {
    type Output = Result<Matrix>;

    /// `&t / &a`: rowwise application
    fn div(self, rhs: &Matrix) -> Result<Matrix> {
        self.rowwise(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{CsrMatrix, DenseMatrix};

    fn seeded() -> SketchOptions {
        SketchOptions::new().with_seed(1234).force_self_contained()
    }

    fn ramp(rows: usize, cols: usize) -> Matrix {
        Matrix::Dense(DenseMatrix::from_fn(rows, cols, |i, j| (i * cols + j) as f64 * 0.1 - 1.0))
    }

    #[test]
    fn test_output_shapes() {
        let t = SketchTransform::new(6, 3, SketchParams::Jlt, &seeded()).unwrap();
        let sa = t.columnwise(&ramp(6, 4)).unwrap();
        assert_eq!((sa.rows(), sa.cols()), (3, 4));
        let as_ = t.rowwise(&ramp(5, 6)).unwrap();
        assert_eq!((as_.rows(), as_.cols()), (5, 3));
    }

    #[test]
    fn test_rowwise_is_transposed_columnwise() {
        let t = SketchTransform::new(6, 3, SketchParams::Cwt, &seeded()).unwrap();
        let a = ramp(6, 4);
        let left = t.columnwise(&a).unwrap().to_dense();
        let right = t.rowwise(&a.transpose()).unwrap().to_dense();
        assert_eq!(right.shape(), [4, 3]);
        for i in 0..3 {
            for j in 0..4 {
                assert!((left.get(i, j) - right.get(j, i)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_dimension_mismatch_sides() {
        let t = SketchTransform::new(10, 5, SketchParams::Jlt, &seeded()).unwrap();
        match t.columnwise(&ramp(7, 2)) {
            Err(Error::DimensionMismatch { side, expected, got }) => {
                assert_eq!((side, expected, got), (DimensionSide::Input, 10, 7));
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut bad_out = Matrix::Dense(DenseMatrix::zeros(4, 2));
        assert!(matches!(
            t.apply_into(&ramp(10, 2), &mut bad_out, 0),
            Err(Error::DimensionMismatch {
                side: DimensionSide::Output,
                ..
            })
        ));

        let mut bad_cols = Matrix::Dense(DenseMatrix::zeros(5, 3));
        assert!(matches!(
            t.apply_into(&ramp(10, 2), &mut bad_cols, "left"),
            Err(Error::DimensionMismatch {
                side: DimensionSide::InputOutput,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_axis_leaves_output_alone() {
        let t = SketchTransform::new(4, 2, SketchParams::Jlt, &seeded()).unwrap();
        let mut out = Matrix::Dense(DenseMatrix::from_fn(2, 3, |_, _| 7.0));
        let before = out.clone();
        assert!(matches!(
            t.apply_into(&ramp(4, 3), &mut out, 2),
            Err(Error::InvalidArgument { arg: "axis", .. })
        ));
        assert!(matches!(
            t.apply(&ramp(4, 3), None, "up"),
            Err(Error::InvalidArgument { arg: "axis", .. })
        ));
        assert_eq!(out, before);
    }

    #[test]
    fn test_unsupported_sparse_output() {
        let t = SketchTransform::new(4, 2, SketchParams::Jlt, &seeded()).unwrap();
        let sparse_in = Matrix::Sparse(CsrMatrix::from_dense(&DenseMatrix::from_fn(4, 2, |i, j| (i + j) as f64)));
        assert!(matches!(
            t.columnwise(&sparse_in),
            Err(Error::UnsupportedCombination {
                sketch: "JLT",
                input: "SparseMatrix",
                output: "SparseMatrix"
            })
        ));
    }

    #[test]
    fn test_default_output_kind() {
        let opts = seeded().with_default_output(MatrixKind::Dense);
        let t = SketchTransform::new(4, 2, SketchParams::Cwt, &opts).unwrap();
        let sparse_in = Matrix::Sparse(CsrMatrix::empty([4, 3]));
        let out = t.columnwise(&sparse_in).unwrap();
        assert_eq!(out.kind(), MatrixKind::Dense);
    }

    #[test]
    fn test_operators() {
        let t = SketchTransform::new(6, 3, SketchParams::Jlt, &seeded()).unwrap();
        let a = ramp(6, 2);
        assert_eq!((&t * &a).unwrap(), t.columnwise(&a).unwrap());
        let b = a.transpose();
        assert_eq!((&t / &b).unwrap(), t.rowwise(&b).unwrap());
    }

    #[test]
    fn test_same_seed_same_result() {
        let a = ramp(8, 3);
        let t1 = SketchTransform::new(8, 4, SketchParams::GaussianRft { sigma: 2.0 }, &seeded()).unwrap();
        let t2 = SketchTransform::new(8, 4, SketchParams::GaussianRft { sigma: 2.0 }, &seeded()).unwrap();
        assert_eq!(t1.columnwise(&a).unwrap(), t2.columnwise(&a).unwrap());
        assert_eq!(t1.seed(), Some(1234));
    }

    #[test]
    fn test_accelerated_without_backend() {
        let opts = SketchOptions::new().require_accelerated();
        assert!(matches!(
            SketchTransform::new(4, 2, SketchParams::Jlt, &opts),
            Err(Error::BackendUnavailable(_))
        ));
    }

    #[test]
    fn test_by_name_resolves_alias() {
        let t = SketchTransform::by_name("TensorSketch", 4, 8, &seeded()).unwrap();
        assert_eq!(t.sketch_type(), SketchType::Ppt);
        assert!(matches!(
            SketchTransform::by_name("NoSuchSketch", 4, 8, &seeded()),
            Err(Error::UnsupportedConfiguration(_))
        ));
    }
}
