//! Common test utilities
#![allow(dead_code)]

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sketchr::backend::{RawHandle, SketchBackend};
use sketchr::error::{Error, Result};
use sketchr::matrix::{CsrMatrix, DenseMatrix, Layout, Matrix, MatrixKind};
use sketchr::sketch::{Axis, SerializedTransform, SketchParams, SketchType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two matrices hold the same logical values
pub fn assert_matrix_close(a: &Matrix, b: &Matrix, tol: f64, msg: &str) {
    assert_eq!((a.rows(), a.cols()), (b.rows(), b.cols()), "{}: shape mismatch", msg);
    assert_allclose_f64(
        &a.to_dense().to_row_major_vec(),
        &b.to_dense().to_row_major_vec(),
        0.0,
        tol,
        msg,
    );
}

/// Dense row-major matrix of uniform entries in [0, 1)
pub fn random_dense(rows: usize, cols: usize, seed: u64) -> DenseMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    DenseMatrix::from_fn(rows, cols, |_, _| rng.random_range(0.0..1.0))
}

/// Column-major copy of [`random_dense`]
pub fn random_dense_col_major(rows: usize, cols: usize, seed: u64) -> DenseMatrix {
    random_dense(rows, cols, seed).to_layout(Layout::ColMajor)
}

/// Sparse matrix keeping roughly `density` of a random dense matrix
pub fn random_sparse(rows: usize, cols: usize, density: f64, seed: u64) -> CsrMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let dense = DenseMatrix::from_fn(rows, cols, |_, _| {
        if rng.random_bool(density) {
            rng.random_range(0.0..1.0)
        } else {
            0.0
        }
    });
    CsrMatrix::from_dense(&dense)
}

// ============================================================================
// Mock accelerated backend
// ============================================================================

/// In-memory backend that fills outputs with a constant and records every call
#[derive(Default)]
pub struct MockBackend {
    next_handle: AtomicU64,
    live: Mutex<HashMap<RawHandle, SerializedTransform>>,
    pub creates: AtomicUsize,
    pub applies: AtomicUsize,
    pub frees: AtomicUsize,
    pub last_axis: Mutex<Option<Axis>>,
    pub fail_apply: AtomicBool,
    pub only: Option<Vec<SketchType>>,
    /// Export only the opaque engine state, no parameter fields
    pub minimal_records: bool,
}

impl MockBackend {
    /// Backend supporting every sketch type
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend supporting only `types`
    pub fn supporting(types: &[SketchType]) -> Self {
        Self {
            only: Some(types.to_vec()),
            ..Self::default()
        }
    }

    /// Backend whose exported records hold nothing but its own state
    pub fn minimal() -> Self {
        Self {
            minimal_records: true,
            ..Self::default()
        }
    }

    /// Value written into every output entry
    pub const FILL: f64 = 42.0;

    pub fn live_handles(&self) -> usize {
        self.live.lock().len()
    }

    fn register(&self, record: SerializedTransform) -> RawHandle {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst) + 1;
        self.live.lock().insert(handle, record);
        handle
    }
}

impl SketchBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn supported_combinations(&self) -> Vec<(SketchType, MatrixKind, MatrixKind)> {
        SketchType::ALL
            .iter()
            .filter(|t| self.only.as_ref().map_or(true, |only| only.contains(*t)))
            .flat_map(|&t| {
                [
                    (t, MatrixKind::Dense, MatrixKind::Dense),
                    (t, MatrixKind::Sparse, MatrixKind::Dense),
                ]
            })
            .collect()
    }

    fn create(
        &self,
        _sketch_type: SketchType,
        _n: usize,
        _s: usize,
        params: &SerializedTransform,
    ) -> Result<RawHandle> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let mut record = params.clone();
        record.insert("engine_state", "opaque");
        Ok(self.register(record))
    }

    fn apply(&self, handle: RawHandle, _input: &Matrix, output: &mut Matrix, axis: Axis) -> Result<()> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        *self.last_axis.lock() = Some(axis);
        if !self.live.lock().contains_key(&handle) {
            return Err(Error::Backend(format!("unknown handle {}", handle)));
        }
        let fail = self.fail_apply.load(Ordering::SeqCst);
        if let Matrix::Dense(d) = output {
            d.map_inplace(|_| if fail { f64::NAN } else { Self::FILL });
        }
        if fail {
            return Err(Error::Backend("injected failure".to_string()));
        }
        Ok(())
    }

    fn serialize(&self, handle: RawHandle) -> Result<SerializedTransform> {
        let record = self
            .live
            .lock()
            .get(&handle)
            .cloned()
            .ok_or_else(|| Error::Backend(format!("unknown handle {}", handle)))?;
        if self.minimal_records {
            let mut minimal = SerializedTransform::default();
            if let Some(state) = record.get("engine_state") {
                minimal.insert("engine_state", state.clone());
            }
            return Ok(minimal);
        }
        Ok(record)
    }

    fn deserialize(&self, record: &SerializedTransform) -> Result<RawHandle> {
        if !record.contains("engine_state") {
            return Err(Error::malformed("engine_state", "missing"));
        }
        Ok(self.register(record.clone()))
    }

    fn free(&self, handle: RawHandle) {
        self.frees.fetch_add(1, Ordering::SeqCst);
        self.live.lock().remove(&handle);
    }
}

// ============================================================================
// Parameter fixtures
// ============================================================================

/// One parameter set per sketch type, valid for input dimension `n`
pub fn params_for_every_type(n: usize) -> Vec<SketchParams> {
    let weights: Vec<f64> = (0..n).map(|i| 1.0 + i as f64).collect();
    vec![
        SketchParams::Jlt,
        SketchParams::Sjlt { density: 0.3 },
        SketchParams::Ct { c: 2.0 },
        SketchParams::Fjlt,
        SketchParams::Cwt,
        SketchParams::Mmt,
        SketchParams::Wzt { p: 1.5 },
        SketchParams::GaussianRft { sigma: 1.5 },
        SketchParams::LaplacianRft { sigma: 0.8 },
        SketchParams::MaternRft { nu: 1.5, l: 2.0 },
        SketchParams::GaussianQrft { sigma: 1.0, skip: 3 },
        SketchParams::LaplacianQrft { sigma: 1.0, skip: 0 },
        SketchParams::ExpSemigroupRlt { beta: 0.5 },
        SketchParams::ExpSemigroupQrlt { beta: 0.5, skip: 2 },
        SketchParams::FastGaussianRft { sigma: 1.0 },
        SketchParams::FastMaternRft { nu: 2.5, l: 1.0 },
        SketchParams::Ppt {
            q: 2,
            c: 1.0,
            gamma: 0.5,
        },
        SketchParams::Urst,
        SketchParams::Nurst {
            probabilities: weights,
        },
    ]
}
