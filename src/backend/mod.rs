//! Accelerated backend seam
//!
//! An accelerated backend is an external engine that owns sketch state behind
//! opaque integer handles. This module defines:
//!
//! - [`SketchBackend`]: the call interface the framework consumes
//! - [`BackendHandle`]: exclusive ownership of one handle, freed on drop
//! - a process-wide slot holding the backend used by default
//!
//! # Axis convention
//!
//! Backends address every operand column-major. The framework flips the axis
//! before calling [`SketchBackend::apply`] whenever the operands are row
//! oriented, so the axis a backend receives is always the physical one.

use crate::error::Result;
use crate::matrix::{Matrix, MatrixKind};
use crate::sketch::{Axis, SerializedTransform, SketchType};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Opaque handle value issued by a backend
pub type RawHandle = u64;

/// Call interface of an accelerated sketch engine
///
/// Implementations must be thread-safe for distinct handles. The framework
/// never issues two calls on the same handle concurrently unless the caller
/// shares a transform across threads.
pub trait SketchBackend: Send + Sync {
    /// Human-readable name of this backend
    fn name(&self) -> &str;

    /// Every `(type, input kind, output kind)` triple the backend can apply
    fn supported_combinations(&self) -> Vec<(SketchType, MatrixKind, MatrixKind)>;

    /// Whether the backend supports at least one combination for `sketch_type`
    fn supports_type(&self, sketch_type: SketchType) -> bool {
        self.supported_combinations()
            .iter()
            .any(|(t, _, _)| *t == sketch_type)
    }

    /// Create a fresh handle for `sketch_type` mapping `n` to `s`
    ///
    /// `params` is a record carrying the header and the variant's parameter
    /// fields, without a seed.
    fn create(
        &self,
        sketch_type: SketchType,
        n: usize,
        s: usize,
        params: &SerializedTransform,
    ) -> Result<RawHandle>;

    /// Apply the sketch held by `handle` to `input`, writing `output`
    ///
    /// `axis` is the physical axis, already flipped for row-oriented operands.
    fn apply(
        &self,
        handle: RawHandle,
        input: &Matrix,
        output: &mut Matrix,
        axis: Axis,
    ) -> Result<()>;

    /// Export the state of `handle`
    fn serialize(&self, handle: RawHandle) -> Result<SerializedTransform>;

    /// Rebuild a handle from a record produced by [`SketchBackend::serialize`]
    fn deserialize(&self, record: &SerializedTransform) -> Result<RawHandle>;

    /// Release `handle`; called exactly once per handle
    fn free(&self, handle: RawHandle);
}

// ============================================================================
// Handle ownership
// ============================================================================

/// Exclusive owner of one backend handle
///
/// Not `Clone`: the handle is released exactly once, when this value drops.
pub struct BackendHandle {
    raw: RawHandle,
    backend: Arc<dyn SketchBackend>,
}

impl BackendHandle {
    /// Request a new handle from `backend`
    pub fn create(
        backend: Arc<dyn SketchBackend>,
        sketch_type: SketchType,
        n: usize,
        s: usize,
        params: &SerializedTransform,
    ) -> Result<Self> {
        let raw = backend.create(sketch_type, n, s, params)?;
        debug!(backend = backend.name(), handle = raw, %sketch_type, "created backend handle");
        Ok(Self { raw, backend })
    }

    /// Rebuild a handle from a backend-produced record
    pub fn deserialize(backend: Arc<dyn SketchBackend>, record: &SerializedTransform) -> Result<Self> {
        let raw = backend.deserialize(record)?;
        debug!(backend = backend.name(), handle = raw, "rehydrated backend handle");
        Ok(Self { raw, backend })
    }

    /// Raw handle value
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// Backend owning the handle
    pub fn backend(&self) -> &Arc<dyn SketchBackend> {
        &self.backend
    }

    pub(crate) fn apply(&self, input: &Matrix, output: &mut Matrix, axis: Axis) -> Result<()> {
        self.backend.apply(self.raw, input, output, axis)
    }

    pub(crate) fn serialize(&self) -> Result<SerializedTransform> {
        self.backend.serialize(self.raw)
    }
}

impl Drop for BackendHandle {
    fn drop(&mut self) {
        debug!(backend = self.backend.name(), handle = self.raw, "freeing backend handle");
        self.backend.free(self.raw);
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("backend", &self.backend.name())
            .field("raw", &format!("0x{:x}", self.raw))
            .finish()
    }
}

// ============================================================================
// Process-wide backend slot
// ============================================================================

static ACTIVE_BACKEND: OnceLock<RwLock<Option<Arc<dyn SketchBackend>>>> = OnceLock::new();

fn slot() -> &'static RwLock<Option<Arc<dyn SketchBackend>>> {
    ACTIVE_BACKEND.get_or_init(|| RwLock::new(None))
}

/// Install `backend` as the process-wide default, returning the previous one
///
/// Transforms already constructed keep the backend they were built with.
pub fn install_backend(backend: Arc<dyn SketchBackend>) -> Option<Arc<dyn SketchBackend>> {
    debug!(backend = backend.name(), "installing accelerated backend");
    slot().write().replace(backend)
}

/// Remove the process-wide backend, returning it
pub fn uninstall_backend() -> Option<Arc<dyn SketchBackend>> {
    slot().write().take()
}

/// The process-wide backend, if one is installed
pub fn active_backend() -> Option<Arc<dyn SketchBackend>> {
    slot().read().clone()
}
