//! Construction options and execution modes

use crate::backend::SketchBackend;
use crate::error::Result;
use crate::matrix::MatrixKind;
use std::fmt;
use std::sync::Arc;

/// Where the caller wants a transform to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPreference {
    /// Accelerated if a backend supports the type, self-contained otherwise
    #[default]
    Auto,
    /// Always sample and apply in-process
    SelfContained,
    /// Fail unless a backend supports the type
    Accelerated,
}

/// Where a constructed transform runs; fixed for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Backed by an accelerated backend handle
    Accelerated,
    /// Backed by in-process sampled parameters
    SelfContained,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Accelerated => write!(f, "accelerated"),
            ExecutionMode::SelfContained => write!(f, "self-contained"),
        }
    }
}

/// Options for constructing or rehydrating a sketch transform
///
/// ```ignore
/// let opts = SketchOptions::new()
///     .with_seed(42)
///     .with_default_output(MatrixKind::Dense)
///     .force_self_contained();
/// ```
#[derive(Clone, Default)]
pub struct SketchOptions {
    /// Kind allocated by `apply` when no output is given; the input's kind if unset
    pub default_output: Option<MatrixKind>,
    /// Execution preference
    pub preference: ExecutionPreference,
    /// Seed for self-contained sampling; drawn from entropy if unset
    pub seed: Option<u64>,
    /// Backend to use instead of the process-wide one
    pub backend: Option<Arc<dyn SketchBackend>>,
}

impl fmt::Debug for SketchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SketchOptions")
            .field("default_output", &self.default_output)
            .field("preference", &self.preference)
            .field("seed", &self.seed)
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .finish()
    }
}

impl SketchOptions {
    /// Default options: automatic mode, fresh seed, output kind follows input
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample self-contained parameters from `seed`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Allocate outputs of `kind` when none is supplied
    pub fn with_default_output(mut self, kind: MatrixKind) -> Self {
        self.default_output = Some(kind);
        self
    }

    /// Allocate outputs of the kind called `name`
    ///
    /// # Errors
    ///
    /// `UnsupportedConfiguration` if `name` is not a constructible kind
    pub fn with_default_output_name(self, name: &str) -> Result<Self> {
        Ok(self.with_default_output(name.parse()?))
    }

    /// Never use an accelerated backend
    pub fn force_self_contained(mut self) -> Self {
        self.preference = ExecutionPreference::SelfContained;
        self
    }

    /// Fail construction unless an accelerated backend supports the type
    pub fn require_accelerated(mut self) -> Self {
        self.preference = ExecutionPreference::Accelerated;
        self
    }

    /// Use `backend` instead of the process-wide backend
    pub fn with_backend(mut self, backend: Arc<dyn SketchBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Backend candidate: the explicit one, else the installed one
    pub(crate) fn resolve_backend(&self) -> Option<Arc<dyn SketchBackend>> {
        self.backend.clone().or_else(crate::backend::active_backend)
    }
}
