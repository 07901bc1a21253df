//! Error types for sketchr

use thiserror::Error;

/// Result type alias using sketchr's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of an `apply` call failed a dimension check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionSide {
    /// The input's sketched dimension differs from the transform's input dimension
    Input,
    /// The output's sketched dimension differs from the transform's output dimension
    Output,
    /// Input and output disagree along the dimension that is not sketched
    InputOutput,
}

impl std::fmt::Display for DimensionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionSide::Input => write!(f, "input"),
            DimensionSide::Output => write!(f, "output"),
            DimensionSide::InputOutput => write!(f, "input != output"),
        }
    }
}

/// Errors that can occur while building, applying or persisting sketches
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// A name or configuration the crate does not know how to honor
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// The (transform, input kind, output kind) triple is not supported
    #[error("Unsupported transform-input-output combination: ({sketch}, {input}, {output})")]
    UnsupportedCombination {
        /// Canonical transform name
        sketch: &'static str,
        /// Input matrix kind
        input: &'static str,
        /// Output matrix kind
        output: &'static str,
    },

    /// Input and output operands cannot be used together
    #[error("Input and output are incompatible: {0}")]
    Incompatible(String),

    /// Sketched or passthrough dimension mismatch
    #[error("Sketched dimension is incorrect ({side}): expected {expected}, got {got}")]
    DimensionMismatch {
        /// Which side is wrong
        side: DimensionSide,
        /// Expected size
        expected: usize,
        /// Actual size
        got: usize,
    },

    /// A serialized record is missing a field or carries an invalid one
    #[error("Malformed serialized transform, field '{field}': {reason}")]
    MalformedSerialization {
        /// Offending field name
        field: String,
        /// Description of the problem
        reason: String,
    },

    /// The transform cannot produce a serialized record
    #[error("Serialization not supported for {0}")]
    SerializationUnsupported(&'static str),

    /// Accelerated execution requested but no usable backend is installed
    #[error("Accelerated backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// JSON encoding or decoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(side: DimensionSide, expected: usize, got: usize) -> Self {
        Self::DimensionMismatch {
            side,
            expected,
            got,
        }
    }

    /// Create a malformed serialization error
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSerialization {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
