//! Matrix adapter: the operand types accepted by sketch transforms
//!
//! Every input or output of a sketch is a [`Matrix`], which normalizes the
//! supported representations behind one interface:
//!
//! - dimensions along either [`Axis`]
//! - a [`MatrixKind`] tag used for supported-combination lookups
//! - construction of a sibling operand of a requested shape and kind
//! - a compatibility check between an input and an output
//!
//! # Orientation
//!
//! Accelerated backends address every buffer column-major. Row-major dense
//! matrices and CSR matrices are "row oriented": a backend sees them as the
//! transpose of the logical matrix, so the physical axis must be flipped
//! before forwarding. Input and output must share an orientation.

mod csr;
mod dense;

pub use csr::CsrMatrix;
pub use dense::{DenseMatrix, Layout};

use crate::error::{Error, Result};
use crate::sketch::Axis;
use std::fmt;
use std::str::FromStr;

/// Representation tag of a matrix operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    /// Dense local matrix (`"Matrix"`)
    Dense,
    /// CSR sparse local matrix (`"SparseMatrix"`)
    Sparse,
}

impl MatrixKind {
    /// All kinds the crate can construct
    pub const ALL: [MatrixKind; 2] = [MatrixKind::Dense, MatrixKind::Sparse];

    /// Canonical name used in combination tables and error messages
    pub fn name(self) -> &'static str {
        match self {
            MatrixKind::Dense => "Matrix",
            MatrixKind::Sparse => "SparseMatrix",
        }
    }
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MatrixKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Matrix" | "DenseMatrix" => Ok(MatrixKind::Dense),
            "SparseMatrix" | "CsrMatrix" => Ok(MatrixKind::Sparse),
            other => Err(Error::UnsupportedConfiguration(format!(
                "unsupported output matrix type ({})",
                other
            ))),
        }
    }
}

/// Result of a successful compatibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compatibility {
    /// The backend sees both operands transposed; flip the physical axis
    pub transposed: bool,
}

/// A sketch operand
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    /// Dense matrix
    Dense(DenseMatrix),
    /// CSR sparse matrix
    Sparse(CsrMatrix),
}

impl From<DenseMatrix> for Matrix {
    fn from(m: DenseMatrix) -> Self {
        Matrix::Dense(m)
    }
}

impl From<CsrMatrix> for Matrix {
    fn from(m: CsrMatrix) -> Self {
        Matrix::Sparse(m)
    }
}

impl Matrix {
    /// Number of rows
    pub fn rows(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.rows(),
            Matrix::Sparse(m) => m.nrows(),
        }
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.cols(),
            Matrix::Sparse(m) => m.ncols(),
        }
    }

    /// Size along `axis`: rows for columnwise, columns for rowwise
    pub fn dim(&self, axis: Axis) -> usize {
        match axis {
            Axis::Columnwise => self.rows(),
            Axis::Rowwise => self.cols(),
        }
    }

    /// Representation tag
    pub fn kind(&self) -> MatrixKind {
        match self {
            Matrix::Dense(_) => MatrixKind::Dense,
            Matrix::Sparse(_) => MatrixKind::Sparse,
        }
    }

    /// True when a column-major backend sees this operand transposed
    pub fn is_row_oriented(&self) -> bool {
        match self {
            Matrix::Dense(m) => m.layout() == Layout::RowMajor,
            Matrix::Sparse(_) => true,
        }
    }

    /// Borrow the dense payload, if any
    pub fn as_dense(&self) -> Option<&DenseMatrix> {
        match self {
            Matrix::Dense(m) => Some(m),
            Matrix::Sparse(_) => None,
        }
    }

    /// Borrow the sparse payload, if any
    pub fn as_sparse(&self) -> Option<&CsrMatrix> {
        match self {
            Matrix::Sparse(m) => Some(m),
            Matrix::Dense(_) => None,
        }
    }

    /// Dense copy of the logical values
    pub fn to_dense(&self) -> DenseMatrix {
        match self {
            Matrix::Dense(m) => m.clone(),
            Matrix::Sparse(m) => m.to_dense(),
        }
    }

    /// Transposed copy of the same kind
    pub fn transpose(&self) -> Matrix {
        match self {
            Matrix::Dense(m) => Matrix::Dense(m.transpose()),
            Matrix::Sparse(m) => Matrix::Sparse(m.transpose()),
        }
    }

    /// Construct a zero operand of `kind` whose orientation matches `self`
    pub fn construct_like(&self, kind: MatrixKind, rows: usize, cols: usize) -> Matrix {
        match kind {
            MatrixKind::Dense => {
                let layout = if self.is_row_oriented() {
                    Layout::RowMajor
                } else {
                    Layout::ColMajor
                };
                Matrix::Dense(DenseMatrix::zeros_with_layout(rows, cols, layout))
            }
            MatrixKind::Sparse => Matrix::Sparse(CsrMatrix::empty([rows, cols])),
        }
    }

    /// Check whether `self` (input) and `other` (output) can be used together
    ///
    /// # Errors
    ///
    /// `Incompatible` if the operands disagree on orientation
    pub fn check_compatible(&self, other: &Matrix) -> Result<Compatibility> {
        let (a, b) = (self.is_row_oriented(), other.is_row_oriented());
        if a != b {
            return Err(Error::Incompatible(format!(
                "{} input is {}-oriented but {} output is {}-oriented",
                self.kind(),
                if a { "row" } else { "column" },
                other.kind(),
                if b { "row" } else { "column" },
            )));
        }
        Ok(Compatibility { transposed: a })
    }

    /// Overwrite `self` with the logical values of `result`
    ///
    /// Dense operands keep their layout; sparse operands are rebuilt.
    pub(crate) fn store(&mut self, result: &DenseMatrix) -> Result<()> {
        match self {
            Matrix::Dense(m) => m.assign(result),
            Matrix::Sparse(m) => {
                if m.shape() != result.shape() {
                    return Err(Error::invalid_argument(
                        "result",
                        format!("shape {:?} does not match {:?}", result.shape(), m.shape()),
                    ));
                }
                *m = CsrMatrix::from_dense(result);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!("Matrix".parse::<MatrixKind>().unwrap(), MatrixKind::Dense);
        assert_eq!(MatrixKind::Sparse.to_string(), "SparseMatrix");
        assert!(matches!(
            "DistMatrix".parse::<MatrixKind>(),
            Err(Error::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_dim_follows_axis() {
        let m = Matrix::from(DenseMatrix::zeros(4, 7));
        assert_eq!(m.dim(Axis::Columnwise), 4);
        assert_eq!(m.dim(Axis::Rowwise), 7);
    }

    #[test]
    fn test_compatibility() {
        let rm = Matrix::from(DenseMatrix::zeros(2, 2));
        let cm = Matrix::from(DenseMatrix::zeros_with_layout(2, 2, Layout::ColMajor));
        let sp = Matrix::from(CsrMatrix::empty([2, 2]));

        assert!(rm.check_compatible(&rm).unwrap().transposed);
        assert!(!cm.check_compatible(&cm).unwrap().transposed);
        assert!(sp.check_compatible(&rm).unwrap().transposed);
        assert!(matches!(
            cm.check_compatible(&rm),
            Err(Error::Incompatible(_))
        ));
    }

    #[test]
    fn test_construct_like_keeps_orientation() {
        let cm = Matrix::from(DenseMatrix::zeros_with_layout(3, 3, Layout::ColMajor));
        let out = cm.construct_like(MatrixKind::Dense, 2, 3);
        assert!(!out.is_row_oriented());
        assert_eq!((out.rows(), out.cols()), (2, 3));

        let sparse = cm.construct_like(MatrixKind::Sparse, 2, 3);
        assert_eq!(sparse.kind(), MatrixKind::Sparse);
    }

    #[test]
    fn test_store_into_sparse() {
        let mut out = Matrix::from(CsrMatrix::empty([1, 3]));
        let result = DenseMatrix::from_rows(&[vec![0.0, 2.0, 0.0]]).unwrap();
        out.store(&result).unwrap();
        assert_eq!(out.as_sparse().unwrap().nnz(), 1);
    }
}
