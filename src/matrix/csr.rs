//! CSR (Compressed Sparse Row) matrix: struct, creation, products

use super::dense::{DenseMatrix, Layout};
use crate::error::{Error, Result};

/// CSR (Compressed Sparse Row) sparse matrix of f64 values
///
/// Used both as a sketch operand (sparse inputs and outputs) and as the
/// storage of sparse sketching matrices (SJLT and the hashing family).
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    row_ptrs: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
    shape: [usize; 2],
}

impl CsrMatrix {
    /// Create a new CSR matrix from components
    ///
    /// # Arguments
    ///
    /// * `row_ptrs` - Row pointers (length: nrows + 1)
    /// * `col_indices` - Column indices for each non-zero
    /// * `values` - Values at each position
    /// * `shape` - Matrix shape [nrows, ncols]
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if:
    /// - row_ptrs length != nrows + 1, or row_ptrs is not non-decreasing
    /// - col_indices and values have different lengths
    /// - a column index is out of range
    pub fn new(
        row_ptrs: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<f64>,
        shape: [usize; 2],
    ) -> Result<Self> {
        let [nrows, ncols] = shape;

        if row_ptrs.len() != nrows + 1 {
            return Err(Error::invalid_argument(
                "row_ptrs",
                format!("expected length {}, got {}", nrows + 1, row_ptrs.len()),
            ));
        }
        if col_indices.len() != values.len() {
            return Err(Error::invalid_argument(
                "col_indices",
                format!(
                    "{} column indices for {} values",
                    col_indices.len(),
                    values.len()
                ),
            ));
        }
        if row_ptrs[0] != 0
            || row_ptrs.windows(2).any(|w| w[0] > w[1])
            || row_ptrs[nrows] != values.len()
        {
            return Err(Error::invalid_argument(
                "row_ptrs",
                "must start at 0, be non-decreasing and end at nnz",
            ));
        }
        if let Some(&bad) = col_indices.iter().find(|&&c| c >= ncols) {
            return Err(Error::invalid_argument(
                "col_indices",
                format!("column {} out of bounds for {} columns", bad, ncols),
            ));
        }

        Ok(Self {
            row_ptrs,
            col_indices,
            values,
            shape,
        })
    }

    /// Create an empty CSR matrix
    pub fn empty(shape: [usize; 2]) -> Self {
        Self {
            row_ptrs: vec![0; shape[0] + 1],
            col_indices: Vec::new(),
            values: Vec::new(),
            shape,
        }
    }

    /// Build from (row, col, value) triplets; duplicate positions are summed
    pub fn from_triplets(shape: [usize; 2], triplets: &[(usize, usize, f64)]) -> Result<Self> {
        let [nrows, ncols] = shape;
        let mut sorted = triplets.to_vec();
        if let Some(&(r, c, _)) = sorted.iter().find(|(r, c, _)| *r >= nrows || *c >= ncols) {
            return Err(Error::invalid_argument(
                "triplets",
                format!("entry ({}, {}) out of bounds for {:?}", r, c, shape),
            ));
        }
        sorted.sort_by_key(|&(r, c, _)| (r, c));

        let mut row_ptrs = vec![0usize; nrows + 1];
        let mut col_indices = Vec::with_capacity(sorted.len());
        let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in sorted {
            if last == Some((r, c)) {
                if let Some(tail) = values.last_mut() {
                    *tail += v;
                }
                continue;
            }
            col_indices.push(c);
            values.push(v);
            row_ptrs[r + 1] += 1;
            last = Some((r, c));
        }
        for i in 0..nrows {
            row_ptrs[i + 1] += row_ptrs[i];
        }

        Self::new(row_ptrs, col_indices, values, shape)
    }

    /// Sparse copy of a dense matrix, dropping exact zeros
    pub fn from_dense(dense: &DenseMatrix) -> Self {
        let [nrows, ncols] = dense.shape();
        let mut row_ptrs = Vec::with_capacity(nrows + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();
        row_ptrs.push(0);
        for i in 0..nrows {
            for j in 0..ncols {
                let v = dense.get(i, j);
                if v != 0.0 {
                    col_indices.push(j);
                    values.push(v);
                }
            }
            row_ptrs.push(values.len());
        }
        Self {
            row_ptrs,
            col_indices,
            values,
            shape: [nrows, ncols],
        }
    }

    /// Dense row-major copy
    pub fn to_dense(&self) -> DenseMatrix {
        let mut out = DenseMatrix::zeros_with_layout(self.nrows(), self.ncols(), Layout::RowMajor);
        for (i, j, v) in self.iter() {
            out.set(i, j, v);
        }
        out
    }

    /// Returns the shape as [nrows, ncols]
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    /// Returns the number of rows
    #[inline]
    pub fn nrows(&self) -> usize {
        self.shape[0]
    }

    /// Returns the number of columns
    #[inline]
    pub fn ncols(&self) -> usize {
        self.shape[1]
    }

    /// Returns the number of stored non-zeros
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns the row pointers
    pub fn row_ptrs(&self) -> &[usize] {
        &self.row_ptrs
    }

    /// Returns the column indices
    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    /// Returns the stored values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over (row, col, value) in row order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.nrows()).flat_map(move |i| {
            (self.row_ptrs[i]..self.row_ptrs[i + 1])
                .map(move |k| (i, self.col_indices[k], self.values[k]))
        })
    }

    /// Transposed copy (still CSR)
    pub fn transpose(&self) -> CsrMatrix {
        let [nrows, ncols] = self.shape;
        let mut counts = vec![0usize; ncols + 1];
        for &c in &self.col_indices {
            counts[c + 1] += 1;
        }
        for j in 0..ncols {
            counts[j + 1] += counts[j];
        }

        let mut next = counts.clone();
        let mut col_indices = vec![0usize; self.nnz()];
        let mut values = vec![0.0; self.nnz()];
        for (i, j, v) in self.iter() {
            let dst = next[j];
            col_indices[dst] = i;
            values[dst] = v;
            next[j] += 1;
        }

        CsrMatrix {
            row_ptrs: counts,
            col_indices,
            values,
            shape: [ncols, nrows],
        }
    }

    /// Keep the rows listed in `indices`, in that order
    pub fn select_rows(&self, indices: &[usize]) -> CsrMatrix {
        let mut row_ptrs = Vec::with_capacity(indices.len() + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();
        row_ptrs.push(0);
        for &r in indices {
            let range = self.row_ptrs[r]..self.row_ptrs[r + 1];
            col_indices.extend_from_slice(&self.col_indices[range.clone()]);
            values.extend_from_slice(&self.values[range]);
            row_ptrs.push(values.len());
        }
        CsrMatrix {
            row_ptrs,
            col_indices,
            values,
            shape: [indices.len(), self.ncols()],
        }
    }

    /// Sparse × dense product: `self · rhs`, returned row-major
    ///
    /// For each row i:
    /// ```text
    /// out[i, :] = sum(values[k] * rhs[col_indices[k], :]) for k in row_ptrs[i]..row_ptrs[i+1]
    /// ```
    pub fn spmm(&self, rhs: &DenseMatrix) -> Result<DenseMatrix> {
        if self.ncols() != rhs.rows() {
            return Err(Error::invalid_argument(
                "rhs",
                format!(
                    "cannot multiply {}x{} sparse by {}x{} dense",
                    self.nrows(),
                    self.ncols(),
                    rhs.rows(),
                    rhs.cols()
                ),
            ));
        }

        let rhs = rhs.to_layout(Layout::RowMajor);
        let m = rhs.cols();
        let mut out = vec![0.0; self.nrows() * m];
        for (i, c, v) in self.iter() {
            let src = &rhs.as_slice()[c * m..(c + 1) * m];
            let dst = &mut out[i * m..(i + 1) * m];
            for (o, x) in dst.iter_mut().zip(src.iter()) {
                *o += v * x;
            }
        }
        DenseMatrix::from_vec(self.nrows(), m, out, Layout::RowMajor)
    }

    /// Sparse × sparse product with a dense row-major result
    pub fn spgemm_dense(&self, rhs: &CsrMatrix) -> Result<DenseMatrix> {
        if self.ncols() != rhs.nrows() {
            return Err(Error::invalid_argument(
                "rhs",
                format!(
                    "cannot multiply {}x{} by {}x{}",
                    self.nrows(),
                    self.ncols(),
                    rhs.nrows(),
                    rhs.ncols()
                ),
            ));
        }

        let m = rhs.ncols();
        let mut out = vec![0.0; self.nrows() * m];
        for (i, c, v) in self.iter() {
            for k in rhs.row_ptrs[c]..rhs.row_ptrs[c + 1] {
                out[i * m + rhs.col_indices[k]] += v * rhs.values[k];
            }
        }
        DenseMatrix::from_vec(self.nrows(), m, out, Layout::RowMajor)
    }
}
