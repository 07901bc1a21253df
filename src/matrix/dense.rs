//! Dense f64 matrix with row- or column-major storage

use crate::error::{Error, Result};

/// Memory layout of a dense matrix
///
/// Accelerated backends address buffers column-major; a row-major buffer is
/// therefore seen by a backend as the transpose of the logical matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// Row-major (C order)
    #[default]
    RowMajor,
    /// Column-major (Fortran order)
    ColMajor,
}

impl Layout {
    /// The other layout
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Layout::RowMajor => Layout::ColMajor,
            Layout::ColMajor => Layout::RowMajor,
        }
    }
}

/// Dense matrix of f64 values
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    layout: Layout,
}

impl DenseMatrix {
    /// Create a zero-filled row-major matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::zeros_with_layout(rows, cols, Layout::RowMajor)
    }

    /// Create a zero-filled matrix with the given layout
    pub fn zeros_with_layout(rows: usize, cols: usize, layout: Layout) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
            layout,
        }
    }

    /// Wrap an existing buffer
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `data.len() != rows * cols`
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>, layout: Layout) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "buffer of length {} cannot hold a {}x{} matrix",
                    data.len(),
                    rows,
                    cols
                ),
            ));
        }
        Ok(Self {
            data,
            rows,
            cols,
            layout,
        })
    }

    /// Build a row-major matrix from a list of equally long rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
            return Err(Error::invalid_argument(
                "rows",
                format!("row {} has length {}, expected {}", bad, rows[bad].len(), ncols),
            ));
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::from_vec(rows.len(), ncols, data, Layout::RowMajor)
    }

    /// Build a row-major matrix by evaluating `f(i, j)` at every position
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self {
            data,
            rows,
            cols,
            layout: Layout::RowMajor,
        }
    }

    /// Build a column-major matrix from its columns (each of length `rows`)
    pub(crate) fn from_columns(rows: usize, columns: &[Vec<f64>]) -> Self {
        let mut out = Self::zeros_with_layout(rows, columns.len(), Layout::ColMajor);
        for (j, col) in columns.iter().enumerate() {
            debug_assert_eq!(col.len(), rows);
            out.data[j * rows..(j + 1) * rows].copy_from_slice(col);
        }
        out
    }

    /// Number of rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as [rows, cols]
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Storage layout
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Raw storage in `layout` order
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw storage in `layout` order
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows && j < self.cols);
        match self.layout {
            Layout::RowMajor => i * self.cols + j,
            Layout::ColMajor => j * self.rows + i,
        }
    }

    /// Element at (i, j)
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.offset(i, j)]
    }

    /// Overwrite element (i, j)
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let idx = self.offset(i, j);
        self.data[idx] = value;
    }

    /// Copy of column `j`
    pub fn column(&self, j: usize) -> Vec<f64> {
        match self.layout {
            Layout::ColMajor => self.data[j * self.rows..(j + 1) * self.rows].to_vec(),
            Layout::RowMajor => (0..self.rows).map(|i| self.get(i, j)).collect(),
        }
    }

    /// Copy of row `i`
    pub fn row(&self, i: usize) -> Vec<f64> {
        match self.layout {
            Layout::RowMajor => self.data[i * self.cols..(i + 1) * self.cols].to_vec(),
            Layout::ColMajor => (0..self.cols).map(|j| self.get(i, j)).collect(),
        }
    }

    /// Logical values in row-major order, whatever the storage layout
    pub fn to_row_major_vec(&self) -> Vec<f64> {
        match self.layout {
            Layout::RowMajor => self.data.clone(),
            Layout::ColMajor => (0..self.rows).flat_map(|i| self.row(i)).collect(),
        }
    }

    /// Same values stored in `layout`
    pub fn to_layout(&self, layout: Layout) -> Self {
        if layout == self.layout {
            return self.clone();
        }
        let mut out = Self::zeros_with_layout(self.rows, self.cols, layout);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(i, j, self.get(i, j));
            }
        }
        out
    }

    /// Transpose without moving any element: dimensions swap, layout flips
    pub fn into_transpose(self) -> Self {
        Self {
            data: self.data,
            rows: self.cols,
            cols: self.rows,
            layout: self.layout.flipped(),
        }
    }

    /// Transposed copy
    pub fn transpose(&self) -> Self {
        self.clone().into_transpose()
    }

    /// Apply `f` to every element in place
    pub fn map_inplace(&mut self, mut f: impl FnMut(f64) -> f64) {
        for v in self.data.iter_mut() {
            *v = f(*v);
        }
    }

    /// Multiply every element by `factor`
    pub fn scale(&mut self, factor: f64) {
        self.map_inplace(|v| v * factor);
    }

    /// Matrix product `self · rhs`, returned row-major
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the inner dimensions differ
    pub fn matmul(&self, rhs: &DenseMatrix) -> Result<DenseMatrix> {
        if self.cols != rhs.rows {
            return Err(Error::invalid_argument(
                "rhs",
                format!(
                    "cannot multiply {}x{} by {}x{}",
                    self.rows, self.cols, rhs.rows, rhs.cols
                ),
            ));
        }

        let lhs = self.to_layout(Layout::RowMajor);
        let rhs = rhs.to_layout(Layout::RowMajor);
        let (m, k, n) = (self.rows, self.cols, rhs.cols);
        let mut out = vec![0.0; m * n];

        // i-k-j order keeps both inner accesses contiguous
        for i in 0..m {
            let out_row = &mut out[i * n..(i + 1) * n];
            for p in 0..k {
                let a = lhs.data[i * k + p];
                if a == 0.0 {
                    continue;
                }
                let rhs_row = &rhs.data[p * n..(p + 1) * n];
                for (o, b) in out_row.iter_mut().zip(rhs_row.iter()) {
                    *o += a * b;
                }
            }
        }

        Self::from_vec(m, n, out, Layout::RowMajor)
    }

    /// Keep the rows listed in `indices`, in that order
    pub fn select_rows(&self, indices: &[usize]) -> DenseMatrix {
        DenseMatrix::from_fn(indices.len(), self.cols, |i, j| self.get(indices[i], j))
    }

    /// Copy the logical values of `src` into `self`, keeping `self`'s layout
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if shapes differ
    pub fn assign(&mut self, src: &DenseMatrix) -> Result<()> {
        if self.shape() != src.shape() {
            return Err(Error::invalid_argument(
                "src",
                format!("shape {:?} does not match {:?}", src.shape(), self.shape()),
            ));
        }
        if self.layout == src.layout {
            self.data.copy_from_slice(&src.data);
        } else {
            for i in 0..self.rows {
                for j in 0..self.cols {
                    self.set(i, j, src.get(i, j));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_indexing() {
        let rm = DenseMatrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Layout::RowMajor)
            .unwrap();
        let cm = DenseMatrix::from_vec(2, 3, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0], Layout::ColMajor)
            .unwrap();
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(rm.get(i, j), cm.get(i, j));
            }
        }
        assert_eq!(cm.to_row_major_vec(), rm.as_slice());
        assert_eq!(cm.column(1), vec![2.0, 5.0]);
        assert_eq!(rm.row(1), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_transpose_is_free() {
        let a = DenseMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let t = a.transpose();
        assert_eq!(t.shape(), [3, 2]);
        assert_eq!(t.layout(), Layout::ColMajor);
        assert_eq!(t.as_slice(), a.as_slice());
        assert_eq!(t.get(2, 1), 6.0);
    }

    #[test]
    fn test_matmul() {
        let a = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = DenseMatrix::from_rows(&[vec![5.0, 6.0], vec![7.0, 8.0]]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);

        // Mixed layouts give the same product
        let c2 = a.to_layout(Layout::ColMajor).matmul(&b.transpose().transpose()).unwrap();
        assert_eq!(c2, c);
    }

    #[test]
    fn test_matmul_shape_mismatch() {
        let a = DenseMatrix::zeros(2, 3);
        assert!(a.matmul(&DenseMatrix::zeros(2, 3)).is_err());
    }

    #[test]
    fn test_assign_keeps_layout() {
        let src = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mut dst = DenseMatrix::zeros_with_layout(2, 2, Layout::ColMajor);
        dst.assign(&src).unwrap();
        assert_eq!(dst.layout(), Layout::ColMajor);
        assert_eq!(dst.as_slice(), &[1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(DenseMatrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }
}
