//! Square connectivity matrices.
//!
//! Values are stored row-major in a contiguous buffer. `NaN` marks the absence
//! of an edge; no other sentinel is recognised.

/// Square `f64` matrix backed by a row-major buffer.
///
/// # Examples
/// ```
/// use dendronet_core::Matrix;
///
/// let matrix = Matrix::from_rows(vec![vec![0.0, 0.5], vec![0.5, 0.0]])
///     .expect("rows are square");
/// assert_eq!(matrix.dim(), 2);
/// assert_eq!(matrix.get(0, 1), Some(0.5));
/// assert_eq!(matrix.get(2, 0), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    dim: usize,
    values: Vec<f64>,
}

impl Matrix {
    /// Builds a matrix from nested rows.
    ///
    /// Returns `None` unless every row has exactly `rows.len()` entries.
    /// Network construction reports shape problems with more context, so this
    /// helper is meant for callers assembling matrices by hand.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let dim = rows.len();
        if rows.iter().any(|row| row.len() != dim) {
            return None;
        }
        Some(Self::from_square_rows(dim, rows))
    }

    pub(crate) fn from_square_rows(dim: usize, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.len() == dim && rows.iter().all(|row| row.len() == dim));
        let values = rows.into_iter().flatten().collect();
        Self { dim, values }
    }

    /// Creates a `dim`×`dim` matrix with every entry set to `value`.
    #[must_use]
    pub fn filled(dim: usize, value: f64) -> Self {
        Self {
            dim,
            values: vec![value; dim.saturating_mul(dim)],
        }
    }

    /// Returns the number of rows (and columns).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the entry at `(row, col)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.dim || col >= self.dim {
            return None;
        }
        self.values.get(row * self.dim + col).copied()
    }

    /// Returns one row as a slice.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.dim {
            return None;
        }
        let start = row * self.dim;
        self.values.get(start..start + self.dim)
    }

    /// Iterates over the rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // `chunks` rejects a zero chunk size, so an empty matrix yields nothing.
        self.values.chunks(self.dim.max(1))
    }

    /// Produces a new matrix of the same shape by mapping every entry.
    #[must_use]
    pub fn map_indexed(&self, mut f: impl FnMut(usize, usize, f64) -> f64) -> Self {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(offset, &value)| f(offset / self.dim, offset % self.dim, value))
            .collect();
        Self {
            dim: self.dim,
            values,
        }
    }

    /// Extracts the principal sub-matrix on `indices`, preserving their order.
    ///
    /// Returns `None` when any index is out of bounds.
    ///
    /// # Examples
    /// ```
    /// use dendronet_core::Matrix;
    ///
    /// let matrix = Matrix::from_rows(vec![
    ///     vec![0.0, 1.0, 2.0],
    ///     vec![1.0, 0.0, 3.0],
    ///     vec![2.0, 3.0, 0.0],
    /// ])
    /// .expect("rows are square");
    /// let sub = matrix.sub_matrix(&[0, 2]).expect("indices are in bounds");
    /// assert_eq!(sub.row(0), Some(&[0.0, 2.0][..]));
    /// assert_eq!(sub.row(1), Some(&[2.0, 0.0][..]));
    /// ```
    #[must_use]
    pub fn sub_matrix(&self, indices: &[usize]) -> Option<Self> {
        let mut values = Vec::with_capacity(indices.len() * indices.len());
        for &row in indices {
            for &col in indices {
                values.push(self.get(row, col)?);
            }
        }
        Some(Self {
            dim: indices.len(),
            values,
        })
    }

    /// Returns `true` when both matrices have the same shape and identical bit
    /// patterns, treating `NaN` entries as equal to each other.
    #[must_use]
    pub fn bitwise_eq(&self, other: &Self) -> bool {
        self.dim == other.dim
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(left, right)| left.to_bits() == right.to_bits())
    }
}

impl AsRef<Matrix> for Matrix {
    fn as_ref(&self) -> &Matrix {
        self
    }
}
