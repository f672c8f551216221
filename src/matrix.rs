#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use num_traits::Zero;
use std::fmt;
use std::ops::{AddAssign, Index, IndexMut};

/// A dense, row-major 2D array with fixed dimensions.
///
/// Indexing is by `(row, col)` pairs and panics when out of bounds. Equality
/// is element-wise.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Zero + Clone> Matrix<T> {
    /// Create a new zero-filled matrix of the given dimensions.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::zero(); rows * cols],
            rows,
            cols,
        }
    }
}

impl<T> Matrix<T> {
    /// Create a new matrix from rows of values.
    ///
    /// # Panics
    ///
    /// If the rows are not all of the same length.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == num_cols),
            "matrix rows must have equal lengths"
        );
        Self {
            data: rows.into_iter().flatten().collect(),
            rows: num_rows,
            cols: num_cols,
        }
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the row at the given index as a slice.
    #[inline]
    #[must_use]
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Get the backing row-major storage.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T: AddAssign + Copy> Matrix<T> {
    /// Add `value` to the element at (`row`, `col`) in place.
    #[inline]
    pub fn increment(&mut self, row: usize, col: usize, value: T) {
        self[(row, col)] += value;
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(col < self.cols, "column {col} is out of range");
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(col < self.cols, "column {col} is out of range");
        &mut self.data[row * self.cols + col]
    }
}

impl<T: Zero + fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let value = &self.data[row * self.cols + col];
                if value.is_zero() {
                    write!(f, "           ")?;
                } else {
                    write!(f, "{value:>10.6} ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
