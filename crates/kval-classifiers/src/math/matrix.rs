use std::error::Error;
use std::fmt;
use std::ops::{Index, IndexMut, Range};

use crate::math::vector::Array1;

/// Dense row-major matrix; rows are samples, columns are features.
#[derive(Clone, Debug, PartialEq)]
pub struct Array2<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> Array2<T> {
    pub fn from_shape_vec(shape: (usize, usize), data: Vec<T>) -> Result<Self, ShapeError> {
        let (rows, cols) = shape;
        if data.len() != rows * cols {
            return Err(ShapeError {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Build a matrix from a list of rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ShapeError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(ShapeError {
                    rows: nrows,
                    cols: ncols,
                    len: data.len() + row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: nrows,
            cols: ncols,
        })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn row_slice(&self, row: usize) -> &[T] {
        let start = self.offset(row, 0);
        &self.data[start..start + self.cols]
    }

    /// Iterate over rows as slices, in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |r| self.row_slice(r))
    }

    pub fn column(&self, col: usize) -> Array1<T>
    where
        T: Clone,
    {
        assert!(col < self.cols, "column index out of bounds");
        (0..self.rows).map(|row| self[(row, col)].clone()).collect()
    }

    /// Copy of the contiguous row block `range`.
    pub fn slice_rows(&self, range: Range<usize>) -> Array2<T>
    where
        T: Clone,
    {
        assert!(
            range.start <= range.end && range.end <= self.rows,
            "row slice out of bounds"
        );
        let start = self.offset(range.start, 0);
        let end = self.offset(range.end, 0);
        Array2 {
            data: self.data[start..end].to_vec(),
            rows: range.end - range.start,
            cols: self.cols,
        }
    }

    /// Copy of every row outside `range`: the prefix before it followed by
    /// the suffix after it, relative order preserved.
    pub fn without_rows(&self, range: Range<usize>) -> Array2<T>
    where
        T: Clone,
    {
        assert!(
            range.start <= range.end && range.end <= self.rows,
            "row slice out of bounds"
        );
        let cut_start = self.offset(range.start, 0);
        let cut_end = self.offset(range.end, 0);
        let mut data = Vec::with_capacity(self.data.len() - (cut_end - cut_start));
        data.extend_from_slice(&self.data[..cut_start]);
        data.extend_from_slice(&self.data[cut_end..]);
        Array2 {
            data,
            rows: self.rows - (range.end - range.start),
            cols: self.cols,
        }
    }
}

impl<T> Index<(usize, usize)> for Array2<T> {
    type Output = T;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        let offset = self.offset(index.0, index.1);
        &self.data[offset]
    }
}

impl<T> IndexMut<(usize, usize)> for Array2<T> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        let offset = self.offset(index.0, index.1);
        &mut self.data[offset]
    }
}

#[derive(Debug, Clone)]
pub struct ShapeError {
    rows: usize,
    cols: usize,
    len: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid shape ({}, {}) for buffer of length {}",
            self.rows, self.cols, self.len
        )
    }
}

impl Error for ShapeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_by_two() -> Array2<f64> {
        Array2::from_shape_vec(
            (5, 2),
            vec![0.0, 0.1, 1.0, 1.1, 2.0, 2.1, 3.0, 3.1, 4.0, 4.1],
        )
        .unwrap()
    }

    #[test]
    fn from_shape_vec_rejects_bad_length() {
        assert!(Array2::from_shape_vec((2, 3), vec![1.0; 5]).is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Array2::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        let m = Array2::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m[(1, 0)], 3.0);
    }

    #[test]
    fn slice_rows_keeps_the_block() {
        let block = five_by_two().slice_rows(1..3);
        assert_eq!(block.shape(), (2, 2));
        assert_eq!(block.row_slice(0), &[1.0, 1.1]);
        assert_eq!(block.row_slice(1), &[2.0, 2.1]);
    }

    #[test]
    fn without_rows_concatenates_prefix_and_suffix() {
        let rest = five_by_two().without_rows(1..3);
        assert_eq!(rest.nrows(), 3);
        let firsts: Vec<f64> = rest.rows().map(|r| r[0]).collect();
        assert_eq!(firsts, vec![0.0, 3.0, 4.0]);
    }

    #[test]
    fn without_rows_of_edges() {
        let m = five_by_two();
        assert_eq!(m.without_rows(0..2).row_slice(0), &[2.0, 2.1]);
        assert_eq!(m.without_rows(3..5).nrows(), 3);
        assert_eq!(m.without_rows(0..5).nrows(), 0);
    }
}
