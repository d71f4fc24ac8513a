//! Row-major containers for feature matrices and per-sample vectors.
//!
//! `Array2` holds the feature matrix (rows are samples), `Array1` holds
//! labels, scores and other per-sample values. Both are deliberately small;
//! the cross-validation loop only needs row slicing and row concatenation.
pub mod matrix;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use vector::Array1;

/// Euclidean distance between two equally sized rows.
#[inline]
pub fn euclidean_distance(lhs: &[f64], rhs: &[f64]) -> f64 {
    debug_assert_eq!(lhs.len(), rhs.len());
    lhs.iter()
        .zip(rhs.iter())
        .map(|(a, b)| {
            let d = a - b;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
