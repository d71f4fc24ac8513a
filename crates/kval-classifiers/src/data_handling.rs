//! Labelled datasets handed to the validator.
//!
//! `Dataset` pairs a feature matrix with an index-aligned label vector and
//! the feature names it was loaded with. The core treats it as read-only.
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::error::{KvalError, Result};
use crate::math::{Array1, Array2};

/// Class label usable by the classifier and metric evaluator.
///
/// `Ord` gives every per-class computation a stable class order; numeric
/// (`i64`) and categorical (`String`) labels both qualify.
pub trait Label: Clone + Eq + Hash + Ord + Debug + Display + Send + Sync {}

impl<T> Label for T where T: Clone + Eq + Hash + Ord + Debug + Display + Send + Sync {}

#[derive(Debug, Clone)]
pub struct Dataset<L> {
    pub x: Array2<f64>,
    pub y: Array1<L>,
    pub feature_names: Vec<String>,
}

impl<L: Label> Dataset<L> {
    pub fn new(x: Array2<f64>, y: Array1<L>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(KvalError::InvalidInput(format!(
                "feature matrix has {} rows but label vector has {} entries",
                x.nrows(),
                y.len()
            )));
        }
        if !feature_names.is_empty() && feature_names.len() != x.ncols() {
            return Err(KvalError::InvalidInput(format!(
                "{} feature names given for {} columns",
                feature_names.len(),
                x.ncols()
            )));
        }
        Ok(Dataset {
            x,
            y,
            feature_names,
        })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Number of samples per class, in class order.
    pub fn class_counts(&self) -> BTreeMap<L, usize> {
        let mut counts = BTreeMap::new();
        for label in self.y.iter() {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn log_input_data_summary(&self) {
        log::info!("----- Input Data Summary -----");
        log::info!(
            "{} samples, {} feature columns",
            self.x.nrows(),
            self.x.ncols()
        );
        for (label, count) in self.class_counts() {
            log::info!("class {}: {} samples", label, count);
        }
        log::info!("-------------------------------");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_rejects_mismatched_rows() {
        let x = Array2::from_shape_vec((3, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let y = Array1::from_vec(vec![2i64, 4]);
        assert!(matches!(
            Dataset::new(x, y, vec![]),
            Err(KvalError::InvalidInput(_))
        ));
    }

    #[test]
    fn class_counts_are_ordered_by_label() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0; 4]).unwrap();
        let y = Array1::from_vec(vec!["b".to_string(), "a".into(), "b".into(), "b".into()]);
        let ds = Dataset::new(x, y, vec!["f".into()]).unwrap();
        let counts: Vec<_> = ds.class_counts().into_iter().collect();
        assert_eq!(counts, vec![("a".to_string(), 1), ("b".to_string(), 3)]);
    }
}
