use crate::error::Result;
use crate::math::Array2;

/// Output of a classifier over a block of query rows.
///
/// `labels[i]` and `scores[i]` belong to query row `i`. Scores are in
/// `[0, 1]`; their meaning is defined by the implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction<L> {
    pub labels: Vec<L>,
    pub scores: Vec<f64>,
}

impl<L> Prediction<L> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Contract shared by every classifier the cross-validator can drive.
///
/// `fit` replaces any previous training state wholesale. `predict` takes
/// `&mut self` because implementations may draw from an owned random source.
pub trait ClassifierModel<L> {
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()>;

    fn predict(&mut self, x: &Array2<f64>) -> Result<Prediction<L>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
