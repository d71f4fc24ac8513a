use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::data_handling::Label;
use crate::error::{KvalError, Result};
use crate::math::{euclidean_distance, Array2};
use crate::models::classifier_trait::{ClassifierModel, Prediction};

/// Brute-force k-nearest-neighbor classifier with Euclidean distance.
///
/// A majority vote among the `k` closest training rows decides the label.
/// When the two leading classes hold the same number of neighbors, one of
/// them is drawn from the classifier's random source; seed it (or pass a
/// custom generator) to make predictions reproducible.
pub struct KnnClassifier<L, R = StdRng> {
    k: usize,
    positive_label: Option<L>,
    rng: R,
    state: Option<TrainedState<L>>,
}

/// Copy of the training data; replaced on every `fit`.
struct TrainedState<L> {
    x: Array2<f64>,
    y: Vec<L>,
}

/// Classes found among the neighbors of one query row, ordered by neighbor
/// count (descending) and then by first appearance in distance order.
#[derive(Debug, Clone, PartialEq)]
struct NeighborVote<L> {
    candidates: Vec<(L, usize)>,
}

impl<L: Label> KnnClassifier<L, StdRng> {
    pub fn new(k: usize) -> Result<Self> {
        Self::with_rng(k, StdRng::from_entropy())
    }

    pub fn with_seed(k: usize, seed: u64) -> Result<Self> {
        Self::with_rng(k, StdRng::seed_from_u64(seed))
    }
}

impl<L: Label, R: Rng> KnnClassifier<L, R> {
    pub fn with_rng(k: usize, rng: R) -> Result<Self> {
        if k == 0 {
            return Err(KvalError::InvalidConfiguration(
                "number of neighbors k must be at least 1".to_string(),
            ));
        }
        Ok(KnnClassifier {
            k,
            positive_label: None,
            rng,
            state: None,
        })
    }

    /// Report the neighbor fraction of `label` as the score instead of the
    /// predicted label's fraction.
    pub fn with_positive_label(mut self, label: L) -> Self {
        self.positive_label = Some(label);
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    fn resolve(&mut self, vote: &NeighborVote<L>) -> (L, f64) {
        let candidates = vote.candidates.as_slice();
        let winner = match candidates {
            [first, second, ..] if first.1 == second.1 => {
                log::debug!(
                    "tie between {} and {} ({} neighbors each)",
                    first.0,
                    second.0,
                    first.1
                );
                if self.rng.gen_bool(0.5) {
                    first
                } else {
                    second
                }
            }
            [first, ..] => first,
            // k >= 1 guarantees at least one candidate.
            [] => unreachable!("neighbor vote without candidates"),
        };

        let hits = match &self.positive_label {
            Some(positive) => candidates
                .iter()
                .find(|(label, _)| label == positive)
                .map_or(0, |(_, count)| *count),
            None => winner.1,
        };

        (winner.0.clone(), hits as f64 / self.k as f64)
    }
}

impl<L: Label, R: Rng> ClassifierModel<L> for KnnClassifier<L, R> {
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()> {
        if x.is_empty() {
            return Err(KvalError::InvalidInput(
                "cannot fit on an empty training set".to_string(),
            ));
        }
        if x.nrows() != y.len() {
            return Err(KvalError::InvalidInput(format!(
                "training matrix has {} rows but {} labels were given",
                x.nrows(),
                y.len()
            )));
        }
        self.state = Some(TrainedState {
            x: x.clone(),
            y: y.to_vec(),
        });
        Ok(())
    }

    fn predict(&mut self, x: &Array2<f64>) -> Result<Prediction<L>> {
        let state = self.state.as_ref().ok_or(KvalError::NotFitted)?;
        if self.k > state.x.nrows() {
            return Err(KvalError::InvalidInput(format!(
                "k = {} exceeds the training set size of {}",
                self.k,
                state.x.nrows()
            )));
        }
        if x.nrows() > 0 && x.ncols() != state.x.ncols() {
            return Err(KvalError::InvalidInput(format!(
                "query has {} feature columns, training data has {}",
                x.ncols(),
                state.x.ncols()
            )));
        }

        // Neighbor search is pure; only the tie-break below touches the rng,
        // and it runs in query order.
        let k = self.k;
        let votes: Vec<NeighborVote<L>> = (0..x.nrows())
            .into_par_iter()
            .map(|row| vote(state, k, x.row_slice(row)))
            .collect();

        let mut labels = Vec::with_capacity(votes.len());
        let mut scores = Vec::with_capacity(votes.len());
        for v in &votes {
            let (label, score) = self.resolve(v);
            labels.push(label);
            scores.push(score);
        }

        Ok(Prediction { labels, scores })
    }

    fn name(&self) -> &str {
        "knn"
    }
}

/// Indices of the `k` training rows closest to `query`, nearest first.
/// Equal distances keep training row order.
fn nearest_neighbors(train: &Array2<f64>, k: usize, query: &[f64]) -> Vec<usize> {
    let mut distances: Vec<(f64, usize)> = train
        .rows()
        .enumerate()
        .map(|(idx, row)| (euclidean_distance(row, query), idx))
        .collect();

    let by_distance = |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
    if k < distances.len() {
        distances.select_nth_unstable_by(k - 1, by_distance);
        distances.truncate(k);
    }
    distances.sort_unstable_by(by_distance);
    distances.into_iter().map(|(_, idx)| idx).collect()
}

fn vote<L: Label>(state: &TrainedState<L>, k: usize, query: &[f64]) -> NeighborVote<L> {
    let mut candidates: Vec<(L, usize)> = Vec::new();
    for idx in nearest_neighbors(&state.x, k, query) {
        let label = &state.y[idx];
        match candidates.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => candidates.push((label.clone(), 1)),
        }
    }
    // Stable: equal counts stay in first-appearance order.
    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    NeighborVote { candidates }
}
