//! Contiguous k-fold partitioning.
//!
//! Folds are laid out in index order with no shuffling: the first
//! `n % k_folds` folds receive one extra sample, so fold sizes differ by at
//! most one and the same `(n, k_folds)` always yields the same partition.
use std::ops::Range;

use crate::error::{KvalError, Result};

/// One test partition `[start, end)`; everything else trains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fold {
    /// 1-based position of the fold in the run.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Fold {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn test_range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Training indices for a dataset of `n` samples: the prefix before the
    /// fold followed by the suffix after it.
    pub fn train_indices(&self, n: usize) -> Vec<usize> {
        (0..self.start).chain(self.end..n).collect()
    }
}

/// Split `n` ordered samples into `k_folds` contiguous folds.
pub fn partition(n: usize, k_folds: usize) -> Result<Vec<Fold>> {
    if k_folds < 2 {
        return Err(KvalError::InvalidConfiguration(format!(
            "number of folds must be at least 2, got {}",
            k_folds
        )));
    }
    if k_folds > n {
        return Err(KvalError::InvalidConfiguration(format!(
            "number of folds ({}) exceeds the number of samples ({})",
            k_folds, n
        )));
    }

    let base = n / k_folds;
    let remainder = n % k_folds;

    let folds = (0..k_folds)
        .map(|i| {
            let start = i * base + i.min(remainder);
            let end = start + base + usize::from(i < remainder);
            Fold {
                index: i + 1,
                start,
                end,
            }
        })
        .collect();

    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_samples_in_three_folds() {
        let folds = partition(10, 3).unwrap();
        let ranges: Vec<_> = folds.iter().map(|f| (f.start, f.end)).collect();
        assert_eq!(ranges, vec![(0, 4), (4, 7), (7, 10)]);
        let sizes: Vec<_> = folds.iter().map(Fold::len).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        let indices: Vec<_> = folds.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn folds_cover_every_index_once() {
        for n in 2..40 {
            for k in 2..=n {
                let folds = partition(n, k).unwrap();
                assert_eq!(folds.len(), k);

                let mut seen = vec![0usize; n];
                for fold in &folds {
                    for i in fold.test_range() {
                        seen[i] += 1;
                    }
                }
                assert!(seen.iter().all(|&c| c == 1), "n={} k={}", n, k);

                let max = folds.iter().map(Fold::len).max().unwrap();
                let min = folds.iter().map(Fold::len).min().unwrap();
                assert!(max - min <= 1, "n={} k={}", n, k);
                assert!(folds.windows(2).all(|w| w[0].end == w[1].start));
            }
        }
    }

    #[test]
    fn train_and_test_are_disjoint_and_complete() {
        let n = 17;
        for fold in partition(n, 4).unwrap() {
            let train = fold.train_indices(n);
            assert_eq!(train.len() + fold.len(), n);
            assert!(train.iter().all(|i| !fold.test_range().contains(i)));
            assert!(train.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn partition_is_repeatable() {
        assert_eq!(partition(23, 5).unwrap(), partition(23, 5).unwrap());
    }

    #[test]
    fn rejects_out_of_range_fold_counts() {
        assert!(matches!(partition(10, 1), Err(KvalError::InvalidConfiguration(_))));
        assert!(matches!(partition(10, 0), Err(KvalError::InvalidConfiguration(_))));
        assert!(matches!(partition(3, 4), Err(KvalError::InvalidConfiguration(_))));
        assert!(partition(4, 4).is_ok());
    }
}
