//! k-fold cross-validation over a single classifier.
//!
//! Every fold refits the classifier on its complement only, predicts the
//! fold, and evaluates the predictions. Folds run in order; pooled labels
//! and scores are concatenated in fold order. The first error aborts the
//! run, since a partial cross-validation result is not a valid aggregate.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::data_handling::{Dataset, Label};
use crate::error::{KvalError, Result};
use crate::fold::{partition, Fold};
use crate::math::Array2;
use crate::metrics::{BinaryLabels, ConfusionMatrix, Metric, MetricEvaluator, MetricValues};
use crate::models::{ClassifierModel, Prediction};

/// Metrics of one fold, tagged with its 1-based index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldMetrics {
    pub fold: usize,
    pub values: MetricValues,
}

impl FoldMetrics {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }
}

/// Per-fold metric table plus the pooled predictions of a run.
#[derive(Debug, Clone)]
pub struct ValidationResult<L> {
    /// Selected metrics in the order they were requested.
    pub metrics: Vec<Metric>,
    pub folds: Vec<FoldMetrics>,
    pub y_true: Vec<L>,
    pub y_pred: Vec<L>,
    pub scores: Vec<f64>,
}

impl<L: Label> ValidationResult<L> {
    /// Metric names in column order of the fold table.
    pub fn metric_columns(&self) -> Vec<Metric> {
        self.metrics.clone()
    }

    /// Unweighted mean of every metric over the folds.
    pub fn mean_metrics(&self) -> MetricValues {
        let mut sums: BTreeMap<Metric, (f64, usize)> = BTreeMap::new();
        for fold in &self.folds {
            for (metric, value) in &fold.values {
                let entry = sums.entry(*metric).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(metric, (sum, n))| (metric, sum / n as f64))
            .collect()
    }

    pub fn confusion_matrix(&self) -> Result<ConfusionMatrix<L>> {
        ConfusionMatrix::from_labels(&self.y_true, &self.y_pred)
    }
}

/// Runs k-fold cross-validation with a fixed fold count and metric selection.
#[derive(Debug, Clone)]
pub struct CrossValidator<L> {
    k_folds: usize,
    evaluator: MetricEvaluator<L>,
}

impl<L: Label> CrossValidator<L> {
    pub fn new(k_folds: usize) -> Self {
        CrossValidator {
            k_folds,
            evaluator: MetricEvaluator::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.evaluator = self.evaluator.with_metrics(metrics);
        self
    }

    pub fn with_binary_labels(mut self, binary: BinaryLabels<L>) -> Self {
        self.evaluator = self.evaluator.with_binary_labels(binary);
        self
    }

    pub fn k_folds(&self) -> usize {
        self.k_folds
    }

    pub fn run(
        &self,
        classifier: &mut dyn ClassifierModel<L>,
        x: &Array2<f64>,
        y: &[L],
    ) -> Result<ValidationResult<L>> {
        if x.nrows() != y.len() {
            return Err(KvalError::InvalidInput(format!(
                "feature matrix has {} rows but label vector has {} entries",
                x.nrows(),
                y.len()
            )));
        }

        let folds = partition(y.len(), self.k_folds)?;
        log::info!(
            "Running {}-fold cross-validation of '{}' on {} samples",
            self.k_folds,
            classifier.name(),
            y.len()
        );

        let mut result = ValidationResult {
            metrics: self.evaluator.metrics().to_vec(),
            folds: Vec::with_capacity(folds.len()),
            y_true: Vec::with_capacity(y.len()),
            y_pred: Vec::with_capacity(y.len()),
            scores: Vec::with_capacity(y.len()),
        };

        for fold in &folds {
            let (metrics, y_test, prediction) = self.run_fold(classifier, x, y, fold)?;
            log::info!(
                "Fold {}/{}: {}",
                fold.index,
                folds.len(),
                format_values(self.evaluator.metrics(), &metrics)
            );

            result.folds.push(FoldMetrics {
                fold: fold.index,
                values: metrics,
            });
            result.y_true.extend_from_slice(y_test);
            result.y_pred.extend(prediction.labels);
            result.scores.extend(prediction.scores);
        }

        Ok(result)
    }

    pub fn run_dataset(
        &self,
        classifier: &mut dyn ClassifierModel<L>,
        dataset: &Dataset<L>,
    ) -> Result<ValidationResult<L>> {
        self.run(classifier, &dataset.x, dataset.y.as_slice())
    }

    fn run_fold<'y>(
        &self,
        classifier: &mut dyn ClassifierModel<L>,
        x: &Array2<f64>,
        y: &'y [L],
        fold: &Fold,
    ) -> Result<(MetricValues, &'y [L], Prediction<L>)> {
        let test = fold.test_range();
        log::debug!(
            "Fold {}: test rows [{}, {}), {} training rows",
            fold.index,
            fold.start,
            fold.end,
            y.len() - fold.len()
        );

        let x_train = x.without_rows(test.clone());
        let y_train: Vec<L> = y[..fold.start]
            .iter()
            .chain(&y[fold.end..])
            .cloned()
            .collect();
        let x_test = x.slice_rows(test.clone());
        let y_test = &y[test];

        classifier.fit(&x_train, &y_train)?;
        let prediction = classifier.predict(&x_test)?;
        if prediction.len() != y_test.len() {
            return Err(KvalError::InvalidInput(format!(
                "classifier returned {} predictions for {} test rows",
                prediction.len(),
                y_test.len()
            )));
        }

        let metrics = self.evaluator.evaluate(y_test, &prediction.labels)?;
        Ok((metrics, y_test, prediction))
    }
}

fn format_values(order: &[Metric], values: &MetricValues) -> String {
    order
        .iter()
        .filter_map(|metric| values.get(metric).map(|value| (metric, value)))
        .map(|(metric, value)| format!("{}={:.4}", metric, value))
        .collect::<Vec<_>>()
        .join(", ")
}
