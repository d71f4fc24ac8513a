//! Classification metrics computed from true/predicted label pairs.
//!
//! Sensitivity, specificity and the geometric mean are computed one-vs-rest
//! for every class present in `y_true` and macro-averaged (unweighted mean
//! over classes). AUC in the per-fold table is the single operating point
//! approximation `(1 + tpr - fpr) / 2` for a positive/negative label pair;
//! `roc_curve` offers the threshold-sweep ROC over continuous scores.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data_handling::Label;
use crate::error::{KvalError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    ErrorRate,
    Sensitivity,
    Specificity,
    GeometricMean,
    Auc,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Accuracy,
        Metric::ErrorRate,
        Metric::Sensitivity,
        Metric::Specificity,
        Metric::GeometricMean,
        Metric::Auc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::ErrorRate => "error_rate",
            Metric::Sensitivity => "sensitivity",
            Metric::Specificity => "specificity",
            Metric::GeometricMean => "geometric_mean",
            Metric::Auc => "auc",
        }
    }

    fn needs_class_counts(&self) -> bool {
        matches!(
            self,
            Metric::Sensitivity | Metric::Specificity | Metric::GeometricMean
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = KvalError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| KvalError::InvalidMetric(vec![s.to_string()]))
    }
}

/// Parse a list of metric names, reporting every unsupported entry at once.
/// Duplicates are dropped; the first occurrence fixes the order.
pub fn parse_metrics<S: AsRef<str>>(names: &[S]) -> Result<Vec<Metric>> {
    let mut metrics = Vec::with_capacity(names.len());
    let mut invalid = Vec::new();
    for name in names {
        match name.as_ref().parse::<Metric>() {
            Ok(m) if !metrics.contains(&m) => metrics.push(m),
            Ok(_) => {}
            Err(_) => invalid.push(name.as_ref().to_string()),
        }
    }
    if !invalid.is_empty() {
        return Err(KvalError::InvalidMetric(invalid));
    }
    Ok(metrics)
}

/// Metric name to value, iterated in `Metric` declaration order. Column
/// order for output comes from the selection, see
/// `ValidationResult::metric_columns`.
pub type MetricValues = BTreeMap<Metric, f64>;

/// Caller designation of the positive and negative class for binary metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryLabels<L> {
    pub positive: L,
    pub negative: L,
}

impl<L: Label> BinaryLabels<L> {
    pub fn new(positive: L, negative: L) -> Self {
        BinaryLabels { positive, negative }
    }

    /// Infer the pair from exactly two distinct labels; the larger one is
    /// positive (so `4` over `2`, `1` over `0`).
    pub fn infer<'a, I>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a L>,
        L: 'a,
    {
        let distinct: BTreeSet<&L> = labels.into_iter().collect();
        let mut it = distinct.into_iter();
        match (it.next(), it.next(), it.next()) {
            (Some(negative), Some(positive), None) => {
                Ok(BinaryLabels::new(positive.clone(), negative.clone()))
            }
            (_, None, _) => Err(KvalError::MetricComputation(
                "AUC needs two distinct labels".to_string(),
            )),
            _ => Err(KvalError::MetricComputation(
                "AUC on more than two labels needs an explicit positive/negative label pair"
                    .to_string(),
            )),
        }
    }
}

/// One-vs-rest confusion counts for a single class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassCounts {
    pub tp: usize,
    pub fn_: usize,
    pub tn: usize,
    pub fp: usize,
}

impl ClassCounts {
    pub fn for_label<L: PartialEq>(y_true: &[L], y_pred: &[L], label: &L) -> Self {
        let mut counts = ClassCounts::default();
        for (t, p) in y_true.iter().zip(y_pred) {
            match (t == label, p == label) {
                (true, true) => counts.tp += 1,
                (true, false) => counts.fn_ += 1,
                (false, false) => counts.tn += 1,
                (false, true) => counts.fp += 1,
            }
        }
        counts
    }

    pub fn sensitivity(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    pub fn geometric_mean(&self) -> f64 {
        let product = self.sensitivity() * self.specificity();
        if product > 0.0 {
            product.sqrt()
        } else {
            0.0
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn check_lengths<L>(y_true: &[L], y_pred: &[L]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(KvalError::InvalidInput(format!(
            "y_true has {} labels but y_pred has {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(KvalError::InvalidInput(
            "cannot evaluate an empty prediction set".to_string(),
        ));
    }
    Ok(())
}

pub fn accuracy<L: PartialEq>(y_true: &[L], y_pred: &[L]) -> f64 {
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    ratio(hits, y_true.len())
}

/// Single operating point AUC: `(1 + tpr - fpr) / 2`.
pub fn single_point_auc<L: Label>(
    y_true: &[L],
    y_pred: &[L],
    binary: Option<&BinaryLabels<L>>,
) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let inferred;
    let pair = match binary {
        Some(pair) => pair,
        None => {
            inferred = BinaryLabels::infer(y_true.iter().chain(y_pred))?;
            &inferred
        }
    };

    let negatives = y_true.iter().filter(|&t| *t == pair.negative).count();
    let positives = y_true.iter().filter(|&t| *t == pair.positive).count();
    if negatives == 0 || positives == 0 {
        return Err(KvalError::MetricComputation(format!(
            "AUC needs both '{}' and '{}' among the true labels",
            pair.positive, pair.negative
        )));
    }

    let false_pos = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| **t == pair.negative && **p == pair.positive)
        .count();
    let true_pos = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| **t == pair.positive && **p == pair.positive)
        .count();

    let fpr = false_pos as f64 / negatives as f64;
    let tpr = true_pos as f64 / positives as f64;
    Ok((1.0 + tpr - fpr) / 2.0)
}

/// Compute `selected` metrics (all when `None`) for one set of predictions.
pub fn evaluate<L: Label>(
    y_true: &[L],
    y_pred: &[L],
    selected: Option<&[Metric]>,
    binary: Option<&BinaryLabels<L>>,
) -> Result<MetricValues> {
    check_lengths(y_true, y_pred)?;
    let selected = selected.unwrap_or(&Metric::ALL[..]);

    let per_class: Vec<ClassCounts> = if selected.iter().any(Metric::needs_class_counts) {
        let mut classes: Vec<&L> = y_true.iter().collect();
        classes.sort();
        classes.dedup();
        classes
            .into_iter()
            .map(|label| ClassCounts::for_label(y_true, y_pred, label))
            .collect()
    } else {
        Vec::new()
    };
    let macro_avg = |f: fn(&ClassCounts) -> f64| {
        per_class.iter().map(f).sum::<f64>() / per_class.len() as f64
    };

    let mut values = MetricValues::new();
    for metric in selected {
        let value = match metric {
            Metric::Accuracy => accuracy(y_true, y_pred),
            Metric::ErrorRate => 1.0 - accuracy(y_true, y_pred),
            Metric::Sensitivity => macro_avg(ClassCounts::sensitivity),
            Metric::Specificity => macro_avg(ClassCounts::specificity),
            Metric::GeometricMean => macro_avg(ClassCounts::geometric_mean),
            Metric::Auc => single_point_auc(y_true, y_pred, binary)?,
        };
        values.insert(*metric, value);
    }
    Ok(values)
}

/// A reusable metric selection plus optional binary label designation.
#[derive(Debug, Clone)]
pub struct MetricEvaluator<L> {
    metrics: Vec<Metric>,
    binary: Option<BinaryLabels<L>>,
}

impl<L: Label> Default for MetricEvaluator<L> {
    fn default() -> Self {
        MetricEvaluator {
            metrics: Metric::ALL.to_vec(),
            binary: None,
        }
    }
}

impl<L: Label> MetricEvaluator<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_binary_labels(mut self, binary: BinaryLabels<L>) -> Self {
        self.binary = Some(binary);
        self
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn binary_labels(&self) -> Option<&BinaryLabels<L>> {
        self.binary.as_ref()
    }

    pub fn evaluate(&self, y_true: &[L], y_pred: &[L]) -> Result<MetricValues> {
        evaluate(y_true, y_pred, Some(&self.metrics), self.binary.as_ref())
    }
}

/// Count grid over the sorted union of true and predicted labels.
/// Rows are true labels, columns are predicted labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix<L> {
    pub classes: Vec<L>,
    pub counts: Vec<Vec<usize>>,
}

impl<L: Label> ConfusionMatrix<L> {
    pub fn from_labels(y_true: &[L], y_pred: &[L]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(KvalError::InvalidInput(format!(
                "y_true has {} labels but y_pred has {}",
                y_true.len(),
                y_pred.len()
            )));
        }
        let classes: Vec<L> = y_true
            .iter()
            .chain(y_pred)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let position = |label: &L| classes.binary_search(label).unwrap_or_default();

        let mut counts = vec![vec![0usize; classes.len()]; classes.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            counts[position(t)][position(p)] += 1;
        }
        Ok(ConfusionMatrix { classes, counts })
    }

    pub fn count(&self, truth: &L, predicted: &L) -> usize {
        match (
            self.classes.binary_search(truth),
            self.classes.binary_search(predicted),
        ) {
            (Ok(r), Ok(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// Points of a threshold-sweep ROC curve and the trapezoidal area under it.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub thresholds: Vec<f64>,
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub auc: f64,
}

/// Sweep every distinct score (descending) as a `score >= threshold`
/// cut-off. The curve starts at (0, 0) and ends at (1, 1).
pub fn roc_curve<L: Label>(y_true: &[L], scores: &[f64], positive: &L) -> Result<RocCurve> {
    if y_true.len() != scores.len() {
        return Err(KvalError::InvalidInput(format!(
            "y_true has {} labels but {} scores were given",
            y_true.len(),
            scores.len()
        )));
    }
    let positives = y_true.iter().filter(|&t| t == positive).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(KvalError::MetricComputation(format!(
            "ROC curve needs both '{}' and other labels among the true labels",
            positive
        )));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut thresholds = vec![f64::INFINITY];
    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let (mut tp, mut fp) = (0usize, 0usize);
    for (pos, &idx) in order.iter().enumerate() {
        if y_true[idx] == *positive {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_group = order
            .get(pos + 1)
            .map_or(true, |&next| scores[next] != scores[idx]);
        if last_of_group {
            thresholds.push(scores[idx]);
            fpr.push(fp as f64 / negatives as f64);
            tpr.push(tp as f64 / positives as f64);
        }
    }

    let auc = fpr
        .windows(2)
        .zip(tpr.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum();

    Ok(RocCurve {
        thresholds,
        fpr,
        tpr,
        auc,
    })
}

pub fn roc_auc<L: Label>(y_true: &[L], scores: &[f64], positive: &L) -> Result<f64> {
    Ok(roc_curve(y_true, scores, positive)?.auc)
}
