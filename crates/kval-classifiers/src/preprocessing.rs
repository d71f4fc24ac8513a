//! Column-wise feature scaling.
//!
//! Provides a standard scaler (per-column mean/std) and a min-max scaler,
//! both fitted on a full `Array2<f64>` and applied to every row. `Normalization`
//! selects between them from configuration.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::math::Array2;

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;
}

/// Fit a `Scaler` from an `Array2<f64>` where rows are samples and
/// columns are features. Uses the sample standard deviation (n - 1).
pub fn fit_scaler(x: &Array2<f64>) -> Scaler {
    let (nrows, ncols) = x.shape();

    let mut mean = vec![0.0f64; ncols];
    for row in x.rows() {
        for (m, v) in mean.iter_mut().zip(row) {
            *m += v;
        }
    }
    let nrows_f = nrows.max(1) as f64;
    for v in mean.iter_mut() {
        *v /= nrows_f;
    }

    let mut var = vec![0.0f64; ncols];
    for row in x.rows() {
        for c in 0..ncols {
            let d = row[c] - mean[c];
            var[c] += d * d;
        }
    }
    let dof = nrows.saturating_sub(1).max(1) as f64;
    for v in var.iter_mut() {
        *v = (*v / dof).sqrt().max(Scaler::MIN_STD);
    }

    Scaler { mean, std: var }
}

/// Transform all rows using the provided `Scaler` and return a new `Array2<f64>`.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Array2<f64> {
    let ncols = x.ncols();
    let mut out = x.clone();
    for r in 0..x.nrows() {
        for c in 0..ncols {
            out[(r, c)] = (x[(r, c)] - sc.mean[c]) / sc.std[c];
        }
    }
    out
}

pub fn fit_transform(x: &Array2<f64>) -> Array2<f64> {
    let sc = fit_scaler(x);
    transform_all(x, &sc)
}

/// Per-column minimum and maximum.
#[derive(Clone, Debug, PartialEq)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

pub fn fit_min_max(x: &Array2<f64>) -> MinMaxScaler {
    let ncols = x.ncols();
    let mut min = vec![f64::INFINITY; ncols];
    let mut max = vec![f64::NEG_INFINITY; ncols];
    for row in x.rows() {
        for c in 0..ncols {
            min[c] = min[c].min(row[c]);
            max[c] = max[c].max(row[c]);
        }
    }
    MinMaxScaler { min, max }
}

/// Map every column to [0, 1]. Constant columns map to 0.
pub fn transform_min_max(x: &Array2<f64>, sc: &MinMaxScaler) -> Array2<f64> {
    let mut out = x.clone();
    for r in 0..x.nrows() {
        for c in 0..x.ncols() {
            let range = sc.max[c] - sc.min[c];
            out[(r, c)] = if range > 0.0 {
                (x[(r, c)] - sc.min[c]) / range
            } else {
                0.0
            };
        }
    }
    out
}

/// Feature scaling applied before cross-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    None,
    MinMax,
    Standard,
}

impl Normalization {
    pub fn apply(&self, x: &Array2<f64>) -> Array2<f64> {
        if x.is_empty() {
            return x.clone();
        }
        match self {
            Normalization::None => x.clone(),
            Normalization::MinMax => transform_min_max(x, &fit_min_max(x)),
            Normalization::Standard => fit_transform(x),
        }
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(Normalization::None),
            "min_max" | "minmax" => Ok(Normalization::MinMax),
            "standard" | "z_score" | "zscore" => Ok(Normalization::Standard),
            _ => Err(format!(
                "Unknown normalization: {}. Use one of: none, min-max, standard",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Array2<f64> {
        Array2::from_rows(vec![
            vec![1.0, 5.0],
            vec![2.0, 5.0],
            vec![3.0, 5.0],
        ])
        .unwrap()
    }

    #[test]
    fn standard_scaler_uses_sample_std() {
        let sc = fit_scaler(&sample());
        assert_eq!(sc.mean, vec![2.0, 5.0]);
        assert!((sc.std[0] - 1.0).abs() < 1e-12);
        assert_eq!(sc.std[1], Scaler::MIN_STD);

        let z = transform_all(&sample(), &sc);
        assert!((z[(0, 0)] + 1.0).abs() < 1e-12);
        assert!((z[(2, 0)] - 1.0).abs() < 1e-12);
        assert_eq!(z[(1, 1)], 0.0);
    }

    #[test]
    fn min_max_maps_to_unit_interval() {
        let out = Normalization::MinMax.apply(&sample());
        assert_eq!(out.column(0).to_vec(), vec![0.0, 0.5, 1.0]);
        assert_eq!(out.column(1).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn none_leaves_data_untouched() {
        assert_eq!(Normalization::None.apply(&sample()), sample());
    }

    #[test]
    fn parses_names() {
        assert_eq!("min-max".parse::<Normalization>(), Ok(Normalization::MinMax));
        assert_eq!("Standard".parse::<Normalization>(), Ok(Normalization::Standard));
        assert!("log".parse::<Normalization>().is_err());
    }
}
