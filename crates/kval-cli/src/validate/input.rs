use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use kval_classifiers::cleaning::MissingValueStrategy;
use kval_classifiers::config::ModelType;
use kval_classifiers::io::TableReaderConfig;
use kval_classifiers::metrics::Metric;
use kval_classifiers::preprocessing::Normalization;

use crate::util::validate_table_file;

/// Parameters of a `validate` run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidateConfig {
    pub data_file: String,
    pub label_column: String,
    pub exclude_columns: Vec<String>,
    pub model: ModelType,
    pub k_folds: usize,
    /// Metric names; empty selects every supported metric.
    pub metrics: Vec<String>,
    pub seed: Option<u64>,
    /// Label treated as the positive class for scores and AUC. Inferred as
    /// the larger label when the data has exactly two classes.
    pub positive_label: Option<String>,
    pub missing_values: MissingValueStrategy,
    pub normalization: Normalization,
    pub output_dir: String,
    /// File name of the scaled dataset written under `output_dir`.
    pub save_scaled: Option<String>,
    pub report: bool,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        let reader = TableReaderConfig::default();
        ValidateConfig {
            data_file: String::new(),
            label_column: reader.label_column,
            exclude_columns: reader.exclude_columns,
            model: ModelType::default(),
            k_folds: 5,
            metrics: Metric::ALL.iter().map(|m| m.name().to_string()).collect(),
            seed: None,
            positive_label: None,
            missing_values: MissingValueStrategy::default(),
            normalization: Normalization::default(),
            output_dir: String::from("result"),
            save_scaled: None,
            report: true,
        }
    }
}

/// Load a validation configuration from a JSON file. Missing fields take
/// their default.
pub fn load_validate_config<P: AsRef<Path>>(path: P) -> Result<ValidateConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: ValidateConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

impl ValidateConfig {
    /// Start from the config file (or defaults) and apply CLI overrides.
    pub fn from_arguments(config_path: Option<&Path>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => load_validate_config(path)?,
            None => ValidateConfig::default(),
        };

        if let Some(data) = matches.get_one::<String>("data") {
            config.data_file = data.clone();
        }
        validate_table_file(&config.data_file)?;

        if let Some(label) = matches.get_one::<String>("label_column") {
            config.label_column = label.clone();
        }
        if let Some(exclude) = matches.get_many::<String>("exclude") {
            config.exclude_columns = exclude.cloned().collect();
        }
        if let Some(k) = matches.get_one::<usize>("k") {
            config.model = ModelType::Knn { k: *k };
        }
        if let Some(folds) = matches.get_one::<usize>("folds") {
            config.k_folds = *folds;
        }
        if let Some(metrics) = matches.get_many::<String>("metrics") {
            config.metrics = metrics.cloned().collect();
        }
        if let Some(seed) = matches.get_one::<u64>("seed") {
            config.seed = Some(*seed);
        }
        if let Some(positive) = matches.get_one::<String>("positive_label") {
            config.positive_label = Some(positive.clone());
        }
        if let Some(strategy) = matches.get_one::<String>("missing") {
            config.missing_values =
                MissingValueStrategy::from_str(strategy).map_err(anyhow::Error::msg)?;
        }
        if let Some(norm) = matches.get_one::<String>("normalization") {
            config.normalization = Normalization::from_str(norm).map_err(anyhow::Error::msg)?;
        }
        if let Some(dir) = matches.get_one::<String>("output_dir") {
            config.output_dir = dir.clone();
        }
        if let Some(name) = matches.get_one::<String>("save_scaled") {
            config.save_scaled = Some(name.clone());
        }
        if matches.get_flag("no_report") {
            config.report = false;
        }

        Ok(config)
    }

    pub fn reader_config(&self) -> TableReaderConfig {
        TableReaderConfig {
            label_column: self.label_column.clone(),
            exclude_columns: self.exclude_columns.clone(),
            ..TableReaderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ValidateConfig =
            serde_json::from_str(r#"{"data_file": "d.csv", "model": {"knn": {"k": 7}}, "missing_values": "median"}"#)
                .unwrap();
        assert_eq!(config.model, ModelType::Knn { k: 7 });
        assert_eq!(config.missing_values, MissingValueStrategy::Median);
        assert_eq!(config.k_folds, 5);
        assert_eq!(config.label_column, "classtype_v1");
        assert!(config.report);
    }

    #[test]
    fn default_round_trips_through_json() {
        let config = ValidateConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: ValidateConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
