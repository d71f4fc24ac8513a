use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use kval_classifiers::data_handling::Dataset;
use kval_classifiers::report::validation_report;
use kval_classifiers::validation::ValidationResult;

use super::input::ValidateConfig;
use super::validator::ValidationOutcome;
use crate::util::ensure_output_dir;

pub const RESULTS_FILE: &str = "validation_results.csv";
pub const PREDICTIONS_FILE: &str = "predictions.csv";
pub const REPORT_FILE: &str = "validation_report.html";

fn csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {:?}", path))?;
    Ok(csv::WriterBuilder::new().from_writer(BufWriter::new(file)))
}

/// One row per fold: `fold` followed by the selected metric columns.
pub fn write_fold_results<P: AsRef<Path>>(result: &ValidationResult<String>, path: P) -> Result<()> {
    let mut writer = csv_writer(path.as_ref())?;
    let columns = result.metric_columns();

    let mut header = vec!["fold".to_string()];
    header.extend(columns.iter().map(|m| m.name().to_string()));
    writer.write_record(&header)?;

    for fold in &result.folds {
        let mut record = vec![fold.fold.to_string()];
        record.extend(
            columns
                .iter()
                .map(|m| fold.get(*m).map_or(String::new(), |v| format!("{:.6}", v))),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Pooled predictions in dataset row order.
pub fn write_predictions<P: AsRef<Path>>(result: &ValidationResult<String>, path: P) -> Result<()> {
    let mut writer = csv_writer(path.as_ref())?;
    writer.write_record(["row", "y_true", "y_pred", "score"])?;
    for (row, ((truth, pred), score)) in result
        .y_true
        .iter()
        .zip(&result.y_pred)
        .zip(&result.scores)
        .enumerate()
    {
        writer.write_record([
            row.to_string(),
            truth.clone(),
            pred.clone(),
            format!("{:.6}", score),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// The cleaned, scaled features plus the label column.
pub fn write_scaled_dataset<P: AsRef<Path>>(
    dataset: &Dataset<String>,
    label_name: &str,
    path: P,
) -> Result<()> {
    let mut writer = csv_writer(path.as_ref())?;
    let mut header = dataset.feature_names.clone();
    header.push(label_name.to_string());
    writer.write_record(&header)?;

    for (row, label) in dataset.x.rows().zip(dataset.y.iter()) {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(label.clone());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_report<P: AsRef<Path>>(
    config: &ValidateConfig,
    outcome: &ValidationOutcome,
    path: P,
) -> Result<()> {
    let overview: Vec<(String, String)> = vec![
        ("data file".to_string(), config.data_file.clone()),
        ("label column".to_string(), outcome.label_name.clone()),
        ("samples".to_string(), outcome.dataset.len().to_string()),
        (
            "features".to_string(),
            outcome.dataset.feature_names.join(", "),
        ),
        ("model".to_string(), format!("{:?}", config.model)),
        ("folds".to_string(), config.k_folds.to_string()),
        (
            "positive label".to_string(),
            outcome.positive_label.clone().unwrap_or_else(|| "-".to_string()),
        ),
    ];
    let config_json = serde_json::to_string_pretty(config)?;

    let report = validation_report(
        "kval Cross-Validation Report",
        &outcome.result,
        outcome.positive_label.as_ref(),
        &overview,
        Some(&config_json),
    )?;
    report.save_to_file(path)
}

/// Write every requested output under `config.output_dir`; returns the
/// written paths.
pub fn write_outputs(config: &ValidateConfig, outcome: &ValidationOutcome) -> Result<Vec<PathBuf>> {
    let dir = ensure_output_dir(&config.output_dir)?;
    let mut written = Vec::new();

    let path = dir.join(RESULTS_FILE);
    write_fold_results(&outcome.result, &path)?;
    written.push(path);

    let path = dir.join(PREDICTIONS_FILE);
    write_predictions(&outcome.result, &path)?;
    written.push(path);

    if let Some(name) = &config.save_scaled {
        let path = dir.join(name);
        write_scaled_dataset(&outcome.dataset, &outcome.label_name, &path)?;
        written.push(path);
    }

    if config.report {
        let path = dir.join(REPORT_FILE);
        write_report(config, outcome, &path)?;
        written.push(path);
    }

    for path in &written {
        log::info!("Wrote {}", path.display());
    }
    Ok(written)
}
