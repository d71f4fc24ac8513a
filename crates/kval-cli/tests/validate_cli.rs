//! Integration tests for the `validate` subcommand: argument merging, run and outputs.

use std::path::{Path, PathBuf};

use kval_cli::cli::build_cli;
use kval_cli::validate::input::{load_validate_config, ValidateConfig};
use kval_cli::validate::output::{write_outputs, PREDICTIONS_FILE, REPORT_FILE, RESULTS_FILE};
use kval_cli::validate::validator::run_validation;

/// 20 labelled rows in two clusters, with a sample-id column, one missing
/// cell and one duplicate row.
fn write_data(dir: &Path) -> PathBuf {
    let labels = [2, 2, 4, 4, 2, 4, 2, 2, 4, 4, 2, 4, 2, 4, 4, 2, 4, 2, 2, 4];
    let mut content = String::from("Sample code number,thickness,size,shape,classtype_v1\n");
    for (i, label) in labels.iter().enumerate() {
        let base = if *label == 2 { 1.0 } else { 7.0 };
        let j = i as f64 * 0.1;
        let shape = if i == 3 { String::from("NA") } else { format!("{}", base + 2.0 * j) };
        content.push_str(&format!("{},{},{},{},{}\n", 500 + i, base + j, base - j, shape, label));
    }
    content.push_str("500,1,1,1,2\n");
    let path = dir.join("data.csv");
    std::fs::write(&path, content).unwrap();
    path
}

fn config_from_args(args: &[&str]) -> ValidateConfig {
    let matches = build_cli().try_get_matches_from(args).unwrap();
    let sub = matches.subcommand_matches("validate").unwrap();
    let config_path = sub.get_one::<PathBuf>("config").map(PathBuf::as_path);
    ValidateConfig::from_arguments(config_path, sub).unwrap()
}

#[test]
fn validate_writes_results_predictions_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_data(dir.path());
    let out = dir.path().join("out");

    let config = config_from_args(&[
        "kval",
        "validate",
        "--data",
        data.to_str().unwrap(),
        "-k",
        "3",
        "--folds",
        "3",
        "--seed",
        "11",
        "--missing",
        "median",
        "--normalization",
        "min-max",
        "--output-dir",
        out.to_str().unwrap(),
        "--save-scaled",
        "scaled_data.csv",
    ]);
    assert_eq!(config.k_folds, 3);

    let outcome = run_validation(&config).unwrap();
    assert_eq!(outcome.dataset.len(), 20);
    assert_eq!(outcome.positive_label.as_deref(), Some("4"));
    assert_eq!(outcome.result.folds.len(), 3);

    let written = write_outputs(&config, &outcome).unwrap();
    assert_eq!(written.len(), 4);

    let results = std::fs::read_to_string(out.join(RESULTS_FILE)).unwrap();
    let mut lines = results.lines();
    assert_eq!(
        lines.next().unwrap(),
        "fold,accuracy,error_rate,sensitivity,specificity,geometric_mean,auc"
    );
    assert_eq!(lines.count(), 3);

    let predictions = std::fs::read_to_string(out.join(PREDICTIONS_FILE)).unwrap();
    assert!(predictions.starts_with("row,y_true,y_pred,score"));
    assert_eq!(predictions.lines().count(), 21);

    let scaled = std::fs::read_to_string(out.join("scaled_data.csv")).unwrap();
    assert!(scaled.starts_with("thickness,size,shape,classtype_v1"));

    let report = std::fs::read_to_string(out.join(REPORT_FILE)).unwrap();
    assert!(report.contains("ROC Curve"));
}

#[test]
fn config_file_with_cli_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_data(dir.path());
    let config_path = dir.path().join("config.json");
    let json = serde_json::json!({
        "data_file": data.to_str().unwrap(),
        "model": {"knn": {"k": 5}},
        "k_folds": 4,
        "metrics": ["accuracy"],
        "report": false,
        "output_dir": dir.path().join("res").to_str().unwrap(),
    });
    std::fs::write(&config_path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    let loaded = load_validate_config(&config_path).unwrap();
    assert_eq!(loaded.k_folds, 4);

    let config = config_from_args(&[
        "kval",
        "validate",
        config_path.to_str().unwrap(),
        "--folds",
        "2",
        "--metrics",
        "error_rate,accuracy",
    ]);
    assert_eq!(config.k_folds, 2);
    assert_eq!(config.metrics, vec!["error_rate", "accuracy"]);
    assert!(!config.report);

    let outcome = run_validation(&config).unwrap();
    // Remove strategy drops the incomplete row as well as the duplicate.
    assert_eq!(outcome.dataset.len(), 19);
    let written = write_outputs(&config, &outcome).unwrap();
    assert_eq!(written.len(), 2);
    let results = std::fs::read_to_string(&written[0]).unwrap();
    assert!(results.starts_with("fold,error_rate,accuracy\n"));
}

#[test]
fn invalid_inputs_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_data(dir.path());

    let mut config = ValidateConfig {
        data_file: data.to_str().unwrap().to_string(),
        metrics: vec!["accuracy".to_string(), "f1".to_string()],
        ..ValidateConfig::default()
    };
    let err = run_validation(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("f1"));

    config.metrics = vec!["accuracy".to_string()];
    config.k_folds = 1;
    assert!(run_validation(&config).is_err());

    config.k_folds = 3;
    config.positive_label = Some("9".to_string());
    assert!(run_validation(&config).is_err());

    let matches = build_cli()
        .try_get_matches_from(["kval", "validate", "--data", "missing.xlsx"])
        .unwrap();
    let sub = matches.subcommand_matches("validate").unwrap();
    assert!(ValidateConfig::from_arguments(None, sub).is_err());
}
