use anyhow::{bail, Context, Result};

use kval_classifiers::cleaning::clean;
use kval_classifiers::config::ClassifierConfig;
use kval_classifiers::data_handling::Dataset;
use kval_classifiers::io::read_table;
use kval_classifiers::metrics::{parse_metrics, BinaryLabels};
use kval_classifiers::models::factory::build_model;
use kval_classifiers::validation::{CrossValidator, ValidationResult};

use super::input::ValidateConfig;

/// Everything a `validate` run produced.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Cleaned and scaled dataset the folds were drawn from.
    pub dataset: Dataset<String>,
    pub label_name: String,
    pub result: ValidationResult<String>,
    pub positive_label: Option<String>,
}

pub fn run_validation(config: &ValidateConfig) -> Result<ValidationOutcome> {
    let metrics = parse_metrics(&config.metrics).context("Invalid metric selection")?;

    let table = read_table(&config.data_file, &config.reader_config())?;
    let label_name = table.label_name.clone();
    let table = clean(table, config.missing_values);
    let mut dataset = table
        .into_dataset()
        .context("Dataset still has missing values after cleaning")?;
    if dataset.is_empty() {
        bail!("No samples left after cleaning {}", config.data_file);
    }
    dataset.x = config.normalization.apply(&dataset.x);
    dataset.log_input_data_summary();

    let classes = dataset.y.unique();
    let binary = resolve_binary_labels(config.positive_label.as_deref(), &classes)?;
    let positive_label = binary
        .as_ref()
        .map(|b| b.positive.clone())
        .or_else(|| config.positive_label.clone());

    let model_config = ClassifierConfig::new(config.model.clone(), config.seed);
    let mut model = build_model(&model_config, positive_label.clone())
        .context("Failed to build classifier")?;

    let mut validator = CrossValidator::new(config.k_folds);
    if !metrics.is_empty() {
        validator = validator.with_metrics(metrics);
    }
    if let Some(binary) = binary {
        log::info!(
            "Positive class '{}', negative class '{}'",
            binary.positive,
            binary.negative
        );
        validator = validator.with_binary_labels(binary);
    }

    let result = validator
        .run_dataset(model.as_mut(), &dataset)
        .context("Cross-validation failed")?;

    for (metric, value) in result.mean_metrics() {
        log::info!("mean {}: {:.4}", metric, value);
    }

    Ok(ValidationOutcome {
        dataset,
        label_name,
        result,
        positive_label,
    })
}

/// Pick the positive/negative pair for binary metrics.
///
/// An explicit positive label must be one of the classes. With two classes
/// the other one is negative; without an explicit label the larger class is
/// positive, compared as numbers when both labels parse. More than two
/// classes leave the pair unset.
fn resolve_binary_labels(
    positive: Option<&str>,
    classes: &[String],
) -> Result<Option<BinaryLabels<String>>> {
    if let Some(positive) = positive {
        if !classes.iter().any(|c| c == positive) {
            bail!(
                "Positive label '{}' is not one of the classes: {}",
                positive,
                classes.join(", ")
            );
        }
    }
    if classes.len() != 2 {
        if classes.len() > 2 {
            log::warn!(
                "{} classes found; AUC needs a two-class dataset",
                classes.len()
            );
        }
        return Ok(None);
    }

    let binary = match positive {
        Some(positive) => {
            let negative = classes
                .iter()
                .find(|c| c.as_str() != positive)
                .cloned()
                .unwrap_or_default();
            BinaryLabels::new(positive.to_string(), negative)
        }
        None => match numeric_pair(classes) {
            Some((low, high)) => BinaryLabels::new(high, low),
            None => BinaryLabels::infer(classes)?,
        },
    };
    Ok(Some(binary))
}

/// Order two numeric class labels by value, so `10` sorts above `9`.
fn numeric_pair(classes: &[String]) -> Option<(String, String)> {
    let [a, b] = classes else {
        return None;
    };
    let (x, y) = (a.parse::<f64>().ok()?, b.parse::<f64>().ok()?);
    if x < y {
        Some((a.clone(), b.clone()))
    } else if y < x {
        Some((b.clone(), a.clone()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn infers_larger_label_as_positive() {
        let binary = resolve_binary_labels(None, &classes(&["2", "4"])).unwrap().unwrap();
        assert_eq!(binary, BinaryLabels::new("4".to_string(), "2".to_string()));
    }

    #[test]
    fn numeric_labels_compare_by_value() {
        let binary = resolve_binary_labels(None, &classes(&["10", "9"])).unwrap().unwrap();
        assert_eq!(binary, BinaryLabels::new("10".to_string(), "9".to_string()));

        let binary = resolve_binary_labels(None, &classes(&["9", "10"])).unwrap().unwrap();
        assert_eq!(binary.positive, "10");
        assert_eq!(binary.negative, "9");
    }

    #[test]
    fn text_labels_compare_as_text() {
        let binary = resolve_binary_labels(None, &classes(&["benign", "malignant"]))
            .unwrap()
            .unwrap();
        assert_eq!(binary.positive, "malignant");
    }

    #[test]
    fn explicit_positive_label_wins() {
        let binary = resolve_binary_labels(Some("2"), &classes(&["2", "4"]))
            .unwrap()
            .unwrap();
        assert_eq!(binary.positive, "2");
        assert_eq!(binary.negative, "4");
    }

    #[test]
    fn unknown_positive_label_is_an_error() {
        assert!(resolve_binary_labels(Some("7"), &classes(&["2", "4"])).is_err());
    }

    #[test]
    fn multiclass_has_no_pair() {
        let binary = resolve_binary_labels(None, &classes(&["a", "b", "c"])).unwrap();
        assert!(binary.is_none());
    }
}
