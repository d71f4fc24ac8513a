//! HTML reporting for cross-validation runs.
pub mod plots;
pub mod report;

use maud::html;

pub use report::{Report, ReportSection};

use crate::data_handling::Label;
use crate::error::Result;
use crate::metrics::roc_curve;
use crate::validation::ValidationResult;

/// Build the standard cross-validation report.
///
/// `overview` rows are shown as a key/value table; `config_json` is embedded
/// verbatim when given. The ROC section appears only when `positive` is set
/// and both classes occur among the pooled true labels.
pub fn validation_report<L: Label>(
    title: &str,
    result: &ValidationResult<L>,
    positive: Option<&L>,
    overview: &[(String, String)],
    config_json: Option<&str>,
) -> Result<Report> {
    let mut report = Report::new("kval", env!("CARGO_PKG_VERSION"), None, title);

    {
        let mut section = ReportSection::new("Overview");
        section.add_content(html! {
            table {
                @for (key, value) in overview {
                    tr { th { (key) } td { (value) } }
                }
            }
        });
        report.add_section(section);
    }

    {
        let columns = result.metric_columns();
        let means = result.mean_metrics();
        let mut section = ReportSection::new("Fold Metrics");
        section.add_content(html! {
            table {
                tr {
                    th { "fold" }
                    @for metric in &columns { th { (metric) } }
                }
                @for fold in &result.folds {
                    tr {
                        td { (fold.fold) }
                        @for metric in &columns {
                            td { (format!("{:.4}", fold.get(*metric).unwrap_or(f64::NAN))) }
                        }
                    }
                }
                tr {
                    th { "mean" }
                    @for metric in &columns {
                        th { (format!("{:.4}", means.get(metric).copied().unwrap_or(f64::NAN))) }
                    }
                }
            }
        });
        section.add_plot(plots::plot_fold_metrics(&result.folds, &columns, "Metrics per Fold"));
        report.add_section(section);
    }

    {
        let matrix = result.confusion_matrix()?;
        let mut section = ReportSection::new("Confusion Matrix");
        section.add_content(html! {
            p { "Pooled predictions over all folds: " (matrix.total()) " samples." }
        });
        section.add_plot(plots::plot_confusion_matrix(&matrix, "Confusion Matrix"));
        report.add_section(section);
    }

    if let Some(positive) = positive {
        match roc_curve(&result.y_true, &result.scores, positive) {
            Ok(curve) => {
                let mut section = ReportSection::new("ROC Curve");
                section.add_content(html! {
                    p {
                        "Scores are the fraction of neighbors labelled '" (positive)
                        "'. Threshold-sweep AUC: " (format!("{:.4}", curve.auc))
                    }
                });
                section.add_plot(plots::plot_roc_curve(&curve, "ROC Curve"));
                report.add_section(section);
            }
            Err(e) => log::warn!("Skipping ROC curve: {}", e),
        }
    }

    if let Some(json) = config_json {
        let mut section = ReportSection::new("Configuration");
        section.add_content(html! {
            pre { code { (json) } }
        });
        report.add_section(section);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metric;
    use crate::validation::FoldMetrics;

    fn result() -> ValidationResult<i64> {
        ValidationResult {
            metrics: vec![Metric::Accuracy],
            folds: vec![
                FoldMetrics {
                    fold: 1,
                    values: [(Metric::Accuracy, 1.0)].into_iter().collect(),
                },
                FoldMetrics {
                    fold: 2,
                    values: [(Metric::Accuracy, 0.5)].into_iter().collect(),
                },
            ],
            y_true: vec![2, 4, 2, 4],
            y_pred: vec![2, 4, 2, 2],
            scores: vec![0.0, 1.0, 0.0, 0.34],
        }
    }

    #[test]
    fn report_has_all_sections() {
        let overview = vec![("samples".to_string(), "4".to_string())];
        let report =
            validation_report("CV", &result(), Some(&4), &overview, Some(r#"{"k": 3}"#)).unwrap();
        let titles: Vec<&str> = report.sections().iter().map(|s| s.title()).collect();
        assert_eq!(
            titles,
            vec!["Overview", "Fold Metrics", "Confusion Matrix", "ROC Curve", "Configuration"]
        );
        let html = report.render();
        assert!(html.contains("0.7500"));
        assert!(html.contains("&quot;k&quot;"));
    }

    #[test]
    fn roc_is_skipped_without_positive_label_or_second_class() {
        let report = validation_report("CV", &result(), None, &[], None).unwrap();
        assert_eq!(report.sections().len(), 3);

        let mut single = result();
        single.y_true = vec![2, 2, 2, 2];
        let report = validation_report("CV", &single, Some(&4), &[], None).unwrap();
        assert_eq!(report.sections().len(), 3);
    }
}
