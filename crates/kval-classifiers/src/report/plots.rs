use plotly::common::{DashType, Line, Mode};
use plotly::layout::{Axis, BarMode, Layout};
use plotly::{Bar, HeatMap, Plot, Scatter};

use crate::data_handling::Label;
use crate::metrics::{ConfusionMatrix, Metric, RocCurve};
use crate::validation::FoldMetrics;

/// Heatmap of the confusion matrix, true labels on the y axis.
pub fn plot_confusion_matrix<L: Label>(matrix: &ConfusionMatrix<L>, title: &str) -> Plot {
    let names: Vec<String> = matrix.classes.iter().map(|c| c.to_string()).collect();

    let trace = HeatMap::new(names.clone(), names, matrix.counts.clone()).name("Count");

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("Predicted label"))
            .y_axis(Axis::new().title("True label")),
    );
    plot
}

pub fn plot_roc_curve(curve: &RocCurve, title: &str) -> Plot {
    let mut plot = Plot::new();

    plot.add_trace(
        Scatter::new(curve.fpr.clone(), curve.tpr.clone())
            .mode(Mode::Lines)
            .name(&format!("ROC (AUC = {:.3})", curve.auc)),
    );

    let reference_line = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance")
        .line(Line::new().color("grey").dash(DashType::Dash));
    plot.add_trace(reference_line);

    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("False positive rate"))
            .y_axis(Axis::new().title("True positive rate")),
    );
    plot
}

/// Grouped bars: one group per fold, one bar per metric in `columns` order.
pub fn plot_fold_metrics(folds: &[FoldMetrics], columns: &[Metric], title: &str) -> Plot {
    let fold_names: Vec<String> = folds.iter().map(|f| format!("Fold {}", f.fold)).collect();

    let mut plot = Plot::new();
    for &metric in columns {
        let values: Vec<f64> = folds
            .iter()
            .map(|f| f.get(metric).unwrap_or(f64::NAN))
            .collect();
        plot.add_trace(Bar::new(fold_names.clone(), values).name(metric.name()));
    }

    plot.set_layout(
        Layout::new()
            .title(title)
            .bar_mode(BarMode::Group)
            .x_axis(Axis::new().title("Fold"))
            .y_axis(Axis::new().title("Value")),
    );
    plot
}
