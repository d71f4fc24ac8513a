use thiserror::Error;

/// Errors raised by the classifier, fold partitioner, validator and metric evaluator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KvalError {
    /// Malformed or mismatched shapes passed to fit/predict/evaluate.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("classifier has not been fitted; call fit before predict")]
    NotFitted,

    /// Fold count or neighbor count out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unsupported metric(s): {}", .0.join(", "))]
    InvalidMetric(Vec<String>),

    /// Metric is undefined for the given label distribution.
    #[error("cannot compute metric: {0}")]
    MetricComputation(String),
}

pub type Result<T> = std::result::Result<T, KvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_metric_lists_every_entry() {
        let err = KvalError::InvalidMetric(vec!["f1".to_string(), "recall".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("f1"));
        assert!(msg.contains("recall"));
    }

    #[test]
    fn not_fitted_message_mentions_fit() {
        assert!(KvalError::NotFitted.to_string().contains("fit"));
    }
}
