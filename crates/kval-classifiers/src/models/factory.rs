use crate::config::{ClassifierConfig, ModelType};
use crate::data_handling::Label;
use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::knn::KnnClassifier;

/// Build a boxed classifier from a `ClassifierConfig`.
///
/// `positive_label`, when given, selects which class the prediction scores
/// refer to.
pub fn build_model<L: Label + 'static>(
    config: &ClassifierConfig,
    positive_label: Option<L>,
) -> Result<Box<dyn ClassifierModel<L>>> {
    match config.model_type {
        ModelType::Knn { k } => {
            let knn = match config.seed {
                Some(seed) => KnnClassifier::with_seed(k, seed)?,
                None => KnnClassifier::new(k)?,
            };
            let knn = match positive_label {
                Some(label) => knn.with_positive_label(label),
                None => knn,
            };
            Ok(Box::new(knn))
        }
    }
}
