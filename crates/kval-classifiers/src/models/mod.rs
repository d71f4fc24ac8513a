pub mod classifier_trait;
pub mod factory;
pub mod knn;

pub use classifier_trait::{ClassifierModel, Prediction};
pub use knn::KnnClassifier;
