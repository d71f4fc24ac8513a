//! kval-classifiers: k-nearest-neighbor classification with k-fold
//! cross-validation.
//!
//! The core is a distance-vote classifier (`models::knn`), a contiguous fold
//! partitioner (`fold`), a cross-validation runner (`validation`) and a
//! multi-metric evaluator (`metrics`). Around it sit table import (`io`),
//! cleaning and scaling helpers, and an HTML report builder.
//!
//! Everything is generic over the `Label` type; the CLI uses `String` labels.
pub mod cleaning;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod fold;
pub mod io;
pub mod math;
pub mod metrics;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod validation;

pub use error::{KvalError, Result};
