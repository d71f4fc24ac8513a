use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Central configuration for classifiers built by `models::factory`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Seed for the tie-break random source. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported classifier variants and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    #[serde(rename = "knn")]
    Knn { k: usize },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::Knn { k: 3 }
    }
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::Knn { .. } => "knn",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    /// Accepts `knn` (default k) or `knn:<k>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let (name, arg) = match lowered.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (lowered.as_str(), None),
        };
        match name {
            "knn" => {
                let k = match arg {
                    Some(raw) => raw
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid neighbor count '{}' in '{}'", raw, s))?,
                    None => 3,
                };
                Ok(ModelType::Knn { k })
            }
            _ => Err(format!("Unknown model type: {}. Supported: knn", s)),
        }
    }
}

impl ClassifierConfig {
    pub fn new(model_type: ModelType, seed: Option<u64>) -> Self {
        Self { seed, model_type }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            seed: None,
            model_type: ModelType::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_knn_with_and_without_k() {
        assert_eq!("knn".parse::<ModelType>().unwrap(), ModelType::Knn { k: 3 });
        assert_eq!("KNN:7".parse::<ModelType>().unwrap(), ModelType::Knn { k: 7 });
        assert!("knn:seven".parse::<ModelType>().is_err());
        assert!("svm".parse::<ModelType>().is_err());
    }

    #[test]
    fn config_json_is_flat() {
        let cfg = ClassifierConfig::new(ModelType::Knn { k: 5 }, Some(11));
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"knn\""));
        let back: ClassifierConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn seed_is_optional_in_json() {
        let cfg: ClassifierConfig = serde_json::from_str(r#"{"knn": {"k": 4}}"#).unwrap();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.model_type, ModelType::Knn { k: 4 });
    }
}
