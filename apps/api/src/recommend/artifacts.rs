//! Pre-fitted model artifacts and the `TextClassifier` capability they implement.
//!
//! The vectorizer, classifier and label decoder are trained elsewhere and exported as
//! JSON. This module only loads and queries them.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::similarity::tfidf::{SparseVector, TextAnalyzer, TfidfModel};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read model artifact '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid model artifact '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Model artifact shape mismatch: {0}")]
    ShapeMismatch(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("Feature vector has index {index} but the classifier expects {expected} features")]
    FeatureOutOfRange { index: usize, expected: usize },

    #[error("Class index {0} has no label")]
    UnknownClass(usize),

    #[error("Classifier produced non-finite probabilities")]
    NonFinite,
}

/// Capability interface over a trained text classifier.
pub trait TextClassifier: Send + Sync {
    fn vectorize(&self, text: &str) -> SparseVector;

    /// Per-class probabilities, aligned with the label decoder's index space.
    fn classify(&self, features: &SparseVector) -> Result<Vec<f64>, PredictionError>;

    fn decode_label(&self, index: usize) -> Result<String, PredictionError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Vectorizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct VectorizerFile {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    stop_words: Option<String>,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_norm")]
    norm: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<String> {
    Some("l2".to_string())
}

fn vectorizer_from_json(json: &str, path: &str) -> Result<TfidfModel, ArtifactError> {
    let file: VectorizerFile = serde_json::from_str(json).map_err(|source| ArtifactError::Parse {
        path: path.to_string(),
        source,
    })?;

    if let Some(bad) = file.vocabulary.values().find(|&&i| i >= file.idf.len()) {
        return Err(ArtifactError::ShapeMismatch(format!(
            "vocabulary index {bad} exceeds idf length {}",
            file.idf.len()
        )));
    }
    let remove_stop_words = match file.stop_words.as_deref() {
        None => false,
        Some("english") => true,
        Some(other) => {
            return Err(ArtifactError::ShapeMismatch(format!(
                "unsupported stop word list '{other}'"
            )))
        }
    };

    Ok(TfidfModel {
        analyzer: TextAnalyzer {
            lowercase: file.lowercase,
            remove_stop_words,
            ngram_range: file.ngram_range,
        },
        vocabulary: file.vocabulary,
        idf: file.idf,
        sublinear_tf: file.sublinear_tf,
        normalize: file.norm.as_deref() == Some("l2"),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Classifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    Multinomial,
    Ovr,
}

/// Linear model: one weight row and intercept per class.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearClassifier {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default = "default_multi_class")]
    pub multi_class: MultiClass,
}

fn default_multi_class() -> MultiClass {
    MultiClass::Multinomial
}

impl LinearClassifier {
    pub fn num_classes(&self) -> usize {
        self.intercept.len()
    }

    pub fn num_features(&self) -> usize {
        self.coef.first().map(Vec::len).unwrap_or(0)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.coef.len() != self.intercept.len() {
            return Err(ArtifactError::ShapeMismatch(format!(
                "{} coefficient rows but {} intercepts",
                self.coef.len(),
                self.intercept.len()
            )));
        }
        let width = self.num_features();
        if self.coef.iter().any(|row| row.len() != width) {
            return Err(ArtifactError::ShapeMismatch(
                "coefficient rows have differing lengths".to_string(),
            ));
        }
        Ok(())
    }

    pub fn predict_proba(&self, features: &SparseVector) -> Result<Vec<f64>, PredictionError> {
        let expected = self.num_features();
        if let Some(&(index, _)) = features.entries.iter().find(|(i, _)| *i >= expected) {
            return Err(PredictionError::FeatureOutOfRange { index, expected });
        }

        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| b + features.entries.iter().map(|(i, v)| row[*i] * v).sum::<f64>())
            .collect();

        let probs = match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::Ovr if scores.len() == 1 => {
                let p = sigmoid(scores[0]);
                vec![1.0 - p, p]
            }
            MultiClass::Ovr => {
                let raw: Vec<f64> = scores.iter().map(|s| sigmoid(*s)).collect();
                let total: f64 = raw.iter().sum();
                raw.iter().map(|p| p / total).collect()
            }
        };

        if probs.iter().any(|p| !p.is_finite()) {
            return Err(PredictionError::NonFinite);
        }
        Ok(probs)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Label decoder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelDecoder {
    pub classes: Vec<String>,
}

impl LabelDecoder {
    pub fn decode(&self, index: usize) -> Result<String, PredictionError> {
        self.classes
            .get(index)
            .cloned()
            .ok_or(PredictionError::UnknownClass(index))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bundle
// ────────────────────────────────────────────────────────────────────────────

/// The vectorizer / classifier / label decoder triple, validated against each other.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    vectorizer: TfidfModel,
    classifier: LinearClassifier,
    labels: LabelDecoder,
}

impl ModelArtifacts {
    pub fn new(
        vectorizer: TfidfModel,
        classifier: LinearClassifier,
        labels: LabelDecoder,
    ) -> Result<Self, ArtifactError> {
        classifier.validate()?;
        if classifier.num_features() != vectorizer.num_features() {
            return Err(ArtifactError::ShapeMismatch(format!(
                "vectorizer has {} features but classifier expects {}",
                vectorizer.num_features(),
                classifier.num_features()
            )));
        }
        let classes = match (classifier.multi_class, classifier.num_classes()) {
            (MultiClass::Ovr, 1) => 2,
            (_, n) => n,
        };
        if classes != labels.classes.len() {
            return Err(ArtifactError::ShapeMismatch(format!(
                "classifier has {} classes but label decoder has {}",
                classes,
                labels.classes.len()
            )));
        }
        Ok(Self {
            vectorizer,
            classifier,
            labels,
        })
    }

    pub fn load(
        vectorizer_path: &Path,
        classifier_path: &Path,
        label_encoder_path: &Path,
    ) -> Result<Self, ArtifactError> {
        let vectorizer = vectorizer_from_json(
            &read_artifact(vectorizer_path)?,
            &vectorizer_path.display().to_string(),
        )?;
        let classifier: LinearClassifier = parse_artifact(classifier_path)?;
        let labels: LabelDecoder = parse_artifact(label_encoder_path)?;

        let artifacts = Self::new(vectorizer, classifier, labels)?;
        info!(
            "Loaded role classifier: {} features, {} roles",
            artifacts.vectorizer.num_features(),
            artifacts.labels.classes.len()
        );
        Ok(artifacts)
    }

    pub fn num_classes(&self) -> usize {
        self.labels.classes.len()
    }
}

impl TextClassifier for ModelArtifacts {
    fn vectorize(&self, text: &str) -> SparseVector {
        self.vectorizer.transform(text)
    }

    fn classify(&self, features: &SparseVector) -> Result<Vec<f64>, PredictionError> {
        self.classifier.predict_proba(features)
    }

    fn decode_label(&self, index: usize) -> Result<String, PredictionError> {
        self.labels.decode(index)
    }
}

fn read_artifact(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    serde_json::from_str(&read_artifact(path)?).map_err(|source| ArtifactError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const VECTORIZER_JSON: &str = r#"{
        "vocabulary": {"python": 0, "pandas": 1, "java": 2, "spring": 3, "react": 4},
        "idf": [1.0, 1.0, 1.0, 1.0, 1.0],
        "stop_words": "english"
    }"#;

    pub(crate) const CLASSIFIER_JSON: &str = r#"{
        "coef": [
            [3.0, 3.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 3.0, 3.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 3.0]
        ],
        "intercept": [0.0, 0.0, 0.0],
        "multi_class": "multinomial"
    }"#;

    pub(crate) const LABELS_JSON: &str =
        r#"{"classes": ["Data Science", "Java Developer", "Web Development"]}"#;

    pub(crate) fn fixture_artifacts() -> ModelArtifacts {
        ModelArtifacts::new(
            vectorizer_from_json(VECTORIZER_JSON, "vectorizer.json").unwrap(),
            serde_json::from_str(CLASSIFIER_JSON).unwrap(),
            serde_json::from_str(LABELS_JSON).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let artifacts = fixture_artifacts();
        let probs = artifacts
            .classify(&artifacts.vectorize("python and pandas"))
            .unwrap();
        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_ovr_probabilities_are_normalised() {
        let classifier = LinearClassifier {
            coef: vec![vec![1.0], vec![-1.0]],
            intercept: vec![0.0, 0.0],
            multi_class: MultiClass::Ovr,
        };
        let features = SparseVector {
            entries: vec![(0, 2.0)],
        };
        let probs = classifier.predict_proba(&features).unwrap();
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_out_of_range_feature_is_prediction_error() {
        let artifacts = fixture_artifacts();
        let features = SparseVector {
            entries: vec![(9, 1.0)],
        };
        assert_eq!(
            artifacts.classify(&features).unwrap_err(),
            PredictionError::FeatureOutOfRange {
                index: 9,
                expected: 5
            }
        );
    }

    #[test]
    fn test_decode_label() {
        let artifacts = fixture_artifacts();
        assert_eq!(artifacts.decode_label(1).unwrap(), "Java Developer");
        assert_eq!(
            artifacts.decode_label(7).unwrap_err(),
            PredictionError::UnknownClass(7)
        );
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let err = ModelArtifacts::new(
            vectorizer_from_json(VECTORIZER_JSON, "vectorizer.json").unwrap(),
            serde_json::from_str(CLASSIFIER_JSON).unwrap(),
            LabelDecoder {
                classes: vec!["Only".to_string()],
            },
        )
        .unwrap_err();
        assert!(matches!(err, ArtifactError::ShapeMismatch(_)));
    }

    #[test]
    fn test_vocabulary_index_beyond_idf_rejected() {
        let json = r#"{"vocabulary": {"rust": 3}, "idf": [1.0]}"#;
        assert!(matches!(
            vectorizer_from_json(json, "v.json"),
            Err(ArtifactError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let v = dir.path().join("vectorizer.json");
        let c = dir.path().join("classifier.json");
        let l = dir.path().join("label_encoder.json");
        std::fs::write(&v, VECTORIZER_JSON).unwrap();
        std::fs::write(&c, CLASSIFIER_JSON).unwrap();
        std::fs::write(&l, LABELS_JSON).unwrap();

        let artifacts = ModelArtifacts::load(&v, &c, &l).unwrap();
        assert_eq!(artifacts.num_classes(), 3);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = ModelArtifacts::load(&missing, &missing, &missing).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }
}
