//! Role Recommender: ranks job roles for a resume with a pre-trained text classifier.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::recommend::artifacts::{PredictionError, TextClassifier};
use crate::scoring::skill_scorer::round2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleScore {
    pub role: String,
    pub confidence: f64, // 0 – 100, two decimals
}

/// Outcome of a recommendation request. `NoContent` is returned for empty or
/// whitespace-only text instead of a sentinel role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "roles", rename_all = "snake_case")]
pub enum Recommendation {
    Ranked(Vec<RoleScore>),
    NoContent,
}

impl Recommendation {
    pub fn top_role(&self) -> Option<&str> {
        match self {
            Recommendation::Ranked(roles) => roles.first().map(|r| r.role.as_str()),
            Recommendation::NoContent => None,
        }
    }
}

#[derive(Clone)]
pub struct RoleRecommender {
    classifier: Arc<dyn TextClassifier>,
}

impl RoleRecommender {
    pub fn new(classifier: Arc<dyn TextClassifier>) -> Self {
        Self { classifier }
    }

    /// Returns at most `top_n` roles (minimum 1), strictly non-increasing in confidence.
    /// Ties keep ascending class-index order.
    pub fn recommend(
        &self,
        resume_text: &str,
        top_n: usize,
    ) -> Result<Recommendation, PredictionError> {
        if resume_text.trim().is_empty() {
            return Ok(Recommendation::NoContent);
        }

        let features = self.classifier.vectorize(resume_text);
        let probs = self.classifier.classify(&features).map_err(|e| {
            warn!("Role prediction failed: {e}");
            e
        })?;

        let roles = rank(&probs, top_n.max(1))
            .into_iter()
            .map(|index| {
                Ok(RoleScore {
                    role: self.classifier.decode_label(index)?,
                    confidence: round2(probs[index] * 100.0),
                })
            })
            .collect::<Result<Vec<_>, PredictionError>>()?;

        debug!("Recommended {} roles", roles.len());
        Ok(Recommendation::Ranked(roles))
    }
}

/// Indices of the `top_n` highest probabilities; stable sort keeps index order on ties.
fn rank(probs: &[f64], top_n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..probs.len()).collect();
    indices.sort_by(|&a, &b| {
        probs[b]
            .partial_cmp(&probs[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(top_n);
    indices
}

#[cfg(test)]
impl Recommendation {
    /// Flattens to `(role, confidence)` pairs; `NoContent` becomes `("No content", 0.0)`.
    pub fn pairs(&self) -> Vec<(String, f64)> {
        match self {
            Recommendation::Ranked(roles) => roles
                .iter()
                .map(|r| (r.role.clone(), r.confidence))
                .collect(),
            Recommendation::NoContent => vec![("No content".to_string(), 0.0)],
        }
    }
}
