use serde::{Deserialize, Serialize};

use crate::models::resume::ParsedResume;
use crate::recommend::recommender::Recommendation;
use crate::scoring::skill_scorer::ScoreResult;
use crate::similarity::matcher::SimilarityResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Scoring,
    Recommendation,
}

/// A stage that could not produce its result, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

/// Everything one analysis run produced. Absent results are explained in `stage_errors`,
/// except `similarity_result`, which is absent when no job description was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub parsed_resume: ParsedResume,
    pub scored_role: Option<String>,
    pub score_result: Option<ScoreResult>,
    pub recommendations: Option<Recommendation>,
    pub similarity_result: Option<SimilarityResult>,
    pub stage_errors: Vec<StageError>,
}
