//! Analysis pipeline: extraction, entities, then skill scoring, role recommendation and
//! optional JD similarity over the parsed text.
//!
//! Flow: parse_resume / parse_text → ParsedResume; analyze → AnalysisReport.
//! Extraction failures land in `ParsedResume.error`; later stage failures land in
//! `AnalysisReport.stage_errors`. Nothing here panics or propagates past the report.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::models::report::{AnalysisReport, Stage, StageError};
use crate::models::resume::ParsedResume;
use crate::parsing::entities::extract_entities;
use crate::parsing::extractor::DocumentExtractor;
use crate::parsing::ner::NerBackend;
use crate::recommend::recommender::{Recommendation, RoleRecommender};
use crate::scoring::skill_scorer::{score, SkillTarget};
use crate::scoring::taxonomy::SkillTaxonomy;
use crate::similarity::matcher::match_resume;

/// Where the resume text comes from.
#[derive(Debug, Clone)]
pub enum ResumeSource {
    File(std::path::PathBuf),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub source: ResumeSource,
    /// Role or custom skill list; `None` picks a role from the recommendations.
    pub target: Option<SkillTarget>,
    pub jd_text: Option<String>,
    pub jd_threshold: f64,
    pub top_n: usize,
}

/// Read-only collaborators shared by every request.
pub struct ResumeEngine {
    pub extractor: DocumentExtractor,
    pub ner: Arc<dyn NerBackend>,
    pub taxonomy: Arc<SkillTaxonomy>,
    /// `None` when no model artifacts were loaded.
    pub recommender: Option<RoleRecommender>,
}

impl ResumeEngine {
    /// Parses a file. Never fails: extraction errors are recorded in `error`.
    pub fn parse_resume(&self, path: &Path) -> ParsedResume {
        match self.extractor.extract(path) {
            Ok(text) => self.parse_text(&text),
            Err(e) => {
                warn!("Document extraction failed for {}: {e}", path.display());
                ParsedResume::failed(format!("Document extraction failed: {e}"))
            }
        }
    }

    pub fn parse_text(&self, raw_text: &str) -> ParsedResume {
        extract_entities(raw_text, self.ner.as_ref())
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport {
        let parsed = match &request.source {
            ResumeSource::File(path) => self.parse_resume(path),
            ResumeSource::Text(text) => self.parse_text(text),
        };

        let mut report = AnalysisReport {
            parsed_resume: parsed,
            scored_role: None,
            score_result: None,
            recommendations: None,
            similarity_result: None,
            stage_errors: Vec::new(),
        };

        if report.parsed_resume.is_failed() {
            report.stage_errors.push(StageError {
                stage: Stage::Extraction,
                message: report.parsed_resume.error.clone(),
            });
            return report;
        }

        let text = report.parsed_resume.raw_text.clone();

        match &self.recommender {
            Some(recommender) => match recommender.recommend(&text, request.top_n) {
                Ok(rec) => report.recommendations = Some(rec),
                Err(e) => report.stage_errors.push(StageError {
                    stage: Stage::Recommendation,
                    message: format!("Role prediction failed: {e}"),
                }),
            },
            None => report.stage_errors.push(StageError {
                stage: Stage::Recommendation,
                message: "Role recommendation unavailable: no model artifacts loaded".to_string(),
            }),
        }

        let target = request
            .target
            .clone()
            .or_else(|| self.default_role(report.recommendations.as_ref()));
        if let Some(target) = target {
            if let SkillTarget::Role(role) = &target {
                report.scored_role = Some(role.trim().to_string());
            }
            match score(&text, &target, &self.taxonomy) {
                Ok(result) => report.score_result = Some(result),
                Err(e) => report.stage_errors.push(StageError {
                    stage: Stage::Scoring,
                    message: format!("Score unavailable: {e}"),
                }),
            }
        }

        if let Some(jd) = request.jd_text.as_deref().filter(|jd| !jd.trim().is_empty()) {
            report.similarity_result = Some(match_resume(&text, jd, request.jd_threshold));
        }

        info!(
            "Analysis complete: {} skills, score={:?}, {} stage errors",
            report.parsed_resume.skills.len(),
            report.score_result.as_ref().map(|s| s.score),
            report.stage_errors.len()
        );
        report
    }

    /// Top recommended role when the taxonomy knows it, else the first taxonomy role.
    fn default_role(&self, recommendations: Option<&Recommendation>) -> Option<SkillTarget> {
        recommendations
            .and_then(Recommendation::top_role)
            .filter(|role| self.taxonomy.contains_role(role))
            .or_else(|| self.taxonomy.role_names().next())
            .map(|role| SkillTarget::Role(role.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::ner::RegexNerBackend;
    use crate::recommend::artifacts::tests::fixture_artifacts;
    use crate::similarity::matcher::{Verdict, DEFAULT_THRESHOLD};

    fn engine(with_model: bool) -> ResumeEngine {
        ResumeEngine {
            extractor: DocumentExtractor::default(),
            ner: Arc::new(RegexNerBackend::new()),
            taxonomy: Arc::new(SkillTaxonomy::default()),
            recommender: with_model.then(|| RoleRecommender::new(Arc::new(fixture_artifacts()))),
        }
    }

    fn text_request(text: &str) -> AnalysisRequest {
        AnalysisRequest {
            source: ResumeSource::Text(text.to_string()),
            target: None,
            jd_text: None,
            jd_threshold: DEFAULT_THRESHOLD,
            top_n: 3,
        }
    }

    #[test]
    fn test_unsupported_file_is_captured_not_raised() {
        let parsed = engine(false).parse_resume(Path::new("resume.pages"));
        assert!(parsed.is_failed());
        assert!(parsed.error.contains("Unsupported file format"));
        assert!(parsed.raw_text.is_empty());
    }

    #[test]
    fn test_failed_extraction_skips_downstream_stages() {
        let mut request = text_request("");
        request.source = ResumeSource::File("missing/resume.txt".into());
        request.jd_text = Some("Python developer".to_string());

        let report = engine(true).analyze(&request);
        assert!(report.score_result.is_none());
        assert!(report.recommendations.is_none());
        assert!(report.similarity_result.is_none());
        assert_eq!(report.stage_errors.len(), 1);
        assert_eq!(report.stage_errors[0].stage, Stage::Extraction);
    }

    #[test]
    fn test_parse_txt_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.txt");
        std::fs::write(&path, "Jane Doe\njane@example.com\nExperience\nPython at Acme").unwrap();

        let parsed = engine(false).parse_resume(&path);
        assert!(!parsed.is_failed());
        assert_eq!(parsed.name, "Jane Doe");
        assert!(parsed.skills.contains("python"));
    }

    #[test]
    fn test_explicit_role_scores_and_matches_jd() {
        let mut request = text_request(
            "Experienced Python developer skilled in machine learning, pandas, and SQL.",
        );
        request.target = Some(SkillTarget::Role("Data Science".to_string()));
        request.jd_text = Some("Looking for a Java developer".to_string());

        let report = engine(true).analyze(&request);
        assert_eq!(report.scored_role.as_deref(), Some("Data Science"));
        assert!(report.score_result.unwrap().score > 0.0);
        assert_eq!(report.similarity_result.unwrap().verdict, Verdict::WeakMatch);
        assert!(report.stage_errors.is_empty());
    }

    #[test]
    fn test_default_role_follows_top_recommendation() {
        let report = engine(true).analyze(&text_request("Java and Spring microservices"));
        assert_eq!(report.scored_role.as_deref(), Some("Java Developer"));
    }

    #[test]
    fn test_without_model_scores_first_taxonomy_role() {
        let report = engine(false).analyze(&text_request("pandas and numpy"));
        assert_eq!(report.scored_role.as_deref(), Some("Data Science"));
        assert!(report.recommendations.is_none());
        assert_eq!(report.stage_errors[0].stage, Stage::Recommendation);
    }

    #[test]
    fn test_unknown_role_reported_as_stage_error() {
        let mut request = text_request("python");
        request.target = Some(SkillTarget::Role("Astronaut".to_string()));

        let report = engine(true).analyze(&request);
        assert!(report.score_result.is_none());
        let err = report
            .stage_errors
            .iter()
            .find(|e| e.stage == Stage::Scoring)
            .unwrap();
        assert!(err.message.contains("Astronaut"));
    }

    #[test]
    fn test_empty_text_yields_no_content_recommendation() {
        let report = engine(true).analyze(&text_request("   "));
        assert_eq!(report.recommendations, Some(Recommendation::NoContent));
        assert_eq!(report.score_result.unwrap().score, 0.0);
    }
}
