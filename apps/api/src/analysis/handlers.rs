use std::path::{Path, PathBuf};

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::pipeline::{AnalysisRequest, ResumeSource};
use crate::analysis::uploads::{save_upload, validate_upload};
use crate::errors::AppError;
use crate::models::report::AnalysisReport;
use crate::models::resume::ParsedResume;
use crate::recommend::recommender::Recommendation;
use crate::scoring::skill_scorer::{score, ScoreResult, SkillTarget};
use crate::similarity::matcher::{match_resume, SimilarityResult};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "resume";

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub file_path: Option<String>,
    pub raw_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub raw_text: String,
    pub role: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub raw_text: String,
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
    pub jd_text: String,
    pub threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub file_path: Option<String>,
    pub raw_text: Option<String>,
    pub role: Option<String>,
    pub skills: Option<Vec<String>>,
    pub jd_text: Option<String>,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_path: String,
    pub size_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    #[serde(flatten)]
    pub result: SimilarityResult,
    pub label: &'static str,
}

/// GET /api/v1/roles
pub async fn handle_list_roles(State(state): State<AppState>) -> Json<RolesResponse> {
    let roles = state
        .engine
        .taxonomy
        .role_names()
        .map(str::to_string)
        .collect();
    Json(RolesResponse { roles })
}

/// POST /api/v1/resumes/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<ParsedResume>, AppError> {
    let source = resume_source(req.file_path, req.raw_text, &state.config.upload_dir).await?;
    let engine = state.engine.clone();
    let parsed = tokio::task::spawn_blocking(move || match source {
        ResumeSource::File(path) => engine.parse_resume(&path),
        ResumeSource::Text(text) => engine.parse_text(&text),
    })
    .await?;
    Ok(Json(parsed))
}

/// POST /api/v1/resumes/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;

        validate_upload(&file_name, data.len(), state.config.max_upload_bytes)?;
        let path = save_upload(&state.config.upload_dir, &file_name, &data)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to save upload: {e}")))?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                file_path: path.display().to_string(),
                size_bytes: data.len(),
            }),
        ));
    }
    Err(AppError::Validation(format!(
        "multipart field '{UPLOAD_FIELD}' is required"
    )))
}

/// POST /api/v1/resumes/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResult>, AppError> {
    let target = skill_target(req.role, req.skills)?
        .ok_or_else(|| AppError::Validation("either role or skills is required".to_string()))?;
    let engine = state.engine.clone();
    let result =
        tokio::task::spawn_blocking(move || score(&req.raw_text, &target, &engine.taxonomy))
            .await??;
    Ok(Json(result))
}

/// POST /api/v1/resumes/recommend
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<Recommendation>, AppError> {
    let recommender = state.engine.recommender.clone().ok_or_else(|| {
        AppError::Unavailable("role recommendation model is not loaded".to_string())
    })?;
    let top_n = req.top_n.unwrap_or(state.config.default_top_n);
    let recommendation =
        tokio::task::spawn_blocking(move || recommender.recommend(&req.raw_text, top_n))
            .await??;
    Ok(Json(recommendation))
}

/// POST /api/v1/resumes/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let threshold = threshold_or_default(req.threshold, &state)?;
    let result =
        tokio::task::spawn_blocking(move || match_resume(&req.resume_text, &req.jd_text, threshold))
            .await?;
    Ok(Json(MatchResponse {
        label: result.verdict.label(),
        result,
    }))
}

/// POST /api/v1/resumes/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    let request = AnalysisRequest {
        source: resume_source(req.file_path, req.raw_text, &state.config.upload_dir).await?,
        target: skill_target(req.role, req.skills)?,
        jd_text: req.jd_text,
        jd_threshold: state.config.jd_match_threshold,
        top_n: req.top_n.unwrap_or(state.config.default_top_n),
    };
    let engine = state.engine.clone();
    let report = tokio::task::spawn_blocking(move || engine.analyze(&request)).await?;
    info!(
        "Analyze request finished with {} stage errors",
        report.stage_errors.len()
    );
    Ok(Json(report))
}

// ────────────────────────────────────────────────────────────────────────────
// Request helpers
// ────────────────────────────────────────────────────────────────────────────

async fn resume_source(
    file_path: Option<String>,
    raw_text: Option<String>,
    upload_dir: &Path,
) -> Result<ResumeSource, AppError> {
    match (file_path, raw_text) {
        (Some(path), None) => Ok(ResumeSource::File(
            confine_to_upload_dir(upload_dir, Path::new(&path)).await?,
        )),
        (None, Some(text)) => Ok(ResumeSource::Text(text)),
        (Some(_), Some(_)) => Err(AppError::Validation(
            "provide file_path or raw_text, not both".to_string(),
        )),
        (None, None) => Err(AppError::Validation(
            "file_path or raw_text is required".to_string(),
        )),
    }
}

/// Resolves a client-supplied path to a file inside `upload_dir`.
/// A bare file name is looked up in `upload_dir`; anything else must canonicalize under it.
async fn confine_to_upload_dir(upload_dir: &Path, path: &Path) -> Result<PathBuf, AppError> {
    let is_bare_name = path.components().count() == 1 && path.file_name().is_some();
    let candidate = if is_bare_name {
        upload_dir.join(path)
    } else {
        path.to_path_buf()
    };

    let not_found = || AppError::NotFound(format!("resume file '{}' not found", path.display()));
    let root = tokio::fs::canonicalize(upload_dir)
        .await
        .map_err(|_| not_found())?;
    let resolved = tokio::fs::canonicalize(&candidate)
        .await
        .map_err(|_| not_found())?;

    if !resolved.starts_with(&root) {
        warn!(
            "Rejected resume path outside the upload directory: {}",
            path.display()
        );
        return Err(AppError::Validation(
            "file_path must refer to an uploaded resume".to_string(),
        ));
    }
    Ok(resolved)
}

fn skill_target(
    role: Option<String>,
    skills: Option<Vec<String>>,
) -> Result<Option<SkillTarget>, AppError> {
    match (role, skills) {
        (Some(_), Some(_)) => Err(AppError::Validation(
            "provide role or skills, not both".to_string(),
        )),
        (Some(role), None) => Ok(Some(SkillTarget::Role(role))),
        (None, Some(skills)) => Ok(Some(SkillTarget::Custom(skills))),
        (None, None) => Ok(None),
    }
}

fn threshold_or_default(threshold: Option<f64>, state: &AppState) -> Result<f64, AppError> {
    match threshold {
        None => Ok(state.config.jd_match_threshold),
        Some(t) if (0.0..=100.0).contains(&t) => Ok(t),
        Some(t) => Err(AppError::Validation(format!(
            "threshold must be between 0 and 100, got {t}"
        ))),
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    warn!("Multipart upload rejected: {e}");
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resume_source_requires_exactly_one_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"%PDF").unwrap();

        assert!(matches!(
            resume_source(None, Some("text".into()), dir.path()).await,
            Ok(ResumeSource::Text(_))
        ));
        assert!(matches!(
            resume_source(Some("a.pdf".into()), None, dir.path()).await,
            Ok(ResumeSource::File(_))
        ));
        assert!(resume_source(None, None, dir.path()).await.is_err());
        assert!(resume_source(Some("a.pdf".into()), Some("text".into()), dir.path())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_upload_dir_confines_file_paths() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std::fs::create_dir(&uploads).unwrap();
        std::fs::write(uploads.join("cv.txt"), "Jane Doe").unwrap();
        std::fs::write(root.path().join("secrets.txt"), "DB_PASSWORD=hunter2").unwrap();

        let inside = confine_to_upload_dir(&uploads, &uploads.join("cv.txt"))
            .await
            .unwrap();
        assert!(inside.ends_with("cv.txt"));
        assert!(confine_to_upload_dir(&uploads, Path::new("cv.txt")).await.is_ok());

        assert!(matches!(
            confine_to_upload_dir(&uploads, &root.path().join("secrets.txt")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            confine_to_upload_dir(&uploads, &uploads.join("../secrets.txt")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            confine_to_upload_dir(&uploads, Path::new("missing.txt")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_skill_target_is_optional_but_exclusive() {
        assert!(matches!(skill_target(None, None), Ok(None)));
        assert!(matches!(
            skill_target(None, Some(vec!["rust".into()])),
            Ok(Some(SkillTarget::Custom(_)))
        ));
        assert!(skill_target(Some("Data Science".into()), Some(vec![])).is_err());
    }
}
