use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::similarity::matcher::DEFAULT_THRESHOLD;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numeric values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub classifier_path: PathBuf,
    pub vectorizer_path: PathBuf,
    pub label_encoder_path: PathBuf,
    /// `None` uses the built-in taxonomy.
    pub skill_taxonomy_path: Option<PathBuf>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub jd_match_threshold: f64,
    pub default_top_n: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let model_dir = PathBuf::from(env_or("MODEL_DIR", "model"));
        let artifact = |key: &str, file: &str| {
            std::env::var(key)
                .map(PathBuf::from)
                .unwrap_or_else(|_| model_dir.join(file))
        };

        let jd_match_threshold: f64 = parse_env("JD_MATCH_THRESHOLD", DEFAULT_THRESHOLD)?;
        if !(0.0..=100.0).contains(&jd_match_threshold) {
            anyhow::bail!("JD_MATCH_THRESHOLD must be between 0 and 100, got {jd_match_threshold}");
        }

        Ok(Config {
            classifier_path: artifact("CLASSIFIER_MODEL_PATH", "classifier.json"),
            vectorizer_path: artifact("VECTORIZER_PATH", "vectorizer.json"),
            label_encoder_path: artifact("LABEL_ENCODER_PATH", "label_encoder.json"),
            skill_taxonomy_path: std::env::var("SKILL_TAXONOMY_PATH").ok().map(PathBuf::from),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploaded_resumes")),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            jd_match_threshold,
            default_top_n: parse_env("DEFAULT_TOP_N", 3)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        let model_dir = PathBuf::from("model");
        Config {
            classifier_path: model_dir.join("classifier.json"),
            vectorizer_path: model_dir.join("vectorizer.json"),
            label_encoder_path: model_dir.join("label_encoder.json"),
            skill_taxonomy_path: None,
            upload_dir: PathBuf::from("uploaded_resumes"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            jd_match_threshold: DEFAULT_THRESHOLD,
            default_top_n: 3,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: usize = parse_env("RESUME_MATCHER_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("RESUME_MATCHER_TEST_BAD_PORT", "eighty");
        let err = parse_env::<u16>("RESUME_MATCHER_TEST_BAD_PORT", 8080).unwrap_err();
        assert!(err.to_string().contains("RESUME_MATCHER_TEST_BAD_PORT"));
    }

    #[test]
    fn test_default_artifact_paths_live_under_model_dir() {
        let config = Config::default();
        assert_eq!(config.vectorizer_path, PathBuf::from("model/vectorizer.json"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
    }
}
