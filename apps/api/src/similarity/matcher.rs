//! Similarity Matcher: TF-IDF cosine similarity between a resume and a job description.
//!
//! A fresh two-document vocabulary is fitted for every comparison; nothing is shared with
//! the role recommender's pre-fitted vectorizer.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scoring::skill_scorer::round2;
use crate::similarity::tfidf::{TextAnalyzer, TfidfModel};

pub const DEFAULT_THRESHOLD: f64 = 50.0;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern should compile"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern should compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    GoodMatch,
    WeakMatch,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::GoodMatch => "Good Match",
            Verdict::WeakMatch => "Not a Strong Match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub score: f64, // 0 – 100, two decimals
    pub verdict: Verdict,
}

/// Lowercases, strips punctuation, and collapses whitespace.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Similarity as a percentage in [0, 100]. Degenerate (empty) documents score 0.
pub fn similarity_score(resume_text: &str, jd_text: &str) -> f64 {
    let resume = clean_text(resume_text);
    let jd = clean_text(jd_text);

    let model = TfidfModel::fit(&[&resume, &jd], TextAnalyzer::english());
    if model.num_features() == 0 {
        return 0.0;
    }

    let (resume_vec, jd_vec) = (model.transform(&resume), model.transform(&jd));
    if resume_vec.is_zero() || jd_vec.is_zero() {
        debug!("One side of the JD comparison has no usable terms");
        return 0.0;
    }
    round2(resume_vec.cosine(&jd_vec) * 100.0)
}

pub fn match_resume(resume_text: &str, jd_text: &str, threshold: f64) -> SimilarityResult {
    let score = similarity_score(resume_text, jd_text);
    let verdict = if score >= threshold {
        Verdict::GoodMatch
    } else {
        Verdict::WeakMatch
    };
    debug!("JD similarity {score} against threshold {threshold}: {verdict:?}");
    SimilarityResult { score, verdict }
}
