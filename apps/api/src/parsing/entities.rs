//! Entity Extractor: composes contact details, known skills, and sections into one record.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::resume::ParsedResume;
use crate::parsing::ner::NerBackend;
use crate::parsing::sections::segment;

/// Canonical technology terms looked up in every resume.
pub const SKILLS_VOCABULARY: &[&str] = &[
    "python",
    "java",
    "c++",
    "sql",
    "machine learning",
    "deep learning",
    "data science",
    "pandas",
    "numpy",
    "tensorflow",
    "flask",
    "django",
    "html",
    "css",
    "javascript",
    "react",
    "node.js",
    "excel",
    "power bi",
];

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\w.-]+@[\w.-]+\.\w{2,4}").expect("email pattern should compile")
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s-]?)?(?:\(?\d{3}\)?[\s-]?)?\d{3}[\s-]?\d{4}")
        .expect("phone pattern should compile")
});

/// Extracts every field of a `ParsedResume` from raw text. Total: any input, including the
/// empty string, yields a fully populated record with an empty `error`.
pub fn extract_entities(raw_text: &str, ner: &dyn NerBackend) -> ParsedResume {
    ParsedResume {
        raw_text: raw_text.to_string(),
        name: ner.first_person(raw_text).unwrap_or_default(),
        email: first_match(&EMAIL, raw_text),
        phone: first_match(&PHONE, raw_text),
        skills: extract_skills(raw_text),
        sections: segment(raw_text),
        error: String::new(),
    }
}

/// Vocabulary terms that occur anywhere in the text, case-insensitively.
pub fn extract_skills(raw_text: &str) -> BTreeSet<String> {
    let lowered = raw_text.to_lowercase();
    SKILLS_VOCABULARY
        .iter()
        .filter(|skill| lowered.contains(*skill))
        .map(|skill| skill.to_string())
        .collect()
}

fn first_match(pattern: &Regex, text: &str) -> String {
    pattern
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
