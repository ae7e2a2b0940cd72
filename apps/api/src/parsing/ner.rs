//! Person-name recognition for resume text.
//!
//! Provides a `NerBackend` trait for pluggable recognisers and a built-in
//! `RegexNerBackend` tuned for resume layouts, where the candidate's name is
//! almost always one of the first few lines.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::parsing::sections::match_header;

/// How many leading non-blank lines are inspected for a standalone name line.
const LEADING_LINES: usize = 5;

/// Trait for pluggable person-name recognisers.
///
/// Implementations return person-name spans in text order; the entity extractor
/// takes the first one.
pub trait NerBackend: Send + Sync {
    /// Human-readable backend identifier (e.g. "regex").
    fn backend_id(&self) -> &str;

    /// Extract person-name spans from text, in order of appearance.
    fn person_spans(&self, text: &str) -> Vec<String>;

    fn first_person(&self, text: &str) -> Option<String> {
        self.person_spans(text).into_iter().next()
    }
}

/// Regex-based recogniser. Checks the leading lines for a line that is nothing
/// but a name, then falls back to capitalised word pairs anywhere in the text.
pub struct RegexNerBackend;

impl RegexNerBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RegexNerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NerBackend for RegexNerBackend {
    fn backend_id(&self) -> &str {
        "regex"
    }

    fn person_spans(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut spans = Vec::new();

        for line in text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(LEADING_LINES)
        {
            if NAME_LINE.is_match(line) && match_header(line).is_none() && !is_stopword_name(line)
            {
                let name = collapse_whitespace(line);
                if seen.insert(name.clone()) {
                    spans.push(name);
                }
            }
        }

        for cap in CAPITALIZED_NAME.captures_iter(text) {
            if let Some(m) = cap.get(1) {
                let name = collapse_whitespace(m.as_str());
                if !is_stopword_name(&name) && seen.insert(name.clone()) {
                    spans.push(name);
                }
            }
        }

        spans
    }
}

static NAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Za-z'’\-]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][A-Za-z'’\-]+){1,3}$")
        .expect("name line pattern should compile")
});

static CAPITALIZED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]{2,}(?:[ \t]+[A-Z]\.?[ \t]+|[ \t]+)[A-Z][a-z]{2,})\b")
        .expect("capitalized name pattern should compile")
});

/// Words that make a capitalised span a heading, place, employer or skill rather than a name.
static NON_NAME_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // headings
        "resume", "curriculum", "vitae", "cv", "profile", "summary", "objective", "contact",
        "skills", "technical", "education", "experience", "projects", "project", "achievements",
        "awards", "honors", "certifications", "references", "languages", "interests",
        "professional", "personal", "work", "employment", "qualifications", "about",
        // titles and employers
        "engineer", "developer", "manager", "analyst", "scientist", "intern", "senior",
        "junior", "lead", "software", "data", "university", "college", "institute", "school",
        "academy", "inc", "corp", "corporation", "company", "ltd", "llc", "technologies",
        "solutions", "services", "group", "bachelor", "master", "science", "engineering",
        // technology terms
        "python", "java", "javascript", "react", "django", "flask", "machine", "learning",
        "deep", "power", "node", "excel", "sql", "pandas", "numpy", "tensorflow", "spring",
        "boot", "cloud", "web", "experienced", "skilled",
        // months and places that lead lines
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december", "present", "street", "road", "avenue", "new",
        "san", "los",
    ]
    .into_iter()
    .collect()
});

fn is_stopword_name(span: &str) -> bool {
    span.split_whitespace().any(|word| {
        let word = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        NON_NAME_WORDS.contains(word.as_str())
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_name_line() {
        let text = "Jane Doe\njane.doe@example.com | +1 555 123 4567\nExperience\nAcme Corp";
        assert_eq!(
            RegexNerBackend::new().first_person(text),
            Some("Jane Doe".to_string())
        );
    }

    #[test]
    fn test_name_with_middle_initial() {
        let text = "\n\n  John Q. Public  \nSoftware Engineer";
        assert_eq!(
            RegexNerBackend::new().first_person(text),
            Some("John Q. Public".to_string())
        );
    }

    #[test]
    fn test_heading_before_name_is_skipped() {
        let text = "Curriculum Vitae\nMaria Garcia-Lopez\nData Scientist";
        assert_eq!(
            RegexNerBackend::new().first_person(text),
            Some("Maria Garcia-Lopez".to_string())
        );
    }

    #[test]
    fn test_section_header_is_not_a_name() {
        let text = "Work Experience\nProfessional Summary";
        assert_eq!(RegexNerBackend::new().first_person(text), None);
    }

    #[test]
    fn test_skill_phrases_are_not_names() {
        let text = "Experienced Python developer skilled in Machine Learning and Power BI.";
        assert!(RegexNerBackend::new().person_spans(text).is_empty());
    }

    #[test]
    fn test_fallback_finds_name_in_body() {
        let text = "contact: reach out to Alice Walker for details";
        assert_eq!(
            RegexNerBackend::new().first_person(text),
            Some("Alice Walker".to_string())
        );
    }

    #[test]
    fn test_empty_text_has_no_person() {
        assert_eq!(RegexNerBackend::new().first_person(""), None);
        assert_eq!(RegexNerBackend::new().backend_id(), "regex");
    }
}
