//! Section Segmenter: splits raw resume text into named sections by header-line detection.

use crate::models::resume::{empty_sections, SectionName, Sections};

/// How a normalised line is compared with a header pattern.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// The whole line must equal the pattern.
    Exact(&'static str),
    /// The line may contain the pattern anywhere.
    Contains(&'static str),
}

impl Pattern {
    fn matches(&self, normalized: &str) -> bool {
        match *self {
            Pattern::Exact(p) => normalized == p,
            Pattern::Contains(p) => normalized.contains(p),
        }
    }
}

use Pattern::{Contains, Exact};

/// Header patterns per section, checked in `SectionName::ALL` order.
/// "project" is common in body prose, so its singular and plural forms only match whole lines.
const SECTION_HEADERS: &[(SectionName, &[Pattern])] = &[
    (
        SectionName::Education,
        &[
            Contains("education"),
            Contains("academic background"),
            Contains("qualifications"),
        ],
    ),
    (
        SectionName::Experience,
        &[
            Contains("experience"),
            Contains("work experience"),
            Contains("professional experience"),
            Contains("employment"),
        ],
    ),
    (
        SectionName::Projects,
        &[
            Exact("project"),
            Exact("projects"),
            Contains("project experience"),
            Contains("personal projects"),
        ],
    ),
    (
        SectionName::Achievements,
        &[
            Contains("achievements"),
            Contains("accomplishments"),
            Contains("awards"),
            Contains("honors"),
        ],
    ),
];

/// Segments resume text into section bodies.
///
/// Header lines switch the cursor and are never copied into a body. Non-blank lines after a
/// header are trimmed and appended to the current section; lines before the first header are
/// dropped. Every section key is present in the result.
pub fn segment(raw_text: &str) -> Sections {
    let mut bodies: Vec<(SectionName, Vec<&str>)> =
        SectionName::ALL.iter().map(|s| (*s, Vec::new())).collect();
    let mut current: Option<SectionName> = None;

    for line in raw_text.lines() {
        if let Some(section) = match_header(line) {
            current = Some(section);
            continue;
        }
        let trimmed = line.trim();
        if let (Some(section), false) = (current, trimmed.is_empty()) {
            if let Some((_, lines)) = bodies.iter_mut().find(|(name, _)| *name == section) {
                lines.push(trimmed);
            }
        }
    }

    let mut sections = empty_sections();
    for (name, lines) in bodies {
        sections.insert(name, lines.join("\n").trim().to_string());
    }
    sections
}

/// Returns the section a line introduces, if it is a header line.
pub fn match_header(line: &str) -> Option<SectionName> {
    let normalized = normalize_header(line);
    SECTION_HEADERS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| p.matches(&normalized)))
        .map(|(section, _)| *section)
}

fn normalize_header(line: &str) -> String {
    line.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '•' | '>'))
        .collect()
}
