use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Resume sections recognised by the segmenter, in header-matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    Education,
    Experience,
    Projects,
    Achievements,
}

impl SectionName {
    pub const ALL: [SectionName; 4] = [
        SectionName::Education,
        SectionName::Experience,
        SectionName::Projects,
        SectionName::Achievements,
    ];
}

/// Section bodies keyed by name. Every section is present; undetected ones are empty.
pub type Sections = BTreeMap<SectionName, String>;

/// Builds a section map with every key present and an empty body.
pub fn empty_sections() -> Sections {
    SectionName::ALL
        .iter()
        .map(|name| (*name, String::new()))
        .collect()
}

/// Canonical output of parsing one resume document.
///
/// Empty strings mean "not found". A non-empty `error` means extraction failed and every
/// other field holds its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub raw_text: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: BTreeSet<String>,
    pub sections: Sections,
    pub error: String,
}

impl Default for ParsedResume {
    fn default() -> Self {
        Self {
            raw_text: String::new(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            skills: BTreeSet::new(),
            sections: empty_sections(),
            error: String::new(),
        }
    }
}

impl ParsedResume {
    /// A record for a document whose text could not be extracted.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        !self.error.is_empty()
    }
}

#[cfg(test)]
impl ParsedResume {
    pub fn section(&self, name: SectionName) -> &str {
        self.sections.get(&name).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_every_section_key() {
        let parsed = ParsedResume::default();
        assert_eq!(parsed.sections.len(), 4);
        for name in SectionName::ALL {
            assert_eq!(parsed.section(name), "");
        }
    }

    #[test]
    fn test_failed_record_keeps_defaults() {
        let parsed = ParsedResume::failed("Document extraction failed: boom");
        assert!(parsed.is_failed());
        assert!(parsed.raw_text.is_empty());
        assert!(parsed.skills.is_empty());
        assert_eq!(parsed.sections.len(), 4);
    }

    #[test]
    fn test_section_names_serialize_snake_case() {
        let parsed = ParsedResume::default();
        let json = serde_json::to_value(&parsed).unwrap();
        let sections = json["sections"].as_object().unwrap();
        assert!(sections.contains_key("education"));
        assert!(sections.contains_key("achievements"));
    }
}
