//! Document Extractor: turns a resume file (PDF, DOCX, TXT) into raw text.
//!
//! Readers are registered per format on a `DocumentExtractor`; a format with no registered
//! reader is reported as unsupported, exactly like an unknown extension.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

const ALLOWED_FORMATS: &str = "PDF, DOCX, or TXT";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format '{extension}'. Please upload {ALLOWED_FORMATS}.")]
    UnsupportedFormat { extension: String },

    #[error("Failed to read {format} document '{path}': {reason}")]
    ReadError {
        format: DocumentFormat,
        path: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Txt => "TXT",
        };
        f.write_str(label)
    }
}

/// Reads one document format into text. Implementations report failures as plain messages;
/// the extractor wraps them into `ExtractError::ReadError`.
pub trait DocumentReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<String, String>;
}

/// Concatenates per-page text in page order. Pages without text contribute nothing.
pub struct PdfReader;

impl DocumentReader for PdfReader {
    fn read(&self, path: &Path) -> Result<String, String> {
        let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| e.to_string())?;
        debug!("Extracted {} PDF pages from {}", pages.len(), path.display());
        Ok(pages.concat())
    }
}

/// Joins body paragraph texts with newlines, in document order.
pub struct DocxReader;

impl DocumentReader for DocxReader {
    fn read(&self, path: &Path) -> Result<String, String> {
        let file = File::open(path).map_err(|e| e.to_string())?;
        let mut archive = ZipArchive::new(file).map_err(|e| e.to_string())?;
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| e.to_string())?
            .read_to_string(&mut xml)
            .map_err(|e| e.to_string())?;
        Ok(docx_paragraphs(&xml).join("\n"))
    }
}

/// Reads the file verbatim as UTF-8.
pub struct PlainTextReader;

impl DocumentReader for PlainTextReader {
    fn read(&self, path: &Path) -> Result<String, String> {
        std::fs::read_to_string(path).map_err(|e| e.to_string())
    }
}

/// Dispatches a file path to the reader registered for its extension.
pub struct DocumentExtractor {
    readers: HashMap<DocumentFormat, Box<dyn DocumentReader>>,
}

impl DocumentExtractor {
    pub fn empty() -> Self {
        Self {
            readers: HashMap::new(),
        }
    }

    pub fn with_reader(mut self, format: DocumentFormat, reader: Box<dyn DocumentReader>) -> Self {
        self.readers.insert(format, reader);
        self
    }

    pub fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let unsupported = || ExtractError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{}", e.to_ascii_lowercase()))
                .unwrap_or_default(),
        };

        let format = DocumentFormat::from_path(path).ok_or_else(unsupported)?;
        let reader = self.readers.get(&format).ok_or_else(unsupported)?;

        reader.read(path).map_err(|reason| ExtractError::ReadError {
            format,
            path: path.display().to_string(),
            reason,
        })
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::empty()
            .with_reader(DocumentFormat::Pdf, Box::new(PdfReader))
            .with_reader(DocumentFormat::Docx, Box::new(DocxReader))
            .with_reader(DocumentFormat::Txt, Box::new(PlainTextReader))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DOCX body parsing
// ────────────────────────────────────────────────────────────────────────────

// Paragraph open, self-closing and close tags. `<w:pPr>` and friends never match.
static PARAGRAPH_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:p(?:\s[^>]*)?/?>|</w:p>").expect("paragraph tag pattern should compile")
});

static RUN_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab\s*/>|<w:(?:br|cr)(?:\s[^>]*)?/>")
        .expect("run content pattern should compile")
});

/// Top-level paragraphs in document order. Paragraphs nested inside another one (text boxes)
/// are read as part of their outer paragraph.
fn docx_paragraphs(xml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut depth = 0usize;
    let mut body_start = 0;

    for tag in PARAGRAPH_TAG.find_iter(xml) {
        let raw = tag.as_str();
        if raw.starts_with("</") {
            if depth == 1 {
                paragraphs.push(paragraph_text(&xml[body_start..tag.start()]));
            }
            depth = depth.saturating_sub(1);
        } else if raw.ends_with("/>") {
            if depth == 0 {
                paragraphs.push(String::new());
            }
        } else {
            if depth == 0 {
                body_start = tag.end();
            }
            depth += 1;
        }
    }
    paragraphs
}

fn paragraph_text(body: &str) -> String {
    let mut text = String::new();
    for cap in RUN_CONTENT.captures_iter(body) {
        match cap.get(1) {
            Some(t) => text.push_str(&unescape_xml(t.as_str())),
            None if cap[0].starts_with("<w:tab") => text.push('\t'),
            None => text.push('\n'),
        }
    }
    text
}

fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..=semi]),
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    out
}
