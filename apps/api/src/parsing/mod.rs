//! Resume parsing: document text extraction, section segmentation, and entity extraction.
//! Everything here is synchronous and free of shared mutable state.

pub mod entities;
pub mod extractor;
pub mod ner;
pub mod sections;
