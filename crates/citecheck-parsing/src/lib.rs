use thiserror::Error;

pub mod authors;
pub mod extractor;
pub mod identifiers;
pub mod section;
pub mod title;

pub use extractor::parse_entry;
pub use section::{SegmentationStrategy, find_references_section, segment_references};
// Re-export the domain type from core (canonical definitions live there)
pub use citecheck_core::Reference;

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("no references section found")]
    NoReferencesSection,
    #[error("no reference entries found")]
    NoEntries,
}

/// Extract structured references from a document's plain text.
///
/// Pipeline:
/// 1. Locate the References/Bibliography section
/// 2. Segment it into individual entries
/// 3. For each entry, extract DOI, URLs, year, title, and authors
///
/// Both failure cases are terminal for the job: either no section was found
/// or segmentation produced nothing usable.
pub fn extract_references(text: &str) -> Result<Vec<Reference>, ParsingError> {
    let section = find_references_section(text).ok_or(ParsingError::NoReferencesSection)?;
    let entries = segment_references(&section);
    if entries.is_empty() {
        return Err(ParsingError::NoEntries);
    }
    Ok(entries.iter().map(|entry| parse_entry(entry)).collect())
}
