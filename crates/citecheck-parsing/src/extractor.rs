use citecheck_core::Reference;

use crate::authors::extract_authors;
use crate::identifiers::{extract_doi, extract_urls, extract_year, strip_links};
use crate::title::extract_title;

/// Derive a structured [`Reference`] from one segmented entry string.
///
/// The passes are independent and order-insensitive from the caller's point
/// of view; any field may legitimately come out empty. The DOI-derived
/// `https://doi.org/` URL is appended first (as the most canonical link),
/// literal URLs after it, all deduplicated uniformly.
pub fn parse_entry(raw: &str) -> Reference {
    let mut reference = Reference::new(raw.trim());

    if let Some(doi) = extract_doi(raw) {
        reference.set_doi(doi);
    }
    for url in extract_urls(raw) {
        reference.add_url(url);
    }
    reference.year = extract_year(raw);

    // Title and author grammars work better without link noise.
    let cleaned = strip_links(raw);
    let author_text = match extract_title(&cleaned) {
        Some(extraction) => {
            reference.title = Some(extraction.title);
            extraction.preceding
        }
        None => cleaned,
    };
    for author in extract_authors(&author_text) {
        reference.add_author(author);
    }

    reference
}
