//! Content matching between a fetched page and a reference's metadata.
//!
//! Pages exposing `citation_title` / `citation_author` meta tags (the
//! convention used by citation-management tools) are matched against the
//! structured values; everything else falls back to the page's plain text.
//! Malformed content never aborts validation: it scores zero.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use unicode_normalization::UnicodeNormalization;

use crate::{AuthorMatch, ContentMatch, Reference};

/// Full-string similarity threshold above which a cited author and a
/// `citation_author` tag value count as the same person.
const AUTHOR_MATCH_THRESHOLD: f64 = 0.80;

static CITATION_TITLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="citation_title"]"#).unwrap());
static CITATION_AUTHOR_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="citation_author"]"#).unwrap());

/// Normalize text for fuzzy comparison: NFKD-decompose, strip to ASCII,
/// lowercase, and collapse whitespace.
pub(crate) fn normalize_for_match(text: &str) -> String {
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    let ascii: String = text.nfkd().filter(|c| c.is_ascii()).collect();
    WS_RE
        .replace_all(&ascii, " ")
        .trim()
        .to_lowercase()
}

/// Fuzzy partial-similarity between two strings, scaled to 0-100.
pub fn partial_score(needle: &str, haystack: &str) -> u32 {
    let a = normalize_for_match(needle);
    let b = normalize_for_match(haystack);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    (rapidfuzz::fuzz::partial_ratio(a.chars(), b.chars()) * 100.0).round() as u32
}

/// Whether two author names are the same, per full-string fuzzy similarity.
fn author_matches(ref_author: &str, found_author: &str) -> bool {
    let a = normalize_for_match(ref_author);
    let b = normalize_for_match(found_author);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) > AUTHOR_MATCH_THRESHOLD
}

/// The surname part of an author name: text before the first comma, or the
/// first whitespace-delimited token.
pub(crate) fn surname_of(author: &str) -> &str {
    if let Some((last, _)) = author.split_once(',') {
        last.trim()
    } else {
        author.split_whitespace().next().unwrap_or("")
    }
}

/// Score a fetched page body against a reference.
///
/// Title: partial-similarity against the `citation_title` tag if present,
/// otherwise against the full page text. Authors: fuzzy full-string matching
/// against `citation_author` tags (first match wins per cited author), or
/// case-insensitive surname substring search in the page text when no tags
/// exist.
pub fn match_content(body: &str, reference: &Reference, url: &str, final_url: &str) -> ContentMatch {
    let mut result = ContentMatch {
        url: url.to_string(),
        final_url: final_url.to_string(),
        ..ContentMatch::default()
    };

    let document = Html::parse_document(body);

    let meta_title: Option<String> = document
        .select(&CITATION_TITLE_SEL)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(str::to_string);
    let meta_authors: Vec<String> = document
        .select(&CITATION_AUTHOR_SEL)
        .filter_map(|m| m.value().attr("content"))
        .map(str::to_string)
        .collect();

    let page_text: String = document.root_element().text().collect::<Vec<_>>().join(" ");

    if let Some(ref title) = reference.title {
        result.title_match = match meta_title {
            Some(ref meta) => partial_score(title, meta),
            None => partial_score(title, &page_text),
        };
    }

    if !meta_authors.is_empty() {
        for ref_author in &reference.authors {
            if let Some(found) = meta_authors.iter().find(|a| author_matches(ref_author, a)) {
                result.authors_found += 1;
                result.author_matches.push(AuthorMatch {
                    reference_author: ref_author.clone(),
                    found_author: found.clone(),
                });
            }
        }
    } else {
        let page_lower = normalize_for_match(&page_text);
        for ref_author in &reference.authors {
            let surname = normalize_for_match(surname_of(ref_author));
            if !surname.is_empty() && page_lower.contains(&surname) {
                result.authors_found += 1;
                result.author_matches.push(AuthorMatch {
                    reference_author: ref_author.clone(),
                    found_author: surname_of(ref_author).to_string(),
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_with(title: &str, authors: &[&str]) -> Reference {
        let mut r = Reference::new("raw");
        r.title = Some(title.to_string());
        for a in authors {
            r.add_author(a.to_string());
        }
        r
    }

    #[test]
    fn test_title_match_from_meta_tag() {
        let body = r#"<html><head>
            <meta name="citation_title" content="Deep Learning Survey">
            </head><body>Unrelated body text.</body></html>"#;
        let reference = reference_with("Deep Learning Survey", &[]);
        let m = match_content(body, &reference, "u", "u");
        assert_eq!(m.title_match, 100);
    }

    #[test]
    fn test_title_match_from_page_text() {
        let body = "<html><body>We present the Deep Learning Survey, a study of...</body></html>";
        let reference = reference_with("Deep Learning Survey", &[]);
        let m = match_content(body, &reference, "u", "u");
        assert_eq!(m.title_match, 100);
    }

    #[test]
    fn test_title_mismatch_scores_low() {
        let body = r#"<html><head>
            <meta name="citation_title" content="Completely Unrelated Chemistry Paper">
            </head></html>"#;
        let reference = reference_with("Deep Learning Survey", &[]);
        let m = match_content(body, &reference, "u", "u");
        assert!(m.title_match < 60, "got {}", m.title_match);
    }

    #[test]
    fn test_authors_from_meta_tags_first_match_wins() {
        let body = r#"<html><head>
            <meta name="citation_author" content="Smith, J. A.">
            <meta name="citation_author" content="Jones, B.">
            </head></html>"#;
        let reference = reference_with("T", &["Smith, J. A.", "Doe, X."]);
        let m = match_content(body, &reference, "u", "u");
        assert_eq!(m.authors_found, 1);
        assert_eq!(m.author_matches[0].reference_author, "Smith, J. A.");
        assert_eq!(m.author_matches[0].found_author, "Smith, J. A.");
    }

    #[test]
    fn test_authors_surname_substring_without_tags() {
        let body = "<html><body>A paper by Smith and colleagues at Example University.</body></html>";
        let reference = reference_with("T", &["Smith, J. A."]);
        let m = match_content(body, &reference, "u", "u");
        assert_eq!(m.authors_found, 1);
        assert_eq!(m.author_matches[0].found_author, "Smith");
    }

    #[test]
    fn test_malformed_body_scores_zero() {
        let body = "<<<%%% not even close to html &&&";
        let reference = reference_with("Deep Learning Survey", &["Smith, J."]);
        let m = match_content(body, &reference, "u", "u");
        // html5ever is error-tolerant; garbage input must yield zero counts,
        // not a panic or an error.
        assert_eq!(m.authors_found, 0);
        assert!(m.author_matches.is_empty());
    }

    #[test]
    fn test_empty_reference_scores_zero() {
        let reference = Reference::new("raw");
        let m = match_content("<html><body>text</body></html>", &reference, "u", "u");
        assert_eq!(m.title_match, 0);
        assert_eq!(m.authors_found, 0);
    }

    #[test]
    fn test_surname_of_comma_form() {
        assert_eq!(surname_of("Smith, J. A."), "Smith");
    }

    #[test]
    fn test_surname_of_space_form() {
        assert_eq!(surname_of("Jane Smith"), "Jane");
    }

    #[test]
    fn test_normalize_strips_accents_and_case() {
        assert_eq!(normalize_for_match("Rényi  DIVERGENCE"), "renyi divergence");
    }

    #[test]
    fn test_author_matches_fuzzy() {
        assert!(author_matches("Smith, J. A.", "Smith, J.A."));
        assert!(!author_matches("Smith, J. A.", "Nakamura, K."));
    }
}
