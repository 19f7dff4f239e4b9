use once_cell::sync::Lazy;
use regex::Regex;

/// DOI with an optional case-insensitive `doi` label.
static DOI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:\bdoi\b[\s:]*)?(10\.\d{4,}(?:\.\d+)*/[^\s,;]+)").unwrap());

/// Bare http(s) URL, excluding whitespace, commas, and closing brackets.
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s,\])]+").unwrap());

/// First 19xx/20xx four-digit token.
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

/// Extract a DOI from reference text.
///
/// Requires `10.` + at least four digits + optional dotted suffix + `/` +
/// a non-whitespace suffix; a leading `doi:` label is accepted but not
/// required. Trailing punctuation is stripped.
pub fn extract_doi(text: &str) -> Option<String> {
    DOI_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';']).to_string())
}

/// Extract all http(s) URLs in order of appearance, trailing punctuation
/// trimmed. Duplicates are not removed here; deduplication happens where
/// the URLs are attached to a reference.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ')']).to_string())
        .filter(|u| !u.is_empty())
        .collect()
}

/// Extract the first plausible publication year (19xx/20xx).
pub fn extract_year(text: &str) -> Option<String> {
    YEAR_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Remove URLs and the DOI (with any label) from an entry, leaving cleaner
/// text for title and author extraction.
pub fn strip_links(text: &str) -> String {
    static DOI_LABELED_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)(?:\bdoi\b[\s:]*)?10\.\d{4,}(?:\.\d+)*/\S+").unwrap());
    let stripped = URL_RE.replace_all(text, "");
    DOI_LABELED_RE.replace_all(&stripped, "").to_string()
}
