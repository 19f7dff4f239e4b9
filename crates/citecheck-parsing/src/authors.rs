use once_cell::sync::Lazy;
use regex::Regex;

use citecheck_core::MAX_AUTHORS;

/// `Last, I. I.`: surname (possibly multi-word), comma, dotted initials.
static LAST_COMMA_INITIALS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*),\s*([A-Z]\.(?:\s*[A-Z]\.)*)").unwrap()
});

/// `Last I. I.`: surname directly followed by dotted initials.
static LAST_INITIALS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\s+([A-Z]\.(?:\s*[A-Z]\.)*)").unwrap()
});

/// Separators for the `and`/`&` heuristic.
static AND_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+and\s+|\s*&\s*").unwrap());

/// A token that plausibly starts a name: capitalized word.
static NAME_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]+").unwrap());

/// Candidates that differ only in trailing punctuation are the same author.
fn dedup_key(name: &str) -> String {
    name.trim_end_matches(['.', ',']).trim_end().to_string()
}

/// Extract author names from the text preceding a reference's title.
///
/// Two name grammars (`Last, I.` and `Last I.`) plus an `and`/`&`-split
/// heuristic; all candidates are merged, deduplicated, and truncated to the
/// first [`MAX_AUTHORS`]. An empty result is valid.
pub fn extract_authors(author_text: &str) -> Vec<String> {
    let mut authors: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    let mut push = |name: String, authors: &mut Vec<String>, seen: &mut Vec<String>| {
        let key = dedup_key(&name);
        if key.is_empty() || seen.iter().any(|k| k == &key) {
            return;
        }
        seen.push(key);
        authors.push(name);
    };

    for re in [&*LAST_COMMA_INITIALS_RE, &*LAST_INITIALS_RE] {
        for caps in re.captures_iter(author_text) {
            let name = format!("{}, {}", &caps[1], &caps[2]);
            push(name, &mut authors, &mut seen);
        }
    }

    for part in AND_SPLIT_RE.split(author_text) {
        let part = part.trim().trim_end_matches([',', '.']).trim_end();
        if part.chars().count() > 3 && NAME_START_RE.is_match(part) {
            push(part.to_string(), &mut authors, &mut seen);
        }
    }

    authors.truncate(MAX_AUTHORS);
    authors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_comma_initials() {
        let authors = extract_authors("Smith, J. A. ");
        assert_eq!(authors, vec!["Smith, J. A."]);
    }

    #[test]
    fn test_multiple_comma_form_authors() {
        let authors = extract_authors("Smith, J., Jones, B. ");
        assert!(authors.contains(&"Smith, J.".to_string()));
        assert!(authors.contains(&"Jones, B.".to_string()));
    }

    #[test]
    fn test_last_then_initials_form() {
        let authors = extract_authors("Smith J. M. ");
        assert_eq!(authors[0], "Smith, J. M.");
    }

    #[test]
    fn test_and_split_full_names() {
        let authors = extract_authors("Jane Smith and Bob Jones");
        assert!(authors.contains(&"Jane Smith".to_string()));
        assert!(authors.contains(&"Bob Jones".to_string()));
    }

    #[test]
    fn test_ampersand_split() {
        let authors = extract_authors("Jane Smith & Bob Jones");
        assert!(authors.contains(&"Jane Smith".to_string()));
        assert!(authors.contains(&"Bob Jones".to_string()));
    }

    #[test]
    fn test_grammar_and_heuristic_do_not_duplicate() {
        // The and-split candidate "Smith, J. A" differs from the grammar
        // candidate only by trailing punctuation and must be merged.
        let authors = extract_authors("Smith, J. A. ");
        assert_eq!(authors.len(), 1);
    }

    #[test]
    fn test_short_tokens_rejected() {
        assert!(extract_authors("et al").is_empty());
    }

    #[test]
    fn test_lowercase_tokens_rejected() {
        assert!(extract_authors("some lowercase words and more text").is_empty());
    }

    #[test]
    fn test_truncated_to_max_authors() {
        let many = (0..15u8)
            .map(|i| {
                let c = (b'A' + i) as char;
                format!("{c}aaa, {c}.")
            })
            .collect::<Vec<_>>()
            .join(" ");
        let authors = extract_authors(&many);
        assert_eq!(authors.len(), MAX_AUTHORS);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_authors("").is_empty());
    }
}
