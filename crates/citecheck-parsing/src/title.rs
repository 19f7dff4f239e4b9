use once_cell::sync::Lazy;
use regex::Regex;

/// A detected title together with the text that precedes it, which bounds
/// author extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleExtraction {
    pub title: String,
    pub preceding: String,
}

/// Quotation style recognized as delimiting a title, tried in priority
/// order. The first style that matches wins; styles are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStrategy {
    /// `"Title"`
    DoubleQuoted,
    /// `'Title'`
    SingleQuoted,
    /// `“Title”`
    Typographic,
}

impl TitleStrategy {
    pub const ALL: [TitleStrategy; 3] = [
        TitleStrategy::DoubleQuoted,
        TitleStrategy::SingleQuoted,
        TitleStrategy::Typographic,
    ];

    fn pattern(&self) -> &'static Regex {
        static DOUBLE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).unwrap());
        static SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'([^']+)'").unwrap());
        static TYPOGRAPHIC: Lazy<Regex> =
            Lazy::new(|| Regex::new("\u{201c}([^\u{201c}\u{201d}]+)\u{201d}").unwrap());
        match self {
            Self::DoubleQuoted => &DOUBLE,
            Self::SingleQuoted => &SINGLE,
            Self::Typographic => &TYPOGRAPHIC,
        }
    }

    pub fn attempt(&self, text: &str) -> Option<TitleExtraction> {
        let caps = self.pattern().captures(text)?;
        let whole = caps.get(0)?;
        let title = caps.get(1)?.as_str().trim();
        if title.is_empty() {
            return None;
        }
        Some(TitleExtraction {
            title: title.to_string(),
            preceding: text[..whole.start()].to_string(),
        })
    }
}

/// Minimum clause length for the unquoted-title fallback.
const MIN_CLAUSE_CHARS: usize = 30;

/// An initials run like `A. B` is never a title.
static INITIALS_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]\s*\.\s*[A-Z]").unwrap());

/// Fallback: the longest comma/period-delimited clause longer than
/// [`MIN_CLAUSE_CHARS`] that does not look like an initials run. Earliest
/// clause wins ties.
fn longest_clause(text: &str) -> Option<TitleExtraction> {
    let mut best: Option<(usize, usize, &str)> = None; // (chars, start, trimmed)
    let mut offset = 0;
    for part in text.split(['.', ',']) {
        let trimmed = part.trim();
        let chars = trimmed.chars().count();
        if chars > MIN_CLAUSE_CHARS
            && !INITIALS_RUN_RE.is_match(trimmed)
            && best.map_or(true, |(b, _, _)| chars > b)
        {
            best = Some((chars, offset, trimmed));
        }
        offset += part.len() + 1; // +1 for the single-byte delimiter
    }
    best.map(|(_, start, trimmed)| TitleExtraction {
        title: trimmed.to_string(),
        preceding: text[..start].to_string(),
    })
}

/// Extract a title from an entry whose URLs/DOI have been stripped.
///
/// Quote-pair strategies run first in priority order; entries without a
/// quoted title fall back to the longest plausible clause. `None` is a
/// valid outcome, not an error.
pub fn extract_title(text: &str) -> Option<TitleExtraction> {
    TitleStrategy::ALL
        .iter()
        .find_map(|strategy| strategy.attempt(text))
        .or_else(|| longest_clause(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_quoted_title() {
        let t = extract_title("Smith, J. \"Deep Learning Survey\" 2020.").unwrap();
        assert_eq!(t.title, "Deep Learning Survey");
        assert_eq!(t.preceding, "Smith, J. ");
    }

    #[test]
    fn test_single_quoted_title() {
        let t = extract_title("Jones, B. 'An Unusual Result' 2019.").unwrap();
        assert_eq!(t.title, "An Unusual Result");
    }

    #[test]
    fn test_typographic_quoted_title() {
        let t = extract_title("Lee, C. \u{201c}Curly Quoted Title\u{201d} 2018.").unwrap();
        assert_eq!(t.title, "Curly Quoted Title");
    }

    #[test]
    fn test_double_quotes_win_over_single() {
        let t = extract_title("'early single' then \"The Double Quoted Title\"").unwrap();
        assert_eq!(t.title, "The Double Quoted Title");
    }

    #[test]
    fn test_clause_fallback_picks_longest() {
        let text = "Smith J, A moderately long clause over thirty chars, \
                    an even longer clause that clearly exceeds the first one in length, 2020";
        let t = extract_title(text).unwrap();
        assert_eq!(
            t.title,
            "an even longer clause that clearly exceeds the first one in length"
        );
    }

    #[test]
    fn test_clause_fallback_preceding_text() {
        let text = "Smith J, a sufficiently long unquoted title clause here, Journal";
        let t = extract_title(text).unwrap();
        assert_eq!(t.title, "a sufficiently long unquoted title clause here");
        assert_eq!(t.preceding, "Smith J,");
    }

    #[test]
    fn test_clause_fallback_requires_more_than_thirty_chars() {
        // Exactly 30 characters is not enough.
        let clause = "abcdefghij abcdefghij abcdefgh";
        assert_eq!(clause.chars().count(), 30);
        assert!(extract_title(&format!("Smith J, {clause}, 2020")).is_none());
    }

    #[test]
    fn test_short_clauses_yield_no_title() {
        assert!(extract_title("Short, bits, only, here").is_none());
    }

    #[test]
    fn test_empty_quotes_ignored() {
        assert!(extract_title("Smith, J. \"\" 2020, tiny").is_none());
    }
}
