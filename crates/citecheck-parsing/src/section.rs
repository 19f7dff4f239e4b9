use once_cell::sync::Lazy;
use regex::Regex;

/// Entries this short (or shorter) after trimming are discarded as noise.
pub const MIN_ENTRY_CHARS: usize = 20;

/// Numbering-marker grammar for splitting a references section, tried in
/// fixed priority order. The first grammar producing at least one entry is
/// used exclusively; grammars are never merged within one segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationStrategy {
    /// `[1]`, `[2]`, ...
    Bracketed,
    /// `1.`, `2.`, ... at the start of a line.
    Numbered,
    /// `(1)`, `(2)`, ... at the start of a line.
    Parenthesized,
}

impl SegmentationStrategy {
    /// All strategies in priority order.
    pub const ALL: [SegmentationStrategy; 3] = [
        SegmentationStrategy::Bracketed,
        SegmentationStrategy::Numbered,
        SegmentationStrategy::Parenthesized,
    ];

    fn marker_re(&self) -> &'static Regex {
        // Markers are capped at 3 digits so years like [2020] or "2020."
        // never act as entry boundaries.
        static BRACKETED: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?:^|\s)\[(\d{1,3})\]\s*").unwrap());
        static NUMBERED: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?m)^\s*(\d{1,3})\.\s+").unwrap());
        static PARENTHESIZED: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?m)^\s*\((\d{1,3})\)\s*").unwrap());
        match self {
            Self::Bracketed => &BRACKETED,
            Self::Numbered => &NUMBERED,
            Self::Parenthesized => &PARENTHESIZED,
        }
    }

    /// Split `text` at this grammar's markers.
    ///
    /// Non-empty text before the first marker becomes the first entry.
    /// Returns `None` when the grammar produces no entries, so the next
    /// grammar in priority order gets its turn.
    pub fn attempt(&self, text: &str) -> Option<Vec<String>> {
        let re = self.marker_re();
        let matches: Vec<_> = re.find_iter(text).collect();
        if matches.is_empty() {
            return None;
        }

        let mut entries = Vec::new();

        let leading = text[..matches[0].start()].trim();
        if !leading.is_empty() {
            entries.push(leading.to_string());
        }

        for i in 0..matches.len() {
            let start = matches[i].end();
            let end = if i + 1 < matches.len() {
                matches[i + 1].start()
            } else {
                text.len()
            };
            let content = text[start..end].trim();
            if !content.is_empty() {
                entries.push(content.to_string());
            }
        }

        if entries.is_empty() { None } else { Some(entries) }
    }
}

static SECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Heading followed by content up to the first blank line (or end).
        Regex::new(r"(?is)(?:references|bibliography)\s*\n(.*?)(?:\n\s*\n|\z)").unwrap(),
        // Heading followed by content up to an appendix marker (or end).
        Regex::new(r"(?is)(?:references|bibliography)\s*(.*?)(?:\n\s*appendix|\z)").unwrap(),
    ]
});

/// Locate the references section in the document text.
///
/// Tries the heading patterns in priority order and returns the content of
/// the first one that matches non-trivially. `None` means no section was
/// found, which is terminal for the job.
pub fn find_references_section(text: &str) -> Option<String> {
    for re in SECTION_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            let section = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            if !section.trim().is_empty() {
                return Some(section.to_string());
            }
        }
    }
    None
}

/// A line starting like "Surname, I.", which forces a new entry mid-paragraph.
static AUTHOR_COMMA_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+,\s*[A-Z]").unwrap());

/// A line starting with two capitalized words.
static AUTHOR_CAPS_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+\s+[A-Z]").unwrap());

/// Fallback segmentation when no numbering grammar matches: paragraphs
/// delimited by blank lines, with a new entry forced whenever a line looks
/// like the start of an author name.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                entries.push(std::mem::take(&mut current));
            }
        } else if !current.is_empty()
            && (AUTHOR_COMMA_START.is_match(line) || AUTHOR_CAPS_START.is_match(line))
        {
            entries.push(std::mem::take(&mut current));
            current.push_str(line);
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        entries.push(current);
    }

    entries
}

/// Split a references section into individual entry strings.
///
/// Grammars from [`SegmentationStrategy::ALL`] are tried in priority order;
/// the first that yields entries wins. Otherwise the paragraph fallback
/// runs. Entries of [`MIN_ENTRY_CHARS`] characters or fewer are discarded.
pub fn segment_references(section: &str) -> Vec<String> {
    let raw = SegmentationStrategy::ALL
        .iter()
        .find_map(|strategy| strategy.attempt(section))
        .unwrap_or_else(|| split_paragraphs(section));

    raw.into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| e.chars().count() > MIN_ENTRY_CHARS)
        .collect()
}
