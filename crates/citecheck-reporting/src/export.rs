use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use citecheck_core::Reference;
use serde::Serialize;

/// Output format for a validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
    Markdown,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "txt",
            Self::Markdown => "md",
        }
    }
}

/// Export finished references to the given path.
pub fn export_results(
    refs: &[Reference],
    format: ExportFormat,
    path: &Path,
) -> Result<(), String> {
    let content = match format {
        ExportFormat::Json => export_json(refs),
        ExportFormat::Text => export_text(refs),
        ExportFormat::Markdown => export_markdown(refs),
    };

    let mut file =
        std::fs::File::create(path).map_err(|e| format!("Failed to create file: {e}"))?;
    file.write_all(content.as_bytes())
        .map_err(|e| format!("Failed to write: {e}"))?;
    Ok(())
}

#[derive(Serialize)]
struct NumberedReference<'a> {
    number: usize,
    #[serde(flatten)]
    reference: &'a Reference,
}

/// JSON report: an array of numbered reference records.
pub fn export_json(refs: &[Reference]) -> String {
    let numbered: Vec<NumberedReference<'_>> = refs
        .iter()
        .enumerate()
        .map(|(i, reference)| NumberedReference {
            number: i + 1,
            reference,
        })
        .collect();
    serde_json::to_string_pretty(&numbered).unwrap_or_else(|_| "[]".to_string())
}

fn summary_counts(refs: &[Reference]) -> (usize, usize) {
    let total = refs.len();
    let accessible = refs.iter().filter(|r| r.is_accessible).count();
    (total, accessible)
}

/// Human-readable text report.
pub fn export_text(refs: &[Reference]) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);
    let (total, accessible) = summary_counts(refs);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "REFERENCE VALIDATION REPORT");
    let _ = writeln!(out, "{rule}\n");
    let _ = writeln!(out, "Total References: {total}");
    let _ = writeln!(out, "Accessible: {accessible}");
    let _ = writeln!(out, "Inaccessible: {}", total - accessible);
    let _ = writeln!(out, "\n{rule}\n");

    for (i, r) in refs.iter().enumerate() {
        let _ = writeln!(out, "[{}] {}\n", i + 1, "=".repeat(75));

        if !r.authors.is_empty() {
            let _ = writeln!(out, "AUTHORS:");
            for author in &r.authors {
                let _ = writeln!(out, "  - {author}");
            }
            let _ = writeln!(out);
        }
        if let Some(ref title) = r.title {
            let _ = writeln!(out, "TITLE:\n  {title}\n");
        }
        if let Some(ref year) = r.year {
            let _ = writeln!(out, "YEAR: {year}\n");
        }
        if let Some(ref doi) = r.doi {
            let _ = writeln!(out, "DOI: {doi}\n");
        }
        if !r.urls.is_empty() {
            let _ = writeln!(out, "URLs:");
            for url in &r.urls {
                let _ = writeln!(out, "  - {url}");
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "VALIDATION RESULTS:");
        if let Some(ref check) = r.url_check {
            if !check.accessible_urls.is_empty() {
                let _ = writeln!(out, "  [OK] Accessible URLs:");
                for url in &check.accessible_urls {
                    let _ = writeln!(out, "    - {url}");
                }
            }
            if !check.inaccessible_urls.is_empty() {
                let _ = writeln!(out, "  [X] Inaccessible URLs:");
                for inaccessible in &check.inaccessible_urls {
                    let _ = writeln!(
                        out,
                        "    - {} ({})",
                        inaccessible.url, inaccessible.reason
                    );
                }
            }
            if !check.match_results.is_empty() {
                let _ = writeln!(out, "  Content Matching:");
                for m in &check.match_results {
                    let _ = writeln!(out, "    URL: {}", m.url);
                    let _ = writeln!(out, "    Title Match: {}%", m.title_match);
                    let _ = writeln!(out, "    Authors Found: {}", m.authors_found);
                    for pair in &m.author_matches {
                        let _ = writeln!(
                            out,
                            "      - {} -> {}",
                            pair.reference_author, pair.found_author
                        );
                    }
                }
            }
        } else {
            let _ = writeln!(out, "  No validation performed");
        }

        if let Some(ref search) = r.search {
            if search.search_performed {
                let _ = writeln!(out, "\nWEB SEARCH RESULTS:");
                let _ = writeln!(
                    out,
                    "  Search Query: {}",
                    search.query.as_deref().unwrap_or("N/A")
                );
                if let Some(ref best) = search.best_match {
                    let _ = writeln!(out, "\n  [BEST MATCH] Score: {}%", best.match_score);
                    let _ = writeln!(out, "    URL: {}", best.url);
                    let _ = writeln!(out, "    Title: {}", best.title);
                }
                if !search.results.is_empty() {
                    let _ = writeln!(out, "\n  All Search Results ({}):", search.results.len());
                    for result in &search.results {
                        let _ = writeln!(
                            out,
                            "    [{}] Score: {}%  {}",
                            result.rank, result.match_score, result.url
                        );
                    }
                }
                if let Some(ref error) = search.error {
                    let _ = writeln!(out, "  Search Error: {error}");
                }
            }
        }

        let _ = writeln!(out, "\n{}", "-".repeat(80));
        let _ = writeln!(out, "RAW TEXT:\n{}", r.raw_text);
        let _ = writeln!(out, "{}\n\n", "-".repeat(80));
    }

    out
}

/// Markdown report: summary header plus one section per reference.
pub fn export_markdown(refs: &[Reference]) -> String {
    let mut out = String::new();
    let (total, accessible) = summary_counts(refs);

    let _ = writeln!(out, "# Reference Validation Report\n");
    let _ = writeln!(out, "| Total | Accessible | Inaccessible |");
    let _ = writeln!(out, "|---|---|---|");
    let _ = writeln!(out, "| {total} | {accessible} | {} |\n", total - accessible);

    for (i, r) in refs.iter().enumerate() {
        let title = r.title.as_deref().unwrap_or("(no title)");
        let _ = writeln!(out, "## [{}] {title}\n", i + 1);
        if !r.authors.is_empty() {
            let _ = writeln!(out, "- **Authors**: {}", r.authors.join("; "));
        }
        if let Some(ref year) = r.year {
            let _ = writeln!(out, "- **Year**: {year}");
        }
        if let Some(ref doi) = r.doi {
            let _ = writeln!(out, "- **DOI**: `{doi}`");
        }
        for url in &r.urls {
            let _ = writeln!(out, "- <{url}>");
        }
        let _ = writeln!(
            out,
            "- **Accessible**: {}",
            if r.is_accessible { "yes" } else { "no" }
        );
        if let Some(ref search) = r.search {
            if let Some(ref best) = search.best_match {
                let _ = writeln!(
                    out,
                    "- **Search best match**: {} (score {})",
                    best.url, best.match_score
                );
            }
        }
        let _ = writeln!(out);
    }

    out
}
