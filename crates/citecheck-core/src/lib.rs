use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub mod config_file;
pub mod matching;
pub mod search;
pub mod validator;

// Re-export for convenience
pub use search::build_query;
pub use validator::UrlValidator;

/// A single bibliographic reference extracted from a document.
///
/// Created by the extraction pipeline, then mutated in place by
/// [`UrlValidator`] (URL probing + content matching) or the search fallback.
/// One `Reference` is the unit handed to report generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reference {
    /// The reference entry exactly as it appeared in the source text.
    pub raw_text: String,
    /// Up to 10 author names, in order of appearance, deduplicated.
    pub authors: Vec<String>,
    pub title: Option<String>,
    /// Four-digit publication year (19xx/20xx).
    pub year: Option<String>,
    pub doi: Option<String>,
    /// All URLs found in the entry, first-seen order, deduplicated.
    /// Includes the canonical `https://doi.org/<doi>` URL when a DOI is set.
    pub urls: Vec<String>,
    /// True once any URL has been classified accessible.
    pub is_accessible: bool,
    pub url_check: Option<UrlCheckResult>,
    pub search: Option<SearchOutcome>,
}

/// Maximum number of authors kept per reference.
pub const MAX_AUTHORS: usize = 10;

impl Reference {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    /// Append a URL, preserving first-seen order and skipping duplicates.
    pub fn add_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        if !self.urls.iter().any(|u| u == &url) {
            self.urls.push(url);
        }
    }

    /// Set the DOI and append its canonical `https://doi.org/` URL.
    ///
    /// The derived URL goes through the same deduplication as every other
    /// URL source, so a literal `doi.org` link in the entry never produces
    /// a duplicate.
    pub fn set_doi(&mut self, doi: impl Into<String>) {
        let doi = doi.into();
        self.add_url(format!("https://doi.org/{doi}"));
        self.doi = Some(doi);
    }

    /// Append an author, skipping duplicates and capping at [`MAX_AUTHORS`].
    pub fn add_author(&mut self, author: impl Into<String>) {
        let author = author.into();
        if self.authors.len() < MAX_AUTHORS && !self.authors.iter().any(|a| a == &author) {
            self.authors.push(author);
        }
    }
}

/// Accumulated outcome of probing every URL of one reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlCheckResult {
    pub accessible_urls: Vec<String>,
    pub inaccessible_urls: Vec<InaccessibleUrl>,
    pub match_results: Vec<ContentMatch>,
}

/// A URL that could not be fetched, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InaccessibleUrl {
    pub url: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// How well a fetched page matched the reference's metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentMatch {
    pub url: String,
    /// URL after following redirects.
    pub final_url: String,
    /// Fuzzy partial-similarity between the cited title and the page (0-100).
    pub title_match: u32,
    pub authors_found: usize,
    pub author_matches: Vec<AuthorMatch>,
}

/// A cited author paired with the matching name found on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorMatch {
    pub reference_author: String,
    pub found_author: String,
}

/// Outcome of the web search fallback for a reference without URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub search_performed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub results: Vec<RankedResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_match: Option<RankedResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set to `"insufficient_info"` when the reference had nothing to search by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One search result, scored against the reference's metadata.
///
/// `match_score` is the mean of the weighted contributing components and is
/// deliberately unclamped: an author bonus on top of a strong title match can
/// push it past 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub rank: usize,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub match_score: u32,
}

/// Runtime configuration for the validation engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connect timeout for each request; the read timeout is twice this.
    pub connect_timeout: Duration,
    /// Delay slept before every network request.
    pub request_delay: Duration,
    /// Search the web for references that carry no URL.
    pub enable_search: bool,
    pub user_agent: String,
    /// Search provider endpoint (HTML form POST, DuckDuckGo-compatible).
    pub search_url: String,
}

impl Config {
    pub fn read_timeout(&self) -> Duration {
        self.connect_timeout * 2
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_delay: Duration::from_secs(1),
            enable_search: false,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            search_url: "https://html.duckduckgo.com/html/".into(),
        }
    }
}

/// Progress events emitted during validation.
///
/// Callers supply a sink at invocation; the engine never writes progress to
/// an ambient stream.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Started validating one reference.
    Checking { index: usize, total: usize },
    /// About to probe one URL (after the rate-limit sleep).
    CheckingUrl {
        index: usize,
        total: usize,
        url: String,
    },
    /// Finished probing one URL.
    UrlChecked {
        index: usize,
        total: usize,
        url: String,
        accessible: bool,
        status: Option<u16>,
        /// Final URL when the request was redirected.
        redirected_to: Option<String>,
    },
    /// Started the search fallback for a reference without URLs.
    Searching {
        index: usize,
        total: usize,
        query: String,
    },
    /// Search fallback finished.
    SearchComplete {
        index: usize,
        total: usize,
        results: usize,
        best_score: Option<u32>,
    },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Validate a list of references in place.
///
/// Probes each reference's URLs strictly sequentially (the configured delay
/// elapses before every request), runs content matching on accessible pages,
/// and falls back to a web search for references without URLs when search is
/// enabled. Progress events are emitted via the callback. Cancellation is
/// honored between requests, never mid-flight.
pub async fn validate_references(
    refs: &mut [Reference],
    config: &Config,
    progress: impl Fn(ProgressEvent) + Send + Sync,
    cancel: CancellationToken,
) -> Result<(), CoreError> {
    let validator = UrlValidator::new(config.clone())?;
    let total = refs.len();
    for (index, reference) in refs.iter_mut().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        progress(ProgressEvent::Checking { index, total });
        validator
            .check_reference(reference, index, total, &progress, &cancel)
            .await;
    }
    Ok(())
}
