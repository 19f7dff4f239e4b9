//! Web search fallback for references without URLs.
//!
//! Queries an HTML search endpoint (DuckDuckGo-compatible form POST) and
//! ranks the returned results by weighted similarity to the reference's
//! metadata. This is a weaker signal than probing a cited URL: the best
//! match is only the highest-scoring candidate among those examined, never
//! a guarantee that it is the reference's actual source.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::matching::{partial_score, surname_of};
use crate::{Config, ProgressEvent, RankedResult, Reference, SearchOutcome};

/// Maximum number of search results examined per query.
const MAX_RESULTS: usize = 5;

/// How many characters of the title go into the query.
const QUERY_TITLE_LIMIT: usize = 100;

/// How many leading authors are checked for a surname bonus.
const AUTHOR_BONUS_DEPTH: usize = 3;

static RESULT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.result").unwrap());
static RESULT_TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result__a").unwrap());
static RESULT_SNIPPET_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__snippet").unwrap());

/// Build a search query from whatever metadata the reference has:
/// title (truncated), first author, year, space-joined, missing fields
/// skipped. Returns `None` when there is nothing to search by.
pub fn build_query(reference: &Reference) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(ref title) = reference.title {
        parts.push(title.chars().take(QUERY_TITLE_LIMIT).collect());
    }
    if let Some(first_author) = reference.authors.first() {
        parts.push(first_author.clone());
    }
    if let Some(ref year) = reference.year {
        parts.push(year.clone());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// One raw result parsed out of the provider's HTML.
#[derive(Debug, Clone)]
struct RawResult {
    title: String,
    url: String,
    snippet: String,
}

fn parse_search_results(body: &str) -> Vec<RawResult> {
    let document = Html::parse_document(body);
    let mut results = Vec::new();
    for div in document.select(&RESULT_SEL).take(MAX_RESULTS) {
        let Some(anchor) = div.select(&RESULT_TITLE_SEL).next() else {
            continue;
        };
        let title = anchor.text().collect::<String>().trim().to_string();
        let url = anchor.value().attr("href").unwrap_or("").to_string();
        let snippet = div
            .select(&RESULT_SNIPPET_SEL)
            .next()
            .map(|s| s.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        results.push(RawResult {
            title,
            url,
            snippet,
        });
    }
    results
}

/// Combine the contributing score components into a final match score.
///
/// Weighted sum divided by the number of contributing components (no upper
/// clamp): a title match counts double, a snippet match single, an author
/// surname in the snippet adds a flat 70, the year in the snippet a flat 50.
fn combine_components(
    title_match: Option<u32>,
    snippet_match: Option<u32>,
    author_in_snippet: bool,
    year_in_snippet: bool,
) -> u32 {
    let mut sum: u32 = 0;
    let mut count: u32 = 0;
    if let Some(t) = title_match {
        sum += t * 2;
        count += 1;
    }
    if let Some(s) = snippet_match {
        sum += s;
        count += 1;
    }
    if author_in_snippet {
        sum += 70;
        count += 1;
    }
    if year_in_snippet {
        sum += 50;
        count += 1;
    }
    if count == 0 { 0 } else { sum / count }
}

/// Score one search result against the reference's metadata.
fn score_result(result: &RawResult, reference: &Reference) -> u32 {
    let title_match = match reference.title {
        Some(ref title) if !result.title.is_empty() => Some(partial_score(title, &result.title)),
        _ => None,
    };
    let snippet_match = match reference.title {
        Some(ref title) if !result.snippet.is_empty() => {
            Some(partial_score(title, &result.snippet))
        }
        _ => None,
    };

    let snippet_lower = result.snippet.to_lowercase();
    let author_in_snippet = !result.snippet.is_empty()
        && reference
            .authors
            .iter()
            .take(AUTHOR_BONUS_DEPTH)
            .map(|a| surname_of(a).to_lowercase())
            .any(|surname| !surname.is_empty() && snippet_lower.contains(&surname));

    let year_in_snippet = reference
        .year
        .as_ref()
        .is_some_and(|year| result.snippet.contains(year.as_str()));

    combine_components(title_match, snippet_match, author_in_snippet, year_in_snippet)
}

/// Run the search fallback for one reference.
///
/// Sleeps the configured delay, issues a single form POST to the search
/// endpoint, scores up to [`MAX_RESULTS`] results, and returns the outcome.
/// Provider failures are recorded in the outcome, never propagated.
pub(crate) async fn search_reference(
    client: &reqwest::Client,
    config: &Config,
    reference: &Reference,
    index: usize,
    total: usize,
    progress: &(dyn Fn(ProgressEvent) + Send + Sync),
) -> SearchOutcome {
    let Some(query) = build_query(reference) else {
        return SearchOutcome {
            search_performed: false,
            reason: Some("insufficient_info".into()),
            ..SearchOutcome::default()
        };
    };

    tokio::time::sleep(config.request_delay).await;
    progress(ProgressEvent::Searching {
        index,
        total,
        query: query.clone(),
    });

    let raw = match fetch_results(client, config, &query).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(error = %e, "search provider request failed");
            return SearchOutcome {
                search_performed: true,
                query: Some(query),
                error: Some(e.to_string()),
                ..SearchOutcome::default()
            };
        }
    };

    let results: Vec<RankedResult> = raw
        .iter()
        .enumerate()
        .map(|(i, r)| RankedResult {
            rank: i + 1,
            url: r.url.clone(),
            title: r.title.clone(),
            snippet: r.snippet.clone(),
            match_score: score_result(r, reference),
        })
        .collect();

    // Max score wins; strict comparison keeps the earliest rank on ties.
    let best_match = results
        .iter()
        .fold(None::<&RankedResult>, |best, r| match best {
            Some(b) if b.match_score >= r.match_score => Some(b),
            _ => Some(r),
        })
        .cloned();

    progress(ProgressEvent::SearchComplete {
        index,
        total,
        results: results.len(),
        best_score: best_match.as_ref().map(|b| b.match_score),
    });

    SearchOutcome {
        search_performed: true,
        query: Some(query),
        results,
        best_match,
        ..SearchOutcome::default()
    }
}

async fn fetch_results(
    client: &reqwest::Client,
    config: &Config,
    query: &str,
) -> Result<Vec<RawResult>, reqwest::Error> {
    let resp = client
        .post(&config.search_url)
        .form(&[("q", query)])
        .send()
        .await?;
    if !resp.status().is_success() {
        // Provider refused the query; treated as "no results", not an error.
        return Ok(Vec::new());
    }
    let body = resp.text().await?;
    Ok(parse_search_results(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(title: Option<&str>, authors: &[&str], year: Option<&str>) -> Reference {
        let mut r = Reference::new("raw");
        r.title = title.map(str::to_string);
        for a in authors {
            r.add_author(a.to_string());
        }
        r.year = year.map(str::to_string);
        r
    }

    #[test]
    fn test_build_query_title_only() {
        let r = reference(Some("A Study of X"), &[], None);
        assert_eq!(build_query(&r).as_deref(), Some("A Study of X"));
    }

    #[test]
    fn test_build_query_all_fields_space_joined() {
        let r = reference(Some("A Study of X"), &["Smith, J."], Some("2020"));
        assert_eq!(
            build_query(&r).as_deref(),
            Some("A Study of X Smith, J. 2020")
        );
    }

    #[test]
    fn test_build_query_skips_missing_fields() {
        let r = reference(None, &["Smith, J."], Some("2020"));
        assert_eq!(build_query(&r).as_deref(), Some("Smith, J. 2020"));
    }

    #[test]
    fn test_build_query_truncates_title() {
        let long = "x".repeat(250);
        let r = reference(Some(&long), &[], None);
        assert_eq!(build_query(&r).map(|q| q.len()), Some(QUERY_TITLE_LIMIT));
    }

    #[test]
    fn test_build_query_empty_reference() {
        assert_eq!(build_query(&Reference::new("raw")), None);
    }

    #[test]
    fn test_combine_title_and_snippet() {
        // 80*2 + 40 = 200 over 2 components -> 100
        assert_eq!(combine_components(Some(80), Some(40), false, false), 100);
    }

    #[test]
    fn test_combine_unclamped_with_author_bonus() {
        // 80*2 + 70 = 230 over 2 components -> 115
        assert_eq!(combine_components(Some(80), None, true, false), 115);
    }

    #[test]
    fn test_combine_no_components() {
        assert_eq!(combine_components(None, None, false, false), 0);
    }

    #[test]
    fn test_combine_year_only() {
        assert_eq!(combine_components(None, None, false, true), 50);
    }

    #[test]
    fn test_score_result_author_and_year_bonus() {
        let r = reference(None, &["Smith, J.", "Doe, A."], Some("2020"));
        let raw = RawResult {
            title: String::new(),
            url: "u".into(),
            snippet: "A 2020 paper by Smith on things.".into(),
        };
        // author (70) + year (50) = 120 over 2 -> 60
        assert_eq!(score_result(&raw, &r), 60);
    }

    #[test]
    fn test_score_result_author_bonus_limited_to_first_three() {
        let r = reference(None, &["Aaa, A.", "Bbb, B.", "Ccc, C.", "Ddd, D."], None);
        let raw = RawResult {
            title: String::new(),
            url: "u".into(),
            snippet: "mentions only Ddd here".into(),
        };
        assert_eq!(score_result(&raw, &r), 0);
    }

    #[test]
    fn test_parse_search_results_duckduckgo_html() {
        let body = r#"<html><body>
            <div class="result">
              <a class="result__a" href="https://example.com/a">First Title</a>
              <a class="result__snippet">First snippet text</a>
            </div>
            <div class="result">
              <a class="result__a" href="https://example.com/b">Second Title</a>
            </div>
        </body></html>"#;
        let results = parse_search_results(body);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "First Title");
        assert_eq!(results[0].url, "https://example.com/a");
        assert_eq!(results[0].snippet, "First snippet text");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn test_parse_search_results_caps_at_five() {
        let one = r#"<div class="result"><a class="result__a" href="u">T</a></div>"#;
        let body = format!("<html><body>{}</body></html>", one.repeat(8));
        assert_eq!(parse_search_results(&body).len(), MAX_RESULTS);
    }

    #[test]
    fn test_parse_search_results_empty_page() {
        assert!(parse_search_results("<html><body></body></html>").is_empty());
    }
}
