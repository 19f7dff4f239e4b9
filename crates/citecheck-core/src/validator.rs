//! Sequential URL probing with a fixed inter-request delay.
//!
//! Requests are never issued concurrently: the configured delay elapses
//! before every GET, across URLs within a reference and across references
//! within a job. This is a rate-limiting contract toward remote hosts, not
//! a performance shortcut. There are no retries; failures are recorded and
//! the pipeline moves on.

use crate::matching::match_content;
use crate::search::search_reference;
use crate::{
    Config, CoreError, InaccessibleUrl, ProgressEvent, Reference, UrlCheckResult,
};
use tokio_util::sync::CancellationToken;

/// Probes a reference's URLs for reachability and content agreement.
pub struct UrlValidator {
    client: reqwest::Client,
    config: Config,
}

impl UrlValidator {
    /// Build a validator with a client using the configured connect timeout
    /// and a read timeout of twice that, following redirects.
    pub fn new(config: Config) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    /// Check every URL of one reference, sequentially, mutating it in place.
    ///
    /// 2xx responses are recorded as accessible and content-matched; any
    /// other status, timeout, or transport failure is recorded as
    /// inaccessible with a reason. References without URLs go to the search
    /// fallback instead (when enabled), leaving `url_check` unset.
    /// Cancellation is only observed between requests.
    pub async fn check_reference(
        &self,
        reference: &mut Reference,
        index: usize,
        total: usize,
        progress: &(dyn Fn(ProgressEvent) + Send + Sync),
        cancel: &CancellationToken,
    ) {
        if reference.urls.is_empty() {
            if self.config.enable_search {
                let outcome =
                    search_reference(&self.client, &self.config, reference, index, total, progress)
                        .await;
                reference.search = Some(outcome);
            }
            return;
        }

        let mut result = UrlCheckResult::default();
        let urls = reference.urls.clone();
        for url in urls {
            if cancel.is_cancelled() {
                break;
            }

            // Be respectful to remote hosts: space out every request.
            tokio::time::sleep(self.config.request_delay).await;
            progress(ProgressEvent::CheckingUrl {
                index,
                total,
                url: url.clone(),
            });

            match self.client.get(&url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let final_url = resp.url().to_string();
                        let redirected_to =
                            (final_url != url).then(|| final_url.clone());
                        // A body that fails to arrive is malformed content,
                        // not an inaccessible URL: the status already said 2xx.
                        let body = resp.text().await.unwrap_or_default();
                        let content_match =
                            match_content(&body, reference, &url, &final_url);

                        result.accessible_urls.push(url.clone());
                        result.match_results.push(content_match);
                        reference.is_accessible = true;

                        progress(ProgressEvent::UrlChecked {
                            index,
                            total,
                            url,
                            accessible: true,
                            status: Some(status.as_u16()),
                            redirected_to,
                        });
                    } else {
                        tracing::debug!(%url, status = status.as_u16(), "URL not accessible");
                        result.inaccessible_urls.push(InaccessibleUrl {
                            url: url.clone(),
                            reason: format!("HTTP {}", status.as_u16()),
                            status_code: Some(status.as_u16()),
                        });
                        progress(ProgressEvent::UrlChecked {
                            index,
                            total,
                            url,
                            accessible: false,
                            status: Some(status.as_u16()),
                            redirected_to: None,
                        });
                    }
                }
                Err(e) => {
                    let reason = if e.is_timeout() {
                        "Timeout".to_string()
                    } else {
                        e.to_string()
                    };
                    tracing::debug!(%url, %reason, "URL check failed");
                    result.inaccessible_urls.push(InaccessibleUrl {
                        url: url.clone(),
                        reason,
                        status_code: None,
                    });
                    progress(ProgressEvent::UrlChecked {
                        index,
                        total,
                        url,
                        accessible: false,
                        status: None,
                        redirected_to: None,
                    });
                }
            }
        }

        reference.url_check = Some(result);
    }
}
