use log::{debug, info, warn};
use serde::Serialize;
use url::Url;

use super::Provider;
use crate::error::{BuildStatsError, Result};
use crate::models::Build;
use crate::transport::Transport;

/// Which builds of a page are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFilter {
    pub branch: Option<String>,
    pub include_pull_requests: bool,
}

impl Default for BuildFilter {
    fn default() -> Self {
        Self {
            branch: None,
            include_pull_requests: true,
        }
    }
}

impl BuildFilter {
    pub fn matches(&self, build: &Build) -> bool {
        let branch_matches = self
            .branch
            .as_deref()
            .map_or(true, |branch| build.branch() == Some(branch));

        branch_matches && (self.include_pull_requests || !build.from_pull_request())
    }
}

/// The project and amount of history to fetch.
#[derive(Debug, Clone)]
pub struct HistoryRequest {
    pub account: String,
    pub project: String,
    pub count: usize,
    pub filter: BuildFilter,
}

/// Why a fetch stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The requested number of builds was collected.
    Fulfilled,
    /// The provider returned an empty or short page.
    ProviderExhausted,
    /// A request failed; the builds collected before it are returned.
    TransportFailed,
    /// The attempt cap was reached before enough builds matched.
    AttemptsExhausted,
}

impl std::fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Fulfilled => "fulfilled",
            Self::ProviderExhausted => "no more builds",
            Self::TransportFailed => "request failed",
            Self::AttemptsExhausted => "attempt limit reached",
        })
    }
}

/// Builds collected by one fetch, most recent first.
#[derive(Debug, Clone)]
pub struct BuildHistory {
    pub builds: Vec<Build>,
    pub outcome: FetchOutcome,
    pub requests: usize,
}

/// Pages through a provider's build history.
pub struct HistoryClient<T> {
    transport: T,
    provider: Provider,
    base_url: String,
}

impl<T: Transport> HistoryClient<T> {
    /// Creates a client for `provider` rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(transport: T, provider: Provider, base_url: &str) -> Result<Self> {
        Url::parse(base_url).map_err(|e| {
            BuildStatsError::Config(format!("Invalid {provider} base URL {base_url:?}: {e}"))
        })?;

        Ok(Self {
            transport,
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Fetches up to `request.count` builds, most recent first.
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn fetch_builds(&self, request: &HistoryRequest) -> Result<Vec<Build>> {
        Ok(self.fetch_history(request).await?.builds)
    }

    /// Fetches up to `request.count` builds and reports why fetching stopped.
    ///
    /// Pages are requested one after another until enough builds pass the
    /// filter, the provider runs out (an empty or short page), a request
    /// fails, or the provider's attempt cap is hit. A failed request ends the
    /// fetch with whatever was collected so far; only malformed responses are
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns an error if a response body cannot be parsed.
    pub async fn fetch_history(&self, request: &HistoryRequest) -> Result<BuildHistory> {
        let provider = self.provider;
        let count = request.count;
        let mut builds = Vec::new();

        if count == 0 {
            return Ok(BuildHistory {
                builds,
                outcome: FetchOutcome::Fulfilled,
                requests: 0,
            });
        }

        let page_size = provider.page_size(count);
        let full_page = provider.full_page_len(count);
        let max_attempts = provider.max_attempts(count);
        let mut cursor = provider.initial_cursor();
        let mut requests = 0;
        let mut outcome = FetchOutcome::AttemptsExhausted;

        info!(
            "Fetching up to {count} {provider} builds for {}/{}...",
            request.account, request.project
        );

        while requests < max_attempts {
            let url = provider.history_url(
                &self.base_url,
                &request.account,
                &request.project,
                page_size,
                request.filter.branch.as_deref(),
                cursor,
            );
            requests += 1;

            let Some(body) = self.transport.get(&url).await else {
                warn!("Stopping after failed request {requests}/{max_attempts}: {url}");
                outcome = FetchOutcome::TransportFailed;
                break;
            };

            let batch = provider.parse(&body)?;

            let Some(last) = batch.last() else {
                debug!("Empty page from {url}");
                outcome = FetchOutcome::ProviderExhausted;
                break;
            };
            cursor = provider.next_cursor(cursor, last);

            let fetched = batch.len();
            builds.extend(batch.into_iter().filter(|b| request.filter.matches(b)));

            info!(
                "Page {requests}: fetched {fetched} builds (kept total: {})",
                builds.len()
            );

            if builds.len() >= count {
                outcome = FetchOutcome::Fulfilled;
                break;
            }

            // A short page is the last one.
            if fetched < full_page {
                outcome = FetchOutcome::ProviderExhausted;
                break;
            }
        }

        builds.truncate(count);

        if builds.is_empty() {
            warn!(
                "No builds found for {}/{} on {provider}",
                request.account, request.project
            );
        }

        info!(
            "Returning {} {provider} builds after {requests} requests ({outcome})",
            builds.len()
        );

        Ok(BuildHistory {
            builds,
            outcome,
            requests,
        })
    }
}
