use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use crate::error::{BuildStatsError, Result};

/// Fetches a single URL and yields its body.
///
/// Implementations never fail loudly: network errors and non-success
/// statuses come back as `None`, which callers treat as "no more data".
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// `Transport` backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .user_agent(concat!("buildstats/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| BuildStatsError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Option<String> {
        debug!("GET {url}");

        let response = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Request to {url} failed: {e}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Request to {url} returned status {status}");
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Failed to read response body from {url}: {e}");
                None
            }
        }
    }
}
