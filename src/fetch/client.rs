//! HTTP client wrapper with bounded retries and a per-call TLS override.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::{AttemptError, FetchError};
use super::retry::{FetchPolicy, RetryDecision};
use crate::settings::Settings;
use crate::user_agent;

/// HTTP fetcher used by the scraper and the remote fallback.
///
/// Holds two connection pools: one validating certificates and one that
/// does not, selected per call through `verify_tls`. Every call is a live
/// network fetch; nothing is cached here.
///
/// # Example
///
/// ```no_run
/// use fakeua_core::fetch::HttpFetcher;
/// use fakeua_core::Settings;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&Settings::default())?;
/// let html = fetcher.fetch_text("https://www.w3schools.com/browsers/default.asp", true).await?;
/// println!("{} bytes", html.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    insecure_client: Client,
    policy: FetchPolicy,
}

impl HttpFetcher {
    /// Creates a fetcher using the timeout and retry budget from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the TLS backend cannot be initialized.
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        Self::with_policy(
            settings.http_timeout,
            FetchPolicy::new(settings.http_retries, settings.http_delay),
        )
    }

    /// Creates a fetcher with an explicit timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the TLS backend cannot be initialized.
    pub fn with_policy(timeout: Duration, policy: FetchPolicy) -> Result<Self, FetchError> {
        let client = base_builder(timeout)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        let insecure_client = base_builder(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        Ok(Self {
            client,
            insecure_client,
            policy,
        })
    }

    /// Returns the retry policy in effect.
    #[must_use]
    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetches `url` and returns the raw response body.
    ///
    /// Transient failures (timeouts, connection errors, 408/429/5xx) are retried
    /// up to the policy's attempt budget with a fixed sleep in between.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] for malformed or non-http(s) URLs
    /// - [`FetchError::DataSourceUnavailable`] once retries are exhausted or a
    ///   permanent failure is seen, carrying the last attempt's error
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str, verify_tls: bool) -> Result<Vec<u8>, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::invalid_url(url));
        }

        let client = if verify_tls {
            &self.client
        } else {
            &self.insecure_client
        };

        let mut attempt = 1;
        loop {
            match fetch_once(client, parsed.clone()).await {
                Ok(body) => {
                    debug!(attempt, bytes = body.len(), "fetch succeeded");
                    return Ok(body);
                }
                Err(error) => {
                    debug!(attempt, error = %error, "fetch attempt failed");
                    match self.policy.should_retry(&error, attempt) {
                        RetryDecision::Retry { delay, attempt: next } => {
                            debug!(delay_ms = delay.as_millis() as u64, "sleeping before retry");
                            tokio::time::sleep(delay).await;
                            attempt = next;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            warn!(attempt, reason = %reason, "giving up on fetch");
                            return Err(FetchError::unavailable(url, attempt, error));
                        }
                    }
                }
            }
        }
    }

    /// Fetches `url` and decodes the body as UTF-8 (invalid sequences replaced).
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_text(&self, url: &str, verify_tls: bool) -> Result<String, FetchError> {
        let body = self.fetch(url, verify_tls).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

async fn fetch_once(client: &Client, url: Url) -> Result<Vec<u8>, AttemptError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(AttemptError::from_send)?;

    let status = response.status();
    if !status.is_success() {
        return Err(AttemptError::HttpStatus {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|source| {
        if source.is_timeout() {
            AttemptError::Timeout
        } else {
            AttemptError::Body { source }
        }
    })?;
    Ok(body.to_vec())
}

fn base_builder(timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .user_agent(user_agent::default_fetch_user_agent())
        .gzip(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_rejects_malformed_url() {
        let fetcher = HttpFetcher::new(&Settings::default()).unwrap();
        let result = fetcher.fetch("not a url", true).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_http_scheme() {
        let fetcher = HttpFetcher::new(&Settings::default()).unwrap();
        let result = fetcher.fetch("ftp://example.com/browsers.jsonl", true).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_fetcher_uses_settings_retry_budget() {
        let settings = Settings {
            http_retries: 4,
            http_delay: Duration::from_millis(7),
            ..Settings::default()
        };
        let fetcher = HttpFetcher::new(&settings).unwrap();
        assert_eq!(fetcher.policy().max_attempts(), 4);
        assert_eq!(fetcher.policy().delay(), Duration::from_millis(7));
    }
}
