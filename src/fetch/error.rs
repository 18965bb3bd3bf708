//! Error types for the fetch module.

use thiserror::Error;

/// Failure of a single fetch attempt.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error: {source}")]
    Network {
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("request timed out")]
    Timeout,

    /// Non-success HTTP response.
    #[error("HTTP {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be read.
    #[error("failed reading response body: {source}")]
    Body {
        /// The underlying read error.
        #[source]
        source: reqwest::Error,
    },
}

impl AttemptError {
    /// Maps a reqwest send error onto the timeout or network variant.
    #[must_use]
    pub fn from_send(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout
        } else {
            Self::Network { source }
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// | Failure | Retry |
    /// |---------|-------|
    /// | Timeout, connection error | yes |
    /// | 408, 429, 5xx | yes |
    /// | other 4xx | no |
    /// | unreadable body | yes |
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout | Self::Body { .. } => true,
            Self::HttpStatus { status } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
        }
    }
}

/// Errors returned by [`HttpFetcher`](super::HttpFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt failed; carries the last failure.
    #[error("data source unavailable: {url} failed after {attempts} attempt(s): {last}")]
    DataSourceUnavailable {
        /// The URL that could not be fetched.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// The failure of the final attempt.
        #[source]
        last: AttemptError,
    },

    /// The URL is malformed or not http(s).
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Creates a retry-exhaustion error.
    pub fn unavailable(url: impl Into<String>, attempts: u32, last: AttemptError) -> Self {
        Self::DataSourceUnavailable {
            url: url.into(),
            attempts,
            last,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

// No `From<reqwest::Error>`: every variant needs the URL or attempt count as context.
