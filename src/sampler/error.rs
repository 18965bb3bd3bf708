//! Error types for the sampling accessor.

use thiserror::Error;

use crate::classifier::UnknownPlatform;
use crate::dataset::DataUnavailable;

/// Caller-supplied filter or fallback arguments of the wrong shape.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    /// `min_version` is negative or not finite.
    #[error("min_version must be a finite, non-negative number, got {0}")]
    InvalidMinVersion(f64),

    /// `min_percentage` is negative or not finite.
    #[error("min_percentage must be a finite, non-negative number, got {0}")]
    InvalidMinPercentage(f64),

    /// The fallback user agent is empty.
    #[error("fallback user agent must not be empty")]
    EmptyFallback,

    /// A platform filter value is not a known platform type.
    #[error(transparent)]
    UnknownPlatform(#[from] UnknownPlatform),
}

/// Errors returned by [`UserAgent`](super::UserAgent) and its builder.
#[derive(Debug, Error)]
pub enum UserAgentError {
    /// The dataset could not be loaded and no fallback is configured.
    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailable),

    /// Nothing matched the request and no fallback is configured.
    #[error("no user agent matches '{request}' under the configured filters and no fallback is set")]
    NoMatch {
        /// The request after alias resolution.
        request: String,
    },

    /// Invalid builder arguments.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
