//! HTTP fetching for scrape targets and the remote dataset snapshot.
//!
//! # Features
//!
//! - Bounded retries with a fixed delay ([`FetchPolicy`])
//! - Early stop on permanent failures (4xx other than 408/429)
//! - Per-call opt-out of certificate validation for broken certificate chains
//! - [`FetchError::DataSourceUnavailable`] carrying the last attempt's failure

mod client;
mod error;
mod retry;

pub use client::HttpFetcher;
pub use error::{AttemptError, FetchError};
pub use retry::{FetchPolicy, RetryDecision};
