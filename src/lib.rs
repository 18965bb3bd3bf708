//! Fake User Agent Core Library
//!
//! This library supplies realistic, randomized browser user agent strings
//! drawn from a dataset built out of scraped browser usage statistics.
//!
//! # Architecture
//!
//! The library is organized into the following modules, leaf-first:
//! - [`settings`] - Upstream URLs, extraction markers, timeouts, and paths
//! - [`fetch`] - HTTP fetcher with bounded fixed-delay retry
//! - [`parser`] - Extraction of browser statistics and agent lists from HTML
//! - [`classifier`] - User agent classification (browser, OS, device)
//! - [`dataset`] - Records, JSON Lines persistence, scraping, and the cache loader
//! - [`convert`] - Offline conversion of large upstream corpora
//! - [`sampler`] - Filtered random access with aliases and a fallback

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classifier;
pub mod convert;
pub mod dataset;
pub mod fetch;
pub mod parser;
pub mod sampler;
pub mod settings;

mod user_agent;
mod util;

// Re-export commonly used types
pub use classifier::{ClassifiedFields, PlatformType, classify};
pub use dataset::{
    BrowserUserAgentRecord, CacheState, DataUnavailable, Dataset, DatasetError, DatasetLoader,
};
pub use fetch::{FetchError, HttpFetcher};
pub use parser::ParseError;
pub use sampler::{
    Browser, ConfigurationError, DEFAULT_FALLBACK, SamplingPolicy, UserAgent, UserAgentBuilder,
    UserAgentError,
};
pub use settings::Settings;
