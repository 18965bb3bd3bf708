//! Randomized user agent access over a filtered dataset.
//!
//! A [`UserAgent`] is built once with its filters and data source, then
//! answers lookups from memory. Lookups never touch the network. A lookup
//! that matches nothing returns the configured fallback (logged at `warn`),
//! or [`UserAgentError::NoMatch`] when the fallback was disabled.
//!
//! # Example
//!
//! ```
//! use fakeua_core::sampler::UserAgent;
//!
//! # async fn example() -> Result<(), fakeua_core::sampler::UserAgentError> {
//! let ua = UserAgent::builder().browsers(["chrome", "edge"]).build().await?;
//! let agent = ua.get("google chrome")?;
//! assert!(!agent.is_empty());
//! # Ok(())
//! # }
//! ```

mod aliases;
mod error;
mod filters;

pub use aliases::AliasTable;
pub use error::{ConfigurationError, UserAgentError};
pub use filters::Filters;

use std::fmt;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use tracing::{debug, instrument, warn};

use crate::classifier::PlatformType;
use crate::dataset::{BrowserUserAgentRecord, DataUnavailable, Dataset, DatasetLoader};

/// User agent returned when nothing matches, unless overridden.
pub const DEFAULT_FALLBACK: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36 Edg/122.0.0.0";

/// Request keyword that skips the per-call browser filter.
pub const RANDOM: &str = "random";

const DEFAULT_BROWSERS: [&str; 4] = ["chrome", "firefox", "safari", "edge"];
const DEFAULT_OS: [&str; 3] = ["win10", "macos", "linux"];
const DEFAULT_PLATFORMS: [&str; 3] = ["desktop", "mobile", "tablet"];

/// How a record is chosen among the filter survivors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SamplingPolicy {
    /// Every surviving record is equally likely.
    #[default]
    Uniform,
    /// Records are drawn proportionally to `percent`. If every survivor has
    /// zero weight the draw is uniform.
    Weighted,
}

/// Named convenience lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    /// Google Chrome.
    Chrome,
    /// Mozilla Firefox.
    Firefox,
    /// Apple Safari.
    Safari,
    /// Microsoft Edge.
    Edge,
    /// Microsoft Internet Explorer.
    InternetExplorer,
    /// Opera.
    Opera,
    /// Any browser allowed by the instance filters.
    Random,
}

impl Browser {
    /// Canonical request key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Safari => "safari",
            Self::Edge => "edge",
            Self::InternetExplorer => "internet explorer",
            Self::Opera => "opera",
            Self::Random => RANDOM,
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the accessor gets its records.
#[derive(Debug, Clone, Default)]
pub enum DataSource {
    /// The dataset compiled into the library.
    #[default]
    Bundled,
    /// Load through a cache-aware loader (may scrape or hit the network).
    Loader(DatasetLoader),
    /// Use the given records as-is.
    Dataset(Dataset),
}

/// Builder for [`UserAgent`].
#[derive(Debug, Clone)]
pub struct UserAgentBuilder {
    browsers: Vec<String>,
    os: Vec<String>,
    platforms: Vec<String>,
    min_version: f64,
    min_percentage: f64,
    fallback: Option<String>,
    sampling: SamplingPolicy,
    aliases: AliasTable,
    source: DataSource,
}

impl Default for UserAgentBuilder {
    fn default() -> Self {
        Self {
            browsers: DEFAULT_BROWSERS.iter().map(|s| (*s).to_string()).collect(),
            os: DEFAULT_OS.iter().map(|s| (*s).to_string()).collect(),
            platforms: DEFAULT_PLATFORMS.iter().map(|s| (*s).to_string()).collect(),
            min_version: 0.0,
            min_percentage: 0.0,
            fallback: Some(DEFAULT_FALLBACK.to_string()),
            sampling: SamplingPolicy::default(),
            aliases: AliasTable::default(),
            source: DataSource::default(),
        }
    }
}

fn owned<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values.into_iter().map(|v| v.as_ref().to_string()).collect()
}

impl UserAgentBuilder {
    /// Allowed browsers; aliases are resolved. Defaults to chrome, firefox, safari, edge.
    #[must_use]
    pub fn browsers<I, S>(mut self, browsers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.browsers = owned(browsers);
        self
    }

    /// Allowed OS keys; `windows` expands to every Windows release. Defaults
    /// to win10, macos, linux.
    #[must_use]
    pub fn os<I, S>(mut self, os: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.os = owned(os);
        self
    }

    /// Allowed device categories by name (`pc` means desktop). Defaults to
    /// desktop, mobile, tablet.
    #[must_use]
    pub fn platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.platforms = owned(platforms);
        self
    }

    /// Minimum browser major.minor version, inclusive.
    #[must_use]
    pub fn min_version(mut self, min_version: f64) -> Self {
        self.min_version = min_version;
        self
    }

    /// Minimum usage weight, inclusive.
    #[must_use]
    pub fn min_percentage(mut self, min_percentage: f64) -> Self {
        self.min_percentage = min_percentage;
        self
    }

    /// User agent returned on a lookup miss.
    #[must_use]
    pub fn fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Disables the fallback: misses and load failures become errors.
    #[must_use]
    pub fn no_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    /// Selection policy among filter survivors.
    #[must_use]
    pub fn sampling(mut self, sampling: SamplingPolicy) -> Self {
        self.sampling = sampling;
        self
    }

    /// Replaces the alias table.
    #[must_use]
    pub fn aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    /// Sets the data source.
    #[must_use]
    pub fn source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    /// Uses `dataset` directly.
    #[must_use]
    pub fn dataset(self, dataset: Dataset) -> Self {
        self.source(DataSource::Dataset(dataset))
    }

    /// Loads through `loader`.
    #[must_use]
    pub fn loader(self, loader: DatasetLoader) -> Self {
        self.source(DataSource::Loader(loader))
    }

    /// Validates the configuration and loads the data.
    ///
    /// # Errors
    ///
    /// - [`UserAgentError::Configuration`] for invalid filter or fallback values
    /// - [`UserAgentError::DataUnavailable`] when loading fails and no fallback
    ///   is configured; with a fallback the accessor starts empty instead
    #[instrument(skip(self), fields(sampling = ?self.sampling))]
    pub async fn build(self) -> Result<UserAgent, UserAgentError> {
        let filters = self.filters()?;
        if self.fallback.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(ConfigurationError::EmptyFallback.into());
        }

        let dataset = match load_source(self.source).await {
            Ok(dataset) => dataset,
            Err(e) if self.fallback.is_some() => {
                warn!(error = %e, "could not load user agent data, only the fallback will be returned");
                Dataset::default()
            }
            Err(e) => return Err(e.into()),
        };
        debug!(records = dataset.len(), "user agent accessor ready");

        Ok(UserAgent {
            dataset,
            filters,
            fallback: self.fallback,
            sampling: self.sampling,
            aliases: self.aliases,
        })
    }

    fn filters(&self) -> Result<Filters, ConfigurationError> {
        if !self.min_version.is_finite() || self.min_version < 0.0 {
            return Err(ConfigurationError::InvalidMinVersion(self.min_version));
        }
        if !self.min_percentage.is_finite() || self.min_percentage < 0.0 {
            return Err(ConfigurationError::InvalidMinPercentage(self.min_percentage));
        }
        let platforms = self
            .platforms
            .iter()
            .map(|p| p.parse::<PlatformType>())
            .collect::<Result<_, _>>()?;

        Ok(Filters {
            browsers: self
                .browsers
                .iter()
                .map(|b| self.aliases.resolve_browser(b))
                .collect(),
            os: self
                .os
                .iter()
                .flat_map(|os| self.aliases.expand_os(os))
                .collect(),
            platforms,
            min_version: self.min_version,
            min_percentage: self.min_percentage,
        })
    }
}

async fn load_source(source: DataSource) -> Result<Dataset, DataUnavailable> {
    match source {
        DataSource::Bundled => Dataset::bundled()
            .map_err(|e| DataUnavailable::new("bundled dataset is corrupt", e)),
        DataSource::Loader(loader) => loader.load().await,
        DataSource::Dataset(dataset) => Ok(dataset),
    }
}

/// Randomized user agent accessor.
#[derive(Debug, Clone)]
pub struct UserAgent {
    dataset: Dataset,
    filters: Filters,
    fallback: Option<String>,
    sampling: SamplingPolicy,
    aliases: AliasTable,
}

impl UserAgent {
    /// Starts a builder with the default filters, fallback, and bundled data.
    #[must_use]
    pub fn builder() -> UserAgentBuilder {
        UserAgentBuilder::default()
    }

    /// The instance filters.
    #[must_use]
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// The configured fallback user agent.
    #[must_use]
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// The selection policy.
    #[must_use]
    pub fn sampling(&self) -> SamplingPolicy {
        self.sampling
    }

    /// The loaded records, before filtering.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Records a request would draw from.
    ///
    /// `request` is alias-resolved. `"random"` applies only the instance
    /// filters; any other value additionally requires that browser.
    #[must_use]
    pub fn candidates(&self, request: &str) -> Vec<&BrowserUserAgentRecord> {
        let request = self.aliases.resolve_browser(request);
        self.dataset
            .iter()
            .filter(|record| self.filters.matches(record))
            .filter(|record| request == RANDOM || record.browser == request)
            .collect()
    }

    /// Returns a user agent string for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`UserAgentError::NoMatch`] on a miss when no fallback is set.
    pub fn get(&self, request: &str) -> Result<String, UserAgentError> {
        self.get_browser(request).map(|record| record.useragent)
    }

    /// Returns a full record for `request`.
    ///
    /// On a miss with a fallback configured, the record describes the
    /// fallback as a Chrome 122 desktop agent on Windows 10.
    ///
    /// # Errors
    ///
    /// Returns [`UserAgentError::NoMatch`] on a miss when no fallback is set.
    pub fn get_browser(&self, request: &str) -> Result<BrowserUserAgentRecord, UserAgentError> {
        self.get_browser_with_rng(request, &mut rand::thread_rng())
    }

    /// Like [`get_browser`](Self::get_browser) with a caller-supplied RNG.
    ///
    /// # Errors
    ///
    /// Returns [`UserAgentError::NoMatch`] on a miss when no fallback is set.
    pub fn get_browser_with_rng<R: Rng + ?Sized>(
        &self,
        request: &str,
        rng: &mut R,
    ) -> Result<BrowserUserAgentRecord, UserAgentError> {
        let candidates = self.candidates(request);
        if let Some(record) = self.choose(&candidates, rng) {
            return Ok(record.clone());
        }

        let resolved = self.aliases.resolve_browser(request);
        match &self.fallback {
            Some(fallback) => {
                warn!(
                    request = %resolved,
                    "no user agent matched the request, suppressed with fallback"
                );
                Ok(fallback_record(fallback))
            }
            None => Err(UserAgentError::NoMatch { request: resolved }),
        }
    }

    fn choose<'a, R: Rng + ?Sized>(
        &self,
        candidates: &[&'a BrowserUserAgentRecord],
        rng: &mut R,
    ) -> Option<&'a BrowserUserAgentRecord> {
        if self.sampling == SamplingPolicy::Weighted
            && let Ok(weights) = WeightedIndex::new(candidates.iter().map(|r| r.percent))
        {
            return candidates.get(weights.sample(rng)).copied();
        }
        candidates.choose(rng).copied()
    }

    /// A named convenience lookup.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_named(&self, browser: Browser) -> Result<String, UserAgentError> {
        self.get(browser.as_str())
    }

    /// A Chrome user agent.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn chrome(&self) -> Result<String, UserAgentError> {
        self.get_named(Browser::Chrome)
    }

    /// A Firefox user agent.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn firefox(&self) -> Result<String, UserAgentError> {
        self.get_named(Browser::Firefox)
    }

    /// A Safari user agent.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn safari(&self) -> Result<String, UserAgentError> {
        self.get_named(Browser::Safari)
    }

    /// An Edge user agent.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn edge(&self) -> Result<String, UserAgentError> {
        self.get_named(Browser::Edge)
    }

    /// A user agent from any allowed browser.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn random(&self) -> Result<String, UserAgentError> {
        self.get_named(Browser::Random)
    }

    /// Forces `loader` to rebuild and swaps in the new records.
    ///
    /// The current records are kept if the rebuild fails.
    ///
    /// # Errors
    ///
    /// Returns [`UserAgentError::DataUnavailable`] from the rebuild.
    pub async fn update(&mut self, loader: &DatasetLoader) -> Result<(), UserAgentError> {
        self.dataset = loader.update().await?;
        Ok(())
    }
}

/// The record returned for a miss.
fn fallback_record(useragent: &str) -> BrowserUserAgentRecord {
    BrowserUserAgentRecord {
        useragent: useragent.to_string(),
        percent: 100.0,
        platform_type: PlatformType::Desktop,
        device_brand: None,
        browser: "chrome".to_string(),
        browser_version: "122.0".to_string(),
        browser_version_major_minor: 122.0,
        os: "win10".to_string(),
        os_version: Some("10".to_string()),
        platform: None,
    }
}
