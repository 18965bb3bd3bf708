//! Dataset cache state machine with scrape and remote fallback.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::{DataUnavailable, Dataset, DatasetError, Scraper, SourceError, decode_remote_payload};
use crate::fetch::FetchError;
use crate::settings::Settings;

/// Whether a dataset file is present at the loader's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// A dataset file exists and will be read without network access.
    Cached,
    /// No dataset file; the next load rebuilds.
    Uncached,
}

/// Loads the dataset from the cache file, rebuilding it when absent.
///
/// A rebuild scrapes upstream pages; if that fails and the remote fallback is
/// enabled, the pre-built dataset from `settings.cache_server` is used
/// instead. Whichever source succeeds is written back to the cache file.
///
/// # Example
///
/// ```no_run
/// use fakeua_core::Settings;
/// use fakeua_core::dataset::DatasetLoader;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let loader = DatasetLoader::new(Settings::default())?.use_remote_fallback(true);
/// let dataset = loader.load().await?;
/// println!("{} user agents", dataset.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    scraper: Scraper,
    path: PathBuf,
    cache: bool,
    use_remote_fallback: bool,
}

impl DatasetLoader {
    /// Creates a loader caching at `settings.data_path`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client can't be built.
    pub fn new(settings: Settings) -> Result<Self, FetchError> {
        Ok(Self::with_scraper(Scraper::new(settings)?))
    }

    /// Creates a loader around an existing scraper.
    #[must_use]
    pub fn with_scraper(scraper: Scraper) -> Self {
        Self {
            path: scraper.settings().data_path.clone(),
            scraper,
            cache: true,
            use_remote_fallback: true,
        }
    }

    /// Overrides the dataset file path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Enables or disables the cache file. Without it every load rebuilds
    /// and the file is never read or written.
    #[must_use]
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Enables or disables the remote pre-built dataset fallback.
    #[must_use]
    pub fn use_remote_fallback(mut self, enabled: bool) -> Self {
        self.use_remote_fallback = enabled;
        self
    }

    /// Enables or disables certificate validation for all fetches.
    #[must_use]
    pub fn verify_tls(mut self, verify_tls: bool) -> Self {
        self.scraper = self.scraper.verify_tls(verify_tls);
        self
    }

    /// The dataset file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reports whether the dataset file exists.
    #[must_use]
    pub fn state(&self) -> CacheState {
        if self.path.is_file() {
            CacheState::Cached
        } else {
            CacheState::Uncached
        }
    }

    /// Returns the dataset, reading the cache file when present.
    ///
    /// # Errors
    ///
    /// Returns [`DataUnavailable`] when the cache file is unreadable, or when
    /// neither the scrape nor the remote fallback produced a dataset.
    #[instrument(skip(self), fields(path = %self.path.display(), cache = self.cache))]
    pub async fn load(&self) -> Result<Dataset, DataUnavailable> {
        if self.cache && self.state() == CacheState::Cached {
            return Dataset::read_jsonl(&self.path)
                .await
                .map_err(|e| DataUnavailable::new("cached dataset file is unreadable", e));
        }
        self.rebuild().await
    }

    /// Deletes the cache file and rebuilds, regardless of the current state.
    ///
    /// # Errors
    ///
    /// Returns [`DataUnavailable`] when the old file can't be removed or the
    /// rebuild fails on every source.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn update(&self) -> Result<Dataset, DataUnavailable> {
        if self.cache {
            self.remove_cache()
                .await
                .map_err(|e| DataUnavailable::new("could not remove cached dataset", e))?;
        }
        self.rebuild().await
    }

    /// Deletes the cache file. Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] for failures other than a missing file.
    pub async fn remove_cache(&self) -> Result<bool, DatasetError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "removed cached dataset");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DatasetError::io(&self.path, e)),
        }
    }

    async fn rebuild(&self) -> Result<Dataset, DataUnavailable> {
        let dataset = match self.scraper.scrape().await {
            Ok(dataset) => dataset,
            Err(scrape_error) if self.use_remote_fallback => {
                warn!(error = %scrape_error, "scrape failed, trying remote fallback");
                self.fetch_remote().await.map_err(|remote_error| {
                    DataUnavailable::new(
                        format!("scrape failed ({scrape_error}) and remote fallback failed"),
                        remote_error,
                    )
                })?
            }
            Err(scrape_error) => {
                return Err(DataUnavailable::new(
                    "scrape failed and remote fallback is disabled",
                    scrape_error,
                ));
            }
        };

        if self.cache
            && let Err(e) = dataset.write_jsonl(&self.path).await
        {
            warn!(error = %e, "could not persist dataset, continuing with in-memory copy");
        }
        Ok(dataset)
    }

    async fn fetch_remote(&self) -> Result<Dataset, SourceError> {
        let url = &self.scraper.settings().cache_server;
        let body = self
            .scraper
            .fetcher()
            .fetch(url, self.scraper.verifies_tls())
            .await?;
        let dataset = decode_remote_payload(&body)?;
        info!(url = %url, records = dataset.len(), "loaded remote dataset");
        Ok(dataset)
    }
}
