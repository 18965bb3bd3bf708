//! The rebuild pipeline: statistics page, per-browser agent pages, normalization.

use tracing::{debug, info, instrument};

use super::{Dataset, RawUserAgent, SourceError, normalize};
use crate::fetch::{FetchError, HttpFetcher};
use crate::parser::{
    parse_browser_catalog, parse_browser_user_agents, rank_table_agents, useragent_table_rows,
};
use crate::settings::{AgentPageFormat, Settings, TABLE_PAGES};

/// Scrapes upstream statistics and agent pages into a fresh dataset.
///
/// Browser pages are fetched one at a time with `settings.request_delay`
/// between requests. Each fetch carries its own retry budget.
#[derive(Debug, Clone)]
pub struct Scraper {
    fetcher: HttpFetcher,
    settings: Settings,
    verify_tls: bool,
}

impl Scraper {
    /// Creates a scraper with a fetcher built from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client can't be built.
    pub fn new(settings: Settings) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&settings)?;
        Ok(Self::with_fetcher(settings, fetcher))
    }

    /// Creates a scraper around an existing fetcher.
    #[must_use]
    pub fn with_fetcher(settings: Settings, fetcher: HttpFetcher) -> Self {
        Self {
            fetcher,
            settings,
            verify_tls: true,
        }
    }

    /// Enables or disables certificate validation for every fetch.
    #[must_use]
    pub fn verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Whether fetches validate certificates.
    #[must_use]
    pub fn verifies_tls(&self) -> bool {
        self.verify_tls
    }

    /// The settings in effect.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The underlying fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &HttpFetcher {
        &self.fetcher
    }

    /// Runs the full scrape.
    ///
    /// The rebuild is all-or-nothing: the first failing fetch or parse aborts
    /// it, so a partially scraped catalog is never returned. Each browser's
    /// usage share is split evenly across its agents.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Fetch`] or [`SourceError::Parse`] from the
    /// first failing step.
    #[instrument(skip(self), fields(stats_page = %self.settings.browsers_stats_page))]
    pub async fn scrape(&self) -> Result<Dataset, SourceError> {
        let settings = &self.settings;
        let html = self
            .fetcher
            .fetch_text(&settings.browsers_stats_page, self.verify_tls)
            .await?;
        let catalog = parse_browser_catalog(&html, settings)?;
        info!(browsers = catalog.len(), "fetched browser catalog");

        let mut raw = Vec::new();
        for (index, (browser, share)) in catalog.iter().enumerate() {
            if index > 0 && !settings.request_delay.is_zero() {
                tokio::time::sleep(settings.request_delay).await;
            }

            let agents = match settings.agent_page_format {
                AgentPageFormat::List => self.fetch_list_agents(browser).await?,
                AgentPageFormat::Table => self.fetch_table_agents(browser).await?,
            };
            debug!(browser = %browser, agents = agents.len(), "fetched agent pages");

            let per_agent = share / f64::from(u32::try_from(agents.len()).unwrap_or(u32::MAX));
            raw.extend(
                agents
                    .into_iter()
                    .map(|agent| RawUserAgent::new(agent, per_agent)),
            );
        }

        let records = normalize(raw);
        info!(records = records.len(), "scrape complete");
        Ok(Dataset::from_records(records))
    }

    async fn fetch_list_agents(&self, browser: &str) -> Result<Vec<String>, SourceError> {
        let url = format!(
            "{}{}",
            self.settings.browser_base_page,
            urlencoding::encode(browser)
        );
        let html = self.fetcher.fetch_text(&url, self.verify_tls).await?;
        Ok(parse_browser_user_agents(&html, browser, &self.settings)?)
    }

    /// Gathers the `Computer` rows of the first table pages, then ranks them
    /// as one list.
    async fn fetch_table_agents(&self, browser: &str) -> Result<Vec<String>, SourceError> {
        let settings = &self.settings;
        let slug = table_slug(browser);
        let mut rows = Vec::new();
        for page in 1..=TABLE_PAGES {
            if page > 1 && !settings.request_delay.is_zero() {
                tokio::time::sleep(settings.request_delay).await;
            }
            let url = format!(
                "{}{}/{page}?order_by=-times_seen",
                settings.browser_base_page,
                urlencoding::encode(&slug)
            );
            let html = self.fetcher.fetch_text(&url, self.verify_tls).await?;
            let page_rows = useragent_table_rows(&html, browser, settings)?;
            debug!(browser, page, rows = page_rows.len(), "fetched table page");
            rows.extend(page_rows);
        }
        Ok(rank_table_agents(rows, browser, settings)?)
    }
}

/// Path segment naming `browser` on table-style sites: lowercase, spaces as hyphens.
fn table_slug(browser: &str) -> String {
    browser.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}
