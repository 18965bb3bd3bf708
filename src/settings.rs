//! Library settings for scraping, fetching, and dataset placement.
//!
//! Every knob that used to be a process-wide constant lives on [`Settings`],
//! which is passed to the fetcher, scraper, and loader at construction.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Browser usage statistics page (catalog of browsers with usage share).
pub const BROWSERS_STATS_PAGE: &str = "https://www.w3schools.com/browsers/default.asp";

/// Base URL for per-browser user agent listings; the browser name is appended.
pub const BROWSER_BASE_PAGE: &str = "http://useragentstring.com/pages/useragentstring.php?name=";

/// Pre-built dataset snapshot used when scraping fails.
pub const CACHE_SERVER: &str =
    "https://raw.githubusercontent.com/fake-useragent/fake-useragent/main/src/fake_useragent/data/browsers.jsonl";

/// Default per-request HTTP timeout.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of attempts per fetch (including the first).
pub const HTTP_RETRIES: u32 = 2;

/// Default fixed delay between fetch attempts.
pub const HTTP_DELAY: Duration = Duration::from_millis(100);

/// Default delay between consecutive scrape requests.
pub const REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Default number of user agents kept per browser.
pub const BROWSERS_COUNT_LIMIT: usize = 50;

/// Number of table pages fetched per browser, most-seen first.
pub const TABLE_PAGES: u32 = 3;

/// Layout of the per-browser agent pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentPageFormat {
    /// A `<div id='liste'>` block of links, one per user agent.
    #[default]
    List,
    /// A `table-useragents` table with a hardware-type column, paginated as
    /// `<base><slug>/<page>?order_by=-times_seen`.
    Table,
}

/// Literal substrings that delimit the regions the parsers extract from.
///
/// These track third-party HTML and change when the sites are redesigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMarkers {
    /// Opening marker of the browser statistics table.
    pub catalog_start: String,
    /// Closing marker of the browser statistics table.
    pub catalog_end: String,
    /// Opening marker of the agent list block.
    pub list_start: String,
    /// Closing marker of the agent list block.
    pub list_end: String,
    /// Opening marker of the agent table.
    pub table_start: String,
    /// Closing marker of the agent table.
    pub table_end: String,
    /// Label fragment of "show more" entries to skip (case-insensitive).
    pub show_more: String,
}

impl Default for ExtractionMarkers {
    fn default() -> Self {
        Self {
            catalog_start: r#"<table class="w3-table-all notranslate">"#.to_string(),
            catalog_end: "</table>".to_string(),
            list_start: "<div id='liste'>".to_string(),
            list_end: "</div>".to_string(),
            table_start: r#"<table class="table table-striped table-hover table-bordered table-useragents">"#
                .to_string(),
            table_end: "</table>".to_string(),
            show_more: "more".to_string(),
        }
    }
}

/// Configuration shared by the fetch, scrape, and load stages.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Browser usage statistics page.
    pub browsers_stats_page: String,
    /// Base URL for per-browser agent pages.
    pub browser_base_page: String,
    /// Remote pre-built dataset.
    pub cache_server: String,
    /// Per-request timeout.
    pub http_timeout: Duration,
    /// Attempts per fetch, including the first (minimum 1).
    pub http_retries: u32,
    /// Fixed delay between attempts.
    pub http_delay: Duration,
    /// Delay between consecutive requests of a scrape run.
    pub request_delay: Duration,
    /// Maximum user agents kept per browser.
    pub browsers_count_limit: usize,
    /// Layout of the per-browser agent pages.
    pub agent_page_format: AgentPageFormat,
    /// Extraction markers for the upstream HTML.
    pub markers: ExtractionMarkers,
    /// Browser display-name overrides applied to catalog rows.
    pub overrides: HashMap<String, String>,
    /// Where the dataset is cached.
    pub data_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            browsers_stats_page: BROWSERS_STATS_PAGE.to_string(),
            browser_base_page: BROWSER_BASE_PAGE.to_string(),
            cache_server: CACHE_SERVER.to_string(),
            http_timeout: HTTP_TIMEOUT,
            http_retries: HTTP_RETRIES,
            http_delay: HTTP_DELAY,
            request_delay: REQUEST_DELAY,
            browsers_count_limit: BROWSERS_COUNT_LIMIT,
            agent_page_format: AgentPageFormat::default(),
            markers: ExtractionMarkers::default(),
            overrides: default_overrides(),
            data_path: default_data_path(),
        }
    }
}

fn default_overrides() -> HashMap<String, String> {
    [
        ("Edge/IE", "Internet Explorer"),
        ("IE/Edge", "Internet Explorer"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

/// Default dataset location: a versioned file in the system temp directory.
#[must_use]
pub fn default_data_path() -> PathBuf {
    let version = env!("CARGO_PKG_VERSION");
    std::env::temp_dir().join(format!("fakeua_{version}.jsonl"))
}
