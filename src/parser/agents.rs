//! Per-browser user agent list extraction.

use std::cmp::Reverse;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use super::{ParseError, extract_region, strip_tags, unescape_html};
use crate::settings::Settings;
use crate::util::compile_static_regex;

static LIST_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"\.php'>(.+?)</a"));

static TABLE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?is)<tr>(.*?)</tr>"));

static TABLE_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<td[^>]*>(.*?)</td>"));

/// Hardware-type label of the rows kept from agent tables.
const COMPUTER_HARDWARE: &str = "Computer";

/// Extracts the ranked user agents for `browser` from a list-style page.
///
/// Entries are read in page order from the region between
/// `markers.list_start` and `markers.list_end`. Entries whose label contains
/// the "show more" sentinel (case-insensitive) are skipped, and the result is
/// truncated to `settings.browsers_count_limit`.
///
/// # Errors
///
/// - [`ParseError::MarkerNotFound`] when the list markers are missing
/// - [`ParseError::NoAgents`] when no entries survive extraction
#[instrument(skip(html, settings), fields(html_len = html.len()))]
pub fn parse_browser_user_agents(
    html: &str,
    browser: &str,
    settings: &Settings,
) -> Result<Vec<String>, ParseError> {
    let markers = &settings.markers;
    let region = extract_region(html, &markers.list_start, &markers.list_end, browser)?;
    let sentinel = markers.show_more.to_lowercase();

    let agents: Vec<String> = LIST_ENTRY_RE
        .captures_iter(region)
        .map(|caps| unescape_html(caps[1].trim()))
        .filter(|label| !label.is_empty())
        .filter(|label| sentinel.is_empty() || !label.to_lowercase().contains(&sentinel))
        .take(settings.browsers_count_limit)
        .collect();

    if agents.is_empty() {
        return Err(ParseError::no_agents(browser));
    }
    debug!(browser, agents = agents.len(), "parsed agent list");
    Ok(agents)
}

/// Extracts user agents for `browser` from a table-style page.
///
/// Only rows whose hardware-type cell (fourth column) reads `Computer` are
/// kept. Rows are ranked by the version following the `<browser>/` token,
/// highest first; rows without a readable version sort last. The result is
/// truncated to `settings.browsers_count_limit`.
///
/// # Errors
///
/// - [`ParseError::MarkerNotFound`] when the table markers are missing
/// - [`ParseError::NoAgents`] when no rows survive extraction
#[instrument(skip(html, settings), fields(html_len = html.len()))]
pub fn parse_useragent_table(
    html: &str,
    browser: &str,
    settings: &Settings,
) -> Result<Vec<String>, ParseError> {
    let rows = useragent_table_rows(html, browser, settings)?;
    rank_table_agents(rows, browser, settings)
}

/// Collects the `Computer` rows of one table page in page order.
///
/// A table with no matching rows yields an empty list, so rows from several
/// pages of the same browser can be gathered before ranking.
///
/// # Errors
///
/// Returns [`ParseError::MarkerNotFound`] when the table markers are missing.
pub fn useragent_table_rows(
    html: &str,
    browser: &str,
    settings: &Settings,
) -> Result<Vec<String>, ParseError> {
    let markers = &settings.markers;
    let table = extract_region(html, &markers.table_start, &markers.table_end, browser)?;

    Ok(TABLE_ROW_RE
        .captures_iter(table)
        .filter_map(|row| {
            let cells: Vec<String> = TABLE_CELL_RE
                .captures_iter(&row[1])
                .map(|cell| unescape_html(strip_tags(&cell[1]).trim()))
                .collect();
            // Header rows use <th> and produce no cells.
            if cells.len() < 4 || cells[3] != COMPUTER_HARDWARE || cells[0].is_empty() {
                return None;
            }
            Some(cells[0].clone())
        })
        .collect())
}

/// Ranks table rows by browser version, highest first, and truncates them
/// to `settings.browsers_count_limit`. The sort is stable, so rows with the
/// same version keep their page order.
///
/// # Errors
///
/// Returns [`ParseError::NoAgents`] when `agents` is empty.
pub fn rank_table_agents(
    mut agents: Vec<String>,
    browser: &str,
    settings: &Settings,
) -> Result<Vec<String>, ParseError> {
    if let Some(token) = version_token_regex(browser) {
        agents.sort_by_cached_key(|agent| Reverse(major_version_with(&token, agent)));
    }
    agents.truncate(settings.browsers_count_limit);

    if agents.is_empty() {
        return Err(ParseError::no_agents(browser));
    }
    debug!(browser, agents = agents.len(), "ranked agent table");
    Ok(agents)
}

/// Reads the major version after `<browser>/` (or `<browser>/v`), case-insensitive.
#[must_use]
pub fn token_major_version(browser: &str, agent: &str) -> Option<u32> {
    major_version_with(&version_token_regex(browser)?, agent)
}

fn version_token_regex(browser: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i){}/v?(\d+)", regex::escape(browser.trim()))).ok()
}

fn major_version_with(token: &Regex, agent: &str) -> Option<u32> {
    token.captures(agent)?.get(1)?.as_str().parse().ok()
}
