//! Browser usage catalog extraction.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use super::{ParseError, extract_region, unescape_html};
use crate::settings::Settings;
use crate::util::compile_static_regex;

static BROWSER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"\.asp">([^<]+?)<"#));

static PERCENT_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"<td\s+class="right">\s*([^<\s%]+)"#));

/// Extracts `(browser, usage_percent)` pairs from the statistics page.
///
/// The table is located between `settings.markers.catalog_start` and
/// `catalog_end`; browser names come from the row links and percentages
/// from the right-aligned cells. Names listed in `settings.overrides` are
/// replaced. Rows are returned in page order.
///
/// # Errors
///
/// - [`ParseError::MarkerNotFound`] when the table markers are missing
/// - [`ParseError::EmptyCatalog`] when the table has no rows
/// - [`ParseError::RowMismatch`] when names and percentages don't pair up
/// - [`ParseError::InvalidPercentage`] when a percentage cell isn't numeric
#[instrument(skip(html, settings), fields(html_len = html.len()))]
pub fn parse_browser_catalog(
    html: &str,
    settings: &Settings,
) -> Result<Vec<(String, f64)>, ParseError> {
    let markers = &settings.markers;
    let table = extract_region(
        html,
        &markers.catalog_start,
        &markers.catalog_end,
        "browser catalog",
    )?;

    let browsers: Vec<String> = BROWSER_NAME_RE
        .captures_iter(table)
        .map(|caps| {
            let name = unescape_html(caps[1].trim());
            settings.overrides.get(&name).cloned().unwrap_or(name)
        })
        .collect();
    let percentages: Vec<&str> = PERCENT_CELL_RE
        .captures_iter(table)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    if browsers.is_empty() {
        return Err(ParseError::EmptyCatalog);
    }
    if browsers.len() != percentages.len() {
        return Err(ParseError::RowMismatch {
            browsers: browsers.len(),
            percentages: percentages.len(),
        });
    }

    let rows = browsers
        .into_iter()
        .zip(percentages)
        .map(|(browser, raw)| match raw.parse::<f64>() {
            Ok(percent) if percent.is_finite() && percent >= 0.0 => Ok((browser, percent)),
            _ => Err(ParseError::InvalidPercentage {
                browser,
                value: raw.to_string(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(rows = rows.len(), "parsed browser catalog");
    Ok(rows)
}
