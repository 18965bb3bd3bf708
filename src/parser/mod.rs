//! Extraction of browser statistics and user agent lists from upstream HTML.
//!
//! The upstream sites are third-party pages without a stable schema. Each
//! parser locates its region by literal markers from
//! [`ExtractionMarkers`](crate::settings::ExtractionMarkers) and fails with
//! [`ParseError`] rather than returning an empty or partial result when the
//! layout no longer matches.
//!
//! # Example
//!
//! ```
//! use fakeua_core::Settings;
//! use fakeua_core::parser::parse_browser_user_agents;
//!
//! let html = "<div id='liste'><a href='/x.php'>Mozilla/5.0 Firefox/120.0</a></div>";
//! let agents = parse_browser_user_agents(html, "Firefox", &Settings::default()).unwrap();
//! assert_eq!(agents, ["Mozilla/5.0 Firefox/120.0"]);
//! ```

mod agents;
mod catalog;
mod error;

pub use agents::{
    parse_browser_user_agents, parse_useragent_table, rank_table_agents, token_major_version,
    useragent_table_rows,
};
pub use catalog::parse_browser_catalog;
pub use error::ParseError;

use std::sync::LazyLock;

use regex::Regex;

use crate::util::compile_static_regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?s)<[^>]*>"));

/// Returns the text between the first `start` marker and the next `end` marker.
fn extract_region<'a>(
    html: &'a str,
    start: &str,
    end: &str,
    page: &str,
) -> Result<&'a str, ParseError> {
    let (_, after_start) = html
        .split_once(start)
        .ok_or_else(|| ParseError::marker_not_found(page, start))?;
    let (region, _) = after_start
        .split_once(end)
        .ok_or_else(|| ParseError::marker_not_found(page, end))?;
    Ok(region)
}

fn strip_tags(fragment: &str) -> String {
    TAG_RE.replace_all(fragment, "").into_owned()
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
