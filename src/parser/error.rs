//! Error types for upstream page extraction.

use thiserror::Error;

/// Errors raised when upstream HTML no longer matches the expected layout.
///
/// None of these mean "no data exists": an upstream page that yields nothing
/// for a known browser has changed format and must not be read as empty.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    /// A region marker was not found in the page.
    #[error("marker `{marker}` not found in {page} page\n  Suggestion: the site layout changed; update the extraction markers")]
    MarkerNotFound {
        /// Which page was being parsed ("browser catalog" or a browser name).
        page: String,
        /// The missing marker text.
        marker: String,
    },

    /// The catalog table produced no rows.
    #[error("browser catalog table contains no browser rows")]
    EmptyCatalog,

    /// Browser names and percentage cells did not pair up.
    #[error("browser catalog rows are inconsistent: {browsers} names but {percentages} percentages")]
    RowMismatch {
        /// Number of browser names extracted.
        browsers: usize,
        /// Number of percentage cells extracted.
        percentages: usize,
    },

    /// A percentage cell could not be read as a number.
    #[error("invalid usage percentage '{value}' for browser '{browser}'")]
    InvalidPercentage {
        /// Browser the percentage belongs to.
        browser: String,
        /// Raw cell text.
        value: String,
    },

    /// A browser page yielded no user agents.
    #[error("no user agents extracted for browser '{browser}'")]
    NoAgents {
        /// Browser whose page was empty.
        browser: String,
    },
}

impl ParseError {
    /// Creates a `MarkerNotFound` error.
    #[must_use]
    pub fn marker_not_found(page: &str, marker: &str) -> Self {
        Self::MarkerNotFound {
            page: page.to_string(),
            marker: marker.to_string(),
        }
    }

    /// Creates a `NoAgents` error.
    #[must_use]
    pub fn no_agents(browser: &str) -> Self {
        Self::NoAgents {
            browser: browser.to_string(),
        }
    }
}
