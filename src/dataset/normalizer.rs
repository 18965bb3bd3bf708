//! Classification and deduplication of raw scraped user agents.

use std::collections::HashSet;

use tracing::{debug, instrument};

use super::BrowserUserAgentRecord;
use crate::classifier::classify;

/// A raw user agent with the usage weight of its source, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawUserAgent {
    /// The user agent as scraped.
    pub useragent: String,
    /// Usage weight, already scaled to percent.
    pub percent: f64,
    /// Navigator platform, when the source provides one.
    pub platform: Option<String>,
}

impl RawUserAgent {
    /// Creates a raw entry without a navigator platform.
    pub fn new(useragent: impl Into<String>, percent: f64) -> Self {
        Self {
            useragent: useragent.into(),
            percent,
            platform: None,
        }
    }
}

/// Classifies each raw entry and keeps the first occurrence of every agent.
///
/// Entries the classifier rejects and entries with a negative or non-finite
/// weight are dropped. Input order is preserved.
#[must_use]
#[instrument(skip(raw), fields(count = raw.len()))]
pub fn normalize(raw: Vec<RawUserAgent>) -> Vec<BrowserUserAgentRecord> {
    let total = raw.len();
    let records = dedup_records(raw.into_iter().filter_map(classify_raw));
    debug!(
        input = total,
        kept = records.len(),
        "normalized user agents"
    );
    records
}

/// Classifies one raw entry into a record, or `None` when it must be dropped.
pub(crate) fn classify_raw(raw: RawUserAgent) -> Option<BrowserUserAgentRecord> {
    if !raw.percent.is_finite() || raw.percent < 0.0 {
        return None;
    }
    let fields = classify(&raw.useragent)?;
    let mut record = BrowserUserAgentRecord::from_classified(fields, raw.percent);
    record.platform = raw.platform;
    Some(record)
}

/// Drops records whose agent string was already seen; first occurrence wins.
pub(crate) fn dedup_records(
    records: impl IntoIterator<Item = BrowserUserAgentRecord>,
) -> Vec<BrowserUserAgentRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.useragent.clone()))
        .collect()
}
