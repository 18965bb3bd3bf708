//! Offline conversion of the Intoli `user-agents.json` corpus into a dataset.
//!
//! The corpus holds tens of thousands of entries, so classification runs on a
//! rayon pool bounded by the available cores. Workers are stateless; results
//! are joined once every worker has finished and then deduplicated.
//!
//! ```no_run
//! use fakeua_core::Settings;
//! use fakeua_core::convert::{ConvertInput, ConvertOptions, run};
//! use fakeua_core::fetch::HttpFetcher;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpFetcher::new(&Settings::default())?;
//! let input = ConvertInput::Url(fakeua_core::convert::DEFAULT_SOURCE_URL.to_string());
//! let summary = run(&input, "browsers.jsonl".as_ref(), &ConvertOptions::default(), &fetcher).await?;
//! println!("wrote {} of {} agents", summary.written, summary.parsed);
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::ConvertError;

use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::classifier::PlatformType;
use crate::dataset::{
    BrowserUserAgentRecord, Dataset, RawUserAgent, classify_raw, dedup_records,
};
use crate::fetch::HttpFetcher;

/// Default download location of the corpus.
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/intoli/user-agents/main/src/user-agents.json.gz";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One corpus entry. Other keys in the source are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceItem {
    /// The user agent string.
    pub user_agent: String,
    /// Sampling probability, a fraction of one.
    pub weight: f64,
    /// Device category label (`desktop`, `mobile`, `tablet`).
    #[serde(default)]
    pub device_category: Option<String>,
    /// Navigator platform.
    #[serde(default)]
    pub platform: Option<String>,
}

/// Where the corpus comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertInput {
    /// A local JSON (or gzipped JSON) file.
    File(PathBuf),
    /// A URL to download.
    Url(String),
}

/// Conversion knobs.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Only convert the first `limit` entries.
    pub limit: Option<usize>,
    /// Worker count; defaults to the available cores.
    pub threads: Option<usize>,
}

/// Counts reported after a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Entries read from the corpus (after the limit).
    pub parsed: usize,
    /// Records written.
    pub written: usize,
}

/// Decodes corpus bytes, transparently inflating gzip.
///
/// # Errors
///
/// Returns [`ConvertError::Gzip`] or [`ConvertError::Json`].
pub fn decode_source(bytes: &[u8]) -> Result<Vec<SourceItem>, ConvertError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut json = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut json)
            .map_err(|source| ConvertError::Gzip { source })?;
        return serde_json::from_slice(&json).map_err(|source| ConvertError::Json { source });
    }
    serde_json::from_slice(bytes).map_err(|source| ConvertError::Json { source })
}

/// Reads the corpus from disk or downloads it.
///
/// # Errors
///
/// Returns [`ConvertError::Io`], [`ConvertError::Fetch`], or a decode error.
#[instrument(skip(fetcher))]
pub async fn load_source(
    input: &ConvertInput,
    fetcher: &HttpFetcher,
) -> Result<Vec<SourceItem>, ConvertError> {
    let bytes = match input {
        ConvertInput::File(path) => tokio::fs::read(path)
            .await
            .map_err(|source| ConvertError::Io {
                path: path.clone(),
                source,
            })?,
        ConvertInput::Url(url) => fetcher.fetch(url, true).await?,
    };
    let items = decode_source(&bytes)?;
    info!(items = items.len(), "loaded source corpus");
    Ok(items)
}

/// Classifies corpus entries in parallel and deduplicates the result.
///
/// `percent` is `weight * 100`. The device category label from the corpus is
/// kept when recognized, otherwise the classifier's category is used.
///
/// # Errors
///
/// Returns [`ConvertError::Pool`] if the worker pool can't be created.
#[instrument(skip(items), fields(items = items.len()))]
pub fn convert_items(
    items: Vec<SourceItem>,
    threads: Option<usize>,
) -> Result<Vec<BrowserUserAgentRecord>, ConvertError> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|source| ConvertError::Pool { source })?;
    debug!(threads = pool.current_num_threads(), "classification pool ready");

    let converted: Vec<BrowserUserAgentRecord> =
        pool.install(|| items.into_par_iter().filter_map(convert_item).collect());
    Ok(dedup_records(converted))
}

fn convert_item(item: SourceItem) -> Option<BrowserUserAgentRecord> {
    let category = item
        .device_category
        .as_deref()
        .and_then(|label| label.parse::<PlatformType>().ok());
    let mut record = classify_raw(RawUserAgent {
        useragent: item.user_agent,
        percent: item.weight * 100.0,
        platform: item.platform,
    })?;
    if let Some(category) = category {
        record.platform_type = category;
    }
    Some(record)
}

/// Loads, converts, and writes the corpus to `output` as JSON Lines.
///
/// # Errors
///
/// Returns any [`ConvertError`] from loading, classification, or writing.
#[instrument(skip(output, fetcher, options), fields(output = %output.display()))]
pub async fn run(
    input: &ConvertInput,
    output: &Path,
    options: &ConvertOptions,
    fetcher: &HttpFetcher,
) -> Result<ConvertSummary, ConvertError> {
    let mut items = load_source(input, fetcher).await?;
    if let Some(limit) = options.limit {
        items.truncate(limit);
    }
    let parsed = items.len();

    let threads = options.threads;
    let records = tokio::task::spawn_blocking(move || convert_items(items, threads))
        .await
        .map_err(|source| ConvertError::Worker { source })??;

    let dataset = Dataset::from_records(records);
    dataset.write_jsonl(output).await?;
    info!(parsed, written = dataset.len(), "conversion complete");
    Ok(ConvertSummary {
        parsed,
        written: dataset.len(),
    })
}
