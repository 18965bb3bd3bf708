//! Error types for dataset persistence and loading.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fetch::FetchError;
use crate::parser::ParseError;

/// Errors reading, writing, or decoding a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// File system error on the dataset file.
    #[error("IO error on dataset file {path}: {source}")]
    Io {
        /// The dataset path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON Lines entry could not be decoded.
    #[error("invalid dataset record on line {line}: {source}")]
    InvalidRecord {
        /// 1-based line number.
        line: usize,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A decoded record breaks a dataset invariant (empty agent, negative weight or version).
    #[error("dataset record on line {line} is out of range: {reason}")]
    OutOfRange {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// The legacy `{"browsers": .., "randomize": ..}` payload is malformed.
    #[error("invalid legacy dataset payload: {reason}")]
    InvalidLegacyPayload {
        /// What was wrong.
        reason: String,
    },

    /// A record could not be encoded.
    #[error("failed to serialize dataset record: {source}")]
    Serialize {
        /// The underlying encode error.
        #[source]
        source: serde_json::Error,
    },
}

impl DatasetError {
    /// Creates an IO error for `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates an invalid legacy payload error.
    pub fn legacy(reason: impl Into<String>) -> Self {
        Self::InvalidLegacyPayload {
            reason: reason.into(),
        }
    }
}

/// A failure of one data source inside the load pipeline.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A fetch failed after retries.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// An upstream page no longer matches the extraction markers.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The cached or remote dataset could not be read or decoded.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// The load pipeline could not produce a dataset from any source.
#[derive(Debug, Error)]
#[error("user agent data unavailable: {reason}")]
pub struct DataUnavailable {
    /// Which sources were tried and how they failed.
    pub reason: String,
    /// The last source failure.
    #[source]
    pub source: SourceError,
}

impl DataUnavailable {
    /// Creates a `DataUnavailable` error.
    pub fn new(reason: impl Into<String>, source: impl Into<SourceError>) -> Self {
        Self {
            reason: reason.into(),
            source: source.into(),
        }
    }
}
