//! Error types for the offline converter.

use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::fetch::FetchError;

/// Errors converting an upstream corpus into a dataset file.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input file could not be read.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// The input path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Downloading the corpus failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The gzip stream is corrupt.
    #[error("corrupt gzip stream: {source}")]
    Gzip {
        /// The underlying decode error.
        #[source]
        source: std::io::Error,
    },

    /// The corpus is not a JSON array of user agent entries.
    #[error("invalid source corpus: {source}")]
    Json {
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The worker pool could not be created.
    #[error("failed to start classification workers: {source}")]
    Pool {
        /// The underlying pool error.
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    /// The classification task panicked or was cancelled.
    #[error("classification task failed: {source}")]
    Worker {
        /// The join error.
        #[source]
        source: tokio::task::JoinError,
    },

    /// Writing the output dataset failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
