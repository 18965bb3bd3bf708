//! The in-memory dataset and its JSON Lines file format.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use super::{BrowserUserAgentRecord, DatasetError};

const BUNDLED_JSONL: &str = include_str!("../../data/browsers.jsonl");

/// An ordered sequence of user agent records.
///
/// Order is whatever the source produced; readers must not depend on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<BrowserUserAgentRecord>,
}

impl Dataset {
    /// Wraps already-normalized records.
    #[must_use]
    pub fn from_records(records: Vec<BrowserUserAgentRecord>) -> Self {
        Self { records }
    }

    /// The pre-built dataset shipped inside the library.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the embedded file fails to decode.
    pub fn bundled() -> Result<Self, DatasetError> {
        Self::from_jsonl_str(BUNDLED_JSONL)
    }

    /// Borrows the records.
    #[must_use]
    pub fn records(&self) -> &[BrowserUserAgentRecord] {
        &self.records
    }

    /// Consumes the dataset, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<BrowserUserAgentRecord> {
        self.records
    }

    /// Iterates over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, BrowserUserAgentRecord> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decodes JSON Lines text. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::InvalidRecord`] when a line is not a valid record
    /// - [`DatasetError::OutOfRange`] when a record breaks the dataset invariants
    pub fn from_jsonl_str(text: &str) -> Result<Self, DatasetError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: BrowserUserAgentRecord = serde_json::from_str(line)
                .map_err(|source| DatasetError::InvalidRecord {
                    line: line_no,
                    source,
                })?;
            if !record.is_valid() {
                return Err(DatasetError::OutOfRange {
                    line: line_no,
                    reason: format!(
                        "useragent must be non-empty, percent and version non-negative (percent={}, version={})",
                        record.percent, record.browser_version_major_minor
                    ),
                });
            }
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Encodes as JSON Lines, one record per line with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Serialize`] if a record can't be encoded
    /// (for example a non-finite weight).
    pub fn to_jsonl_string(&self) -> Result<String, DatasetError> {
        let mut out = String::with_capacity(self.records.len() * 256);
        for record in &self.records {
            let line = serde_json::to_string(record)
                .map_err(|source| DatasetError::Serialize { source })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Reads a JSON Lines dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] when the file can't be read, or a decode
    /// error from [`Dataset::from_jsonl_str`].
    #[instrument(skip(path), fields(path = %path.display()))]
    pub async fn read_jsonl(path: &Path) -> Result<Self, DatasetError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DatasetError::io(path, e))?;
        let dataset = Self::from_jsonl_str(&text)?;
        debug!(records = dataset.len(), "read dataset file");
        Ok(dataset)
    }

    /// Writes the dataset to `path`, replacing any existing file.
    ///
    /// The content is written to a sibling temporary file and renamed into
    /// place, so readers never observe a partially written dataset. Missing
    /// parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] or [`DatasetError::Serialize`].
    #[instrument(skip(self, path), fields(path = %path.display(), records = self.len()))]
    pub async fn write_jsonl(&self, path: &Path) -> Result<(), DatasetError> {
        let body = self.to_jsonl_string()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DatasetError::io(parent, e))?;
        }

        let temp = temp_sibling(path);
        tokio::fs::write(&temp, body)
            .await
            .map_err(|e| DatasetError::io(&temp, e))?;
        if let Err(e) = tokio::fs::rename(&temp, path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(DatasetError::io(path, e));
        }
        debug!("wrote dataset file");
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a BrowserUserAgentRecord;
    type IntoIter = std::slice::Iter<'a, BrowserUserAgentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<BrowserUserAgentRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = BrowserUserAgentRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
