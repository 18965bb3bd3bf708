//! The canonical dataset record.

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifiedFields, PlatformType};

/// One distinct user agent with its usage weight and classified fields.
///
/// Serialized as one JSON object per line in the dataset file. Field names
/// match the published `browsers.jsonl` schema, so `platform_type` is
/// written as `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserUserAgentRecord {
    /// The user agent string; unique within a dataset.
    pub useragent: String,
    /// Usage weight, not necessarily normalized to 100.
    pub percent: f64,
    /// Device category.
    #[serde(rename = "type")]
    pub platform_type: PlatformType,
    /// Device manufacturer.
    #[serde(default)]
    pub device_brand: Option<String>,
    /// Lowercase browser family.
    pub browser: String,
    /// Full dotted browser version.
    pub browser_version: String,
    /// Numeric major.minor projection of `browser_version`.
    pub browser_version_major_minor: f64,
    /// Canonical OS short name.
    pub os: String,
    /// OS version.
    #[serde(default)]
    pub os_version: Option<String>,
    /// Navigator platform (e.g. `Win32`), when the source provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl BrowserUserAgentRecord {
    /// Builds a record from classifier output and a usage weight.
    #[must_use]
    pub fn from_classified(fields: ClassifiedFields, percent: f64) -> Self {
        Self {
            useragent: fields.useragent,
            percent,
            platform_type: fields.platform_type,
            device_brand: fields.device_brand,
            browser: fields.browser,
            browser_version: fields.browser_version,
            browser_version_major_minor: fields.browser_version_major_minor,
            os: fields.os,
            os_version: fields.os_version,
            platform: None,
        }
    }

    /// Checks the record invariants: non-empty agent, non-negative finite
    /// weight and version.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.useragent.is_empty()
            && self.percent.is_finite()
            && self.percent >= 0.0
            && self.browser_version_major_minor.is_finite()
            && self.browser_version_major_minor >= 0.0
    }
}
