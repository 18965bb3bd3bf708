//! User agent classification.
//!
//! Turns a raw user agent string into the structured fields stored in
//! dataset records: browser family and version, canonical operating system,
//! device category, and manufacturer. Classification is pure and
//! deterministic, so it can run on worker threads without coordination.
//!
//! A user agent without any recognizable browser signature, or whose browser
//! version has no numeric major component, is rejected with `None`.

mod browser;
mod device;
mod os;

pub use browser::{BrowserMatch, VersionParts, detect_browser};
pub use device::{PlatformType, UnknownPlatform, detect_brand, detect_platform};
pub use os::{OsMatch, canonicalize_os, detect_os};

use std::sync::LazyLock;

use regex::Regex;

use crate::util::compile_static_regex;

static BRACKETED_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\[.*?\]"));

/// Structured fields derived from one user agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFields {
    /// Cleaned user agent string.
    pub useragent: String,
    /// Lowercase browser family.
    pub browser: String,
    /// Full dotted browser version.
    pub browser_version: String,
    /// Major and minor version as a number, e.g. `122.0`.
    pub browser_version_major_minor: f64,
    /// Canonical OS short name, e.g. `"win10"`.
    pub os: String,
    /// OS version, when present.
    pub os_version: Option<String>,
    /// Device category.
    pub platform_type: PlatformType,
    /// Device manufacturer, when known.
    pub device_brand: Option<String>,
}

/// Removes bracketed fragments (`[FBAN/...]` style app tags) and backslashes.
///
/// ```
/// use fakeua_core::classifier::clean_useragent;
///
/// assert_eq!(
///     clean_useragent(r" Mozilla/5.0 (iPhone) [FBAN/FBIOS;FBAV/1.0] Safari\/604.1 "),
///     "Mozilla/5.0 (iPhone)  Safari/604.1"
/// );
/// ```
#[must_use]
pub fn clean_useragent(raw: &str) -> String {
    BRACKETED_RE.replace_all(raw, "").replace('\\', "").trim().to_string()
}

/// Classifies `raw`, returning `None` when the agent can't be recognized.
///
/// # Example
///
/// ```
/// use fakeua_core::classifier::{PlatformType, classify};
///
/// let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
///           (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
/// let fields = classify(ua).unwrap();
/// assert_eq!(fields.browser, "chrome");
/// assert_eq!(fields.os, "win10");
/// assert_eq!(fields.platform_type, PlatformType::Desktop);
/// ```
#[must_use]
pub fn classify(raw: &str) -> Option<ClassifiedFields> {
    let useragent = clean_useragent(raw);
    if useragent.is_empty() {
        return None;
    }

    let browser = detect_browser(&useragent)?;
    let browser_version_major_minor: f64 = browser.version.major_minor().parse().ok()?;
    if !browser_version_major_minor.is_finite() {
        return None;
    }
    let os = detect_os(&useragent);

    Some(ClassifiedFields {
        browser_version: browser.version.full(),
        browser_version_major_minor,
        os: canonicalize_os(&os.family, os.version.as_deref()),
        os_version: os.version,
        platform_type: detect_platform(&useragent),
        device_brand: detect_brand(&useragent),
        browser: browser.family,
        useragent,
    })
}
