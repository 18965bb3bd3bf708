//! Browser family and version detection from signature tokens.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::util::compile_static_regex;

/// Dotted version capture: major, then optional minor, patch, and patch-minor.
const VERSION: &str = r"(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.(\d+))?";

/// Version components as they appear in the user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionParts {
    /// Major component.
    pub major: String,
    /// Minor component, when present.
    pub minor: Option<String>,
    /// Patch component, when present.
    pub patch: Option<String>,
    /// Fourth component, when present.
    pub patch_minor: Option<String>,
}

impl VersionParts {
    /// Full dotted version, e.g. `"122.0.6261.94"`.
    #[must_use]
    pub fn full(&self) -> String {
        std::iter::once(self.major.as_str())
            .chain(self.minor.as_deref())
            .chain(self.patch.as_deref())
            .chain(self.patch_minor.as_deref())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Major and minor joined, e.g. `"122.0"`, or just the major when no minor exists.
    #[must_use]
    pub fn major_minor(&self) -> String {
        match &self.minor {
            Some(minor) => format!("{}.{minor}", self.major),
            None => self.major.clone(),
        }
    }

    fn from_captures(caps: &Captures<'_>, first: usize) -> Option<Self> {
        let part = |offset: usize| caps.get(first + offset).map(|m| m.as_str().to_string());
        Some(Self {
            major: part(0)?,
            minor: part(1),
            patch: part(2),
            patch_minor: part(3),
        })
    }
}

/// A recognized browser family with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserMatch {
    /// Canonical lowercase family, e.g. `"chrome"`.
    pub family: String,
    /// Version components.
    pub version: VersionParts,
}

static BOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(&format!(
        r"(?i)\b([a-z][a-z-]*(?:bot|crawler|spider))/{VERSION}"
    ))
});

/// Signature rules, checked in order. Chromium derivatives carry a `Chrome/`
/// token too, so they must precede `chrome`; everything WebKit-based carries
/// `Safari/`, so `safari` is last.
static BROWSER_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("edge", format!(r"\b(?:EdgA|EdgiOS|Edge|Edg)/{VERSION}")),
        ("opera", format!(r"\b(?:OPR|OPiOS|OPT)/{VERSION}")),
        ("opera", format!(r"\bOpera/.*\bVersion/{VERSION}")),
        ("opera", format!(r"\bOpera[/ ]{VERSION}")),
        ("samsung internet", format!(r"\bSamsungBrowser/{VERSION}")),
        ("yandex browser", format!(r"\bYaBrowser/{VERSION}")),
        ("vivaldi", format!(r"\bVivaldi/{VERSION}")),
        ("uc browser", format!(r"\bUCBrowser/{VERSION}")),
        ("firefox", format!(r"\b(?:Firefox|FxiOS)/{VERSION}")),
        ("chromium", format!(r"\bChromium/{VERSION}")),
        ("chrome", format!(r"\b(?:CriOS|Chrome)/{VERSION}")),
        ("internet explorer", format!(r"\bMSIE {VERSION}")),
        ("internet explorer", format!(r"\bTrident/.*\brv:{VERSION}")),
        ("safari", format!(r"\bVersion/{VERSION}.*\bSafari/")),
    ]
    .into_iter()
    .map(|(family, pattern)| (family, compile_static_regex(&pattern)))
    .collect()
});

/// Detects the browser family and version, or `None` when no signature matches.
///
/// Self-identified crawlers (`Googlebot/2.1`, `bingbot/2.0`) are reported under
/// their own lowercase name.
#[must_use]
pub fn detect_browser(ua: &str) -> Option<BrowserMatch> {
    if let Some(caps) = BOT_RE.captures(ua) {
        return Some(BrowserMatch {
            family: caps[1].to_lowercase(),
            version: VersionParts::from_captures(&caps, 2)?,
        });
    }

    BROWSER_RULES.iter().find_map(|(family, re)| {
        let caps = re.captures(ua)?;
        Some(BrowserMatch {
            family: (*family).to_string(),
            version: VersionParts::from_captures(&caps, 1)?,
        })
    })
}
