//! Instance-level record filters.

use std::collections::BTreeSet;

use crate::classifier::PlatformType;
use crate::dataset::BrowserUserAgentRecord;

/// Criteria a record must meet to be sampled by an accessor.
///
/// Browser and OS keys are stored canonical and lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    /// Allowed browser keys.
    pub browsers: BTreeSet<String>,
    /// Allowed OS keys, already expanded.
    pub os: BTreeSet<String>,
    /// Allowed device categories.
    pub platforms: BTreeSet<PlatformType>,
    /// Minimum `browser_version_major_minor`, inclusive.
    pub min_version: f64,
    /// Minimum `percent`, inclusive.
    pub min_percentage: f64,
}

impl Filters {
    /// Whether `record` passes every criterion.
    #[must_use]
    pub fn matches(&self, record: &BrowserUserAgentRecord) -> bool {
        self.browsers.contains(&record.browser)
            && self.os.contains(&record.os)
            && self.platforms.contains(&record.platform_type)
            && record.browser_version_major_minor >= self.min_version
            && record.percent >= self.min_percentage
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(browser: &str, os: &str, version: f64, percent: f64) -> BrowserUserAgentRecord {
        BrowserUserAgentRecord {
            useragent: format!("{browser}/{version} ({os})"),
            percent,
            platform_type: PlatformType::Desktop,
            device_brand: None,
            browser: browser.to_string(),
            browser_version: version.to_string(),
            browser_version_major_minor: version,
            os: os.to_string(),
            os_version: None,
            platform: None,
        }
    }

    fn filters() -> Filters {
        Filters {
            browsers: ["chrome".to_string()].into(),
            os: ["win10".to_string()].into(),
            platforms: [PlatformType::Desktop].into(),
            min_version: 100.0,
            min_percentage: 1.0,
        }
    }

    #[test]
    fn test_matches_requires_every_criterion() {
        let f = filters();
        assert!(f.matches(&record("chrome", "win10", 122.0, 2.0)));
        assert!(f.matches(&record("chrome", "win10", 100.0, 1.0)));
        assert!(!f.matches(&record("firefox", "win10", 122.0, 2.0)));
        assert!(!f.matches(&record("chrome", "linux", 122.0, 2.0)));
        assert!(!f.matches(&record("chrome", "win10", 99.9, 2.0)));
        assert!(!f.matches(&record("chrome", "win10", 122.0, 0.5)));

        let mut mobile = record("chrome", "win10", 122.0, 2.0);
        mobile.platform_type = PlatformType::Mobile;
        assert!(!f.matches(&mobile));
    }
}
