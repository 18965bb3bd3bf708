//! User-Agent this crate sends on its own scrape traffic.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/fakeua";

/// Default User-Agent for scrape and cache-server requests (identifies the tool).
#[must_use]
pub(crate) fn default_fetch_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("fakeua/{version} (useragent-dataset-builder; +{PROJECT_UA_URL})")
}
