//! Integration tests for the scrape pipeline and the cache-aware loader.
//!
//! A mock server plays the statistics page, the per-browser agent pages and
//! the cache server.

use std::path::Path;
use std::time::Duration;

use fakeua_core::dataset::{CacheState, DatasetLoader, Scraper, SourceError};
use fakeua_core::settings::AgentPageFormat;
use fakeua_core::{Dataset, PlatformType, Settings};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
const FIREFOX_WIN: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0";
const FIREFOX_LINUX: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0";

fn catalog_page(rows: &[(&str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(name, pct)| {
            format!(
                "<tr><td><a href=\"browsers_{}.asp\">{name}</a></td><td class=\"right\">{pct} %</td></tr>\n",
                name.to_lowercase()
            )
        })
        .collect();
    format!(
        "<html><body><table class=\"w3-table-all notranslate\">\n<tr><th>Browser</th><th>Share</th></tr>\n{body}</table></body></html>"
    )
}

fn agent_page(agents: &[&str]) -> String {
    let links: String = agents
        .iter()
        .map(|ua| format!("<li><a href='/pages/useragentstring.php'>{ua}</a></li>\n"))
        .collect();
    format!("<html><div id='liste'><ul>\n{links}<li><a href='/pages/useragentstring.php'>More Chrome user agents</a></li></ul></div></html>")
}

fn table_page(rows: &[(&str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(ua, hw)| {
            format!("<tr>\n<td class=\"useragent\"><a href=\"/detect/x\">{ua}</a></td>\n<td>Software</td>\n<td>OS</td>\n<td>{hw}</td>\n<td>Common</td>\n</tr>\n")
        })
        .collect();
    format!(
        "<html><table class=\"table table-striped table-hover table-bordered table-useragents\">\n<tr><th>User agent</th><th>Software</th><th>OS</th><th>Hardware</th><th>Popularity</th></tr>\n{body}</table></html>"
    )
}

fn test_settings(server: &MockServer, data_path: &Path) -> Settings {
    Settings {
        browsers_stats_page: format!("{}/stats", server.uri()),
        browser_base_page: format!("{}/ua?name=", server.uri()),
        cache_server: format!("{}/cache", server.uri()),
        http_timeout: Duration::from_secs(2),
        http_retries: 1,
        http_delay: Duration::ZERO,
        request_delay: Duration::ZERO,
        data_path: data_path.to_path_buf(),
        ..Settings::default()
    }
}

async fn mount_stats(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(catalog_page(&[("Chrome", "60.0"), ("Firefox", "40.0")])),
        )
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_agents(server: &MockServer, browser: &str, agents: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(query_param("name", browser))
        .respond_with(ResponseTemplate::new(200).set_body_string(agent_page(agents)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scrape_builds_classified_weighted_records() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    mount_stats(&server, 1).await;
    mount_agents(&server, "Chrome", &[CHROME_WIN, CHROME_MAC]).await;
    mount_agents(&server, "Firefox", &[FIREFOX_WIN, FIREFOX_LINUX]).await;

    let scraper = Scraper::new(test_settings(&server, &dir.path().join("ua.jsonl")))
        .expect("scraper should build");
    let dataset = scraper.scrape().await.expect("scrape should succeed");

    assert_eq!(dataset.len(), 4);
    let chrome_win = dataset
        .iter()
        .find(|r| r.useragent == CHROME_WIN)
        .expect("chrome record");
    assert_eq!(chrome_win.browser, "chrome");
    assert_eq!(chrome_win.os, "win10");
    assert_eq!(chrome_win.platform_type, PlatformType::Desktop);
    assert!((chrome_win.percent - 30.0).abs() < 1e-9);

    let firefox_linux = dataset
        .iter()
        .find(|r| r.useragent == FIREFOX_LINUX)
        .expect("firefox record");
    assert_eq!(firefox_linux.os, "linux");
    assert!((firefox_linux.percent - 20.0).abs() < 1e-9);
    assert!(dataset.iter().all(|r| !r.useragent.contains("More")));
}

async fn mount_table_page(server: &MockServer, slug: &str, page: u32, rows: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path(format!("/useragents/{slug}/{page}")))
        .and(query_param("order_by", "-times_seen"))
        .respond_with(ResponseTemplate::new(200).set_body_string(table_page(rows)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_table_scrape_ranks_rows_across_three_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    mount_stats(&server, 1).await;
    let chrome_old = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";
    let chrome_mobile = "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Mobile Safari/537.36";
    mount_table_page(&server, "chrome", 1, &[(CHROME_MAC, "Computer"), (chrome_mobile, "Mobile")]).await;
    mount_table_page(&server, "chrome", 2, &[(CHROME_WIN, "Computer")]).await;
    mount_table_page(&server, "chrome", 3, &[(chrome_old, "Computer")]).await;
    mount_table_page(&server, "firefox", 1, &[(FIREFOX_LINUX, "Computer")]).await;
    mount_table_page(&server, "firefox", 2, &[(FIREFOX_WIN, "Computer")]).await;
    mount_table_page(&server, "firefox", 3, &[]).await;

    let settings = Settings {
        browser_base_page: format!("{}/useragents/", server.uri()),
        agent_page_format: AgentPageFormat::Table,
        browsers_count_limit: 2,
        ..test_settings(&server, &dir.path().join("ua.jsonl"))
    };
    let scraper = Scraper::new(settings).expect("scraper should build");
    let dataset = scraper.scrape().await.expect("table scrape should succeed");

    let paged: Vec<_> = server
        .received_requests()
        .await
        .expect("request recording is on")
        .into_iter()
        .filter(|req| req.url.query() == Some("order_by=-times_seen"))
        .collect();
    assert_eq!(paged.len(), 6);

    let agents: Vec<&str> = dataset.iter().map(|r| r.useragent.as_str()).collect();
    assert_eq!(agents.len(), 4);
    assert!(agents.contains(&CHROME_WIN));
    assert!(agents.contains(&CHROME_MAC));
    assert!(!agents.contains(&chrome_old));
    assert!(!agents.contains(&chrome_mobile));
    let chrome_win = dataset
        .iter()
        .find(|r| r.useragent == CHROME_WIN)
        .expect("chrome record");
    assert!((chrome_win.percent - 30.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_table_scrape_fails_when_a_page_fails() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    mount_stats(&server, 1).await;
    mount_table_page(&server, "chrome", 1, &[(CHROME_WIN, "Computer")]).await;
    Mock::given(method("GET"))
        .and(path("/useragents/chrome/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let settings = Settings {
        browser_base_page: format!("{}/useragents/", server.uri()),
        agent_page_format: AgentPageFormat::Table,
        ..test_settings(&server, &dir.path().join("ua.jsonl"))
    };
    let scraper = Scraper::new(settings).expect("scraper should build");
    let err = scraper.scrape().await.unwrap_err();
    assert!(matches!(err, SourceError::Fetch(_)), "got {err:?}");
}

#[tokio::test]
async fn test_scrape_is_all_or_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    mount_stats(&server, 1).await;
    mount_agents(&server, "Chrome", &[CHROME_WIN]).await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(query_param("name", "Firefox"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scraper = Scraper::new(test_settings(&server, &dir.path().join("ua.jsonl")))
        .expect("scraper should build");
    let err = scraper.scrape().await.unwrap_err();
    assert!(matches!(err, SourceError::Fetch(_)), "got {err:?}");
}

#[tokio::test]
async fn test_scrape_fails_on_layout_change() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>redesigned</html>"))
        .mount(&server)
        .await;

    let scraper = Scraper::new(test_settings(&server, &dir.path().join("ua.jsonl")))
        .expect("scraper should build");
    let err = scraper.scrape().await.unwrap_err();
    assert!(matches!(err, SourceError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_load_persists_then_reads_cache() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let data_path = dir.path().join("nested").join("ua.jsonl");
    mount_stats(&server, 1).await;
    mount_agents(&server, "Chrome", &[CHROME_WIN, CHROME_MAC]).await;
    mount_agents(&server, "Firefox", &[FIREFOX_WIN]).await;

    let loader = DatasetLoader::new(test_settings(&server, &data_path))
        .expect("loader should build")
        .use_remote_fallback(false);
    assert_eq!(loader.state(), CacheState::Uncached);

    let first = loader.load().await.expect("first load scrapes");
    assert_eq!(loader.state(), CacheState::Cached);
    let second = loader.load().await.expect("second load reads the cache");
    assert_eq!(first, second);

    let on_disk = Dataset::read_jsonl(&data_path)
        .await
        .expect("cache should be valid JSON Lines");
    assert_eq!(on_disk, first);
}

#[tokio::test]
async fn test_load_without_cache_never_touches_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let data_path = dir.path().join("ua.jsonl");
    mount_stats(&server, 2).await;
    mount_agents(&server, "Chrome", &[CHROME_WIN]).await;
    mount_agents(&server, "Firefox", &[FIREFOX_WIN]).await;

    let loader = DatasetLoader::new(test_settings(&server, &data_path))
        .expect("loader should build")
        .cache(false);
    loader.load().await.expect("load should scrape");
    loader.load().await.expect("load should scrape again");
    assert!(!data_path.exists());
}

#[tokio::test]
async fn test_update_replaces_cached_dataset() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let data_path = dir.path().join("ua.jsonl");
    mount_stats(&server, 1).await;
    mount_agents(&server, "Chrome", &[CHROME_WIN]).await;
    mount_agents(&server, "Firefox", &[FIREFOX_WIN]).await;

    Dataset::bundled()
        .expect("bundled data is valid")
        .write_jsonl(&data_path)
        .await
        .expect("seed cache");

    let loader = DatasetLoader::new(test_settings(&server, &data_path))
        .expect("loader should build")
        .use_remote_fallback(false);
    let updated = loader.update().await.expect("update should scrape");

    assert_eq!(updated.len(), 2);
    let cached = loader.load().await.expect("reads fresh cache");
    assert_eq!(cached, updated);
}

#[tokio::test]
async fn test_remote_fallback_legacy_payload() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let data_path = dir.path().join("ua.jsonl");
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let legacy = serde_json::json!({
        "browsers": { "chrome": [CHROME_WIN, CHROME_MAC], "firefox": [FIREFOX_WIN] },
        "randomize": { "0": "chrome", "1": "chrome", "2": "firefox" }
    });
    Mock::given(method("GET"))
        .and(path("/cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string(legacy.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let loader = DatasetLoader::new(test_settings(&server, &data_path)).expect("loader should build");
    let dataset = loader.load().await.expect("remote fallback should succeed");

    assert_eq!(dataset.len(), 3);
    let firefox = dataset
        .iter()
        .find(|r| r.browser == "firefox")
        .expect("firefox record");
    assert!((firefox.percent - 0.1).abs() < 1e-9);
    assert_eq!(loader.state(), CacheState::Cached);
}

#[tokio::test]
async fn test_remote_fallback_jsonl_payload() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let bundled = Dataset::bundled().expect("bundled data is valid");
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cache"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(bundled.to_jsonl_string().expect("encode bundled")),
        )
        .mount(&server)
        .await;

    let loader = DatasetLoader::new(test_settings(&server, &dir.path().join("ua.jsonl")))
        .expect("loader should build");
    let dataset = loader.load().await.expect("remote fallback should succeed");
    assert_eq!(dataset, bundled);
}

#[tokio::test]
async fn test_every_source_failing_is_data_unavailable() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let data_path = dir.path().join("ua.jsonl");
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let loader = DatasetLoader::new(test_settings(&server, &data_path)).expect("loader should build");
    let err = loader.load().await.unwrap_err();
    assert!(err.reason.contains("remote fallback failed"), "{}", err.reason);
    assert!(matches!(err.source, SourceError::Fetch(_)));
    assert!(!data_path.exists());
}

#[tokio::test]
async fn test_disabled_remote_fallback_is_not_contacted() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cache"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let loader = DatasetLoader::new(test_settings(&server, &dir.path().join("ua.jsonl")))
        .expect("loader should build")
        .use_remote_fallback(false);
    let err = loader.load().await.unwrap_err();
    assert!(err.reason.contains("disabled"));
}
