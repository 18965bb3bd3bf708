//! Integration tests for the HTTP fetcher against a mock server.

use std::time::Duration;

use fakeua_core::fetch::{AttemptError, FetchError, FetchPolicy, HttpFetcher};
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_fetcher(attempts: u32) -> HttpFetcher {
    HttpFetcher::with_policy(
        Duration::from_secs(2),
        FetchPolicy::new(attempts, Duration::ZERO),
    )
    .expect("client should build")
}

#[tokio::test]
async fn test_fetch_returns_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fast_fetcher(2)
        .fetch_text(&format!("{}/stats", server.uri()), true)
        .await
        .expect("fetch should succeed");
    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn test_fetch_identifies_tool_in_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header_regex("user-agent", "^fakeua/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    fast_fetcher(1)
        .fetch(&format!("{}/ua", server.uri()), true)
        .await
        .expect("fetch should succeed");
}

#[tokio::test]
async fn test_fetch_retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fast_fetcher(2)
        .fetch_text(&format!("{}/flaky", server.uri()), true)
        .await
        .expect("second attempt should succeed");
    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn test_fetch_exhausts_attempts_on_persistent_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let url = format!("{}/down", server.uri());
    let err = fast_fetcher(3).fetch(&url, true).await.unwrap_err();
    match err {
        FetchError::DataSourceUnavailable {
            url: failed,
            attempts,
            last,
        } => {
            assert_eq!(failed, url);
            assert_eq!(attempts, 3);
            assert!(matches!(last, AttemptError::HttpStatus { status: 500 }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_does_not_retry_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = fast_fetcher(5)
        .fetch(&format!("{}/missing", server.uri()), true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::DataSourceUnavailable {
            attempts: 1,
            last: AttemptError::HttpStatus { status: 404 },
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_retries_rate_limited_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let err = fast_fetcher(2)
        .fetch(&format!("{}/limited", server.uri()), true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::DataSourceUnavailable { attempts: 2, .. }
    ));
}

#[tokio::test]
async fn test_fetch_times_out_slow_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_policy(
        Duration::from_millis(200),
        FetchPolicy::new(1, Duration::ZERO),
    )
    .expect("client should build");
    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()), true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::DataSourceUnavailable {
            last: AttemptError::Timeout,
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_without_tls_verification_still_serves_plain_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("insecure ok"))
        .mount(&server)
        .await;

    let body = fast_fetcher(1)
        .fetch_text(&format!("{}/plain", server.uri()), false)
        .await
        .expect("insecure client should fetch");
    assert_eq!(body, "insecure ok");
}
