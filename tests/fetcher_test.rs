//! Integration tests for Fetcher using wiremock

mod common;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use ccdc::crawler::{Fetcher, RateLimiter};
use ccdc::error::FetchError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{test_fetcher, test_fetcher_with_timeout};

/// Requests carry the configured user agent
#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", "ccdc-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = test_fetcher()
        .fetch_text(&format!("{}/page", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<html>ok</html>");
}

/// Non-2xx responses become server errors carrying the status
#[tokio::test]
async fn test_fetch_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/gone", server.uri());
    let result = test_fetcher().fetch_text(&url).await;

    match result {
        Err(FetchError::ServerError { status, url: failed }) => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_server_error_is_recoverable_kind() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_fetcher().fetch_text(&server.uri()).await.unwrap_err();

    assert!(err.is_recoverable());
}

/// Slow responses hit the explicit request timeout
#[tokio::test]
async fn test_fetch_timeout() {
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

    let result = test_fetcher_with_timeout(Duration::from_millis(200))
        .fetch_text(&format!("{}/slow", server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::Timeout(_))));
}

/// Clones share the limiter, so the bucket is process-wide
#[tokio::test]
async fn test_clones_share_limiter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let limiter = Arc::new(RateLimiter::per_minute(NonZeroU32::new(5).unwrap()));
    let fetcher = Fetcher::new("ccdc-test/1.0", Duration::from_secs(5), limiter).unwrap();
    let clone = fetcher.clone();

    fetcher.fetch_text(&server.uri()).await.unwrap();
    clone.fetch_text(&server.uri()).await.unwrap();

    assert_eq!(fetcher.limiter().available().await, 3);
    assert!(Arc::ptr_eq(fetcher.limiter(), clone.limiter()));
}
