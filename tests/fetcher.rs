use std::time::Duration;

use httpmock::prelude::*;
use tokio_util::sync::CancellationToken;
use toraba::{
    configuration::{PolitenessSettings, Settings},
    error::ScrapeError,
    services::{FetchPage, Fetcher},
};

const DETAIL_PATH: &str = "/prefectures/tokyo/job_detail/1";

fn settings_for(server: &MockServer, max_retries: u32, timeout_secs: u64) -> Settings {
    let mut settings = Settings::default();
    settings.site.base_url = server.base_url();
    settings.site.target_domain = "127.0.0.1".to_string();
    settings.http.max_retries = max_retries;
    settings.http.timeout_secs = timeout_secs;
    settings.politeness = PolitenessSettings::none();
    settings
}

#[tokio::test]
async fn returns_body_and_sends_browser_headers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(DETAIL_PATH)
                .header_exists("user-agent")
                .header("accept-language", "ja,en-US;q=0.9,en;q=0.8");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html><body>求人</body></html>");
        })
        .await;

    let fetcher = Fetcher::new(&settings_for(&server, 3, 5)).unwrap();
    let body = fetcher
        .fetch(&server.url(DETAIL_PATH), &CancellationToken::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(body, "<html><body>求人</body></html>");
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(DETAIL_PATH);
            then.status(404);
        })
        .await;

    let fetcher = Fetcher::new(&settings_for(&server, 5, 5)).unwrap();
    let result = fetcher
        .fetch(&server.url(DETAIL_PATH), &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(ScrapeError::FetchHttpError { status: 404, .. })
    ));
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn service_unavailable_is_retried_until_exhausted() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(DETAIL_PATH);
            then.status(503);
        })
        .await;

    let fetcher = Fetcher::new(&settings_for(&server, 3, 5)).unwrap();
    let result = fetcher
        .fetch(&server.url(DETAIL_PATH), &CancellationToken::new())
        .await;

    match result {
        Err(ScrapeError::RetriesExhausted { attempts, cause, .. }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*cause, ScrapeError::FetchHttpError { status: 503, .. }));
        }
        other => panic!("expected exhausted retries, got {:?}", other),
    }
    mock.assert_hits_async(3).await;
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(DETAIL_PATH);
            then.status(200)
                .body("<html></html>")
                .delay(Duration::from_secs(3));
        })
        .await;

    let fetcher = Fetcher::new(&settings_for(&server, 2, 1)).unwrap();
    let result = fetcher
        .fetch(&server.url(DETAIL_PATH), &CancellationToken::new())
        .await;

    match result {
        Err(ScrapeError::RetriesExhausted { attempts, cause, .. }) => {
            assert_eq!(attempts, 2);
            assert!(matches!(*cause, ScrapeError::FetchTimeout { .. }));
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn cancelled_token_stops_before_the_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(DETAIL_PATH);
            then.status(200).body("<html></html>");
        })
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let fetcher = Fetcher::new(&settings_for(&server, 3, 5)).unwrap();
    let result = fetcher.fetch(&server.url(DETAIL_PATH), &cancel).await;

    assert!(matches!(result, Err(ScrapeError::Cancelled)));
    mock.assert_hits_async(0).await;
}
