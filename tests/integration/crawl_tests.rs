//! End-to-end crawls over HTTP
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! fetch, extract and enqueue cycle through the reqwest-backed fetcher.

use crate::common::create_test_config;
use linkwade::config::load_config;
use linkwade::crawler::HttpFetcher;
use linkwade::output::MemoryRecorder;
use linkwade::Crawler;
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

async fn mount(server: &MockServer, page: &str, response: ResponseTemplate, hits: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .expect(hits)
        .mount(server)
        .await;
}

fn http_crawler(config: &linkwade::Config) -> (Crawler<HttpFetcher>, Arc<MemoryRecorder>) {
    let recorder = Arc::new(MemoryRecorder::new());
    let fetcher = HttpFetcher::new(&config.fetcher).unwrap();
    let crawler = Crawler::new(config, fetcher, recorder.clone()).unwrap();
    (crawler, recorder)
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(
        &mock_server,
        "/",
        html(r#"<img src="/logo.png"><a href="/x">x</a><a href="http://b.test/">out</a>"#),
        1,
    )
    .await;
    mount(
        &mock_server,
        "/x",
        html(r#"<a href="/y">deeper</a><a href="/">home</a>"#),
        1,
    )
    .await;
    mount(&mock_server, "/y", html("<p>too deep</p>"), 0).await;

    let (crawler, recorder) = http_crawler(&create_test_config(1, true));
    let report = crawler.run(&format!("{}/", base_url)).await.unwrap();

    assert_eq!(
        report.visited,
        vec![
            format!("{}/", base_url),
            format!("{}/x", base_url),
            format!("{}/y", base_url),
        ]
    );
    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.depth_dropped, 1);
    assert_eq!(report.stats.links_discarded, 1);
    assert_eq!(report.registered, report.completed);
    assert_eq!(recorder.values(), vec!["/logo.png"]);
}

#[tokio::test]
async fn test_empty_and_non_html_responses_count_as_failures() {
    let mock_server = MockServer::start().await;

    mount(
        &mock_server,
        "/",
        html(r#"<a href="/gone">gone</a><a href="/data.json">data</a><a href="/ok">ok</a>"#),
        1,
    )
    .await;
    mount(&mock_server, "/gone", ResponseTemplate::new(404), 1).await;
    mount(
        &mock_server,
        "/data.json",
        ResponseTemplate::new(200).set_body_raw(r#"{"a": 1}"#, "application/json"),
        1,
    )
    .await;
    mount(&mock_server, "/ok", html("<p>fine</p>"), 1).await;

    let (crawler, _) = http_crawler(&create_test_config(2, true));
    let report = crawler
        .run(&format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.fetch_failures, 2);
    assert_eq!(report.visited.len(), 4);
    assert_eq!(report.zero_crossings, 1);
}

#[tokio::test]
async fn test_error_page_links_are_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(
        &mock_server,
        "/",
        ResponseTemplate::new(404).set_body_raw(
            r#"<a href="/x">x</a><img src="/e.png">"#,
            "text/html; charset=utf-8",
        ),
        1,
    )
    .await;
    mount(&mock_server, "/x", html("<p>found</p>"), 1).await;

    let (crawler, recorder) = http_crawler(&create_test_config(1, true));
    let report = crawler.run(&format!("{}/", base_url)).await.unwrap();

    assert_eq!(
        report.visited,
        vec![format!("{}/", base_url), format!("{}/x", base_url)]
    );
    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.fetch_failures, 0);
    assert_eq!(recorder.values(), vec!["/e.png"]);
}

#[tokio::test]
async fn test_redirected_page_is_followed() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", html(r#"<a href="/old">old</a>"#), 1).await;
    mount(
        &mock_server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", "/new"),
        1,
    )
    .await;
    mount(&mock_server, "/new", html("<p>moved here</p>"), 1).await;

    let (crawler, _) = http_crawler(&create_test_config(1, true));
    let report = crawler
        .run(&format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.fetch_failures, 0);
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let mock_server = MockServer::start().await;

    mount(
        &mock_server,
        "/",
        html(r#"<a href="/a"><img src="/a.png"></a><a href="/b">b</a>"#),
        1,
    )
    .await;
    mount(&mock_server, "/a", html(r#"<img src="/a-full.png">"#), 1).await;
    mount(&mock_server, "/b", html("<p>b</p>"), 0).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[search]
depth = 3
same-host = true
contains-tags = ["img"]

[record]
tags = ["img"]
attr = "src"
format = "json"

[fetcher]
timeout-secs = 5
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    let (crawler, recorder) = http_crawler(&config);
    let report = crawler
        .run(&format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(report.visited.len(), 2);
    assert_eq!(recorder.values(), vec!["/a-full.png", "/a.png"]);
}
