//! Traversal properties over an in-memory page graph

use crate::common::{create_test_config, links, Shared, StaticFetcher};
use linkwade::output::MemoryRecorder;
use linkwade::{CrawlError, Crawler, EngineState};
use std::sync::Arc;
use std::time::Duration;

fn crawler(
    config: &linkwade::Config,
    fetcher: &Arc<StaticFetcher>,
) -> (Crawler<Shared>, Arc<MemoryRecorder>) {
    let recorder = Arc::new(MemoryRecorder::new());
    let crawler = Crawler::new(config, Shared(Arc::clone(fetcher)), recorder.clone()).unwrap();
    (crawler, recorder)
}

#[tokio::test]
async fn test_same_host_end_to_end() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        ("http://a.test/", links(&["/x", "http://b.test/"]).as_str()),
        ("http://a.test/x", "<p>leaf</p>"),
        ("http://b.test/", "<p>external</p>"),
    ]));
    let (crawler, _) = crawler(&create_test_config(1, true), &fetcher);

    let report = crawler.run("http://a.test/").await.unwrap();

    assert_eq!(report.visited, vec!["http://a.test/", "http://a.test/x"]);
    assert_eq!(report.final_state, EngineState::Terminated);
    assert_eq!(fetcher.fetch_count("http://b.test/"), 0);
    assert_eq!(report.stats.links_discarded, 1);
}

#[tokio::test]
async fn test_external_links_followed_without_same_host() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        ("http://a.test/", links(&["/x", "http://b.test/"]).as_str()),
        ("http://a.test/x", "<p>leaf</p>"),
        ("http://b.test/", "<p>external</p>"),
    ]));
    let (crawler, _) = crawler(&create_test_config(1, false), &fetcher);

    let report = crawler.run("http://a.test/").await.unwrap();

    assert_eq!(report.visited.len(), 3);
    assert_eq!(fetcher.fetch_count("http://b.test/"), 1);
}

#[tokio::test]
async fn test_cycle_terminates_and_visits_once() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        ("http://a.test/a", links(&["/b"]).as_str()),
        ("http://a.test/b", links(&["/a", "/b"]).as_str()),
    ]));
    let (crawler, _) = crawler(&create_test_config(10, true), &fetcher);

    let report = crawler.run("http://a.test/a").await.unwrap();

    assert_eq!(report.visited, vec!["http://a.test/a", "http://a.test/b"]);
    assert_eq!(fetcher.fetch_count("http://a.test/a"), 1);
    assert_eq!(fetcher.fetch_count("http://a.test/b"), 1);
    assert_eq!(report.stats.links_duplicate, 2);
    assert_eq!(report.zero_crossings, 1);
}

#[tokio::test]
async fn test_nothing_beyond_max_depth_is_fetched() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        ("http://a.test/0", links(&["/1"]).as_str()),
        ("http://a.test/1", links(&["/2"]).as_str()),
        ("http://a.test/2", links(&["/3"]).as_str()),
        ("http://a.test/3", links(&["/4"]).as_str()),
    ]));
    let (crawler, _) = crawler(&create_test_config(2, true), &fetcher);

    let report = crawler.run("http://a.test/0").await.unwrap();

    assert_eq!(fetcher.fetch_count("http://a.test/2"), 1);
    assert_eq!(fetcher.fetch_count("http://a.test/3"), 0);
    assert_eq!(fetcher.fetch_count("http://a.test/4"), 0);
    assert_eq!(report.stats.pages_fetched, 3);
    assert_eq!(report.stats.depth_dropped, 1);
    // Claimed by its parent, dropped by the driver
    assert!(report.visited.contains(&"http://a.test/3".to_string()));
    assert!(!report.visited.contains(&"http://a.test/4".to_string()));
}

#[tokio::test]
async fn test_contains_tags_filters_anchors() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "http://a.test/",
            r#"<a href="/plain">text only</a>
               <a href="/pic"><img src="/thumb.png"></a>
               <div><img src="/outside.png"></div>"#,
        ),
        ("http://a.test/pic", "<p>picture page</p>"),
        ("http://a.test/plain", "<p>plain page</p>"),
    ]));
    let mut config = create_test_config(1, true);
    config.search.contains_tags = vec!["img".to_string()];
    let (crawler, recorder) = crawler(&config, &fetcher);

    let report = crawler.run("http://a.test/").await.unwrap();

    assert_eq!(report.visited, vec!["http://a.test/", "http://a.test/pic"]);
    assert_eq!(fetcher.fetch_count("http://a.test/plain"), 0);
    assert_eq!(recorder.values(), vec!["/outside.png", "/thumb.png"]);
}

#[tokio::test]
async fn test_wide_fan_out_claims_each_page_once() {
    let hrefs: Vec<String> = (0..40).map(|i| format!("/p{}", i)).collect();
    let all: Vec<&str> = hrefs.iter().map(String::as_str).collect();
    let body = links(&all);

    let mut fetcher = StaticFetcher::new(&[("http://a.test/", body.as_str())]);
    for href in &hrefs {
        fetcher = fetcher.with_page(format!("http://a.test{}", href), body.clone());
    }
    let fetcher = Arc::new(fetcher);
    let (crawler, _) = crawler(&create_test_config(5, true), &fetcher);

    let report = crawler.run("http://a.test/").await.unwrap();

    assert_eq!(report.visited.len(), 41);
    assert_eq!(fetcher.total_fetches(), 41);
    for href in &hrefs {
        assert_eq!(fetcher.fetch_count(&format!("http://a.test{}", href)), 1);
    }
    assert_eq!(report.registered, 41);
    assert_eq!(report.registered, report.completed);
    assert_eq!(report.zero_crossings, 1);
    assert_eq!(report.stats.links_enqueued, 40);
}

#[tokio::test]
async fn test_concurrency_cap_is_respected() {
    let hrefs: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    let all: Vec<&str> = hrefs.iter().map(String::as_str).collect();

    let mut fetcher = StaticFetcher::new(&[("http://a.test/", links(&all).as_str())])
        .with_delay(Duration::from_millis(5));
    for href in &hrefs {
        fetcher = fetcher.with_page(format!("http://a.test{}", href), "<p>leaf</p>");
    }
    let fetcher = Arc::new(fetcher);

    let mut config = create_test_config(1, true);
    config.search.max_concurrent_fetches = Some(3);
    let (crawler, _) = crawler(&config, &fetcher);

    let report = crawler.run("http://a.test/").await.unwrap();

    assert_eq!(report.stats.pages_fetched, 21);
    assert!(fetcher.max_in_flight() <= 3);
    assert_eq!(report.registered, report.completed);
}

#[tokio::test]
async fn test_fetch_failures_still_terminate() {
    let fetcher = Arc::new(StaticFetcher::new(&[(
        "http://a.test/",
        links(&["/missing", "/also-missing"]).as_str(),
    )]));
    let (crawler, _) = crawler(&create_test_config(3, true), &fetcher);

    let report = crawler.run("http://a.test/").await.unwrap();

    assert_eq!(report.stats.pages_fetched, 1);
    assert_eq!(report.stats.fetch_failures, 2);
    assert_eq!(report.registered, 3);
    assert_eq!(report.completed, 3);
    assert_eq!(report.zero_crossings, 1);
}

#[tokio::test]
async fn test_seed_fetch_failure_terminates() {
    let fetcher = Arc::new(StaticFetcher::new(&[]));
    let (crawler, _) = crawler(&create_test_config(3, true), &fetcher);

    let report = crawler.run("http://a.test/").await.unwrap();

    assert_eq!(report.visited, vec!["http://a.test/"]);
    assert_eq!(report.stats.fetch_failures, 1);
    assert_eq!(report.zero_crossings, 1);
}

#[tokio::test]
async fn test_values_recorded_per_page() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "http://a.test/",
            r#"<img src="/one.png"><a href="/x">x</a><img src="/two.png">"#,
        ),
        ("http://a.test/x", r#"<img src="/three.png"><img alt="no src">"#),
    ]));
    let (crawler, recorder) = crawler(&create_test_config(1, true), &fetcher);

    let report = crawler.run("http://a.test/").await.unwrap();

    let records = recorder.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].uri, "http://a.test/");
    assert_eq!(records[0].values, vec!["/one.png", "/two.png"]);
    assert_eq!(records[1].depth, 1);
    assert_eq!(records[1].values, vec!["/three.png"]);
    assert_eq!(report.stats.values_recorded, 3);
}

#[tokio::test]
async fn test_equivalent_links_are_deduplicated() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "http://a.test/",
            links(&["/x", "/x/", "/x#top", "HTTP://WWW.A.TEST/x", "/y/../x"]).as_str(),
        ),
        ("http://a.test/x", "<p>x</p>"),
    ]));
    let (crawler, _) = crawler(&create_test_config(1, true), &fetcher);

    let report = crawler.run("http://a.test/").await.unwrap();

    assert_eq!(report.visited, vec!["http://a.test/", "http://a.test/x"]);
    assert_eq!(fetcher.fetch_count("http://a.test/x"), 1);
    assert_eq!(report.stats.links_duplicate, 4);
}

#[tokio::test]
async fn test_cancel_stops_crawl() {
    let fetcher = Arc::new(
        StaticFetcher::new(&[("http://a.test/", links(&["/slow", "/other"]).as_str())])
            .hang_on("http://a.test/slow")
            .hang_on("http://a.test/other"),
    );
    let (crawler, _) = crawler(&create_test_config(3, true), &fetcher);

    let handle = crawler.start("http://a.test/").unwrap();
    while fetcher.total_fetches() < 3 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(handle.outstanding() > 0);

    handle.cancel();
    let report = tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .expect("cancelled crawl should terminate")
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.final_state, EngineState::Terminated);
    assert_eq!(report.registered, report.completed);
    assert_eq!(report.zero_crossings, 1);
}

#[tokio::test]
async fn test_independent_crawls_share_nothing() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        ("http://a.test/", links(&["/x"]).as_str()),
        ("http://a.test/x", "<p>x</p>"),
        ("http://c.test/", links(&["/z"]).as_str()),
        ("http://c.test/z", "<p>z</p>"),
    ]));
    let (crawler, _) = crawler(&create_test_config(2, true), &fetcher);

    let first = crawler.start("http://a.test/").unwrap();
    let second = crawler.start("http://c.test/").unwrap();
    let (first, second) = tokio::join!(first.join(), second.join());

    assert_eq!(
        first.unwrap().visited,
        vec!["http://a.test/", "http://a.test/x"]
    );
    assert_eq!(
        second.unwrap().visited,
        vec!["http://c.test/", "http://c.test/z"]
    );

    let again = crawler.run("http://a.test/").await.unwrap();
    assert_eq!(again.visited.len(), 2);
    assert_eq!(fetcher.fetch_count("http://a.test/"), 2);
}

#[tokio::test]
async fn test_malformed_seed_is_fatal() {
    let fetcher = Arc::new(StaticFetcher::new(&[]));
    let (crawler, _) = crawler(&create_test_config(1, true), &fetcher);

    let err = crawler.run("ftp://a.test/").await.unwrap_err();

    assert!(matches!(err, CrawlError::Config(_)));
    assert_eq!(fetcher.total_fetches(), 0);
}
