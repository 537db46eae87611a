//! Crawler module for the concurrent frontier traversal
//!
//! This module contains the core crawling logic, including:
//! - The frontier queue and its work items
//! - Reference-counted termination detection
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML extraction of recorded values and candidate links
//! - The per-page fetch task and the traversal driver

mod engine;
mod extractor;
mod fetcher;
mod frontier;
mod task;
mod termination;

pub use engine::{CrawlHandle, CrawlReport, Crawler};
pub use extractor::{Extractor, PageExtract};
pub use fetcher::{build_http_client, fetch_url, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{frontier, Frontier, FrontierReceiver, QueuedItem, WorkItem};
pub use termination::{TerminationDetector, WorkGuard};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl from `seed` over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and compile the selectors
/// 2. Canonicalize and claim the seed
/// 3. Fetch pages, record values and follow links concurrently
/// 4. Return once the outstanding work count has drained to zero
///
/// Recorded values are written to stdout in the configured format.
pub async fn crawl(config: Config, seed: &str) -> Result<CrawlReport, CrawlError> {
    Crawler::from_config(&config)?.run(seed).await
}
