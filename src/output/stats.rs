//! Crawl statistics
//!
//! Fetch tasks bump shared atomic counters while the crawl runs; a
//! [`CrawlStatistics`] snapshot is taken once the driver has terminated.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every task of one crawl
#[derive(Debug, Default)]
pub struct CrawlCounters {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    depth_dropped: AtomicU64,
    cancelled_dropped: AtomicU64,
    links_enqueued: AtomicU64,
    links_duplicate: AtomicU64,
    links_discarded: AtomicU64,
    values_recorded: AtomicU64,
    record_failures: AtomicU64,
}

/// Point-in-time copy of the crawl counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStatistics {
    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Fetches that ended in an error
    pub fetch_failures: u64,

    /// Items dropped for exceeding the maximum depth
    pub depth_dropped: u64,

    /// Items dropped because the crawl was cancelled
    pub cancelled_dropped: u64,

    /// New links claimed and enqueued
    pub links_enqueued: u64,

    /// Links that resolved to an already claimed URL
    pub links_duplicate: u64,

    /// Links rejected by resolution (malformed, no host, external host)
    pub links_discarded: u64,

    /// Attribute values handed to the recorder
    pub values_recorded: u64,

    /// Recorder calls that failed
    pub record_failures: u64,
}

impl CrawlCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn depth_exceeded(&self) {
        self.depth_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cancelled(&self) {
        self.cancelled_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn link_enqueued(&self) {
        self.links_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn link_duplicate(&self) {
        self.links_duplicate.fetch_add(1, Ordering::Relaxed);
    }

    pub fn link_discarded(&self) {
        self.links_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.record_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn values_recorded(&self, count: usize) {
        self.values_recorded
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Takes a snapshot of the counters
    pub fn snapshot(&self) -> CrawlStatistics {
        CrawlStatistics {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            depth_dropped: self.depth_dropped.load(Ordering::Relaxed),
            cancelled_dropped: self.cancelled_dropped.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            links_duplicate: self.links_duplicate.load(Ordering::Relaxed),
            links_discarded: self.links_discarded.load(Ordering::Relaxed),
            values_recorded: self.values_recorded.load(Ordering::Relaxed),
            record_failures: self.record_failures.load(Ordering::Relaxed),
        }
    }
}

impl CrawlStatistics {
    /// Pages that were dispatched to a fetch task
    pub fn pages_attempted(&self) -> u64 {
        self.pages_fetched + self.fetch_failures
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Pages:");
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Failed: {}", stats.fetch_failures);
    println!("  Dropped (depth): {}", stats.depth_dropped);
    if stats.cancelled_dropped > 0 {
        println!("  Dropped (cancelled): {}", stats.cancelled_dropped);
    }
    println!();

    println!("Links:");
    println!("  Enqueued: {}", stats.links_enqueued);
    println!("  Already seen: {}", stats.links_duplicate);
    println!("  Discarded: {}", stats.links_discarded);
    println!();

    println!("Recorded values: {}", stats.values_recorded);
    if stats.record_failures > 0 {
        println!("Recorder failures: {}", stats.record_failures);
    }

    let attempted = stats.pages_attempted();
    let success_rate = if attempted > 0 {
        (stats.pages_fetched as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully fetched)",
        success_rate, stats.pages_fetched, attempted
    );
}
