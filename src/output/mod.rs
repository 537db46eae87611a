//! Output module for recorded values and crawl statistics
//!
//! This module handles:
//! - Recording attribute values extracted from each page
//! - Writing them as text or JSON lines
//! - Counting what the crawl did and printing a summary

mod memory;
pub mod stats;
mod traits;
mod writer;

pub use memory::MemoryRecorder;
pub use stats::{print_statistics, CrawlCounters, CrawlStatistics};
pub use traits::{PageRecord, RecordError, RecordResult, Recorder};
pub use writer::LineRecorder;
