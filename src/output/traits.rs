//! Recorder trait and associated types
//!
//! A recorder receives the attribute values extracted from each fetched page.
//! Recording is a side effect of the crawl: a failing recorder is logged and
//! never changes which pages get visited.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while recording values
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),
}

/// Result type for recording operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Attribute values recorded for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    /// Canonical URL of the page
    pub uri: String,

    /// Depth at which the page was reached
    pub depth: u32,

    /// Recorded attribute values, in document order
    pub values: Vec<String>,
}

/// Destination for recorded attribute values
///
/// Implementations are shared by every fetch task of a crawl and must be
/// safe to call concurrently.
pub trait Recorder: Send + Sync {
    /// Records the values found on one page
    fn record(&self, page: &PageRecord) -> RecordResult<()>;

    /// Flushes any buffered output once the crawl has terminated
    fn finish(&self) -> RecordResult<()> {
        Ok(())
    }
}
