use crate::output::traits::{PageRecord, RecordResult, Recorder};
use std::sync::Mutex;

/// Recorder that keeps every page record in memory
///
/// Useful for embedding the crawler in another program, and in tests.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    records: Mutex<Vec<PageRecord>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all records so far, sorted by URI
    pub fn records(&self) -> Vec<PageRecord> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        records.sort_by(|a, b| a.uri.cmp(&b.uri));
        records
    }

    /// All recorded values across pages, sorted
    pub fn values(&self) -> Vec<String> {
        let mut values: Vec<String> = self
            .records()
            .into_iter()
            .flat_map(|record| record.values)
            .collect();
        values.sort();
        values
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, page: &PageRecord) -> RecordResult<()> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(page.clone());
        Ok(())
    }
}
