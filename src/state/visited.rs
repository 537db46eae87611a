//! Set of canonical URLs already scheduled for processing

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Monotonically growing set of claimed URLs, shared by all fetch tasks
///
/// `try_claim` is the single synchronization point that prevents a URL from
/// being scheduled twice: the membership test and the insert happen under one
/// lock acquisition.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `uri`, returning true iff it had not been claimed before
    pub fn try_claim(&self, uri: &str) -> bool {
        let mut visited = self.lock();
        if visited.contains(uri) {
            return false;
        }
        visited.insert(uri.to_string())
    }

    /// Returns true if `uri` has already been claimed
    pub fn contains(&self, uri: &str) -> bool {
        self.lock().contains(uri)
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted copy of every claimed URL
    pub fn snapshot(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.lock().iter().cloned().collect();
        uris.sort();
        uris
    }

    // Poisoning cannot leave the set half-updated
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
