//! Reference-counted termination detection
//!
//! Every work item is registered exactly once before it is dispatched or
//! handed to the frontier, and completed exactly once when it has been
//! processed or dropped. The outstanding count is therefore positive while
//! any work is alive and reaches zero only when the crawl is quiescent. The
//! completion that brings it to zero closes the frontier; since a closed
//! frontier accepts no new items, zero is reached at most once.
//!
//! A registration is held as a [`WorkGuard`]. Completing the guard (or
//! dropping it, e.g. when a task panics or is aborted) reports the completion.

use crate::crawler::frontier::Frontier;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared outstanding-work counter that closes the frontier at quiescence
#[derive(Debug, Clone)]
pub struct TerminationDetector {
    inner: Arc<DetectorInner>,
}

#[derive(Debug)]
struct DetectorInner {
    outstanding: AtomicUsize,
    registered: AtomicU64,
    completed: AtomicU64,
    zero_crossings: AtomicUsize,
    shut_down: AtomicBool,
    frontier: Frontier,
    quiescent: CancellationToken,
}

impl TerminationDetector {
    /// Creates a detector that will close `frontier` when work drains
    pub fn new(frontier: Frontier) -> Self {
        Self {
            inner: Arc::new(DetectorInner {
                outstanding: AtomicUsize::new(0),
                registered: AtomicU64::new(0),
                completed: AtomicU64::new(0),
                zero_crossings: AtomicUsize::new(0),
                shut_down: AtomicBool::new(false),
                frontier,
                quiescent: CancellationToken::new(),
            }),
        }
    }

    /// Registers one unit of outstanding work
    ///
    /// Once the count has returned to zero the crawl is over: a late
    /// registration is reported as an error and returns an inert guard, so
    /// the count never rises again.
    pub fn register(&self) -> WorkGuard {
        if self.inner.shut_down.load(Ordering::SeqCst) {
            tracing::error!("work registered after the crawl reached quiescence, ignoring it");
            return WorkGuard { detector: None };
        }
        self.inner.outstanding.fetch_add(1, Ordering::SeqCst);
        self.inner.registered.fetch_add(1, Ordering::SeqCst);
        WorkGuard {
            detector: Some(self.clone()),
        }
    }

    fn complete(&self) {
        let previous = match self.inner.outstanding.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |outstanding| outstanding.checked_sub(1),
        ) {
            Ok(previous) => previous,
            Err(_) => {
                tracing::error!("work completed with nothing outstanding, ignoring it");
                return;
            }
        };
        self.inner.completed.fetch_add(1, Ordering::SeqCst);

        if previous == 1 {
            self.inner.zero_crossings.fetch_add(1, Ordering::SeqCst);
            self.shutdown();
        }
    }

    fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(
            registered = self.registered(),
            completed = self.completed(),
            "outstanding work reached zero, closing frontier"
        );
        self.inner.frontier.close();
        self.inner.quiescent.cancel();
    }

    /// Number of registered but not yet completed work items
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Total registrations so far
    pub fn registered(&self) -> u64 {
        self.inner.registered.load(Ordering::SeqCst)
    }

    /// Total completions so far
    pub fn completed(&self) -> u64 {
        self.inner.completed.load(Ordering::SeqCst)
    }

    /// How many times a completion brought the counter to zero
    pub fn zero_crossings(&self) -> usize {
        self.inner.zero_crossings.load(Ordering::SeqCst)
    }

    /// True once the counter has returned to zero and the frontier is closed
    pub fn is_quiescent(&self) -> bool {
        self.inner.quiescent.is_cancelled()
    }

    /// Waits until the crawl is quiescent
    pub async fn quiescent(&self) {
        self.inner.quiescent.cancelled().await
    }
}

/// One registered unit of outstanding work
///
/// Completes its registration exactly once: explicitly through
/// [`WorkGuard::complete`], or on drop.
#[derive(Debug)]
#[must_use = "dropping a WorkGuard immediately completes its work item"]
pub struct WorkGuard {
    detector: Option<TerminationDetector>,
}

impl WorkGuard {
    /// Reports this work item as finished
    pub fn complete(mut self) {
        if let Some(detector) = self.detector.take() {
            detector.complete();
        }
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        if let Some(detector) = self.detector.take() {
            detector.complete();
        }
    }
}
