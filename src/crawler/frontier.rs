//! Frontier queue of pending work items
//!
//! An unbounded multi-producer, single-consumer conduit. Producers are the
//! fetch tasks (and the crawl setup, for the seed); the consumer is the
//! traversal driver. `close` may be called any number of times from any
//! producer; only the first call has an effect. After closing, the consumer
//! still receives whatever was buffered and then observes end-of-stream.

use crate::crawler::termination::WorkGuard;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A pending traversal unit: a canonical URL and the depth it was found at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    uri: Url,
    depth: u32,
}

impl WorkItem {
    /// Creates a work item; `uri` is expected to be canonical already
    pub fn new(uri: Url, depth: u32) -> Self {
        Self { uri, depth }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// A work item for a link found on this page, one level deeper
    pub fn child(&self, uri: Url) -> Self {
        Self {
            uri,
            depth: self.depth + 1,
        }
    }
}

/// A work item as it travels through the frontier
///
/// Items discovered by a fetch task carry the registration made for them
/// before they were enqueued. The seed travels without one; the driver
/// registers it when it dequeues and accepts it.
#[derive(Debug)]
pub struct QueuedItem {
    pub item: WorkItem,
    pub guard: Option<WorkGuard>,
}

impl QueuedItem {
    /// The seed item, not yet registered with the termination detector
    pub fn seed(item: WorkItem) -> Self {
        Self { item, guard: None }
    }

    /// An item registered by the task that discovered it
    pub fn registered(item: WorkItem, guard: WorkGuard) -> Self {
        Self {
            item,
            guard: Some(guard),
        }
    }
}

/// Producer side of the frontier
#[derive(Debug, Clone)]
pub struct Frontier {
    tx: mpsc::UnboundedSender<QueuedItem>,
    closed: Arc<AtomicBool>,
    closed_signal: CancellationToken,
}

/// Consumer side of the frontier, owned by the traversal driver
#[derive(Debug)]
pub struct FrontierReceiver {
    rx: mpsc::UnboundedReceiver<QueuedItem>,
    closed_signal: CancellationToken,
    draining: bool,
}

/// Creates a connected frontier producer/consumer pair
pub fn frontier() -> (Frontier, FrontierReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let closed_signal = CancellationToken::new();

    let producer = Frontier {
        tx,
        closed: Arc::new(AtomicBool::new(false)),
        closed_signal: closed_signal.clone(),
    };
    let consumer = FrontierReceiver {
        rx,
        closed_signal,
        draining: false,
    };

    (producer, consumer)
}

impl Frontier {
    /// Enqueues an item without blocking
    ///
    /// Returns the item back if the frontier has been closed. Dropping the
    /// returned item completes its registration.
    pub fn push(&self, queued: QueuedItem) -> Result<(), QueuedItem> {
        if self.is_closed() {
            return Err(queued);
        }
        self.tx.send(queued).map_err(|rejected| rejected.0)
    }

    /// Closes the frontier; returns true only for the call that closed it
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.closed_signal.cancel();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl FrontierReceiver {
    /// Receives the next item
    ///
    /// Returns `None` once the frontier has been closed and every buffered
    /// item has been handed out. Cancel-safe: no item is lost if the returned
    /// future is dropped before completion.
    pub async fn recv(&mut self) -> Option<QueuedItem> {
        if !self.draining {
            tokio::select! {
                biased;
                _ = self.closed_signal.cancelled() => {
                    // Rejects late sends; buffered items are still returned
                    self.rx.close();
                    self.draining = true;
                }
                queued = self.rx.recv() => return queued,
            }
        }
        self.rx.recv().await
    }

    /// True once the consumer has observed the close and is emptying the buffer
    pub fn is_draining(&self) -> bool {
        self.draining
    }
}
