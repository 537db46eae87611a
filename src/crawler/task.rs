//! Fetch/extract task: the unit of concurrent work
//!
//! One task runs per accepted work item. It fetches the page, records the
//! configured attribute values, then claims, registers and enqueues every
//! unseen link. The registration it was handed is completed exactly once on
//! every path out of the task.

use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, QueuedItem, WorkItem};
use crate::crawler::termination::{TerminationDetector, WorkGuard};
use crate::output::{CrawlCounters, PageRecord, Recorder};
use crate::state::VisitedSet;
use crate::url::resolve_reference;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Everything a fetch task shares with its siblings
pub(crate) struct TaskContext<F> {
    pub fetcher: Arc<F>,
    pub extractor: Arc<Extractor>,
    pub recorder: Arc<dyn Recorder>,
    pub visited: Arc<VisitedSet>,
    pub detector: TerminationDetector,
    pub frontier: Frontier,
    pub same_host: bool,
    pub limiter: Option<Arc<Semaphore>>,
    pub stats: Arc<CrawlCounters>,
}

/// Processes one work item; `guard` is its registration
pub(crate) async fn fetch_and_extract<F: Fetcher>(
    ctx: Arc<TaskContext<F>>,
    item: WorkItem,
    guard: WorkGuard,
) {
    // Held until the task ends
    let _permit = match &ctx.limiter {
        Some(limiter) => match Arc::clone(limiter).acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                guard.complete();
                return;
            }
        },
        None => None,
    };

    tracing::info!("fetching {} @ depth {}", item.uri(), item.depth());

    let page = match ctx.fetcher.fetch(item.uri()).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("failed to fetch {}: {}", item.uri(), e);
            ctx.stats.fetch_failed();
            guard.complete();
            return;
        }
    };
    ctx.stats.page_fetched();

    if page.final_url != *item.uri() {
        tracing::debug!("{} redirected to {}", item.uri(), page.final_url);
    }

    // The parsed document is not Send; keep it out of any await
    let extract = ctx.extractor.extract(&page.body);

    let record = PageRecord {
        uri: item.uri().to_string(),
        depth: item.depth(),
        values: extract.values,
    };
    match ctx.recorder.record(&record) {
        Ok(()) => ctx.stats.values_recorded(record.values.len()),
        Err(e) => {
            tracing::warn!("failed to record values for {}: {}", item.uri(), e);
            ctx.stats.record_failed();
        }
    }

    for href in &extract.links {
        let candidate = match resolve_reference(item.uri(), href, ctx.same_host) {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::trace!("discarding link {:?} on {}: {}", href, item.uri(), e);
                ctx.stats.link_discarded();
                continue;
            }
        };

        if !ctx.visited.try_claim(candidate.as_str()) {
            ctx.stats.link_duplicate();
            continue;
        }

        let child_guard = ctx.detector.register();
        let child = item.child(candidate);
        tracing::debug!("enqueueing {} @ depth {}", child.uri(), child.depth());

        // Our own registration is still held, so the frontier cannot be
        // closed by quiescence here; a rejection means the crawl was cancelled
        if let Err(rejected) = ctx.frontier.push(QueuedItem::registered(child, child_guard)) {
            tracing::debug!("frontier closed, dropping {}", rejected.item.uri());
            ctx.stats.cancelled();
            continue;
        }
        ctx.stats.link_enqueued();
    }

    guard.complete();
}
