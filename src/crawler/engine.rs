//! Traversal driver - main crawl orchestration logic
//!
//! This module contains the control loop that coordinates a crawl:
//! - Seeding the visited set and the frontier
//! - Dequeuing work items and enforcing the depth bound
//! - Dispatching one fetch task per accepted item
//! - Handling cancellation
//! - Reporting what the crawl did once it has terminated
//!
//! The loop has no notion of "done" of its own. It ends when the frontier
//! reports end-of-stream, which happens once the termination detector has
//! seen the outstanding work count return to zero (or the crawl was
//! cancelled) and the buffered items have been consumed.

use crate::config::{validate, Config, SearchConstraints};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::{frontier, FrontierReceiver, QueuedItem, WorkItem};
use crate::crawler::task::{fetch_and_extract, TaskContext};
use crate::crawler::termination::TerminationDetector;
use crate::output::{CrawlCounters, CrawlStatistics, LineRecorder, Recorder};
use crate::state::{EngineState, VisitedSet};
use crate::url::normalize_url;
use crate::{ConfigError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// Main crawler structure
///
/// Holds everything that stays fixed across crawls: the search constraints,
/// the compiled selectors, the page source and the recorder. Each call to
/// [`Crawler::start`] gets its own visited set, frontier and detector, so
/// crawls started from the same `Crawler` never share state.
pub struct Crawler<F: Fetcher> {
    constraints: SearchConstraints,
    extractor: Arc<Extractor>,
    fetcher: Arc<F>,
    recorder: Arc<dyn Recorder>,
}

impl Crawler<HttpFetcher> {
    /// Creates a crawler that fetches over HTTP and writes values to stdout
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        let recorder = Arc::new(LineRecorder::stdout(config.record.format));
        Self::new(config, fetcher, recorder)
    }
}

impl<F: Fetcher> Crawler<F> {
    /// Creates a crawler from a configuration and its collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration; validated again here
    /// * `fetcher` - Source of page bodies
    /// * `recorder` - Destination of recorded attribute values
    pub fn new(config: &Config, fetcher: F, recorder: Arc<dyn Recorder>) -> Result<Self> {
        validate(config)?;
        let extractor = Extractor::new(&config.search, &config.record)?;

        Ok(Self {
            constraints: config.search.clone(),
            extractor: Arc::new(extractor),
            fetcher: Arc::new(fetcher),
            recorder,
        })
    }

    pub fn constraints(&self) -> &SearchConstraints {
        &self.constraints
    }

    /// Starts a crawl from `seed` in the background
    ///
    /// The seed is canonicalized and claimed in the visited set, then placed
    /// on the frontier without a registration. The driver registers it when
    /// it dequeues it, like it would any item it accepts.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, seed: &str) -> Result<CrawlHandle> {
        let seed_uri = normalize_url(seed)
            .map_err(|e| ConfigError::InvalidSeed(format!("{}: {}", seed, e)))?;

        let visited = Arc::new(VisitedSet::new());
        let (tx, rx) = frontier();
        let detector = TerminationDetector::new(tx.clone());
        let stats = Arc::new(CrawlCounters::new());
        let cancel = CancellationToken::new();

        visited.try_claim(seed_uri.as_str());
        if tx
            .push(QueuedItem::seed(WorkItem::new(seed_uri.clone(), 0)))
            .is_err()
        {
            // Unreachable for a frontier created just above
            tracing::error!("frontier rejected the seed {}", seed_uri);
        }

        let limiter = self
            .constraints
            .max_concurrent_fetches
            .map(|permits| Arc::new(Semaphore::new(permits)));

        let ctx = Arc::new(TaskContext {
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            recorder: Arc::clone(&self.recorder),
            visited: Arc::clone(&visited),
            detector: detector.clone(),
            frontier: tx,
            same_host: self.constraints.same_host,
            limiter,
            stats,
        });

        let driver = Driver {
            ctx,
            rx,
            max_depth: self.constraints.max_depth,
            cancel: cancel.clone(),
            seed: seed_uri.to_string(),
        };

        tracing::info!(
            "Starting crawl from {} (max depth {}, same host: {})",
            seed_uri,
            self.constraints.max_depth,
            self.constraints.same_host
        );

        Ok(CrawlHandle {
            join: tokio::spawn(driver.run()),
            cancel,
            detector,
            visited,
        })
    }

    /// Runs a crawl from `seed` to quiescence
    ///
    /// # Example
    ///
    /// ```no_run
    /// use linkwade::config::load_config;
    /// use linkwade::Crawler;
    /// use std::path::Path;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config(Path::new("crawl.toml"))?;
    /// let report = Crawler::from_config(&config)?.run("https://example.com/").await?;
    /// println!("visited {} pages", report.visited.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, seed: &str) -> Result<CrawlReport> {
        self.start(seed)?.join().await
    }
}

/// Handle to a crawl running in the background
pub struct CrawlHandle {
    join: JoinHandle<Result<CrawlReport>>,
    cancel: CancellationToken,
    detector: TerminationDetector,
    visited: Arc<VisitedSet>,
}

impl CrawlHandle {
    /// Stops dispatching work and aborts in-flight fetches
    ///
    /// The crawl still terminates through the normal path: every pending
    /// registration is completed and the report is produced.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this crawl, for use from another task
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Number of work items registered but not yet completed
    pub fn outstanding(&self) -> usize {
        self.detector.outstanding()
    }

    /// Number of URLs claimed so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Waits for the crawl to terminate
    pub async fn join(self) -> Result<CrawlReport> {
        self.join.await?
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Canonical seed URL
    pub seed: String,

    pub started_at: DateTime<Utc>,

    pub elapsed: Duration,

    pub final_state: EngineState,

    /// True if the crawl was stopped through [`CrawlHandle::cancel`]
    pub cancelled: bool,

    /// Every canonical URL claimed during the crawl, sorted
    pub visited: Vec<String>,

    /// Registrations made with the termination detector
    pub registered: u64,

    /// Completions reported to the termination detector
    pub completed: u64,

    /// Times the outstanding count reached zero; 1 for every finished crawl
    pub zero_crossings: usize,

    pub stats: CrawlStatistics,
}

struct Driver<F: Fetcher> {
    ctx: Arc<TaskContext<F>>,
    rx: FrontierReceiver,
    max_depth: u32,
    cancel: CancellationToken,
    seed: String,
}

impl<F: Fetcher> Driver<F> {
    async fn run(self) -> Result<CrawlReport> {
        let Driver {
            ctx,
            mut rx,
            max_depth,
            cancel,
            seed,
        } = self;

        let started_at = Utc::now();
        let start_time = Instant::now();
        let mut state = EngineState::Running;
        let mut tasks = JoinSet::new();
        let mut cancelled = false;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled(), if !cancelled => {
                    tracing::info!("Crawl cancelled, dropping pending work");
                    cancelled = true;
                    ctx.frontier.close();
                    tasks.abort_all();
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join_error(joined);
                }

                next = rx.recv() => {
                    let Some(queued) = next else {
                        break;
                    };

                    if rx.is_draining() && state == EngineState::Running {
                        state.transition(EngineState::Draining)?;
                        tracing::debug!("Frontier closed, draining buffered items");
                    }

                    dispatch(&ctx, queued, max_depth, cancelled, &mut tasks);
                }
            }
        }

        // Tasks may still be unwinding after completing their registration
        while let Some(joined) = tasks.join_next().await {
            log_join_error(joined);
        }

        state.transition(EngineState::Terminated)?;

        if let Err(e) = ctx.recorder.finish() {
            tracing::warn!("Failed to flush recorder: {}", e);
        }

        let detector = &ctx.detector;
        if detector.registered() != detector.completed() {
            tracing::error!(
                registered = detector.registered(),
                completed = detector.completed(),
                "crawl terminated with unbalanced work accounting"
            );
        }

        let report = CrawlReport {
            seed,
            started_at,
            elapsed: start_time.elapsed(),
            final_state: state,
            cancelled,
            visited: ctx.visited.snapshot(),
            registered: detector.registered(),
            completed: detector.completed(),
            zero_crossings: detector.zero_crossings(),
            stats: ctx.stats.snapshot(),
        };

        tracing::info!(
            "Crawl completed: {} pages visited in {:?}",
            report.visited.len(),
            report.elapsed
        );

        Ok(report)
    }
}

/// Accepts, drops or dispatches one dequeued item
fn dispatch<F: Fetcher>(
    ctx: &Arc<TaskContext<F>>,
    queued: QueuedItem,
    max_depth: u32,
    cancelled: bool,
    tasks: &mut JoinSet<()>,
) {
    let QueuedItem { item, guard } = queued;

    // Only the seed arrives unregistered
    let guard = guard.unwrap_or_else(|| ctx.detector.register());

    if cancelled {
        ctx.stats.cancelled();
        guard.complete();
        return;
    }

    if item.depth() > max_depth {
        tracing::trace!("{} is beyond max depth {}", item.uri(), max_depth);
        ctx.stats.depth_exceeded();
        guard.complete();
        return;
    }

    tasks.spawn(fetch_and_extract(Arc::clone(ctx), item, guard));
}

fn log_join_error(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            tracing::error!("Fetch task panicked: {}", e);
        }
    }
}
