//! Harvest coordinator - main pipeline orchestration
//!
//! This module contains the main harvest loop that coordinates all aspects
//! of one run, including:
//! - Walking the listing chain sequentially, page by page
//! - Spawning a bounded pool of workers for detail-page fetches
//! - Funneling every outcome through one committer task that owns the sink
//!
//! A listing fetch that exhausts its retry budget is fatal; a failed detail
//! fetch only costs that one record.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_html, FetchError, RetryPolicy};
use crate::crawler::traversal::{parse_listing, Traversal};
use crate::extract::{harvest_record, NormalizedBook};
use crate::storage::{IngestOutcome, IngestSink, SqliteStore};
use crate::Result;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, error, info, warn};
use url::Url;

/// Counters for one harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Listing pages walked
    pub pages_visited: u64,

    /// Unique detail-page links discovered
    pub items_discovered: u64,

    /// Records written as new rows
    pub books_inserted: u64,

    /// Records rewritten in place (upsert mode only)
    pub books_updated: u64,

    /// Detail pages that failed to fetch and were skipped
    pub item_failures: u64,

    /// Records that failed to write and were skipped
    pub ingest_failures: u64,

    /// Distinct genre labels resolved during the run
    pub genres_resolved: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// What a detail-page worker hands to the committer
enum WorkerOutcome {
    Record { url: Url, book: NormalizedBook },
    Failed { url: Url, error: FetchError },
}

#[derive(Debug, Default)]
struct WalkTally {
    pages_visited: u64,
    items_discovered: u64,
}

#[derive(Debug, Default)]
struct CommitTally {
    books_inserted: u64,
    books_updated: u64,
    item_failures: u64,
    ingest_failures: u64,
    genres_resolved: u64,
}

/// Orchestrates the listing walk and the detail-fetch worker pool
pub struct Coordinator {
    client: Client,
    retry: RetryPolicy,
    currency_symbol: String,
    fetch_permits: Arc<Semaphore>,
    queue_capacity: usize,
    shutdown: watch::Receiver<bool>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `shutdown` - Flag flipped to `true` when the run should stop early
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SweepError)` - Failed to build the HTTP client
    pub fn new(config: &Config, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let client = build_http_client(&config.site, &config.crawler)?;

        Ok(Self {
            client,
            retry: RetryPolicy::from_config(&config.crawler),
            currency_symbol: config.site.currency_symbol.clone(),
            fetch_permits: Arc::new(Semaphore::new(config.crawler.fetch_workers as usize)),
            queue_capacity: config.crawler.queue_capacity as usize,
            shutdown,
        })
    }

    /// Runs the harvest to completion
    ///
    /// Consumes the coordinator; a new one is built for each run.
    pub async fn run(
        mut self,
        start_url: Url,
        sink: IngestSink<SqliteStore>,
    ) -> Result<HarvestReport> {
        info!("Starting harvest from {}", start_url);
        let started = Instant::now();

        let (tx, rx) = mpsc::channel(self.queue_capacity);

        // Single-writer rule: the committer owns the sink, workers only
        // ever send outcomes through the channel.
        let committer = tokio::spawn(run_committer(rx, sink));

        let walk = self.walk_listings(start_url, tx).await;

        // The walk returning drops the last sender once in-flight workers
        // finish, so the committer drains the queue and exits on its own.
        // Await it before surfacing a walk error to keep queued records.
        let commits = committer.await?;
        let walk = walk?;

        let report = HarvestReport {
            pages_visited: walk.pages_visited,
            items_discovered: walk.items_discovered,
            books_inserted: commits.books_inserted,
            books_updated: commits.books_updated,
            item_failures: commits.item_failures,
            ingest_failures: commits.ingest_failures,
            genres_resolved: commits.genres_resolved,
            elapsed: started.elapsed(),
        };

        info!(
            "Harvest complete in {:.1}s: {} pages walked, {} items found, {} inserted, {} updated",
            report.elapsed.as_secs_f64(),
            report.pages_visited,
            report.items_discovered,
            report.books_inserted,
            report.books_updated,
        );
        if report.item_failures > 0 || report.ingest_failures > 0 {
            warn!(
                "{} items failed to fetch and {} records failed to write",
                report.item_failures, report.ingest_failures
            );
        }

        Ok(report)
    }

    /// Walks the listing chain, spawning one worker per discovered item
    ///
    /// A listing fetch error propagates; the retry budget has already been
    /// spent inside `fetch_html` by the time it surfaces here.
    async fn walk_listings(
        &mut self,
        start_url: Url,
        tx: mpsc::Sender<WorkerOutcome>,
    ) -> Result<WalkTally> {
        let mut traversal = Traversal::new();
        let mut current = Some(start_url);

        while let Some(page_url) = current.take() {
            if *self.shutdown.borrow() {
                info!("Shutdown requested, stopping the listing walk");
                break;
            }

            if !traversal.visit_listing(&page_url) {
                warn!(
                    "Next links loop back to {}, stopping the listing walk",
                    page_url
                );
                break;
            }

            debug!("Fetching listing page {}", page_url);
            let body = fetch_html(&self.client, &page_url, self.retry).await?;
            let listing = parse_listing(&body, &page_url);
            debug!(
                "Listing {} yielded {} item links",
                page_url,
                listing.items.len()
            );

            for item_url in listing.items {
                if *self.shutdown.borrow() {
                    break;
                }
                if !traversal.discover_item(&item_url) {
                    debug!("Item {} already queued, skipping", item_url);
                    continue;
                }

                // Backpressure: a worker slot must free up before the next
                // detail fetch is spawned.
                let Ok(permit) = Arc::clone(&self.fetch_permits).acquire_owned().await else {
                    break;
                };

                let client = self.client.clone();
                let retry = self.retry;
                let currency_symbol = self.currency_symbol.clone();
                let tx = tx.clone();
                let shutdown = self.shutdown.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    harvest_item(client, retry, item_url, currency_symbol, tx, shutdown).await;
                });
            }

            // Progress reporting every 10 listing pages
            if traversal.listings_visited() % 10 == 0 {
                info!(
                    "Progress: {} listing pages walked, {} items discovered",
                    traversal.listings_visited(),
                    traversal.items_discovered()
                );
            }

            current = listing.next;
        }

        Ok(WalkTally {
            pages_visited: traversal.listings_visited(),
            items_discovered: traversal.items_discovered(),
        })
    }
}

/// Fetches one detail page, extracts and normalizes its fields, and
/// reports the outcome to the committer
async fn harvest_item(
    client: Client,
    retry: RetryPolicy,
    url: Url,
    currency_symbol: String,
    tx: mpsc::Sender<WorkerOutcome>,
    mut shutdown: watch::Receiver<bool>,
) {
    if *shutdown.borrow() {
        return;
    }

    let fetched = tokio::select! {
        result = fetch_html(&client, &url, retry) => result,
        _ = shutdown.changed() => {
            debug!("Abandoning in-flight fetch of {}", url);
            return;
        }
    };

    let outcome = match fetched {
        Ok(body) => WorkerOutcome::Record {
            book: harvest_record(&body, &currency_symbol),
            url,
        },
        Err(error) => WorkerOutcome::Failed { url, error },
    };

    if tx.send(outcome).await.is_err() {
        debug!("Committer is gone, dropping a worker outcome");
    }
}

/// Receives worker outcomes and writes records through the sink
///
/// This is the only task that touches the store. Write failures are
/// counted and logged per record; they never stop the drain.
async fn run_committer(
    mut rx: mpsc::Receiver<WorkerOutcome>,
    mut sink: IngestSink<SqliteStore>,
) -> CommitTally {
    let mut tally = CommitTally::default();

    while let Some(outcome) = rx.recv().await {
        match outcome {
            WorkerOutcome::Record { url, book } => match sink.ingest(&book) {
                Ok(IngestOutcome::Inserted(id)) => {
                    tally.books_inserted += 1;
                    debug!("Ingested '{}' from {} as book {}", book.title, url, id);
                }
                Ok(IngestOutcome::Updated(id)) => {
                    tally.books_updated += 1;
                    debug!("Refreshed '{}' from {} as book {}", book.title, url, id);
                }
                Err(e) => {
                    tally.ingest_failures += 1;
                    error!("Failed to write record from {}: {}", url, e);
                }
            },
            WorkerOutcome::Failed { url, error } => {
                tally.item_failures += 1;
                warn!("Skipping item {}: {}", url, error);
            }
        }
    }

    tally.genres_resolved = sink.genres_resolved() as u64;
    tally
}

/// Runs one complete harvest with the given configuration
///
/// This function orchestrates the entire pipeline:
///
/// 1. Open (or create) the SQLite store at the configured path
/// 2. Build the ingestion sink in the configured write mode
/// 3. Walk the listing chain from the start URL
/// 4. Fetch, extract and normalize each discovered detail page
/// 5. Commit each record individually through the sink
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `shutdown` - Flag flipped to `true` when the run should stop early
///
/// # Returns
///
/// * `Ok(HarvestReport)` - Counters for the completed (or cancelled) run
/// * `Err(SweepError)` - Setup failed, or a listing page stayed
///   unreachable through the whole retry budget
///
/// # Example
///
/// ```no_run
/// use shelf_sweep::config::load_config;
/// use shelf_sweep::crawler::run_harvest;
/// use std::path::Path;
/// use tokio::sync::watch;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let (_shutdown_tx, shutdown_rx) = watch::channel(false);
/// let report = run_harvest(config, shutdown_rx).await?;
/// println!("Ingested {} books", report.books_inserted);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config, shutdown: watch::Receiver<bool>) -> Result<HarvestReport> {
    let start_url = Url::parse(&config.site.start_url)?;
    let store = SqliteStore::open(Path::new(&config.output.database_path))?;
    let sink = IngestSink::new(store, config.ingest.mode)?;
    let coordinator = Coordinator::new(&config, shutdown)?;
    coordinator.run(start_url, sink).await
}
