//! Crawl stage runner
//!
//! A stage drives an ordered list of work items through the fetcher one at a
//! time. Each item either is skipped (already stored), fetched, or recorded as
//! failed; one item's failure never stops the stage. A fixed pause follows
//! every network call so at most one request is outstanding and the upstream
//! API sees a steady, polite request rate.

use crate::crawler::fetcher::{FetchCause, FetchError, Fetcher};
use crate::store::{entity_id_from_url, RecordStore};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// How often progress is logged, in items
const PROGRESS_INTERVAL: usize = 50;

/// One unit of work: a URL whose body becomes one stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
}

impl WorkItem {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The record id this item is stored under, if the URL yields one
    pub fn id(&self) -> Option<String> {
        entity_id_from_url(&self.url)
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Per-stage settings
#[derive(Debug, Clone)]
pub struct StageOptions {
    /// Pause after each network call, successful or not
    pub delay: Duration,

    /// Skip items whose record already exists, without any request
    pub skip_existing: bool,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            skip_existing: true,
        }
    }
}

/// An item that could not be stored, with the reason
#[derive(Debug)]
pub struct FailedItem {
    pub item: WorkItem,
    pub error: FetchError,
}

/// Outcome of one stage run
#[derive(Debug)]
pub struct StageReport {
    /// Stage name used in logs ("airports", "lounges")
    pub stage: String,

    /// Items handled: `fetched + skipped + failed.len()`
    pub processed: usize,

    /// Items fetched and stored during this run
    pub fetched: usize,

    /// Items skipped because their record already existed
    pub skipped: usize,

    /// Items that failed, in processing order
    pub failed: Vec<FailedItem>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StageReport {
    fn new(stage: &str) -> Self {
        let now = Utc::now();
        Self {
            stage: stage.to_string(),
            processed: 0,
            fetched: 0,
            skipped: 0,
            failed: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Items that ended with a stored record (fetched or already present)
    pub fn succeeded(&self) -> usize {
        self.fetched + self.skipped
    }

    /// True when no item failed
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Runs one crawl stage over `items`, strictly in order
///
/// # Arguments
///
/// * `stage` - Stage name for logs and the report
/// * `items` - Work items, processed sequentially
/// * `fetcher` - Performs the network requests
/// * `store` - Destination for the fetched records
/// * `options` - Delay and skip-existing policy
///
/// # Returns
///
/// A report of what was fetched, skipped, and failed. Failures are recorded,
/// never propagated.
pub async fn run_stage(
    stage: &str,
    items: &[WorkItem],
    fetcher: &Fetcher,
    store: &dyn RecordStore,
    options: &StageOptions,
) -> StageReport {
    let mut report = StageReport::new(stage);
    tracing::info!("Starting {} stage with {} items", stage, items.len());

    for item in items {
        report.processed += 1;

        let Some(id) = item.id() else {
            tracing::warn!("No usable record id in {}, skipping item", item.url);
            report.failed.push(FailedItem {
                item: item.clone(),
                error: FetchError::new(item.url.clone(), FetchCause::InvalidId),
            });
            continue;
        };

        if options.skip_existing && store.exists(&id) {
            tracing::debug!("Skipping download: {} already exists", id);
            report.skipped += 1;
        } else {
            match fetcher.fetch_into(&item.url, &id, store).await {
                Ok(_) => {
                    tracing::info!("Downloaded and saved: {}", id);
                    report.fetched += 1;
                }
                Err(error) => {
                    tracing::warn!("Error downloading {}: {}", item.url, error.cause);
                    report.failed.push(FailedItem {
                        item: item.clone(),
                        error,
                    });
                }
            }

            if !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
        }

        if report.processed % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress ({}): {}/{} items, {} fetched, {} skipped, {} failed",
                stage,
                report.processed,
                items.len(),
                report.fetched,
                report.skipped,
                report.failed.len()
            );
        }
    }

    report.finished_at = Utc::now();
    tracing::info!(
        "Finished {} stage: {} processed, {} fetched, {} skipped, {} failed in {}ms",
        stage,
        report.processed,
        report.fetched,
        report.skipped,
        report.failed.len(),
        report.elapsed().num_milliseconds()
    );

    report
}
