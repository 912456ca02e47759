//! Two-stage crawl pipeline
//!
//! Stage one fetches one record per directory airport. Stage two discovers
//! lounge ids by re-reading the stored airport records and fetches one record
//! per lounge. Each stage is a separate entry point, safe to re-run: with
//! skip-existing enabled a re-run only fetches what is still missing.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::discovery::{dedupe_lounges, discover_lounge_work, LoungeRef};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::runner::{run_stage, StageOptions, StageReport, WorkItem};
use crate::directory::AirportDirectory;
use crate::store::{FsStore, RecordStore};
use crate::AtlasError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main crawl pipeline structure
pub struct Crawler {
    settings: CrawlerConfig,
    base_url: Url,
    fetcher: Fetcher,
    airports: Arc<dyn RecordStore>,
    lounges: Arc<dyn RecordStore>,
}

impl Crawler {
    /// Creates a crawler writing to the filesystem stores named in `config`
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run either stage
    /// * `Err(AtlasError)` - Bad base URL or HTTP client setup failure
    pub fn new(config: &Config) -> Result<Self, AtlasError> {
        let fetcher = Fetcher::from_config(config)?;
        let airports = Arc::new(FsStore::new(config.storage.airports_path()));
        let lounges = Arc::new(FsStore::new(config.storage.lounges_path()));
        Self::with_stores(config.crawler.clone(), fetcher, airports, lounges)
    }

    /// Creates a crawler over arbitrary store backends
    pub fn with_stores(
        settings: CrawlerConfig,
        fetcher: Fetcher,
        airports: Arc<dyn RecordStore>,
        lounges: Arc<dyn RecordStore>,
    ) -> Result<Self, AtlasError> {
        let base_url = Url::parse(&settings.base_url)?;
        Ok(Self {
            settings,
            base_url,
            fetcher,
            airports,
            lounges,
        })
    }

    /// Overrides the configured skip-existing policy
    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.settings.skip_existing = skip_existing;
        self
    }

    /// Work list for stage one, one item per directory airport in table order
    pub fn airport_work(&self, directory: &AirportDirectory) -> Vec<WorkItem> {
        directory
            .iter()
            .map(|airport| self.endpoint("airport", &airport.code))
            .collect()
    }

    /// Work list for stage two, one item per discovered lounge
    pub fn lounge_work(&self, lounges: &[LoungeRef]) -> Vec<WorkItem> {
        lounges
            .iter()
            .map(|lounge| self.endpoint("lounge", &lounge.id))
            .collect()
    }

    /// Runs stage one: fetches every directory airport's record
    pub async fn run_airports(&self, directory: &AirportDirectory) -> Result<StageReport, AtlasError> {
        self.airports.ensure_ready()?;

        let items = self.airport_work(directory);
        let options = self.stage_options(self.settings.airport_delay_ms);

        Ok(run_stage("airports", &items, &self.fetcher, self.airports.as_ref(), &options).await)
    }

    /// Runs stage two: discovers lounges in the stored airport records and fetches them
    ///
    /// Without any stored airport records this completes with no work.
    pub async fn run_lounges(&self) -> Result<StageReport, AtlasError> {
        let mut lounges = discover_lounge_work(self.airports.as_ref())?;
        if self.settings.dedupe_lounges {
            let before = lounges.len();
            lounges = dedupe_lounges(lounges);
            tracing::info!(
                "Collapsed {} duplicate lounge ids",
                before - lounges.len()
            );
        }

        self.lounges.ensure_ready()?;

        let items = self.lounge_work(&lounges);
        let options = self.stage_options(self.settings.lounge_delay_ms);

        Ok(run_stage("lounges", &items, &self.fetcher, self.lounges.as_ref(), &options).await)
    }

    /// Runs stage one, then stage two
    pub async fn run_all(
        &self,
        directory: &AirportDirectory,
    ) -> Result<(StageReport, StageReport), AtlasError> {
        let airports = self.run_airports(directory).await?;
        let lounges = self.run_lounges().await?;
        Ok((airports, lounges))
    }

    fn stage_options(&self, delay_ms: u64) -> StageOptions {
        StageOptions {
            delay: Duration::from_millis(delay_ms),
            skip_existing: self.settings.skip_existing,
        }
    }

    /// `{base}/api/{kind}/{id}`, with `id` percent-encoded as one path segment
    ///
    /// A `.` or `..` id is appended verbatim: URL parsing resolves it away, so
    /// the item yields no record id and fails instead of aliasing `{kind}`.
    fn endpoint(&self, kind: &str, id: &str) -> WorkItem {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", kind]);
        }

        if matches!(id, "." | "..") {
            return WorkItem::new(format!("{}/{}", url, id));
        }

        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        WorkItem::new(url.to_string())
    }
}
