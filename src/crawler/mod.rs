//! Crawler module for record acquisition
//!
//! This module contains the crawl pipeline, including:
//! - HTTP fetching streamed into atomic store writes
//! - Sequential, rate-limited stage execution with per-item failure isolation
//! - Lounge discovery from stored airport records
//! - The two-stage pipeline tying them together

mod discovery;
mod fetcher;
mod pipeline;
mod runner;

pub use discovery::{
    dedupe_lounges, discover_lounge_work, resolve_lounge_work, snapshot_records, LoungeRef,
    StoredRecord,
};
pub use fetcher::{build_http_client, FetchCause, FetchError, Fetcher};
pub use pipeline::Crawler;
pub use runner::{run_stage, FailedItem, StageOptions, StageReport, WorkItem};
