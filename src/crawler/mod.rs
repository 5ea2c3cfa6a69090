//! Crawler module for listing traversal and detail harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry and charset detection
//! - Politeness pacing
//! - Listing card parsing and pagination navigation
//! - Overall harvest coordination

mod charset;
mod coordinator;
mod fetcher;
mod listing;
mod navigator;
mod pacer;

pub use charset::{decode_body, detect_encoding};
pub use coordinator::{CrawlOutcome, Harvester};
pub use fetcher::{build_http_client, is_transient_status, Fetch, FetchedPage, HttpFetcher, RetryPolicy};
pub use listing::{parse_cards, parse_listing, CardSummary, ListingPage};
pub use navigator::{discover_max_page, find_next_link, start_url, Navigator, Step, StopReason};
pub use pacer::Pacer;

use crate::config::Config;

/// Runs a complete harvest over HTTP
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client and compile selectors
/// 2. Consult robots.txt when configured to
/// 3. Walk the listing pages and their detail pages
/// 4. Return the assembled rows and the run report
pub async fn harvest(config: Config) -> crate::Result<CrawlOutcome> {
    Harvester::from_config(config)?.run().await
}
