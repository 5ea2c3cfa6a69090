//! Run report
//!
//! Counters describing what a harvest run did, filled in by the coordinator
//! and printed at the end of the run.

use crate::crawler::StopReason;
use chrono::{DateTime, Utc};

/// Counters for one harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    // Listing pages
    pub listing_pages_crawled: u64,
    pub listing_pages_failed: u64,
    pub listing_pages_blocked: u64,

    // Cards and details
    pub cards_seen: u64,
    pub cards_without_detail: u64,
    pub duplicate_details: u64,
    pub details_fetched: u64,
    pub details_failed: u64,
    pub details_blocked: u64,

    pub rows: u64,
    pub stop_reason: Option<StopReason>,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows that carry only listing data
    pub fn listing_only_rows(&self) -> u64 {
        self.cards_without_detail + self.duplicate_details + self.details_failed + self.details_blocked
    }

    /// Share of detail fetches that succeeded, as a percentage
    pub fn detail_success_rate(&self) -> f64 {
        let attempted = self.details_fetched + self.details_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.details_fetched as f64 / attempted as f64) * 100.0
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }
}

/// Prints the report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Harvest Report ===\n");

    println!("Listing pages:");
    println!("  Crawled: {}", report.listing_pages_crawled);
    println!("  Failed: {}", report.listing_pages_failed);
    if report.listing_pages_blocked > 0 {
        println!("  Blocked by robots.txt: {}", report.listing_pages_blocked);
    }
    println!();

    println!("Cards:");
    println!("  Seen: {}", report.cards_seen);
    println!("  Without detail link: {}", report.cards_without_detail);
    println!("  Duplicate detail link: {}", report.duplicate_details);
    println!();

    println!("Detail pages:");
    println!(
        "  Fetched: {} ({:.1}% success)",
        report.details_fetched,
        report.detail_success_rate()
    );
    println!("  Failed: {}", report.details_failed);
    if report.details_blocked > 0 {
        println!("  Blocked by robots.txt: {}", report.details_blocked);
    }
    println!();

    println!("Rows: {} ({} listing-only)", report.rows, report.listing_only_rows());
    if let Some(reason) = report.stop_reason {
        println!("Stopped: {}", reason);
    }
    if let Some(seconds) = report.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
}
