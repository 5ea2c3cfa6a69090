/// Per-run crawl state
///
/// Owned by a single harvest run and dropped with it.
use crate::dataset::Row;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct CrawlState {
    /// Listing URL about to be fetched, None once pagination is exhausted
    pub current_page: Option<String>,

    /// Number of listing iterations started so far
    pub pages_crawled: u32,

    visited_details: HashSet<String>,
    visited_listings: HashSet<String>,
    rows: Vec<Row>,
}

impl CrawlState {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            current_page: Some(start_url.into()),
            ..Self::default()
        }
    }

    /// Records a detail URL; returns false when it was already visited
    pub fn mark_detail_visited(&mut self, url: &str) -> bool {
        self.visited_details.insert(url.to_string())
    }

    pub fn is_detail_visited(&self, url: &str) -> bool {
        self.visited_details.contains(url)
    }

    /// Records a listing URL; returns false when it was already visited
    pub fn mark_listing_visited(&mut self, url: &str) -> bool {
        self.visited_listings.insert(url.to_string())
    }

    pub fn is_listing_visited(&self, url: &str) -> bool {
        self.visited_listings.contains(url)
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}
