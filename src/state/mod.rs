//! State module for tracking crawl progress
//!
//! `CrawlState` holds the page pointer, visited sets and accumulated rows of
//! one harvest run.

mod crawl_state;

pub use crawl_state::CrawlState;
