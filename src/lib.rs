//! Listing Harvester: a polite listing-and-detail scraper
//!
//! This crate walks a paginated listing site, follows every card to its
//! detail page, extracts semi-structured fields, maps source-language labels
//! onto canonical column names and assembles a tabular dataset.

pub mod config;
pub mod crawler;
pub mod dataset;
pub mod extract;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Listing Harvester operations
///
/// Only conditions that prevent a crawl from starting, or its results from
/// being written, surface here. Per-page failures are logged and counted.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// A fetch that failed after exhausting its retry budget
///
/// Callers treat this as "item unavailable": the page or detail is skipped
/// and the crawl continues.
#[derive(Debug, Clone, Error)]
#[error("Giving up on {url} after {attempts} attempt(s): {reason}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    pub reason: String,
}

/// Result type alias for Listing Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOutcome, Fetch, Harvester, HttpFetcher};
pub use dataset::{assemble, FieldMap, Row};
pub use extract::{DetailExtractor, LabelNormalizer};
