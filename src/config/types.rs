use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Listing Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    /// Extra source label -> canonical field entries, merged over the built-in table
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// The site being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL used to resolve relative links (e.g., "https://www.startup.az")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the first listing page, relative to the base URL
    #[serde(rename = "listing-path")]
    pub listing_path: String,

    /// Query parameter carrying the page number
    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the page size
    #[serde(rename = "page-size-param", default = "default_page_size_param")]
    pub page_size_param: String,

    /// Items per listing page; omitted from URLs when unset
    #[serde(rename = "page-size", default)]
    pub page_size: Option<u32>,

    /// First listing page number to request
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,
}

/// How the crawler moves between listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaginationMode {
    /// Discover the highest page number and walk up to it
    Bounded,
    /// Follow the "next" link until there is none
    FollowNext,
    /// Only the start listing page
    Single,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    #[serde(default = "default_mode")]
    pub mode: PaginationMode,

    /// Hard ceiling on listing pages crawled in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Bound used by bounded discovery when no page numbers are visible
    #[serde(rename = "fallback-page-ceiling", default = "default_fallback_ceiling")]
    pub fallback_page_ceiling: u32,

    /// Attempts per fetch, including the first one
    #[serde(rename = "retry-count", default = "default_retry_count")]
    pub retry_count: u32,

    /// Base of the retry pause; failed attempt n (1-based) waits base + n * `retry-increment-ms`
    #[serde(rename = "retry-base-delay-ms", default = "default_retry_base")]
    pub retry_base_delay_ms: u64,

    #[serde(rename = "retry-increment-ms", default = "default_retry_increment")]
    pub retry_increment_ms: u64,

    /// Politeness delay bounds after every remote fetch (milliseconds)
    #[serde(rename = "politeness-delay-min-ms", default = "default_delay_min")]
    pub politeness_delay_min_ms: u64,

    #[serde(rename = "politeness-delay-max-ms", default = "default_delay_max")]
    pub politeness_delay_max_ms: u64,

    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[serde(rename = "respect-robots-txt", default = "default_true")]
    pub respect_robots_txt: bool,

    /// Minimum paragraph length (characters) for the description backfill
    #[serde(rename = "description-min-chars", default = "default_description_min")]
    pub description_min_chars: usize,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV file
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Optional SQLite database receiving a copy of the rows
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Optional Excel workbook with the same columns as the CSV
    #[serde(rename = "xlsx-path", default)]
    pub xlsx_path: Option<String>,
}

/// CSS selectors describing the site's markup
///
/// Every field has a default matching the markup the harvester was first
/// written against, so most sites only override a handful.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    pub card: String,
    pub card_fallback: String,
    pub card_title: String,
    pub card_text: String,
    pub card_image: String,
    pub pagination: String,
    pub block: String,
    pub block_label: String,
    pub block_value: String,
    pub table_cell: String,
    pub content: String,
    /// Words that mark a "next page" control in aria-label/title attributes
    pub next_labels: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: "div.startup-block a.card".to_string(),
            card_fallback: "a.card.mb-4, a.card".to_string(),
            card_title: ".card-body .card-title".to_string(),
            card_text: ".card-body .card-text".to_string(),
            card_image: "img.card-img-top, img".to_string(),
            pagination: ".pagination".to_string(),
            block: ".process-step-content".to_string(),
            block_label: "h4, h3, strong".to_string(),
            block_value: "p".to_string(),
            table_cell: "div.card-body .row > div, table tr > td, table tr > th".to_string(),
            content: "article.post, main, article".to_string(),
            next_labels: vec!["next".to_string(), "növbəti".to_string()],
        }
    }
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_page_size_param() -> String {
    "per-page".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_mode() -> PaginationMode {
    PaginationMode::FollowNext
}

fn default_max_pages() -> u32 {
    300
}

fn default_fallback_ceiling() -> u32 {
    20
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base() -> u64 {
    1000
}

fn default_retry_increment() -> u64 {
    500
}

fn default_delay_min() -> u64 {
    800
}

fn default_delay_max() -> u64 {
    1600
}

fn default_timeout() -> u64 {
    15
}

fn default_true() -> bool {
    true
}

fn default_description_min() -> usize {
    30
}
