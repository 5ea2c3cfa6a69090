//! Harvest coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties everything together:
//! - Consulting robots.txt once per run
//! - Walking listing pages as the navigator directs
//! - Fetching each card's detail page (once per URL)
//! - Extracting, normalizing and assembling rows
//! - Pacing every remote fetch and counting every skip

use crate::config::Config;
use crate::crawler::fetcher::{Fetch, HttpFetcher};
use crate::crawler::listing::{parse_listing, CardSummary, ListingPage};
use crate::crawler::navigator::{Navigator, Step, StopReason};
use crate::crawler::pacer::Pacer;
use crate::dataset::{assemble, Row};
use crate::extract::{DetailExtractor, LabelNormalizer, SelectorSet};
use crate::output::CrawlReport;
use crate::robots::RobotsGate;
use crate::state::CrawlState;
use crate::Result;
use chrono::Utc;
use url::Url;

/// Rows of a finished run and the counters describing it
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub rows: Vec<Row>,
    pub report: CrawlReport,
}

/// The crawl-and-extract engine
///
/// Generic over the fetch capability so tests can run it against in-memory
/// pages.
pub struct Harvester<F: Fetch> {
    config: Config,
    fetcher: F,
    selectors: SelectorSet,
    extractor: DetailExtractor,
    base_url: Url,
    pacer: Pacer,
}

impl Harvester<HttpFetcher> {
    /// Builds a harvester that fetches over HTTP
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Self::new(config, fetcher)
    }
}

impl<F: Fetch> Harvester<F> {
    /// Compiles selectors and the label table for `config`
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - A selector, URL or label table was invalid
    pub fn new(config: Config, fetcher: F) -> Result<Self> {
        let selectors = SelectorSet::from_config(&config.selectors)?;
        let labels = LabelNormalizer::with_overrides(&config.labels)?;
        let base_url = Url::parse(&config.site.base_url)?;
        let extractor = DetailExtractor::new(
            selectors.clone(),
            labels,
            config.crawler.description_min_chars,
            base_url.clone(),
        );
        let pacer = Pacer::from_config(&config.crawler);

        Ok(Self {
            config,
            fetcher,
            selectors,
            extractor,
            base_url,
            pacer,
        })
    }

    /// Replaces the politeness pacer
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs a complete harvest
    ///
    /// Per-page failures are logged and counted, never returned; the only
    /// errors come from building the start URL.
    pub async fn run(&self) -> Result<CrawlOutcome> {
        let mut navigator = Navigator::new(&self.config)?;
        let mut state = CrawlState::new(navigator.start_url());
        let mut report = CrawlReport::new();
        report.started_at = Some(Utc::now());

        let agent = self.config.user_agent.crawler_name.as_str();
        let robots = if self.config.crawler.respect_robots_txt {
            let gate = RobotsGate::load(&self.fetcher, &self.base_url, agent).await;
            self.pacer.pause().await;
            gate
        } else {
            RobotsGate::disabled(agent)
        };
        let pacer = match robots.crawl_delay() {
            Some(delay) => {
                tracing::info!("robots.txt asks for a crawl delay of {:?}", delay);
                self.pacer.with_floor(delay)
            }
            None => self.pacer,
        };

        tracing::info!(
            "Starting harvest at {} ({:?} mode, at most {} pages)",
            navigator.start_url(),
            navigator.mode(),
            self.config.crawler.max_pages
        );

        let stop_reason = loop {
            let Some(url) = state.current_page.clone() else {
                break StopReason::NoNextLink;
            };
            if state.pages_crawled >= self.config.crawler.max_pages {
                break StopReason::CeilingReached;
            }
            state.pages_crawled += 1;
            state.mark_listing_visited(&url);

            let page = self.fetch_listing(&url, &robots, &pacer, &mut report).await;
            if let Some(page) = &page {
                self.harvest_cards(&page.cards, &mut state, &robots, &pacer, &mut report)
                    .await;
            }

            match navigator.advance(page.as_ref(), &state) {
                Step::Next(next) => state.current_page = Some(next),
                Step::Stop(reason) => {
                    state.current_page = None;
                    break reason;
                }
            }
        };

        report.stop_reason = Some(stop_reason);
        report.rows = state.rows().len() as u64;
        report.finished_at = Some(Utc::now());

        tracing::info!(
            "Harvest finished: {} listing pages, {} rows ({})",
            report.listing_pages_crawled,
            report.rows,
            stop_reason
        );

        Ok(CrawlOutcome {
            rows: state.into_rows(),
            report,
        })
    }

    async fn fetch_listing(
        &self,
        url: &str,
        robots: &RobotsGate,
        pacer: &Pacer,
        report: &mut CrawlReport,
    ) -> Option<ListingPage> {
        if !robots.allows(url) {
            tracing::warn!("Listing page {} disallowed by robots.txt", url);
            report.listing_pages_blocked += 1;
            return None;
        }

        let result = self.fetcher.fetch(url).await;
        pacer.pause().await;

        match result {
            Ok(fetched) => {
                let page_url = Url::parse(&fetched.final_url).or_else(|_| Url::parse(url)).ok()?;
                let page = parse_listing(
                    &fetched.body,
                    &page_url,
                    &self.base_url,
                    &self.selectors,
                    &self.config.site.page_param,
                );
                report.listing_pages_crawled += 1;
                tracing::info!("Listing page {}: {} cards", url, page.cards.len());
                Some(page)
            }
            Err(e) => {
                tracing::warn!("Skipping listing page: {}", e);
                report.listing_pages_failed += 1;
                None
            }
        }
    }

    async fn harvest_cards(
        &self,
        cards: &[CardSummary],
        state: &mut CrawlState,
        robots: &RobotsGate,
        pacer: &Pacer,
        report: &mut CrawlReport,
    ) {
        for card in cards {
            report.cards_seen += 1;
            let row = self.harvest_card(card, state, robots, pacer, report).await;
            state.push_row(row);
        }
    }

    async fn harvest_card(
        &self,
        card: &CardSummary,
        state: &mut CrawlState,
        robots: &RobotsGate,
        pacer: &Pacer,
        report: &mut CrawlReport,
    ) -> Row {
        let label = card.title.as_deref().unwrap_or("<untitled>");

        let Some(detail_url) = card.detail_url.as_deref() else {
            tracing::warn!("Card '{}' has no detail link, keeping listing data only", label);
            report.cards_without_detail += 1;
            return Row::listing_only(card);
        };

        if !state.mark_detail_visited(detail_url) {
            tracing::debug!("Detail page {} already visited", detail_url);
            report.duplicate_details += 1;
            return Row::listing_only(card);
        }

        if !robots.allows(detail_url) {
            tracing::warn!("Detail page {} disallowed by robots.txt", detail_url);
            report.details_blocked += 1;
            return Row::listing_only(card);
        }

        let result = self.fetcher.fetch(detail_url).await;
        pacer.pause().await;

        match result {
            Ok(fetched) => {
                let fields = self.extractor.extract_from_html(&fetched.body, &fetched.final_url);
                report.details_fetched += 1;
                tracing::debug!("Detail page {}: {} fields", detail_url, fields.len());
                assemble(card, &fields)
            }
            Err(e) => {
                tracing::warn!("Keeping listing data only for '{}': {}", label, e);
                report.details_failed += 1;
                Row::listing_only(card)
            }
        }
    }
}
