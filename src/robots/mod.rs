//! Robots.txt handling module
//!
//! The harvester reads the site's robots.txt once per run. A missing or
//! unreachable file allows everything.

mod rules;

pub use rules::{RobotsRules, MAX_CRAWL_DELAY};

use crate::crawler::Fetch;
use std::time::Duration;
use url::Url;

/// Per-run robots.txt decision point
#[derive(Debug, Clone)]
pub struct RobotsGate {
    rules: RobotsRules,
    agent: String,
}

impl RobotsGate {
    pub fn new(rules: RobotsRules, agent: impl Into<String>) -> Self {
        Self {
            rules,
            agent: agent.into(),
        }
    }

    /// A gate that lets everything through
    pub fn disabled(agent: impl Into<String>) -> Self {
        Self::new(RobotsRules::allow_all(), agent)
    }

    /// Fetches `<base>/robots.txt` through `fetcher`
    ///
    /// Any fetch failure (including 404) yields an allow-all gate.
    pub async fn load<F: Fetch + ?Sized>(fetcher: &F, base_url: &Url, agent: &str) -> Self {
        let robots_url = match base_url.join("/robots.txt") {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build robots.txt URL for {}: {}", base_url, e);
                return Self::disabled(agent);
            }
        };

        match fetcher.fetch(robots_url.as_str()).await {
            Ok(page) => {
                tracing::info!("Loaded robots.txt from {}", robots_url);
                Self::new(RobotsRules::from_content(&page.body), agent)
            }
            Err(e) => {
                tracing::info!("No usable robots.txt ({}), allowing all", e);
                Self::disabled(agent)
            }
        }
    }

    pub fn allows(&self, url: &str) -> bool {
        self.rules.is_allowed(url, &self.agent)
    }

    pub fn crawl_delay(&self) -> Option<Duration> {
        self.rules.crawl_delay(&self.agent)
    }
}
