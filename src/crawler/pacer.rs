//! Politeness pacing between remote fetches

use crate::config::CrawlerConfig;
use rand::Rng;
use std::time::Duration;

/// Randomized pause in `[min, max]` milliseconds; `0..=0` disables pausing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
}

impl Pacer {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.politeness_delay_min_ms, config.politeness_delay_max_ms)
    }

    /// A pacer that never waits
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    /// Raises both bounds to at least `floor`, for a robots.txt `Crawl-delay`
    pub fn with_floor(self, floor: Duration) -> Self {
        let floor_ms = u64::try_from(floor.as_millis()).unwrap_or(u64::MAX);
        Self::new(self.min_ms.max(floor_ms), self.max_ms.max(floor_ms))
    }

    pub fn is_disabled(&self) -> bool {
        self.max_ms == 0
    }

    /// Draws the next pause length
    pub fn next_delay(&self) -> Duration {
        if self.is_disabled() {
            return Duration::ZERO;
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    /// Sleeps for a freshly drawn pause
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::trace!("Pausing {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}
