//! robots.txt rules
//!
//! Allow/disallow matching is delegated to the robotstxt crate; only the
//! non-standard `Crawl-delay` directive is read here.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Longest `Crawl-delay` honoured; larger values are clamped to this
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// Rules from one robots.txt file
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    /// Raw robots.txt content; empty allows everything
    content: String,
}

impl RobotsRules {
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Rules that allow everything, used when robots.txt is absent or ignored
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn is_allow_all(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Whether `agent` may fetch the absolute `url`
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.is_allow_all() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, url)
    }

    /// `Crawl-delay` for `agent`, preferring its own group over `*`
    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        let agent = agent.to_lowercase();
        let mut group: Vec<String> = Vec::new();
        let mut group_has_rules = false;
        let mut specific = None;
        let mut wildcard = None;

        for line in self.content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                if group_has_rules {
                    group.clear();
                    group_has_rules = false;
                }
                group.push(value.to_lowercase());
                continue;
            }

            group_has_rules = true;
            if key != "crawl-delay" {
                continue;
            }
            let Ok(seconds) = value.parse::<f64>() else {
                continue;
            };
            if seconds.is_nan() || seconds < 0.0 {
                continue;
            }
            let Ok(delay) = Duration::try_from_secs_f64(seconds.min(MAX_CRAWL_DELAY.as_secs_f64())) else {
                continue;
            };

            if group.iter().any(|ua| ua != "*" && agent.contains(ua.as_str())) {
                specific = Some(delay);
            } else if group.iter().any(|ua| ua == "*") {
                wildcard = wildcard.or(Some(delay));
            }
        }

        specific.or(wildcard)
    }
}
