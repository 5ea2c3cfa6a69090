//! Compiled CSS selectors
//!
//! Selectors are parsed once when the harvester is built and shared by the
//! card parser, the pagination navigator and the detail extractor.

use crate::config::SelectorConfig;
use crate::HarvestError;
use scraper::Selector;

/// All selectors the harvester needs, compiled
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub card: Selector,
    pub card_fallback: Selector,
    pub card_title: Selector,
    pub card_text: Selector,
    pub card_image: Selector,
    pub pagination: Selector,
    pub block: Selector,
    pub block_label: Selector,
    pub block_value: Selector,
    pub table_cell: Selector,
    pub content: Selector,
    pub next_labels: Vec<String>,

    // Fixed structural selectors
    pub anchor: Selector,
    pub paragraph: Selector,
    pub heading: Selector,
    pub image: Selector,
    pub rel_next: Selector,
}

impl SelectorSet {
    /// Compiles every selector from the configuration
    pub fn from_config(config: &SelectorConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            card: compile(&config.card)?,
            card_fallback: compile(&config.card_fallback)?,
            card_title: compile(&config.card_title)?,
            card_text: compile(&config.card_text)?,
            card_image: compile(&config.card_image)?,
            pagination: compile(&config.pagination)?,
            block: compile(&config.block)?,
            block_label: compile(&config.block_label)?,
            block_value: compile(&config.block_value)?,
            table_cell: compile(&config.table_cell)?,
            content: compile(&config.content)?,
            next_labels: config
                .next_labels
                .iter()
                .map(|l| l.trim().to_lowercase())
                .collect(),
            anchor: compile("a[href]")?,
            paragraph: compile("p")?,
            heading: compile("h1")?,
            image: compile("img")?,
            rel_next: compile("a[rel~='next'][href], link[rel~='next'][href]")?,
        })
    }
}

/// Parses a single selector, mapping failures into `HarvestError::Selector`
pub fn compile(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_compile() {
        assert!(SelectorSet::from_config(&SelectorConfig::default()).is_ok());
    }

    #[test]
    fn test_next_labels_lowercased() {
        let config = SelectorConfig {
            next_labels: vec![" Next ".to_string()],
            ..SelectorConfig::default()
        };
        let set = SelectorSet::from_config(&config).unwrap();
        assert_eq!(set.next_labels, vec!["next".to_string()]);
    }

    #[test]
    fn test_invalid_selector_reports_source() {
        let err = compile("p[[").unwrap_err();
        match err {
            HarvestError::Selector { selector, .. } => assert_eq!(selector, "p[["),
            other => panic!("unexpected error: {other}"),
        }
    }
}
