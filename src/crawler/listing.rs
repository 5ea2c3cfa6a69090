//! Listing page parsing
//!
//! Turns a listing document into its cards plus the pagination metadata the
//! navigator needs.

use crate::crawler::navigator::{discover_max_page, find_next_link};
use crate::extract::detail::image_source;
use crate::extract::selectors::SelectorSet;
use crate::extract::text::element_text;
use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// What a listing card says about one item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardSummary {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub image_url: Option<String>,
    pub detail_url: Option<String>,
}

/// A parsed listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub url: String,
    /// Cards in document order
    pub cards: Vec<CardSummary>,
    pub next_url: Option<String>,
    pub discovered_max_page: Option<u32>,
}

/// Parses a listing document
///
/// # Arguments
///
/// * `html` - Decoded listing body
/// * `page_url` - URL the listing was fetched from; pagination links resolve against it
/// * `base_url` - Site base; card links and images resolve against it
/// * `selectors` - Compiled site selectors
/// * `page_param` - Query parameter that carries page numbers
pub fn parse_listing(
    html: &str,
    page_url: &Url,
    base_url: &Url,
    selectors: &SelectorSet,
    page_param: &str,
) -> ListingPage {
    let document = Html::parse_document(html);

    let cards = parse_cards(&document, base_url, selectors);
    if cards.is_empty() {
        tracing::warn!("No cards found on {}", page_url);
    }

    ListingPage {
        url: page_url.to_string(),
        cards,
        next_url: find_next_link(&document, selectors, page_url),
        discovered_max_page: discover_max_page(&document, selectors, page_param, page_url),
    }
}

/// Card elements via the primary selector, or the fallback when it finds none
pub fn parse_cards(document: &Html, base_url: &Url, selectors: &SelectorSet) -> Vec<CardSummary> {
    let mut elements: Vec<ElementRef> = document.select(&selectors.card).collect();
    if elements.is_empty() {
        elements = document.select(&selectors.card_fallback).collect();
        if !elements.is_empty() {
            tracing::debug!("Primary card selector matched nothing, fallback found {}", elements.len());
        }
    }

    elements
        .iter()
        .map(|card| parse_card(card, base_url, selectors))
        .collect()
}

fn parse_card(card: &ElementRef, base_url: &Url, selectors: &SelectorSet) -> CardSummary {
    let first_text = |selector: &Selector| {
        card.select(selector)
            .next()
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
    };

    let href = if card.value().name() == "a" {
        card.value().attr("href")
    } else {
        card.select(&selectors.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
    };

    CardSummary {
        title: first_text(&selectors.card_title),
        short_description: first_text(&selectors.card_text),
        image_url: card
            .select(&selectors.card_image)
            .next()
            .and_then(|img| image_source(&img))
            .and_then(|src| resolve_link(&src, base_url)),
        detail_url: href.and_then(|h| resolve_link(h, base_url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;

    fn selectors() -> SelectorSet {
        SelectorSet::from_config(&SelectorConfig::default()).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://site.tld").unwrap()
    }

    const LISTING: &str = r#"
        <html><body>
        <div class="startup-block">
          <a class="card" href="/startup-content/acme">
            <img class="card-img-top" src="/img/acme.png">
            <div class="card-body">
              <h5 class="card-title"> Acme </h5>
              <p class="card-text">Payments <b>for</b>
                merchants</p>
            </div>
          </a>
        </div>
        <div class="startup-block">
          <a class="card" href="javascript:void(0)">
            <img class="card-img-top" src="" data-lazy-src="/img/beta.png">
            <div class="card-body"><h5 class="card-title">Beta</h5></div>
          </a>
        </div>
        <ul class="pagination">
          <li><a href="?page=1">1</a></li>
          <li><a href="?page=2">2</a></li>
          <li><a href="?page=2" rel="next">›</a></li>
        </ul>
        </body></html>
    "#;

    #[test]
    fn test_parse_listing() {
        let page_url = Url::parse("https://site.tld/startup.html?page=1").unwrap();
        let page = parse_listing(LISTING, &page_url, &base(), &selectors(), "page");

        assert_eq!(page.cards.len(), 2);
        assert_eq!(
            page.cards[0],
            CardSummary {
                title: Some("Acme".to_string()),
                short_description: Some("Payments for merchants".to_string()),
                image_url: Some("https://site.tld/img/acme.png".to_string()),
                detail_url: Some("https://site.tld/startup-content/acme".to_string()),
            }
        );
        assert_eq!(page.next_url.as_deref(), Some("https://site.tld/startup.html?page=2"));
        assert_eq!(page.discovered_max_page, Some(2));
    }

    #[test]
    fn test_card_without_detail_url_is_kept() {
        let page_url = Url::parse("https://site.tld/startup.html").unwrap();
        let page = parse_listing(LISTING, &page_url, &base(), &selectors(), "page");

        let beta = &page.cards[1];
        assert_eq!(beta.title.as_deref(), Some("Beta"));
        assert_eq!(beta.detail_url, None);
        assert_eq!(beta.short_description, None);
        assert_eq!(beta.image_url.as_deref(), Some("https://site.tld/img/beta.png"));
    }

    #[test]
    fn test_fallback_selector() {
        let html = r#"<div><a class="card mb-4" href="/s/one"><div class="card-body"><h5 class="card-title">One</h5></div></a></div>"#;
        let cards = parse_cards(&Html::parse_document(html), &base(), &selectors());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].detail_url.as_deref(), Some("https://site.tld/s/one"));
    }

    #[test]
    fn test_non_anchor_card_uses_first_link() {
        let mut config = SelectorConfig::default();
        config.card = "div.item".to_string();
        let selectors = SelectorSet::from_config(&config).unwrap();
        let html = r#"<div class="item"><a href="/s/two">Two</a><a href="/s/other">Other</a></div>"#;
        let cards = parse_cards(&Html::parse_document(html), &base(), &selectors);
        assert_eq!(cards[0].detail_url.as_deref(), Some("https://site.tld/s/two"));
    }

    #[test]
    fn test_no_cards() {
        let page_url = base();
        let page = parse_listing("<html><body><p>Empty</p></body></html>", &page_url, &base(), &selectors(), "page");
        assert!(page.cards.is_empty());
        assert_eq!(page.next_url, None);
        assert_eq!(page.discovered_max_page, None);
    }
}
