//! Pagination navigation
//!
//! One `Navigator` drives every pagination mode. After each listing page the
//! coordinator asks it for the next URL; it answers with a `Step`.
//!
//! # Modes
//!
//! | Mode | Next page | Stops when |
//! |------|-----------|------------|
//! | Bounded | `page + 1` | past the highest page number seen, or an empty page under the fallback ceiling |
//! | FollowNext | the page's "next" link | no next link, a revisited URL, or a failed listing fetch |
//! | Single | none | after the start page |
//!
//! The `max-pages` ceiling is enforced by the coordinator for every mode.

use crate::config::{Config, PaginationMode, SiteConfig};
use crate::crawler::listing::ListingPage;
use crate::extract::selectors::SelectorSet;
use crate::extract::text::element_text;
use crate::state::CrawlState;
use crate::url::{carry_param, query_param, resolve_link, with_query_param};
use crate::Result;
use scraper::{ElementRef, Html};
use std::fmt;
use url::Url;

/// Link texts that mean "next page" inside a pagination container
const NEXT_GLYPHS: &[&str] = &["›", "»", "→", ">", "❯", "⟩", "▶"];

/// Icon class fragments that mean "next page"
const NEXT_ICON_CLASSES: &[&str] = &["chevron-right", "angle-right", "arrow-right", "caret-right"];

/// Why the crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// FollowNext found no next link
    NoNextLink,
    /// FollowNext was pointed at a listing URL it had already visited
    RevisitedUrl,
    /// Bounded walked past the last page number
    BoundReached,
    /// Bounded without a discovered bound hit a page with no cards
    EmptyPage,
    /// FollowNext could not fetch a listing page
    ListingFailed,
    /// The `max-pages` ceiling was reached
    CeilingReached,
    /// Single mode finished its only page
    SinglePage,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoNextLink => "no next link",
            Self::RevisitedUrl => "next link already visited",
            Self::BoundReached => "last page reached",
            Self::EmptyPage => "empty listing page",
            Self::ListingFailed => "listing page unavailable",
            Self::CeilingReached => "page ceiling reached",
            Self::SinglePage => "single page mode",
        };
        write!(f, "{}", text)
    }
}

/// The navigator's answer after a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Next(String),
    Stop(StopReason),
}

/// Builds the first listing URL
///
/// `base-url` joined with `listing-path`, with the page parameter set to
/// `start-page` and the page-size parameter set when a page size is configured.
pub fn start_url(site: &SiteConfig) -> Result<Url> {
    let base = Url::parse(&site.base_url)?;
    let mut url = base.join(&site.listing_path)?;
    url = with_query_param(&url, &site.page_param, &site.start_page.to_string());
    if let Some(size) = site.page_size {
        url = with_query_param(&url, &site.page_size_param, &size.to_string());
    }
    Ok(url)
}

/// Pagination state machine
#[derive(Debug, Clone)]
pub struct Navigator {
    mode: PaginationMode,
    start_url: Url,
    page_param: String,
    page_size_param: String,
    fallback_ceiling: u32,
    current_page: u32,
    discovered_max: Option<u32>,
}

impl Navigator {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            mode: config.crawler.mode,
            start_url: start_url(&config.site)?,
            page_param: config.site.page_param.clone(),
            page_size_param: config.site.page_size_param.clone(),
            fallback_ceiling: config.crawler.fallback_page_ceiling,
            current_page: config.site.start_page,
            discovered_max: None,
        })
    }

    pub fn mode(&self) -> PaginationMode {
        self.mode
    }

    pub fn start_url(&self) -> &str {
        self.start_url.as_str()
    }

    /// Highest page number seen in any pagination container so far
    pub fn discovered_max(&self) -> Option<u32> {
        self.discovered_max
    }

    /// Decides where to go after the current listing page
    ///
    /// `page` is None when the listing fetch failed. `state` supplies the
    /// current URL and the listing URLs visited so far.
    pub fn advance(&mut self, page: Option<&ListingPage>, state: &CrawlState) -> Step {
        match self.mode {
            PaginationMode::Single => Step::Stop(StopReason::SinglePage),
            PaginationMode::Bounded => self.advance_bounded(page),
            PaginationMode::FollowNext => self.advance_follow_next(page, state),
        }
    }

    fn advance_bounded(&mut self, page: Option<&ListingPage>) -> Step {
        if let Some(found) = page.and_then(|p| p.discovered_max_page) {
            self.discovered_max = Some(self.discovered_max.map_or(found, |m| m.max(found)));
        }

        let bound = match self.discovered_max {
            Some(bound) => bound,
            None => {
                if page.is_some_and(|p| p.cards.is_empty()) {
                    return Step::Stop(StopReason::EmptyPage);
                }
                self.fallback_ceiling
            }
        };

        let next = self.current_page + 1;
        if next > bound {
            return Step::Stop(StopReason::BoundReached);
        }

        self.current_page = next;
        let url = with_query_param(&self.start_url, &self.page_param, &next.to_string());
        Step::Next(url.to_string())
    }

    fn advance_follow_next(&mut self, page: Option<&ListingPage>, state: &CrawlState) -> Step {
        let Some(page) = page else {
            return Step::Stop(StopReason::ListingFailed);
        };
        let Some(next) = page.next_url.as_deref() else {
            return Step::Stop(StopReason::NoNextLink);
        };

        let next = carry_param(self.start_url.as_str(), next, &self.page_size_param);

        let is_current = state.current_page.as_deref() == Some(next.as_str());
        if is_current || state.is_listing_visited(&next) {
            return Step::Stop(StopReason::RevisitedUrl);
        }

        self.current_page += 1;
        Step::Next(next)
    }
}

/// Highest page number advertised in the pagination containers
///
/// Tokens are bare-integer element texts, the page query parameter of link
/// targets, and zero-indexed `data-page` attributes.
pub fn discover_max_page(document: &Html, selectors: &SelectorSet, page_param: &str, page_url: &Url) -> Option<u32> {
    let mut max: Option<u32> = None;
    let mut record = |n: u32| max = Some(max.map_or(n, |m| m.max(n)));

    for container in document.select(&selectors.pagination) {
        for element in container.descendants().filter_map(ElementRef::wrap) {
            if let Ok(n) = element_text(&element).parse::<u32>() {
                record(n);
            }

            let value = element.value();
            if let Some(n) = value.attr("data-page").and_then(|v| v.trim().parse::<u32>().ok()) {
                record(n.saturating_add(1));
            }

            let page_from_href = value
                .attr("href")
                .and_then(|href| resolve_link(href, page_url))
                .and_then(|url| query_param(&url, page_param))
                .and_then(|v| v.trim().parse::<u32>().ok());
            if let Some(n) = page_from_href {
                record(n);
            }
        }
    }

    max
}

/// Finds the "next page" link of a listing document
///
/// Checked in order: `rel="next"`; an anchor whose `aria-label` or `title`
/// contains a next word; inside the pagination container, an anchor whose
/// text is a next word or arrow glyph, or that wraps a right-pointing icon.
/// Disabled entries never count.
pub fn find_next_link(document: &Html, selectors: &SelectorSet, page_url: &Url) -> Option<String> {
    let resolve = |el: &ElementRef| -> Option<String> {
        if is_disabled(el) {
            return None;
        }
        resolve_link(el.value().attr("href")?, page_url)
    };

    if let Some(url) = document.select(&selectors.rel_next).find_map(|el| resolve(&el)) {
        return Some(url);
    }

    let labelled = document.select(&selectors.anchor).find_map(|a| {
        let value = a.value();
        let label = [value.attr("aria-label"), value.attr("title")]
            .into_iter()
            .flatten()
            .map(str::to_lowercase)
            .any(|l| mentions_next(&l, &selectors.next_labels));
        if label {
            resolve(&a)
        } else {
            None
        }
    });
    if labelled.is_some() {
        return labelled;
    }

    document
        .select(&selectors.pagination)
        .flat_map(|container| container.select(&selectors.anchor))
        .filter(|a| is_next_control(a, &selectors.next_labels))
        .find_map(|a| resolve(&a))
}

fn mentions_next(text: &str, next_labels: &[String]) -> bool {
    next_labels.iter().any(|label| text.contains(label.as_str()))
}

fn is_next_control(anchor: &ElementRef, next_labels: &[String]) -> bool {
    let text = element_text(anchor);
    if NEXT_GLYPHS.contains(&text.as_str()) {
        return true;
    }
    if !text.is_empty() && mentions_next(&text.to_lowercase(), next_labels) {
        return true;
    }

    anchor
        .descendants()
        .filter_map(ElementRef::wrap)
        .flat_map(|el| el.value().classes().map(str::to_ascii_lowercase).collect::<Vec<_>>())
        .any(|class| NEXT_ICON_CLASSES.iter().any(|icon| class.contains(icon)))
}

/// Disabled pagination entries: `li.disabled` ancestors, a `disabled` class
/// on the anchor itself, or `aria-disabled="true"`
fn is_disabled(element: &ElementRef) -> bool {
    let value = element.value();
    if value.classes().any(|c| c == "disabled") || value.attr("aria-disabled") == Some("true") {
        return true;
    }

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == "li" && el.value().classes().any(|c| c == "disabled"))
}
