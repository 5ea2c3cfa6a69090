//! Detail page field extraction
//!
//! Strategies run in a fixed order and each one only fills keys that are
//! still missing, so the first strategy to produce a field wins:
//!
//! 1. Labeled content blocks (label element + paragraph values)
//! 2. Label/value cells, only when no labeled block exists at all
//! 3. Description backfill from the first long paragraph
//! 4. Email / phone / website patterns over the visible text and anchors
//! 5. Title from the first `h1`, then from the detail URL slug
//! 6. Image gallery from the main content region

use crate::dataset::{FieldMap, CONTACT_PHONE, DESCRIPTION, EMAIL, IMAGES, TITLE, WEBSITE};
use crate::extract::labels::LabelNormalizer;
use crate::extract::patterns::{
    email_from_mailto, find_email, find_phone, phone_from_tel, pick_website,
};
use crate::extract::selectors::SelectorSet;
use crate::extract::text::{element_text, text_excluding, visible_text};
use crate::url::{is_http_url, resolve_link, slug_from_url};
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use url::Url;

/// Separator between image URLs in the `Images` field
pub const IMAGE_SEPARATOR: &str = " | ";

/// Lazy-load attributes consulted when `src` is missing or a placeholder
const LAZY_IMAGE_ATTRS: &[&str] = &["data-src", "data-lazy-src", "data-original"];

/// Extracts canonical fields from detail documents
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    selectors: SelectorSet,
    labels: LabelNormalizer,
    description_min_chars: usize,
    base_url: Url,
}

impl DetailExtractor {
    /// Creates an extractor
    ///
    /// # Arguments
    ///
    /// * `selectors` - Compiled selectors describing the detail markup
    /// * `labels` - Label normalizer for block and cell labels
    /// * `description_min_chars` - A paragraph must be longer than this to
    ///   backfill `Description`
    /// * `base_url` - The crawled site; its own links never count as an item's website
    pub fn new(
        selectors: SelectorSet,
        labels: LabelNormalizer,
        description_min_chars: usize,
        base_url: Url,
    ) -> Self {
        Self {
            selectors,
            labels,
            description_min_chars,
            base_url,
        }
    }

    /// Parses `html` and extracts its fields
    pub fn extract_from_html(&self, html: &str, detail_url: &str) -> FieldMap {
        let document = Html::parse_document(html);
        self.extract_fields(&document, detail_url)
    }

    /// Runs every strategy over a parsed detail document
    ///
    /// The result depends only on the document and the URL, so extracting
    /// the same page twice yields the same map.
    pub fn extract_fields(&self, document: &Html, detail_url: &str) -> FieldMap {
        let mut fields = FieldMap::new();

        let blocks = self.labeled_blocks(document, &mut fields);
        if blocks == 0 {
            self.label_value_cells(document, &mut fields);
        }
        self.backfill_description(document, &mut fields);
        self.contact_patterns(document, detail_url, &mut fields);
        self.title_fallback(document, detail_url, &mut fields);
        self.collect_images(document, detail_url, &mut fields);

        tracing::debug!("Extracted {} field(s) from {}", fields.len(), detail_url);
        fields
    }

    /// Returns the number of blocks matched, including skipped ones
    fn labeled_blocks(&self, document: &Html, fields: &mut FieldMap) -> usize {
        let mut matched = 0;

        for block in document.select(&self.selectors.block) {
            matched += 1;

            let Some(label_el) = block.select(&self.selectors.block_label).next() else {
                continue;
            };
            let raw_label = element_text(&label_el);
            if raw_label.is_empty() {
                continue;
            }

            let value = self.block_value(&block, &label_el);
            if value.is_empty() {
                tracing::debug!("Skipping block '{}' without a value", raw_label);
                continue;
            }

            let key = self.labels.normalize(&raw_label);
            set_if_absent(fields, &key, &value);
        }

        matched
    }

    fn block_value(&self, block: &ElementRef, label_el: &ElementRef) -> String {
        let paragraphs: Vec<String> = block
            .select(&self.selectors.block_value)
            .map(|p| text_excluding(&p, label_el))
            .filter(|t| !t.is_empty())
            .collect();

        if paragraphs.is_empty() {
            text_excluding(block, label_el)
        } else {
            paragraphs.join(" ")
        }
    }

    fn label_value_cells(&self, document: &Html, fields: &mut FieldMap) {
        let cells: Vec<ElementRef> = document.select(&self.selectors.table_cell).collect();

        let mut i = 0;
        while i < cells.len() {
            let cell = cells[i];
            i += 1;

            let (raw_label, own_value) = match cell.select(&self.selectors.block_label).next() {
                Some(label_el) => (element_text(&label_el), text_excluding(&cell, &label_el)),
                None if cell.value().name() == "th" => (element_text(&cell), String::new()),
                None => continue,
            };
            if raw_label.is_empty() {
                continue;
            }

            let value = if own_value.is_empty() {
                match cells.get(i) {
                    Some(next) if !self.is_label_cell(next) => {
                        i += 1;
                        element_text(next)
                    }
                    _ => String::new(),
                }
            } else {
                own_value
            };

            if !value.is_empty() {
                let key = self.labels.normalize(&raw_label);
                set_if_absent(fields, &key, &value);
            }
        }
    }

    fn is_label_cell(&self, cell: &ElementRef) -> bool {
        cell.value().name() == "th" || cell.select(&self.selectors.block_label).next().is_some()
    }

    fn backfill_description(&self, document: &Html, fields: &mut FieldMap) {
        if fields.contains_key(DESCRIPTION) {
            return;
        }

        let passage = document
            .select(&self.selectors.paragraph)
            .map(|p| element_text(&p))
            .find(|t| t.chars().count() > self.description_min_chars);

        if let Some(passage) = passage {
            set_if_absent(fields, DESCRIPTION, &passage);
        }
    }

    fn contact_patterns(&self, document: &Html, detail_url: &str, fields: &mut FieldMap) {
        let text = visible_text(document);
        let hrefs: Vec<&str> = document
            .select(&self.selectors.anchor)
            .filter_map(|a| a.value().attr("href"))
            .collect();

        if !fields.contains_key(EMAIL) {
            let email = find_email(&text).or_else(|| hrefs.iter().find_map(|h| email_from_mailto(h)));
            if let Some(email) = email {
                set_if_absent(fields, EMAIL, &email);
            }
        }

        if !fields.contains_key(CONTACT_PHONE) {
            let phone = find_phone(&text).or_else(|| hrefs.iter().find_map(|h| phone_from_tel(h)));
            if let Some(phone) = phone {
                set_if_absent(fields, CONTACT_PHONE, &phone);
            }
        }

        if !fields.contains_key(WEBSITE) {
            let candidates: Vec<String> = hrefs
                .iter()
                .filter(|h| is_http_url(h))
                .map(|h| h.trim().to_string())
                .filter(|h| h != detail_url)
                .collect();
            if let Some(website) = pick_website(&candidates, self.base_url.host_str()) {
                set_if_absent(fields, WEBSITE, &website);
            }
        }
    }

    fn title_fallback(&self, document: &Html, detail_url: &str, fields: &mut FieldMap) {
        if fields.contains_key(TITLE) {
            return;
        }

        let title = document
            .select(&self.selectors.heading)
            .map(|h| element_text(&h))
            .find(|t| !t.is_empty())
            .or_else(|| slug_from_url(detail_url));

        if let Some(title) = title {
            set_if_absent(fields, TITLE, &title);
        }
    }

    fn collect_images(&self, document: &Html, detail_url: &str, fields: &mut FieldMap) {
        let page_url = Url::parse(detail_url).unwrap_or_else(|_| self.base_url.clone());

        let sources: Vec<String> = match document.select(&self.selectors.content).next() {
            Some(region) => region
                .select(&self.selectors.image)
                .filter_map(|img| image_source(&img))
                .collect(),
            None => document
                .select(&self.selectors.image)
                .filter_map(|img| image_source(&img))
                .collect(),
        };

        let mut seen = HashSet::new();
        let images: Vec<String> = sources
            .iter()
            .filter_map(|src| resolve_link(src, &page_url))
            .filter(|url| seen.insert(url.clone()))
            .collect();

        if !images.is_empty() {
            set_if_absent(fields, IMAGES, &images.join(IMAGE_SEPARATOR));
        }
    }
}

/// The real source of an image element
///
/// `src` wins unless it is empty or an inline `data:` placeholder, in which
/// case the lazy-load attributes are consulted.
pub fn image_source(img: &ElementRef) -> Option<String> {
    let element = img.value();
    let real_src = element
        .attr("src")
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.to_ascii_lowercase().starts_with("data:"));

    real_src
        .or_else(|| {
            LAZY_IMAGE_ATTRS
                .iter()
                .filter_map(|attr| element.attr(attr))
                .map(str::trim)
                .find(|s| !s.is_empty())
        })
        .map(str::to_string)
}

/// Inserts a trimmed, non-empty value unless the key is already taken
fn set_if_absent(fields: &mut FieldMap, key: &str, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || fields.contains_key(key) {
        return false;
    }
    fields.insert(key.to_string(), value.to_string());
    true
}
