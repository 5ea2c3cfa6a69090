use crate::crawler::CardSummary;
use crate::dataset::{
    FieldMap, DETAIL_PREFIX, DETAIL_URL, LISTING_IMAGE, LISTING_TITLE, SHORT_DESCRIPTION, TITLE,
};
use std::collections::HashMap;

/// One output record: columns in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<String>,
    values: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// A row holding only what the listing card carried
    pub fn listing_only(card: &CardSummary) -> Self {
        let mut row = Self::new();
        let seeds = [
            (LISTING_TITLE, &card.title),
            (SHORT_DESCRIPTION, &card.short_description),
            (LISTING_IMAGE, &card.image_url),
            (DETAIL_URL, &card.detail_url),
            (TITLE, &card.title),
        ];
        for (column, value) in seeds {
            if let Some(value) = value {
                row.set(column, value);
            }
        }
        row
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Sets a column, keeping its original position when it already exists
    pub fn set(&mut self, column: &str, value: &str) {
        if !self.values.contains_key(column) {
            self.columns.push(column.to_string());
        }
        self.values.insert(column.to_string(), value.to_string());
    }

    /// Column names in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// `(column, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .filter_map(|c| self.values.get(c).map(|v| (c.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn merge_field(&mut self, key: &str, value: &str) {
        match self.get(key) {
            None | Some("") => self.set(key, value),
            Some(existing) if existing == value => {}
            Some(_) => {
                let alias = self.free_alias(key, value);
                self.set(&alias, value);
            }
        }
    }

    /// `detail_<key>`, numbered when that column already holds another value
    fn free_alias(&self, key: &str, value: &str) -> String {
        let base = format!("{}{}", DETAIL_PREFIX, key);
        let mut candidate = base.clone();
        let mut n = 2;
        while let Some(existing) = self.get(&candidate) {
            if existing == value {
                break;
            }
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        candidate
    }
}

/// Merges a listing card with the fields extracted from its detail page
///
/// The detail `Title` replaces the listing title under `Title` (the listing
/// one stays in `listing_title`). Any other key is written when the row lacks
/// it, kept when the values agree, and otherwise stored under `detail_<key>`,
/// so no value from either side is lost.
pub fn assemble(card: &CardSummary, fields: &FieldMap) -> Row {
    let mut row = Row::listing_only(card);

    for (key, value) in fields {
        if value.is_empty() {
            continue;
        }
        if key == TITLE {
            row.set(TITLE, value);
        } else {
            row.merge_field(key, value);
        }
    }

    row
}
