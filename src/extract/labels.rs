//! Label normalization
//!
//! Maps the labels printed on detail pages (mostly Azerbaijani, sometimes
//! English) onto canonical column names.
//!
//! # Lookup Order
//!
//! 1. Exact match in the label table, after whitespace is collapsed and a
//!    trailing `:` is dropped
//! 2. Sanitized passthrough: every character that is not alphanumeric or
//!    whitespace is removed and whitespace is collapsed
//! 3. `Unlabeled`, when nothing survives sanitizing
//!
//! No fuzzy or prefix matching happens: an unknown label shows up as its own
//! column instead of being folded into a wrong one.

use crate::extract::text::collapse_whitespace;
use crate::ConfigError;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Column used when a label sanitizes to nothing
pub const UNLABELED: &str = "Unlabeled";

/// The built-in label table
const DEFAULT_TABLE: &str = include_str!("labels.toml");

#[derive(Debug, Deserialize)]
struct LabelFile {
    labels: BTreeMap<String, String>,
}

/// Maps raw labels to canonical field names
#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    table: HashMap<String, String>,
}

impl LabelNormalizer {
    /// Builds a normalizer from the built-in table only
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::with_overrides(&BTreeMap::new())
    }

    /// Builds a normalizer from the built-in table merged with `overrides`
    ///
    /// Entries in `overrides` win over built-in entries with the same key.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let file: LabelFile = toml::from_str(DEFAULT_TABLE)?;
        let mut normalizer = Self::from_table(&file.labels);
        for (label, canonical) in overrides {
            normalizer.insert(label, canonical);
        }
        Ok(normalizer)
    }

    /// Builds a normalizer from an explicit table
    pub fn from_table(table: &BTreeMap<String, String>) -> Self {
        let mut normalizer = Self {
            table: HashMap::with_capacity(table.len()),
        };
        for (label, canonical) in table {
            normalizer.insert(label, canonical);
        }
        normalizer
    }

    fn insert(&mut self, label: &str, canonical: &str) {
        self.table
            .insert(lookup_key(label), canonical.trim().to_string());
    }

    /// Number of label variants known to the table
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Maps a raw label to its canonical key; never returns an empty string
    pub fn normalize(&self, raw: &str) -> String {
        if let Some(canonical) = self.table.get(&lookup_key(raw)) {
            return canonical.clone();
        }

        let sanitized = sanitize_label(raw);
        if sanitized.is_empty() {
            UNLABELED.to_string()
        } else {
            sanitized
        }
    }
}

fn lookup_key(label: &str) -> String {
    let collapsed = collapse_whitespace(label);
    collapsed.trim_end_matches(':').trim_end().to_string()
}

/// Strips punctuation and symbols, keeping letters, digits and single spaces
pub fn sanitize_label(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter_map(|c| match c {
            c if c.is_alphanumeric() => Some(c),
            // whitespace and word-joining punctuation still separate words
            c if c.is_whitespace() => Some(' '),
            '-' | '/' | '_' => Some(' '),
            _ => None,
        })
        .collect();
    collapse_whitespace(&kept)
}
