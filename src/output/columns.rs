//! Output column ordering

use crate::dataset::{
    Row, CONTACT_PHONE, DESCRIPTION, DETAIL_URL, EMAIL, IMAGES, LISTING_IMAGE, LISTING_TITLE,
    SHORT_DESCRIPTION, TITLE, WEBSITE,
};
use std::collections::HashSet;

/// Columns that lead the output, in this order, when present
pub const PREFERRED_COLUMNS: &[&str] = &[
    TITLE,
    LISTING_TITLE,
    SHORT_DESCRIPTION,
    DESCRIPTION,
    LISTING_IMAGE,
    IMAGES,
    DETAIL_URL,
    WEBSITE,
    EMAIL,
    CONTACT_PHONE,
];

/// Union of all row columns: preferred ones first, the rest in first-seen order
pub fn order_columns(rows: &[Row]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut discovered = Vec::new();
    for row in rows {
        for column in row.columns() {
            if seen.insert(column) {
                discovered.push(column);
            }
        }
    }

    let mut ordered: Vec<String> = PREFERRED_COLUMNS
        .iter()
        .filter(|c| seen.contains(**c))
        .map(|c| c.to_string())
        .collect();
    ordered.extend(
        discovered
            .into_iter()
            .filter(|c| !PREFERRED_COLUMNS.contains(c))
            .map(str::to_string),
    );
    ordered
}
