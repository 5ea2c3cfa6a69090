//! Dataset rows
//!
//! A row is one listing card merged with the fields extracted from its detail
//! page. Column names used by more than one module are defined here.

mod row;

pub use row::{assemble, Row};

use std::collections::BTreeMap;

/// Canonical field name to trimmed, non-empty value
pub type FieldMap = BTreeMap<String, String>;

pub const TITLE: &str = "Title";
pub const DESCRIPTION: &str = "Description";
pub const IMAGES: &str = "Images";
pub const WEBSITE: &str = "Website";
pub const EMAIL: &str = "Email";
pub const CONTACT_PHONE: &str = "ContactPhone";

pub const LISTING_TITLE: &str = "listing_title";
pub const SHORT_DESCRIPTION: &str = "short_description";
pub const LISTING_IMAGE: &str = "listing_image";
pub const DETAIL_URL: &str = "detail_url";

/// Prefix for detail values that disagree with a listing value
pub const DETAIL_PREFIX: &str = "detail_";
