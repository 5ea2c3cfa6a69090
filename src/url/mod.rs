//! URL handling module for Listing Harvester
//!
//! This module resolves hrefs found in markup against the site, reads and
//! rewrites pagination query parameters, and derives fallback slugs.

mod query;
mod resolve;

pub use query::{carry_param, query_param, with_query_param};
pub use resolve::{is_http_url, resolve_link, slug_from_url};
