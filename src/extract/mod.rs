//! Markup extraction
//!
//! Turns detail documents into canonical field maps. Selector compilation,
//! label normalization and contact patterns live in their own submodules and
//! are shared with the listing side of the crawler.

pub mod detail;
pub mod labels;
pub mod patterns;
pub mod selectors;
pub mod text;

pub use detail::{image_source, DetailExtractor, IMAGE_SEPARATOR};
pub use labels::{sanitize_label, LabelNormalizer, UNLABELED};
pub use selectors::SelectorSet;
