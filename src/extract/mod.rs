//! Field extraction and normalization for product detail pages
//!
//! This module turns one fetched detail page into a typed record:
//! - CSS structural anchors, kept together in `selectors`
//! - best-effort per-field extraction into `RawBookFields`
//! - typed conversion into a `NormalizedBook` ready for ingestion

mod fields;
mod normalize;
pub mod selectors;

pub use fields::{extract_fields, RawBookFields};
pub use normalize::{normalize, NormalizedBook, Rating, Stock};

/// Extracts and normalizes one detail page body in a single step
pub fn harvest_record(html: &str, currency_symbol: &str) -> NormalizedBook {
    normalize(extract_fields(html), currency_symbol)
}
