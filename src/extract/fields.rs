//! Field extraction from product detail pages
//!
//! Extraction is best-effort per field: a missing structural anchor yields an
//! absent field, never a page-level failure. All label lookups against the
//! product information table go through this module.

use crate::extract::selectors::detail;
use scraper::{ElementRef, Html, Selector};

/// Raw field values pulled from one detail page, before normalization
///
/// Every field is optional. `None` means the expected anchor was missing from
/// the markup; conversion decides what absence means per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBookFields {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub rating_token: Option<String>,
    pub availability: Option<String>,
    pub upc: Option<String>,
    pub product_type: Option<String>,
    pub price_excl_tax: Option<String>,
    pub price_incl_tax: Option<String>,
    pub review_count: Option<String>,
    pub description: Option<String>,
}

/// Extracts all raw fields from a detail page body
pub fn extract_fields(html: &str) -> RawBookFields {
    let document = Html::parse_document(html);

    RawBookFields {
        title: select_text(&document, &detail::TITLE),
        genre: select_text(&document, &detail::BREADCRUMB_GENRE),
        rating_token: rating_class_token(&document),
        availability: info_field(&document, "Availability"),
        upc: info_field(&document, "UPC"),
        product_type: info_field(&document, "Product Type"),
        price_excl_tax: info_field(&document, "Price (excl. tax)"),
        price_incl_tax: info_field(&document, "Price (incl. tax)"),
        review_count: info_field(&document, "Number of reviews"),
        description: select_text(&document, &detail::DESCRIPTION),
    }
}

/// Joined, trimmed text of the first element matching `selector`
fn select_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Rating word carried as the last class of the star-rating element
fn rating_class_token(document: &Html) -> Option<String> {
    let element = document.select(&detail::STAR_RATING).next()?;
    let class = element.value().attr("class")?;
    class.split_whitespace().last().map(str::to_string)
}

/// Looks up a value in the product information table by its label cell
fn info_field(document: &Html, label: &str) -> Option<String> {
    for row in document.select(&detail::INFO_ROW) {
        let Some(th) = row.select(&detail::INFO_LABEL).next() else {
            continue;
        };
        if element_text(th) == label {
            return row.select(&detail::INFO_VALUE).next().map(element_text);
        }
    }
    None
}
