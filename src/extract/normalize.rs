//! Conversion of raw page text into typed record values
//!
//! Every conversion is local to its field: an unparsable value downgrades that
//! field with a warning and the record is still written. Absence and zero stay
//! distinct through the `Rating` and `Stock` variants until persistence.

use crate::extract::fields::RawBookFields;
use chrono::Utc;
use tracing::warn;

/// Star rating decoded from the rating word on the detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    /// A known rating word (One through Five)
    Recognized(u8),
    /// Missing element or a word outside the known set
    Unrecognized,
}

impl Rating {
    /// Stored column value: 1-5 for recognized ratings, 0 otherwise
    pub fn stars(&self) -> u8 {
        match self {
            Rating::Recognized(stars) => *stars,
            Rating::Unrecognized => 0,
        }
    }
}

/// Stock count decoded from the availability text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stock {
    /// A parenthesized unit count was present
    Counted(u32),
    /// No count stated; distinct from a stated count of zero
    Unstated,
}

impl Stock {
    /// Stored column value: the stated count, 0 when unstated
    pub fn count(&self) -> u32 {
        match self {
            Stock::Counted(count) => *count,
            Stock::Unstated => 0,
        }
    }
}

/// One catalog record, typed and ready for the ingestion sink
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBook {
    pub title: String,
    pub genre: String,
    pub rating: Rating,
    pub stock: Stock,
    pub ingested_at: String,
    pub upc: String,
    pub product_type: String,
    pub price_excl_tax: Option<f64>,
    pub price_incl_tax: Option<f64>,
    pub review_count: Option<u32>,
    pub description: String,
}

/// Converts raw fields into a typed record
///
/// Stamps the record with a fresh RFC 3339 ingestion timestamp. Records with
/// unparsable numeric fields are still produced; only the affected field is
/// left empty.
pub fn normalize(raw: RawBookFields, currency_symbol: &str) -> NormalizedBook {
    let rating = rating_from_token(raw.rating_token.as_deref());
    if rating == Rating::Unrecognized {
        if let Some(token) = raw.rating_token.as_deref() {
            warn!("Unrecognized rating word '{}', storing 0", token);
        }
    }

    let genre = match raw.genre {
        Some(label) if !label.is_empty() => label,
        _ => "Unknown".to_string(),
    };

    NormalizedBook {
        title: raw.title.unwrap_or_default(),
        genre,
        rating,
        stock: stock_from_availability(raw.availability.as_deref()),
        ingested_at: Utc::now().to_rfc3339(),
        upc: raw.upc.unwrap_or_default(),
        product_type: raw.product_type.unwrap_or_default(),
        price_excl_tax: parse_price_field(
            "price_excl_tax",
            raw.price_excl_tax.as_deref(),
            currency_symbol,
        ),
        price_incl_tax: parse_price_field(
            "price_incl_tax",
            raw.price_incl_tax.as_deref(),
            currency_symbol,
        ),
        review_count: parse_count_field("review_count", raw.review_count.as_deref()),
        description: raw.description.unwrap_or_default(),
    }
}

/// Maps the rating word to its star count
fn rating_from_token(token: Option<&str>) -> Rating {
    match token {
        Some("One") => Rating::Recognized(1),
        Some("Two") => Rating::Recognized(2),
        Some("Three") => Rating::Recognized(3),
        Some("Four") => Rating::Recognized(4),
        Some("Five") => Rating::Recognized(5),
        _ => Rating::Unrecognized,
    }
}

/// Stock count from the parenthesized part of the availability text
///
/// The absence branch comes first: no numeric conversion runs unless a
/// parenthesized count is actually present.
fn stock_from_availability(availability: Option<&str>) -> Stock {
    let Some(text) = availability else {
        return Stock::Unstated;
    };
    let Some((_, tail)) = text.rsplit_once('(') else {
        return Stock::Unstated;
    };

    let digits: String = tail
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(count) => Stock::Counted(count),
        Err(_) => {
            warn!("Availability text '{}' has no parsable count, storing 0", text);
            Stock::Unstated
        }
    }
}

/// Parses a currency-prefixed decimal, logging a present but unparsable value
fn parse_price_field(name: &str, value: Option<&str>, currency_symbol: &str) -> Option<f64> {
    let text = value?;
    match parse_price(text, currency_symbol) {
        Some(price) => Some(price),
        None => {
            warn!("Could not parse {} value '{}', leaving field empty", name, text);
            None
        }
    }
}

fn parse_price(text: &str, currency_symbol: &str) -> Option<f64> {
    let trimmed = text.trim();
    // double-encoded sources prefix the currency symbol with a stray 'Â'
    let trimmed = trimmed.strip_prefix('Â').unwrap_or(trimmed);
    let bare = trimmed.strip_prefix(currency_symbol).unwrap_or(trimmed);
    let bare = bare.trim();
    if bare.is_empty() {
        return None;
    }
    bare.parse::<f64>().ok()
}

/// Parses a plain integer count, logging a present but unparsable value
fn parse_count_field(name: &str, value: Option<&str>) -> Option<u32> {
    let text = value?;
    match text.trim().parse::<u32>() {
        Ok(count) => Some(count),
        Err(_) => {
            warn!("Could not parse {} value '{}', leaving field empty", name, text);
            None
        }
    }
}
