//! CSS selectors for catalog HTML parsing.
//!
//! This file contains all CSS selectors used for parsing listing and detail
//! pages. Update this file when the catalog changes its HTML structure.
//!
//! **Update process**: When extraction starts returning empty fields, capture
//! an HTML sample, update selectors, and add a test fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for catalog listing pages.
pub mod listing {
    use super::*;

    /// Link to a product detail page inside one listing card.
    pub static ITEM_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("article.product_pod h3 a").unwrap());

    /// Pagination link to the next listing page.
    pub static NEXT_PAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("li.next a").unwrap());
}

/// Selectors for product detail pages.
pub mod detail {
    use super::*;

    /// Book title heading.
    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.product_main h1").unwrap());

    /// Genre entry of the breadcrumb trail (home / catalog / genre / title).
    pub static BREADCRUMB_GENRE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("ul.breadcrumb li:nth-child(3) a").unwrap());

    /// Star rating element; the rating word rides in its class list.
    pub static STAR_RATING: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("p.star-rating").unwrap());

    /// Paragraph immediately after the description header.
    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("#product_description + p").unwrap());

    /// One row of the product information table.
    pub static INFO_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table tr").unwrap());

    /// Label cell of an information row.
    pub static INFO_LABEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());

    /// Value cell of an information row.
    pub static INFO_VALUE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
}
