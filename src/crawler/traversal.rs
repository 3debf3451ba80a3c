//! Listing-page traversal
//!
//! This module handles walking the paginated catalog listing:
//! - Item links extracted in document order
//! - At most one "next" link per page, followed until a page has none
//! - Cycle and duplicate tracking, since the chain is externally
//!   controlled markup

use crate::extract::selectors::listing;
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// Extracted navigation from one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Detail-page links in document order (absolute URLs)
    pub items: Vec<Url>,

    /// The next listing page, when the chain continues
    pub next: Option<Url>,
}

/// Parses a listing page into its item links and next link
///
/// # Link Resolution Rules
///
/// **Include:**
/// - Item anchors, resolved against the page URL
/// - The first "next" anchor, resolved the same way
///
/// **Exclude:**
/// - Anchors without an `href`
/// - Hrefs that do not resolve to a valid URL
/// - Non-HTTP(S) URLs after resolution
///
/// # Arguments
///
/// * `html` - The listing page HTML
/// * `page_url` - The URL the page was fetched from, for resolving
///   relative hrefs
pub fn parse_listing(html: &str, page_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let mut items = Vec::new();
    for element in document.select(&listing::ITEM_LINK) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(url) = resolve_link(href, page_url) {
            items.push(url);
        }
    }

    let next = document
        .select(&listing::NEXT_PAGE)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| resolve_link(href, page_url));

    ListingPage { items, next }
}

/// Resolves an href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - Empty or fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match page_url.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        Ok(url) => {
            debug!("Skipping non-HTTP link: {}", url);
            None
        }
        Err(e) => {
            warn!("Skipping unresolvable link '{}': {}", href, e);
            None
        }
    }
}

/// Tracks which pages the walk has seen
///
/// Listing URLs are tracked to terminate next-link cycles; item URLs are
/// tracked so each detail page is fetched exactly once per run even when
/// it appears on multiple listing pages.
#[derive(Debug, Default)]
pub struct Traversal {
    visited_listings: HashSet<String>,
    seen_items: HashSet<String>,
}

impl Traversal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a listing page as visited
    ///
    /// Returns false when the page was already walked, which means the
    /// next-link chain has looped back on itself.
    pub fn visit_listing(&mut self, url: &Url) -> bool {
        self.visited_listings.insert(url.to_string())
    }

    /// Records an item link as discovered
    ///
    /// Returns false when the item was already seen on an earlier page.
    pub fn discover_item(&mut self, url: &Url) -> bool {
        self.seen_items.insert(url.to_string())
    }

    pub fn listings_visited(&self) -> u64 {
        self.visited_listings.len() as u64
    }

    pub fn items_discovered(&self) -> u64 {
        self.seen_items.len() as u64
    }
}
