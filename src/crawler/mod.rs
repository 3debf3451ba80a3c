//! Crawler module for catalog fetching and traversal
//!
//! This module contains the core harvest logic, including:
//! - HTTP fetching with bounded retry
//! - Listing-page traversal and item discovery
//! - Worker-pool coordination feeding the single-writer sink

mod coordinator;
mod fetcher;
mod traversal;

pub use coordinator::{run_harvest, Coordinator, HarvestReport};
pub use fetcher::{build_http_client, fetch_html, FetchError, RetryPolicy};
pub use traversal::{parse_listing, ListingPage, Traversal};
