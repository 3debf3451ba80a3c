//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! summary statistics from the storage layer.

use crate::storage::{PriceSummary, StorageResult, Store};

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total number of book records
    pub book_count: u64,

    /// Number of distinct genres
    pub genre_count: u64,

    /// Book counts per genre label, largest first
    pub genre_breakdown: Vec<(String, u64)>,

    /// Aggregates over records with a parsed price
    pub prices: PriceSummary,

    /// Timestamp of the most recently ingested record
    pub latest_ingested_at: Option<String>,
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The storage backend to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(store: &dyn Store) -> StorageResult<HarvestStatistics> {
    Ok(HarvestStatistics {
        book_count: store.count_books()?,
        genre_count: store.count_genres()?,
        genre_breakdown: store.genre_breakdown()?,
        prices: store.price_summary()?,
        latest_ingested_at: store.latest_ingested_at()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Book records: {}", stats.book_count);
    println!("  Distinct genres: {}", stats.genre_count);
    if let Some(latest) = &stats.latest_ingested_at {
        println!("  Last ingested at: {}", latest);
    }
    println!();

    if !stats.genre_breakdown.is_empty() {
        println!("Books by Genre:");
        for (label, count) in &stats.genre_breakdown {
            let percentage = if stats.book_count > 0 {
                (*count as f64 / stats.book_count as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", label, count, percentage);
        }
        println!();
    }

    println!("Prices (incl. tax):");
    println!(
        "  Records with a parsed price: {} / {}",
        stats.prices.priced_books, stats.book_count
    );
    if let (Some(min), Some(max), Some(avg)) =
        (stats.prices.min, stats.prices.max, stats.prices.avg)
    {
        println!("  Min: {:.2}", min);
        println!("  Max: {:.2}", max);
        println!("  Avg: {:.2}", avg);
    }
}
