//! Storage module for persisting harvested records
//!
//! This module handles all database operations for the pipeline, including:
//! - SQLite database initialization and schema management
//! - Genre dimension resolution and caching
//! - Per-record book ingestion (append or upsert)
//! - Statistics queries over the persisted tables

mod registry;
mod schema;
mod sink;
mod sqlite;
mod traits;

pub use registry::GenreRegistry;
pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sink::{IngestOutcome, IngestSink};
pub use sqlite::SqliteStore;
pub use traits::{StorageError, StorageResult, Store};

/// Represents a genre row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreRecord {
    pub id: i64,
    pub label: String,
}

/// Represents a book row as persisted
#[derive(Debug, Clone)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub genre_id: Option<i64>,
    pub rating: u32,
    pub stock: u32,
    pub ingested_at: String,
    pub upc: String,
    pub product_type: String,
    pub price_excl_tax: Option<f64>,
    pub price_incl_tax: Option<f64>,
    pub review_count: Option<u32>,
    pub description: String,
}

/// Aggregates over the tax-inclusive price column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSummary {
    /// Number of rows with a non-NULL price
    pub priced_books: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}
