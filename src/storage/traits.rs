//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::extract::NormalizedBook;
use crate::storage::{BookRecord, GenreRecord, PriceSummary};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Book not found: {0}")]
    BookNotFound(i64),

    #[error("Genre disappeared after insert: {0}")]
    GenreNotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the harvest pipeline.
/// Writes are expected to commit per call; a failed call leaves earlier
/// records untouched.
pub trait Store {
    // ===== Genre Management =====

    /// Resolves a genre label to its row id, creating the row if needed
    ///
    /// Uses insert-or-ignore followed by a re-read, so concurrent resolvers
    /// of the same new label converge on a single id.
    fn resolve_genre(&mut self, label: &str) -> StorageResult<i64>;

    /// Looks up a genre id by label without creating it
    fn find_genre(&self, label: &str) -> StorageResult<Option<i64>>;

    /// Loads all genre rows
    fn load_genres(&self) -> StorageResult<Vec<GenreRecord>>;

    // ===== Book Ingestion =====

    /// Inserts one book row and returns its id
    fn insert_book(&mut self, genre_id: i64, book: &NormalizedBook) -> StorageResult<i64>;

    /// Finds the earliest book row carrying the given UPC
    fn find_book_by_upc(&self, upc: &str) -> StorageResult<Option<i64>>;

    /// Rewrites an existing book row in place, keeping its id and UPC
    fn update_book(&mut self, book_id: i64, genre_id: i64, book: &NormalizedBook)
        -> StorageResult<()>;

    /// Gets a book row by id
    fn get_book(&self, book_id: i64) -> StorageResult<BookRecord>;

    // ===== Statistics =====

    /// Total number of book rows
    fn count_books(&self) -> StorageResult<u64>;

    /// Total number of genre rows
    fn count_genres(&self) -> StorageResult<u64>;

    /// Book count per genre label, largest first
    fn genre_breakdown(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Aggregates over the tax-inclusive price column, ignoring NULLs
    fn price_summary(&self) -> StorageResult<PriceSummary>;

    /// Most recent ingestion timestamp, if any rows exist
    fn latest_ingested_at(&self) -> StorageResult<Option<String>>;
}
