//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::extract::NormalizedBook;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, Store};
use crate::storage::{BookRecord, GenreRecord, PriceSummary};
use crate::SweepError;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a database at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(SweepError)` - Failed to open database
    pub fn open(path: &Path) -> Result<Self, SweepError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, SweepError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    // ===== Genre Management =====

    fn resolve_genre(&mut self, label: &str) -> StorageResult<i64> {
        // Write first: a losing concurrent insert is silently ignored and the
        // re-read below converges on whichever row won.
        self.conn.execute(
            "INSERT OR IGNORE INTO genres (label) VALUES (?1)",
            params![label],
        )?;

        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM genres WHERE label = ?1",
                params![label],
                |row| row.get(0),
            )
            .optional()?;

        id.ok_or_else(|| StorageError::GenreNotFound(label.to_string()))
    }

    fn find_genre(&self, label: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM genres WHERE label = ?1",
                params![label],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn load_genres(&self) -> StorageResult<Vec<GenreRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, label FROM genres ORDER BY id")?;

        let genres = stmt
            .query_map([], |row| {
                Ok(GenreRecord {
                    id: row.get(0)?,
                    label: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(genres)
    }

    // ===== Book Ingestion =====

    fn insert_book(&mut self, genre_id: i64, book: &NormalizedBook) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO books (title, genre_id, rating, stock, ingested_at, upc,
             product_type, price_excl_tax, price_incl_tax, review_count, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                book.title,
                genre_id,
                book.rating.stars(),
                book.stock.count(),
                book.ingested_at,
                book.upc,
                book.product_type,
                book.price_excl_tax,
                book.price_incl_tax,
                book.review_count,
                book.description,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_book_by_upc(&self, upc: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM books WHERE upc = ?1 ORDER BY id LIMIT 1",
                params![upc],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn update_book(
        &mut self,
        book_id: i64,
        genre_id: i64,
        book: &NormalizedBook,
    ) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE books SET title = ?1, genre_id = ?2, rating = ?3, stock = ?4,
             ingested_at = ?5, product_type = ?6, price_excl_tax = ?7,
             price_incl_tax = ?8, review_count = ?9, description = ?10
             WHERE id = ?11",
            params![
                book.title,
                genre_id,
                book.rating.stars(),
                book.stock.count(),
                book.ingested_at,
                book.product_type,
                book.price_excl_tax,
                book.price_incl_tax,
                book.review_count,
                book.description,
                book_id,
            ],
        )?;
        Ok(())
    }

    fn get_book(&self, book_id: i64) -> StorageResult<BookRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, genre_id, rating, stock, ingested_at, upc,
             product_type, price_excl_tax, price_incl_tax, review_count, description
             FROM books WHERE id = ?1",
        )?;

        let book = stmt
            .query_row(params![book_id], |row| {
                Ok(BookRecord {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    genre_id: row.get(2)?,
                    rating: row.get(3)?,
                    stock: row.get(4)?,
                    ingested_at: row.get(5)?,
                    upc: row.get(6)?,
                    product_type: row.get(7)?,
                    price_excl_tax: row.get(8)?,
                    price_incl_tax: row.get(9)?,
                    review_count: row.get(10)?,
                    description: row.get(11)?,
                })
            })
            .map_err(|_| StorageError::BookNotFound(book_id))?;

        Ok(book)
    }

    // ===== Statistics =====

    fn count_books(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_genres(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM genres", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn genre_breakdown(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT g.label, COUNT(b.id) as count
             FROM genres g LEFT JOIN books b ON b.genre_id = g.id
             GROUP BY g.id
             ORDER BY count DESC, g.label",
        )?;

        let breakdown = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(breakdown)
    }

    fn price_summary(&self) -> StorageResult<PriceSummary> {
        let summary = self.conn.query_row(
            "SELECT COUNT(price_incl_tax), MIN(price_incl_tax),
             MAX(price_incl_tax), AVG(price_incl_tax) FROM books",
            [],
            |row| {
                Ok(PriceSummary {
                    priced_books: row.get::<_, i64>(0)? as u64,
                    min: row.get(1)?,
                    max: row.get(2)?,
                    avg: row.get(3)?,
                })
            },
        )?;
        Ok(summary)
    }

    fn latest_ingested_at(&self) -> StorageResult<Option<String>> {
        let latest = self
            .conn
            .query_row("SELECT MAX(ingested_at) FROM books", [], |row| row.get(0))?;
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Rating, Stock};

    fn sample_book(title: &str, upc: &str) -> NormalizedBook {
        NormalizedBook {
            title: title.to_string(),
            genre: "Poetry".to_string(),
            rating: Rating::Recognized(3),
            stock: Stock::Counted(22),
            ingested_at: "2024-05-01T12:00:00+00:00".to_string(),
            upc: upc.to_string(),
            product_type: "Books".to_string(),
            price_excl_tax: Some(51.77),
            price_incl_tax: Some(51.77),
            review_count: Some(0),
            description: "A sample book.".to_string(),
        }
    }

    #[test]
    fn test_create_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_resolve_genre_creates_once() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let first = store.resolve_genre("Poetry").unwrap();
        let second = store.resolve_genre("Poetry").unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_genres().unwrap(), 1);
    }

    #[test]
    fn test_resolve_genre_distinct_labels() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let poetry = store.resolve_genre("Poetry").unwrap();
        let travel = store.resolve_genre("Travel").unwrap();

        assert_ne!(poetry, travel);
        assert_eq!(store.count_genres().unwrap(), 2);
    }

    #[test]
    fn test_find_genre_does_not_create() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert_eq!(store.find_genre("Poetry").unwrap(), None);
        let id = store.resolve_genre("Poetry").unwrap();
        assert_eq!(store.find_genre("Poetry").unwrap(), Some(id));
    }

    #[test]
    fn test_insert_book_and_get() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let genre_id = store.resolve_genre("Poetry").unwrap();

        let book_id = store
            .insert_book(genre_id, &sample_book("A Light in the Attic", "upc-1"))
            .unwrap();
        let record = store.get_book(book_id).unwrap();

        assert_eq!(record.title, "A Light in the Attic");
        assert_eq!(record.genre_id, Some(genre_id));
        assert_eq!(record.rating, 3);
        assert_eq!(record.stock, 22);
        assert_eq!(record.upc, "upc-1");
        assert_eq!(record.price_incl_tax, Some(51.77));
        assert_eq!(record.review_count, Some(0));
    }

    #[test]
    fn test_insert_book_with_null_price() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let genre_id = store.resolve_genre("Poetry").unwrap();

        let mut book = sample_book("Oddly Priced", "upc-2");
        book.price_incl_tax = None;
        book.review_count = None;

        let book_id = store.insert_book(genre_id, &book).unwrap();
        let record = store.get_book(book_id).unwrap();

        assert_eq!(record.price_incl_tax, None);
        assert_eq!(record.price_excl_tax, Some(51.77));
        assert_eq!(record.review_count, None);
    }

    #[test]
    fn test_find_book_by_upc() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let genre_id = store.resolve_genre("Poetry").unwrap();

        assert_eq!(store.find_book_by_upc("upc-3").unwrap(), None);
        let book_id = store
            .insert_book(genre_id, &sample_book("Findable", "upc-3"))
            .unwrap();
        assert_eq!(store.find_book_by_upc("upc-3").unwrap(), Some(book_id));
    }

    #[test]
    fn test_find_book_by_upc_prefers_earliest() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let genre_id = store.resolve_genre("Poetry").unwrap();

        let first = store
            .insert_book(genre_id, &sample_book("Twice Over", "upc-4"))
            .unwrap();
        store
            .insert_book(genre_id, &sample_book("Twice Over", "upc-4"))
            .unwrap();

        assert_eq!(store.find_book_by_upc("upc-4").unwrap(), Some(first));
    }

    #[test]
    fn test_update_book_rewrites_fields() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let genre_id = store.resolve_genre("Poetry").unwrap();
        let book_id = store
            .insert_book(genre_id, &sample_book("Mutable", "upc-5"))
            .unwrap();

        let mut updated = sample_book("Mutable, Revised", "upc-5");
        updated.rating = Rating::Recognized(5);
        updated.price_incl_tax = Some(9.99);
        store.update_book(book_id, genre_id, &updated).unwrap();

        let record = store.get_book(book_id).unwrap();
        assert_eq!(record.title, "Mutable, Revised");
        assert_eq!(record.rating, 5);
        assert_eq!(record.price_incl_tax, Some(9.99));
        assert_eq!(store.count_books().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_book() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.get_book(999);
        assert!(matches!(result, Err(StorageError::BookNotFound(999))));
    }

    #[test]
    fn test_genre_breakdown() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let poetry = store.resolve_genre("Poetry").unwrap();
        let travel = store.resolve_genre("Travel").unwrap();

        store
            .insert_book(poetry, &sample_book("Poems I", "upc-6"))
            .unwrap();
        store
            .insert_book(poetry, &sample_book("Poems II", "upc-7"))
            .unwrap();
        store
            .insert_book(travel, &sample_book("Wanderlust", "upc-8"))
            .unwrap();

        let breakdown = store.genre_breakdown().unwrap();
        assert_eq!(breakdown[0], ("Poetry".to_string(), 2));
        assert_eq!(breakdown[1], ("Travel".to_string(), 1));
    }

    #[test]
    fn test_price_summary_skips_nulls() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let genre_id = store.resolve_genre("Poetry").unwrap();

        let mut cheap = sample_book("Cheap", "upc-9");
        cheap.price_incl_tax = Some(10.0);
        let mut dear = sample_book("Dear", "upc-10");
        dear.price_incl_tax = Some(30.0);
        let mut unpriced = sample_book("Unpriced", "upc-11");
        unpriced.price_incl_tax = None;

        store.insert_book(genre_id, &cheap).unwrap();
        store.insert_book(genre_id, &dear).unwrap();
        store.insert_book(genre_id, &unpriced).unwrap();

        let summary = store.price_summary().unwrap();
        assert_eq!(summary.priced_books, 2);
        assert_eq!(summary.min, Some(10.0));
        assert_eq!(summary.max, Some(30.0));
        assert_eq!(summary.avg, Some(20.0));
    }

    #[test]
    fn test_price_summary_empty_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        let summary = store.price_summary().unwrap();
        assert_eq!(summary.priced_books, 0);
        assert_eq!(summary.min, None);
        assert_eq!(summary.avg, None);
    }

    #[test]
    fn test_latest_ingested_at() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.latest_ingested_at().unwrap(), None);

        let genre_id = store.resolve_genre("Poetry").unwrap();
        let mut early = sample_book("Early", "upc-12");
        early.ingested_at = "2024-05-01T08:00:00+00:00".to_string();
        let mut late = sample_book("Late", "upc-13");
        late.ingested_at = "2024-05-01T09:00:00+00:00".to_string();

        store.insert_book(genre_id, &early).unwrap();
        store.insert_book(genre_id, &late).unwrap();

        assert_eq!(
            store.latest_ingested_at().unwrap().as_deref(),
            Some("2024-05-01T09:00:00+00:00")
        );
    }
}
