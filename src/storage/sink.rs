//! Ingestion sink: the single write path into the store
//!
//! One sink instance owns the store and the genre registry for the duration
//! of a run. Every record is resolved and written as its own autocommitted
//! statement, so a failed write affects only that record and nothing already
//! ingested is lost on interruption.

use crate::config::IngestMode;
use crate::extract::NormalizedBook;
use crate::storage::registry::GenreRegistry;
use crate::storage::traits::{StorageResult, Store};
use tracing::debug;

/// What happened to one ingested record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new book row was created
    Inserted(i64),
    /// An existing row matched on UPC and was rewritten
    Updated(i64),
}

/// Writes normalized records into the store, one commit per record
pub struct IngestSink<S: Store> {
    store: S,
    registry: GenreRegistry,
    mode: IngestMode,
}

impl<S: Store> IngestSink<S> {
    /// Creates a sink over the given store, rehydrating the genre registry
    /// from rows left by earlier runs
    pub fn new(store: S, mode: IngestMode) -> StorageResult<Self> {
        let registry = GenreRegistry::load(&store)?;
        Ok(Self {
            store,
            registry,
            mode,
        })
    }

    /// Ingests one record: resolve the genre, write the row, commit
    pub fn ingest(&mut self, book: &NormalizedBook) -> StorageResult<IngestOutcome> {
        let genre_id = self.registry.resolve(&mut self.store, &book.genre)?;

        match self.mode {
            IngestMode::Append => self.insert(genre_id, book),
            IngestMode::Upsert => {
                // A record without a UPC carries no identity to match on
                if book.upc.is_empty() {
                    return self.insert(genre_id, book);
                }
                match self.store.find_book_by_upc(&book.upc)? {
                    Some(book_id) => {
                        self.store.update_book(book_id, genre_id, book)?;
                        debug!("Updated book {} ('{}')", book_id, book.title);
                        Ok(IngestOutcome::Updated(book_id))
                    }
                    None => self.insert(genre_id, book),
                }
            }
        }
    }

    fn insert(&mut self, genre_id: i64, book: &NormalizedBook) -> StorageResult<IngestOutcome> {
        let book_id = self.store.insert_book(genre_id, book)?;
        debug!("Inserted book {} ('{}')", book_id, book.title);
        Ok(IngestOutcome::Inserted(book_id))
    }

    /// Number of distinct genres resolved so far
    pub fn genres_resolved(&self) -> usize {
        self.registry.len()
    }

    /// Read access to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }
}
