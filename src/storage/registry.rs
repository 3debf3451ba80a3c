//! Genre label to row-id resolution
//!
//! The registry fronts the genres table with an in-memory cache. A label is
//! resolved at most once per run; every later record in the same genre reuses
//! the cached id without touching the database.

use crate::storage::traits::{StorageResult, Store};
use std::collections::HashMap;

/// Cache of resolved genre labels
#[derive(Debug, Default)]
pub struct GenreRegistry {
    cache: HashMap<String, i64>,
}

impl GenreRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated from the existing genre rows
    pub fn load(store: &dyn Store) -> StorageResult<Self> {
        let mut cache = HashMap::new();
        for genre in store.load_genres()? {
            cache.insert(genre.label, genre.id);
        }
        Ok(Self { cache })
    }

    /// Resolves a label to its genre id, creating the row on first sight
    ///
    /// The store-level insert is an insert-or-ignore followed by a re-read,
    /// so two resolvers racing on a new label both end up with the same id.
    pub fn resolve(&mut self, store: &mut dyn Store, label: &str) -> StorageResult<i64> {
        if let Some(&id) = self.cache.get(label) {
            return Ok(id);
        }

        let id = store.resolve_genre(label)?;
        self.cache.insert(label.to_string(), id);
        Ok(id)
    }

    /// Number of labels resolved so far
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
