//! Bounded, newest-first history of saved searches.

use crate::error::StorageError;
use crate::query::filter::FilterState;
use crate::storage::kv::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Slot the history is persisted under
pub const SAVED_SEARCHES_KEY: &str = "directory_saved_searches";

/// Default bound on the history length
pub const MAX_SAVED_SEARCHES: usize = 10;

/// A persisted query plus the facet selections it ran with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub query: String,
    pub filters: FilterState,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// Outcome of reading the persisted history
#[derive(Debug, Clone, PartialEq)]
pub enum StorageRead<T> {
    Loaded(T),
    /// Slot never written
    Missing,
    Unavailable(String),
    Corrupt(String),
}

/// Outcome of a save request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// History persisted with `len` entries
    Saved { len: usize },
    /// Query was empty or whitespace; nothing written
    SkippedEmptyQuery,
    Unavailable(String),
}

/// Saved-search history over a key-value backend
#[derive(Debug)]
pub struct SavedSearchStore<S: KeyValueStore> {
    backend: S,
    limit: usize,
}

impl<S: KeyValueStore> SavedSearchStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_limit(backend, MAX_SAVED_SEARCHES)
    }

    /// History bounded to `limit` entries; the bound is never below one
    pub fn with_limit(backend: S, limit: usize) -> Self {
        Self {
            backend,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read the history, reporting exactly why it could not be read.
    ///
    /// A slot written with a larger bound comes back truncated to this one.
    pub fn read(&self) -> StorageRead<Vec<SavedSearch>> {
        match self.backend.get(SAVED_SEARCHES_KEY) {
            Ok(None) => StorageRead::Missing,
            Ok(Some(raw)) => match serde_json::from_str::<Vec<SavedSearch>>(&raw) {
                Ok(mut list) => {
                    if list.len() > self.limit {
                        debug!("truncating {} saved searches to {}", list.len(), self.limit);
                        list.truncate(self.limit);
                    }
                    StorageRead::Loaded(list)
                }
                Err(e) => StorageRead::Corrupt(e.to_string()),
            },
            Err(StorageError::Unavailable(reason)) => StorageRead::Unavailable(reason),
            Err(StorageError::Corrupt(reason)) => StorageRead::Corrupt(reason),
        }
    }

    /// Read the history; every failure collapses to an empty list
    pub fn load(&self) -> Vec<SavedSearch> {
        match self.read() {
            StorageRead::Loaded(list) => list,
            StorageRead::Missing => Vec::new(),
            StorageRead::Unavailable(reason) => {
                warn!("saved searches unavailable: {}", reason);
                Vec::new()
            }
            StorageRead::Corrupt(reason) => {
                warn!("discarding corrupt saved searches: {}", reason);
                Vec::new()
            }
        }
    }

    /// Save the current query and filters, stamped with the current time
    pub fn save(&mut self, query: &str, filters: &FilterState) -> SaveOutcome {
        self.save_at(query, filters, chrono::Utc::now().timestamp_millis())
    }

    /// Prepend an entry and persist the history truncated to the limit
    pub fn save_at(&mut self, query: &str, filters: &FilterState, timestamp: i64) -> SaveOutcome {
        if query.trim().is_empty() {
            return SaveOutcome::SkippedEmptyQuery;
        }

        let mut list = match self.read() {
            StorageRead::Loaded(list) => list,
            StorageRead::Missing => Vec::new(),
            StorageRead::Corrupt(reason) => {
                warn!("replacing corrupt saved searches: {}", reason);
                Vec::new()
            }
            StorageRead::Unavailable(reason) => {
                warn!("cannot save search: {}", reason);
                return SaveOutcome::Unavailable(reason);
            }
        };

        list.insert(
            0,
            SavedSearch {
                query: query.to_string(),
                filters: filters.clone(),
                timestamp,
            },
        );
        list.truncate(self.limit);

        let encoded = match serde_json::to_string(&list) {
            Ok(encoded) => encoded,
            Err(e) => return SaveOutcome::Unavailable(e.to_string()),
        };

        match self.backend.set(SAVED_SEARCHES_KEY, &encoded) {
            Ok(()) => {
                debug!("saved search {:?} ({} in history)", query, list.len());
                SaveOutcome::Saved { len: list.len() }
            }
            Err(e) => {
                warn!("cannot save search: {}", e);
                SaveOutcome::Unavailable(e.to_string())
            }
        }
    }
}
