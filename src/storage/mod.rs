//! Persistence for saved searches.
//!
//! - [`kv`] - the key-value boundary and its in-memory / file backends
//! - [`saved`] - the bounded saved-search history stored in one slot

pub mod kv;
pub mod saved;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use saved::{
    SaveOutcome, SavedSearch, SavedSearchStore, StorageRead, MAX_SAVED_SEARCHES,
    SAVED_SEARCHES_KEY,
};
