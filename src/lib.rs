//! # dirsearch - Faceted Directory Search
//!
//! Client-side search and autocomplete over a precomputed directory index.
//! The index (entities plus their category, location and type facets) is
//! fetched once per session; after that every query, facet change and
//! keystroke is answered locally.
//!
//! ## Architecture
//!
//! - [`index`] - Index document types and the one-shot [`index::IndexStore`]
//! - [`query`] - Filter state, sort keys and the filter/sort engine
//! - [`suggest`] - Autocomplete and the suggestion dropdown state machine
//! - [`storage`] - Saved-search history over a key-value boundary
//! - [`output`] - Escaped views for presenters, terminal printers
//! - [`context`] - [`context::DirectoryContext`], the session that wires it all together
//! - [`utils`] - Configuration and the debounce timer
//! - `tui` - Interactive terminal UI (feature `interactive`)
//!
//! ## Quick Start
//!
//! ```no_run
//! use dirsearch::context::DirectoryContext;
//! use dirsearch::index::FileSource;
//! use dirsearch::storage::MemoryStore;
//! use dirsearch::utils::EngineConfig;
//!
//! let mut ctx = DirectoryContext::new(EngineConfig::default(), MemoryStore::new());
//! ctx.load_index(&FileSource::new("public/api/directory-search.json")).unwrap();
//!
//! ctx.set_category("Restaurants").unwrap();
//! for entity in ctx.results() {
//!     println!("{} ({})", entity.name, entity.location_or_empty());
//! }
//! ```

pub mod context;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod storage;
pub mod suggest;
#[cfg(feature = "interactive")]
pub mod tui;
pub mod utils;

pub use context::DirectoryContext;
pub use error::{EngineError, LoadFailure, Result, StorageError};
