//! One-shot index loading.
//!
//! The index artifact is fetched exactly once per session. A failed fetch is
//! terminal: the store stays in [`LoadState::Failed`] and every later `get()`
//! reports the same failure.

use crate::error::{EngineError, LoadFailure, Result};
use crate::index::types::Index;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Default endpoint the site publishes the search index under
pub const DEFAULT_INDEX_ENDPOINT: &str = "/api/directory-search.json";

/// Somewhere the index artifact can be fetched from
pub trait IndexSource {
    /// Human-readable location, for logs and error messages
    fn describe(&self) -> String;

    /// Fetch the raw artifact bytes
    fn fetch(&self) -> std::result::Result<Vec<u8>, LoadFailure>;
}

/// Index artifact on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl IndexSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> std::result::Result<Vec<u8>, LoadFailure> {
        fs::read(&self.path).map_err(|e| LoadFailure::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

/// Index artifact already held in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl IndexSource for MemorySource {
    fn describe(&self) -> String {
        format!("<memory: {} bytes>", self.bytes.len())
    }

    fn fetch(&self) -> std::result::Result<Vec<u8>, LoadFailure> {
        Ok(self.bytes.clone())
    }
}

/// Index artifact served over HTTP
#[cfg(feature = "http")]
pub struct HttpSource {
    url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

#[cfg(feature = "http")]
impl IndexSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> std::result::Result<Vec<u8>, LoadFailure> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| LoadFailure::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadFailure::Status(status.as_u16()));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| LoadFailure::Network(e.to_string()))
    }
}

/// Pick a source for a configured index location
#[cfg(feature = "http")]
pub fn source_for(location: &str) -> Box<dyn IndexSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}

/// Pick a source for a configured index location.
///
/// Without the `http` feature every location is treated as a path.
#[cfg(not(feature = "http"))]
pub fn source_for(location: &str) -> Box<dyn IndexSource> {
    Box::new(FileSource::new(location))
}

/// Fetch and decode an index without touching any store.
///
/// Safe to run off the owning thread; hand the result to
/// [`IndexStore::finish`].
pub fn fetch_index(source: &dyn IndexSource) -> std::result::Result<Index, LoadFailure> {
    debug!("fetching index from {}", source.describe());
    let bytes = source.fetch()?;
    Index::from_json(&bytes)
}

/// Index lifecycle
#[derive(Debug, Default)]
pub enum LoadState {
    /// No load attempted yet
    #[default]
    Pending,
    /// Fetch in flight
    Loading,
    /// Index loaded and immutable for the rest of the session
    Ready(Index),
    /// Fetch or decode failed; no automatic retry
    Failed(LoadFailure),
}

/// Holds the session's directory index
#[derive(Debug, Default)]
pub struct IndexStore {
    state: LoadState,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an already-decoded index (fixtures and tests)
    pub fn with_index(index: Index) -> Self {
        Self {
            state: LoadState::Ready(index),
        }
    }

    /// Fetch the index once and store it
    pub fn load(&mut self, source: &dyn IndexSource) -> Result<&Index> {
        self.begin()?;
        let result = fetch_index(source);
        self.finish(result)
    }

    /// Mark the fetch as started. Fails if a load was already attempted.
    pub fn begin(&mut self) -> Result<()> {
        match self.state {
            LoadState::Pending => {
                self.state = LoadState::Loading;
                Ok(())
            }
            _ => Err(EngineError::AlreadyLoaded),
        }
    }

    /// Record the outcome of a fetch started with [`begin`](Self::begin)
    pub fn finish(&mut self, result: std::result::Result<Index, LoadFailure>) -> Result<&Index> {
        if !matches!(self.state, LoadState::Loading) {
            return Err(EngineError::AlreadyLoaded);
        }

        match result {
            Ok(index) => {
                info!(
                    entities = index.entities.len(),
                    categories = index.categories.len(),
                    locations = index.locations.len(),
                    types = index.entity_types.len(),
                    "directory index ready"
                );
                self.state = LoadState::Ready(index);
            }
            Err(failure) => {
                warn!("directory index failed to load: {}", failure);
                self.state = LoadState::Failed(failure);
            }
        }

        self.get()
    }

    /// The loaded index
    pub fn get(&self) -> Result<&Index> {
        match &self.state {
            LoadState::Ready(index) => Ok(index),
            LoadState::Failed(failure) => Err(EngineError::IndexLoadFailed(failure.clone())),
            LoadState::Pending | LoadState::Loading => Err(EngineError::NotReady),
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, LoadState::Failed(_))
    }
}
