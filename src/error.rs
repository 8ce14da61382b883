//! Error types for the directory search engine.
//!
//! Index and engine failures propagate as [`EngineError`]. Persistence
//! failures are reported as [`StorageError`] and are absorbed by the saved
//! search store instead of reaching the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Why the index artifact could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to read {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("invalid index document: {0}")]
    Parse(String),
}

/// Main error type for engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The one-time index load failed; search is unavailable for the session
    #[error("Index load failed: {0}")]
    IndexLoadFailed(#[from] LoadFailure),

    /// Search or autocomplete was invoked before the index finished loading
    #[error("Index is not ready")]
    NotReady,

    /// A second load was attempted in the same session
    #[error("Index has already been loaded for this session")]
    AlreadyLoaded,
}

/// Key-value persistence failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt payload: {0}")]
    Corrupt(String),
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
