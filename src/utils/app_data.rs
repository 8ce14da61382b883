use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::index::store::DEFAULT_INDEX_ENDPOINT;
use crate::storage::kv::FileStore;
use crate::storage::saved::MAX_SAVED_SEARCHES;
use crate::suggest::engine::{DEFAULT_MIN_SUGGESTION_CHARS, DEFAULT_SUGGESTION_LIMIT};

const APP_NAME: &str = "dirsearch";
const CONFIG_FILE: &str = "config.json";
const STORAGE_DIR: &str = "storage";

/// Engine configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Where the index document lives: a file path, or an http(s) URL with the `http` feature
    #[serde(default = "default_index_location")]
    pub index_location: String,

    /// Quiet window before a typed query recomputes results
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum suggestions shown in the dropdown
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Trimmed query length below which no suggestions are offered
    #[serde(default = "default_min_suggestion_chars")]
    pub min_suggestion_chars: usize,

    /// Bound on the saved-search history
    #[serde(default = "default_saved_search_limit")]
    pub saved_search_limit: usize,

    /// Drop suggestions repeating an earlier (kind, text) pair
    #[serde(default = "default_dedupe_suggestions")]
    pub dedupe_suggestions: bool,
}

fn default_index_location() -> String {
    format!("public{}", DEFAULT_INDEX_ENDPOINT)
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

fn default_min_suggestion_chars() -> usize {
    DEFAULT_MIN_SUGGESTION_CHARS
}

fn default_saved_search_limit() -> usize {
    MAX_SAVED_SEARCHES
}

fn default_dedupe_suggestions() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_location: default_index_location(),
            debounce_ms: default_debounce_ms(),
            suggestion_limit: default_suggestion_limit(),
            min_suggestion_chars: default_min_suggestion_chars(),
            saved_search_limit: default_saved_search_limit(),
            dedupe_suggestions: default_dedupe_suggestions(),
        }
    }
}

impl EngineConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Directory holding persisted key-value slots (saved searches)
pub fn get_storage_dir() -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join(STORAGE_DIR))
}

/// The file-backed store used by the binary
pub fn default_file_store() -> Result<FileStore> {
    Ok(FileStore::new(get_storage_dir()?))
}
