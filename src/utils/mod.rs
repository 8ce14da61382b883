//! Shared utilities.
//!
//! - [`app_data`] - Engine configuration and app data directory management (XDG-compliant)
//! - [`debouncer`] - Polled cancellable timer used to debounce typed queries

pub mod app_data;
pub mod debouncer;

pub use app_data::*;
pub use debouncer::CancellableTimer;
