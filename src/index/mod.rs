pub mod store;
pub mod types;

pub use store::{
    fetch_index, source_for, FileSource, IndexSource, IndexStore, LoadState, MemorySource,
    DEFAULT_INDEX_ENDPOINT,
};
#[cfg(feature = "http")]
pub use store::HttpSource;
pub use types::*;
