pub mod executor;
pub mod filter;

pub use executor::{collate, facet_counts, matches, recompute, FacetCount, FacetCounts, SearchEngine};
pub use filter::{parse_min_rating, FilterState, SortKey};
