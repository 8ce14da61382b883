pub mod engine;
pub mod nav;

pub use engine::{
    AutocompleteEngine, Commit, Suggestion, SuggestionKind, DEFAULT_MIN_SUGGESTION_CHARS,
    DEFAULT_SUGGESTION_LIMIT,
};
pub use nav::{NavEvent, NavState, SuggestionNav};
