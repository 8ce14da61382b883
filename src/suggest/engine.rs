//! Autocomplete over entity names, categories and locations.

use crate::index::types::Index;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum suggestions returned per keystroke
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

/// Trimmed input shorter than this yields no suggestions
pub const DEFAULT_MIN_SUGGESTION_CHARS: usize = 2;

/// What a suggestion refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Entity,
    Category,
    Location,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Entity => "entity",
            SuggestionKind::Category => "category",
            SuggestionKind::Location => "location",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state change a suggestion performs when picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// Search for the entity by name, facets unchanged
    Entity { name: String },
    /// Select a category facet and clear the query
    Category(String),
    /// Select a location facet and clear the query
    Location(String),
}

/// One autocomplete candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub text: String,
    pub subtitle: String,
    pub commit: Commit,
}

impl Suggestion {
    fn entity(name: &str, subtitle: &str) -> Self {
        Self {
            kind: SuggestionKind::Entity,
            text: name.to_string(),
            subtitle: subtitle.to_string(),
            commit: Commit::Entity {
                name: name.to_string(),
            },
        }
    }

    fn category(category: &str) -> Self {
        Self {
            kind: SuggestionKind::Category,
            text: category.to_string(),
            subtitle: "Category".to_string(),
            commit: Commit::Category(category.to_string()),
        }
    }

    fn location(location: &str) -> Self {
        Self {
            kind: SuggestionKind::Location,
            text: location.to_string(),
            subtitle: "Location".to_string(),
            commit: Commit::Location(location.to_string()),
        }
    }
}

/// Produces suggestions for partial input.
///
/// Candidates are collected in scan order (entities, then categories, then
/// locations) and truncated to `limit`. With `dedupe` set, later candidates
/// with the same kind and text as an earlier one are dropped.
#[derive(Debug, Clone)]
pub struct AutocompleteEngine {
    limit: usize,
    min_chars: usize,
    dedupe: bool,
}

impl Default for AutocompleteEngine {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SUGGESTION_LIMIT,
            min_chars: DEFAULT_MIN_SUGGESTION_CHARS,
            dedupe: true,
        }
    }
}

impl AutocompleteEngine {
    pub fn new(limit: usize, min_chars: usize, dedupe: bool) -> Self {
        Self {
            limit,
            min_chars,
            dedupe,
        }
    }

    /// Suggestions for `raw_query`, in scan order
    pub fn suggest(&self, index: &Index, raw_query: &str) -> Vec<Suggestion> {
        let trimmed = raw_query.trim();
        if trimmed.chars().count() < self.min_chars || self.limit == 0 {
            return Vec::new();
        }
        let needle = trimmed.to_lowercase();

        let entities = index.entities.iter().filter_map(|entity| {
            contains_folded(&entity.name, &needle).then(|| {
                let subtitle = entity.location.as_deref().unwrap_or(&entity.entity_type);
                Suggestion::entity(&entity.name, subtitle)
            })
        });
        let categories = index
            .categories
            .iter()
            .filter(|c| contains_folded(c, &needle))
            .map(|c| Suggestion::category(c));
        let locations = index
            .locations
            .iter()
            .filter(|l| contains_folded(l, &needle))
            .map(|l| Suggestion::location(l));

        let candidates = entities.chain(categories).chain(locations);

        if self.dedupe {
            let mut seen: FxHashSet<(SuggestionKind, String)> = FxHashSet::default();
            candidates
                .filter(|s| seen.insert((s.kind, s.text.clone())))
                .take(self.limit)
                .collect()
        } else {
            candidates.take(self.limit).collect()
        }
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}
